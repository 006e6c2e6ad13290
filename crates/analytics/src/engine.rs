use crate::aggregate::{
    correlation_matrix, describe, quantiles_of, CorrelationMatrix, ReturnQuantiles, ReturnStats,
    SymbolResults,
};
use crate::drawdown::{compute_drawdown, find_worst_episode, MddEpisode};
use crate::error::AnalyticsError;
use crate::params::AnalyticsParams;
use crate::provider::{normalize_symbols, PriceSeriesProvider};
use crate::report::AdjustedReturnReport;
use crate::returns::{compute_returns, summarize, ReturnSeries};
use crate::volatility::{check_period, volatility_profile, VolatilityProfile};
use core_types::DateRange;
use rayon::prelude::*;

/// A stateless calculator that answers analytics requests over a price provider.
///
/// Every method is a pure function of the provider's data and the parameters;
/// calling one twice on the same input yields identical output.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine<P> {
    provider: P,
    params: AnalyticsParams,
}

impl<P: PriceSeriesProvider> AnalyticsEngine<P> {
    pub fn new(provider: P) -> Self {
        Self::with_params(provider, AnalyticsParams::default())
    }

    pub fn with_params(provider: P, params: AnalyticsParams) -> Self {
        Self { provider, params }
    }

    pub fn params(&self) -> &AnalyticsParams {
        &self.params
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches a symbol's prices and derives its daily log returns.
    pub fn returns_for(&self, symbol: &str, range: DateRange) -> Result<ReturnSeries, AnalyticsError> {
        let points = self.provider.fetch(symbol, range)?;
        compute_returns(&points)
    }

    /// Daily returns, drawdown trace and annualized summary for one symbol.
    pub fn adjusted_return(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<AdjustedReturnReport, AnalyticsError> {
        let returns = self.returns_for(symbol, range)?;
        let trace = compute_drawdown(&returns);
        let summary = summarize(&returns, &self.params);
        Ok(AdjustedReturnReport::new(&returns, &trace, summary))
    }

    /// The worst drawdown episode of one symbol with its duration.
    ///
    /// An episode that has not recovered by `range.end()` comes back as
    /// `AnalyticsError::NoRecovery`, which is a valid terminal state.
    pub fn mdd_duration(&self, symbol: &str, range: DateRange) -> Result<MddEpisode, AnalyticsError> {
        let returns = self.returns_for(symbol, range)?;
        find_worst_episode(&compute_drawdown(&returns))
    }

    /// Rolling volatility at every configured horizon that fits the request.
    ///
    /// Requests spanning fewer than `min_period_days` calendar days are
    /// rejected before any data is fetched.
    pub fn volatility_profile(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<VolatilityProfile, AnalyticsError> {
        let days = check_period(range, &self.params)?;
        let returns = self.returns_for(symbol, range)?;
        volatility_profile(&returns, days, &self.params)
    }

    /// Adjusted-return reports for several symbols.
    ///
    /// Symbols without data, or whose computation fails, are marked excluded
    /// and never affect the others.
    pub fn adjusted_returns_for(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> SymbolResults<AdjustedReturnReport> {
        self.per_symbol(symbols, |symbol| self.adjusted_return(symbol, range))
    }

    /// Pairwise correlation of daily returns across every symbol with data.
    pub fn correlation(&self, symbols: &[String], range: DateRange) -> CorrelationMatrix {
        let results = self.per_symbol(symbols, |symbol| self.returns_for(symbol, range));
        let series: Vec<&ReturnSeries> = results.computed().map(|(_, s)| s).collect();
        correlation_matrix(&series)
    }

    pub fn descriptive_stats(&self, symbols: &[String], range: DateRange) -> SymbolResults<ReturnStats> {
        self.per_symbol(symbols, |symbol| self.returns_for(symbol, range).map(|r| describe(&r)))
    }

    pub fn quantiles(&self, symbols: &[String], range: DateRange) -> SymbolResults<ReturnQuantiles> {
        let (lower, upper) = (self.params.lower_quantile, self.params.upper_quantile);
        self.per_symbol(symbols, |symbol| {
            self.returns_for(symbol, range)
                .map(|r| quantiles_of(&r, lower, upper))
        })
    }

    /// Runs `op` for each distinct symbol in parallel and collects the
    /// outcomes in request order.
    fn per_symbol<T, F>(&self, symbols: &[String], op: F) -> SymbolResults<T>
    where
        T: Send,
        F: Fn(&str) -> Result<T, AnalyticsError> + Sync,
    {
        let results: Vec<(String, Result<T, AnalyticsError>)> = normalize_symbols(symbols)
            .into_par_iter()
            .map(|symbol| {
                let result = op(&symbol);
                (symbol, result)
            })
            .collect();

        SymbolResults::from_results(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;
    use chrono::{Days, NaiveDate};
    use core_types::PricePoint;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;

    fn provider(closes: &[f64]) -> InMemoryProvider {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes.iter().enumerate().map(|(i, c)| {
            let price = Decimal::from_f64(*c).unwrap();
            PricePoint::new(start + Days::new(i as u64), "ACME", price, price)
        });
        InMemoryProvider::from_points(points).unwrap()
    }

    #[test]
    fn test_volatility_rejects_short_period_before_fetching() {
        let engine = AnalyticsEngine::new(InMemoryProvider::default());
        let range = DateRange::from_ymd((2024, 1, 1), (2024, 1, 20)).unwrap();
        let err = engine.volatility_profile("ACME", range).unwrap_err();
        assert!(matches!(err, AnalyticsError::PeriodTooShort { days: 19, min_days: 20, .. }));
    }

    #[test]
    fn test_volatility_on_missing_symbol_is_no_data() {
        let engine = AnalyticsEngine::new(InMemoryProvider::default());
        let range = DateRange::from_ymd((2024, 1, 1), (2024, 3, 1)).unwrap();
        assert!(matches!(
            engine.volatility_profile("ACME", range),
            Err(AnalyticsError::NoData { .. })
        ));
    }

    #[test]
    fn test_mdd_duration_end_to_end() {
        let engine = AnalyticsEngine::new(provider(&[100.0, 110.0, 90.0, 95.0, 115.0]));
        let range = DateRange::from_ymd((2024, 1, 1), (2024, 1, 31)).unwrap();
        let episode = engine.mdd_duration("acme", range).unwrap();
        assert_eq!(episode.symbol, "ACME");
        assert_eq!(episode.loss_pct, -18.18);
        assert_eq!(episode.days_total, 3);
    }

    #[test]
    fn test_adjusted_return_rows_align() {
        let engine = AnalyticsEngine::new(provider(&[100.0, 110.0, 90.0]));
        let range = DateRange::from_ymd((2024, 1, 1), (2024, 1, 31)).unwrap();
        let report = engine.adjusted_return("ACME", range).unwrap();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].daily_return, None);
        assert_eq!(report.rows[2].drawdown_pct, -18.18);
        assert_eq!(report.rows[2].running_trough, 90.0);
    }

    #[test]
    fn test_per_symbol_dedupes_and_keeps_order() {
        let engine = AnalyticsEngine::new(provider(&[1.0, 2.0]));
        let range = DateRange::from_ymd((2024, 1, 1), (2024, 1, 31)).unwrap();
        let symbols = vec!["zzz".to_string(), "acme".to_string(), "ACME".to_string()];
        let results = engine.descriptive_stats(&symbols, range);
        let order: Vec<&str> = results.entries.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["ZZZ", "ACME"]);
    }
}
