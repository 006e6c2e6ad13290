use crate::error::AnalyticsError;
use core_types::{CoreError, DateRange, PricePoint};
use std::collections::BTreeMap;

/// The contract the analytics core depends on for its input data.
///
/// Implementations return each symbol's rows ordered by date with inclusive
/// bounds. Gaps (non-trading days) are absent rows, never zero-filled.
pub trait PriceSeriesProvider: Send + Sync {
    /// Returns the ordered series for one symbol, or `AnalyticsError::NoData`
    /// when the symbol/range yields zero rows.
    fn fetch(&self, symbol: &str, range: DateRange) -> Result<Vec<PricePoint>, AnalyticsError>;

    /// Returns every requested symbol's rows in one table ordered by date,
    /// then symbol. Symbols without data, or whose fetch failed, are left out.
    fn fetch_many(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<Vec<PricePoint>, AnalyticsError> {
        let mut rows = Vec::new();
        for symbol in symbols {
            match self.fetch(symbol, range) {
                Ok(points) => rows.extend(points),
                Err(AnalyticsError::NoData { .. }) => continue,
                Err(e @ AnalyticsError::Provider { .. }) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Provider failed, treating symbol as empty.");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));
        Ok(rows)
    }
}

/// Symbols are matched case-insensitively and stored upper case.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Normalizes a symbol list, dropping blanks and duplicates and keeping
/// first-seen order.
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols.iter().map(|s| normalize_symbol(s)) {
        if !symbol.is_empty() && !unique.contains(&symbol) {
            unique.push(symbol);
        }
    }
    unique
}

/// A provider over rows that have already been loaded into memory, e.g. the
/// result of a single `fetch_many` against the database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: BTreeMap<String, Vec<PricePoint>>,
}

impl InMemoryProvider {
    /// Groups rows by symbol and sorts each group by date.
    ///
    /// Duplicate `(symbol, date)` rows are rejected since they would break the
    /// strictly-increasing date invariant of a series.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Result<Self, CoreError> {
        let mut series: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();
        for mut point in points {
            point.symbol = normalize_symbol(&point.symbol);
            series.entry(point.symbol.clone()).or_default().push(point);
        }

        for (symbol, rows) in series.iter_mut() {
            rows.sort_by_key(|p| p.date);
            if let Some(pair) = rows.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(CoreError::InvalidInput(
                    "price rows".to_string(),
                    format!("duplicate row for {symbol} on {}", pair[0].date),
                ));
            }
        }

        Ok(Self { series })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl PriceSeriesProvider for InMemoryProvider {
    fn fetch(&self, symbol: &str, range: DateRange) -> Result<Vec<PricePoint>, AnalyticsError> {
        let symbol = normalize_symbol(symbol);
        let rows = self.series.get(&symbol).map(Vec::as_slice).unwrap_or_default();

        let first = rows.partition_point(|p| p.date < range.start());
        let last = rows.partition_point(|p| p.date <= range.end());
        let selected = &rows[first..last.max(first)];

        if selected.is_empty() {
            return Err(AnalyticsError::NoData {
                symbol,
                range: Some(range),
            });
        }
        Ok(selected.to_vec())
    }
}
