use crate::error::AnalyticsError;
use crate::params::AnalyticsParams;
use crate::stats::{mean, round_dp, sample_std};
use chrono::NaiveDate;
use core_types::{CoreError, PricePoint};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// One day of a symbol's return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    /// `None` on the first day, which has no prior close.
    pub daily_return: Option<f64>,
}

/// Daily log returns for a single symbol, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbol: String,
    pub records: Vec<ReturnRecord>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The defined daily returns, skipping the undefined first one.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.daily_return).collect()
    }
}

/// Computes `ln(close[i] / close[i-1])` for every day, rounded to 2 decimals.
///
/// An empty input yields an empty series. Every close must be strictly
/// positive and dates must be strictly increasing within one symbol.
pub fn compute_returns(series: &[PricePoint]) -> Result<ReturnSeries, AnalyticsError> {
    let Some(first) = series.first() else {
        return Ok(ReturnSeries::default());
    };
    let symbol = first.symbol.clone();

    let mut records: Vec<ReturnRecord> = Vec::with_capacity(series.len());
    for point in series {
        if point.symbol != symbol {
            return Err(CoreError::InvalidInput(
                "price series".to_string(),
                format!("mixed symbols {symbol} and {}", point.symbol),
            )
            .into());
        }

        let close = positive_close(point)?;
        let open = point.open.to_f64().unwrap_or(f64::NAN);

        let daily_return = match records.last() {
            None => None,
            Some(prev) if prev.date >= point.date => {
                return Err(CoreError::InvalidInput(
                    "price series".to_string(),
                    format!("{symbol} dates not strictly increasing at {}", point.date),
                )
                .into());
            }
            Some(prev) => Some(round_dp((close / prev.close).ln(), 2)),
        };

        records.push(ReturnRecord {
            date: point.date,
            open,
            close,
            daily_return,
        });
    }

    tracing::debug!(symbol = %symbol, rows = records.len(), "Computed daily log returns.");
    Ok(ReturnSeries { symbol, records })
}

fn positive_close(point: &PricePoint) -> Result<f64, AnalyticsError> {
    let invalid = || AnalyticsError::InvalidPrice {
        symbol: point.symbol.clone(),
        date: point.date,
        close: point.close,
    };
    if point.close <= Decimal::ZERO {
        return Err(invalid());
    }
    point.close.to_f64().filter(|c| c.is_finite()).ok_or_else(invalid)
}

/// Annualized scalar aggregates of a full return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedReturnSummary {
    /// `mean(daily_return) * 252`, rounded to 2 decimals.
    pub annual_return: Option<f64>,
    /// `std(daily_return) * sqrt(252)`, rounded to 2 decimals.
    pub annualized_volatility: Option<f64>,
    /// `(annual_return - risk_free_rate) / annualized_volatility`, rounded to 2 decimals.
    pub sharpe_ratio: Option<f64>,
}

/// Summarizes a return series.
///
/// The Sharpe ratio is computed from the already-rounded annual return and
/// volatility. It is undefined when the volatility is zero or undefined.
pub fn summarize(returns: &ReturnSeries, params: &AnalyticsParams) -> AdjustedReturnSummary {
    let values = returns.daily_returns();
    let trading_days = f64::from(params.trading_days_per_year);

    let annual_return = mean(&values).map(|m| round_dp(m * trading_days, 2));
    let annualized_volatility =
        sample_std(&values).map(|s| round_dp(s * params.annualization_factor(), 2));

    let sharpe_ratio = match (annual_return, annualized_volatility) {
        (Some(ret), Some(vol)) if vol != 0.0 => {
            Some(round_dp((ret - params.risk_free_rate) / vol, 2))
        }
        _ => None,
    };

    AdjustedReturnSummary {
        annual_return,
        annualized_volatility,
        sharpe_ratio,
    }
}
