use chrono::NaiveDate;
use core_types::{CoreError, DateRange};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No price data for {symbol}{}", range_suffix(.range))]
    NoData {
        symbol: String,
        range: Option<DateRange>,
    },

    #[error("Invalid close price {close} for {symbol} on {date}: log returns need a positive close")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        close: Decimal,
    },

    #[error("Not enough data for {symbol} over a {window}-day window: need {required} observations, have {available}")]
    InsufficientData {
        symbol: String,
        window: usize,
        required: usize,
        available: usize,
    },

    #[error("Period too short: {range} spans {days} days, at least {min_days} are required")]
    PeriodTooShort {
        range: DateRange,
        days: i64,
        min_days: i64,
    },

    #[error(
        "Drawdown of {loss_pct}% for {symbol} has not recovered: peak {peak_value} on {peak_date}, trough {trough_value} on {trough_date}"
    )]
    NoRecovery {
        symbol: String,
        peak_date: NaiveDate,
        peak_value: f64,
        trough_date: NaiveDate,
        trough_value: f64,
        loss_pct: f64,
    },

    #[error("Price provider failed for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AnalyticsError {
    /// Soft outcomes that callers are expected to handle as normal results
    /// rather than abort on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalyticsError::NoData { .. }
                | AnalyticsError::InsufficientData { .. }
                | AnalyticsError::NoRecovery { .. }
        )
    }
}

fn range_suffix(range: &Option<DateRange>) -> String {
    range.map(|r| format!(" in {r}")).unwrap_or_default()
}
