use serde::{Deserialize, Serialize};

/// Annual risk-free rate subtracted from the annual return in the Sharpe ratio.
pub const RISK_FREE_RATE: f64 = 0.0425;
/// Trading days in a year, used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;
/// Rolling volatility horizons, evaluated in this order.
pub const STANDARD_WINDOWS: [usize; 5] = [20, 40, 60, 80, 100];
/// Shortest request span, in calendar days, accepted for volatility analysis.
pub const MIN_PERIOD_DAYS: i64 = 20;

/// Tunable constants for every calculation in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsParams {
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
    /// Must be strictly increasing; the volatility chain stops at the first window that does not fit.
    pub volatility_windows: Vec<usize>,
    pub min_period_days: i64,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl AnalyticsParams {
    pub fn annualization_factor(&self) -> f64 {
        f64::from(self.trading_days_per_year).sqrt()
    }
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            risk_free_rate: RISK_FREE_RATE,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            volatility_windows: STANDARD_WINDOWS.to_vec(),
            min_period_days: MIN_PERIOD_DAYS,
            lower_quantile: 0.01,
            upper_quantile: 0.99,
        }
    }
}
