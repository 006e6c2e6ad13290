use crate::error::ConfigError;
use analytics::AnalyticsParams;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsSettings,
    pub portfolio: Portfolio,
    pub logging: Logging,
}

/// Constants used by the analytics calculations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Annual risk-free rate used in the Sharpe ratio (0.0425 corresponds to 4.25%).
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
    /// Rolling volatility horizons in trading days, strictly increasing.
    pub volatility_windows: Vec<usize>,
    /// Requests spanning fewer calendar days are rejected for volatility analysis.
    pub min_period_days: i64,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

/// The symbols analysed when none are given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        let params = AnalyticsParams::default();
        Self {
            risk_free_rate: params.risk_free_rate,
            trading_days_per_year: params.trading_days_per_year,
            volatility_windows: params.volatility_windows,
            min_period_days: params.min_period_days,
            lower_quantile: params.lower_quantile,
            upper_quantile: params.upper_quantile,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AnalyticsSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "trading_days_per_year must be positive".to_string(),
            ));
        }
        if self.volatility_windows.iter().any(|w| *w < 2) {
            return Err(ConfigError::ValidationError(
                "volatility windows must be at least 2 days".to_string(),
            ));
        }
        if self.volatility_windows.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::ValidationError(
                "volatility_windows must be strictly increasing".to_string(),
            ));
        }
        let in_unit = |q: f64| (0.0..=1.0).contains(&q);
        if !in_unit(self.lower_quantile)
            || !in_unit(self.upper_quantile)
            || self.lower_quantile >= self.upper_quantile
        {
            return Err(ConfigError::ValidationError(format!(
                "quantiles must satisfy 0 <= lower < upper <= 1, got {} and {}",
                self.lower_quantile, self.upper_quantile
            )));
        }
        Ok(())
    }
}

impl From<&AnalyticsSettings> for AnalyticsParams {
    fn from(settings: &AnalyticsSettings) -> Self {
        Self {
            risk_free_rate: settings.risk_free_rate,
            trading_days_per_year: settings.trading_days_per_year,
            volatility_windows: settings.volatility_windows.clone(),
            min_period_days: settings.min_period_days,
            lower_quantile: settings.lower_quantile,
            upper_quantile: settings.upper_quantile,
        }
    }
}
