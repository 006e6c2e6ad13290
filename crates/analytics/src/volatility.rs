use crate::error::AnalyticsError;
use crate::params::{AnalyticsParams, TRADING_DAYS_PER_YEAR};
use crate::returns::ReturnSeries;
use crate::stats::{round_dp, sample_std};
use core_types::{CoreError, DateRange};
use serde::{Deserialize, Serialize};

/// Volatility of one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowVolatility {
    pub window: usize,
    pub daily_volatility: f64,
    pub annualized_volatility: f64,
}

/// Every horizon that fit the requested span and series, in increasing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    pub symbol: String,
    pub span_days: i64,
    pub windows: Vec<WindowVolatility>,
}

/// Sample standard deviation of the daily returns in the first full window,
/// i.e. the `window` returns ending at index `window`, rounded to 5 decimals.
///
/// Index 0 has no return, so `window + 1` observations are required. Later
/// observations never affect the result; this is not a trailing window over
/// the latest data.
pub fn rolling_volatility(returns: &ReturnSeries, window: usize) -> Result<f64, AnalyticsError> {
    if window < 2 {
        return Err(CoreError::InvalidInput(
            "volatility window".to_string(),
            format!("{window} is too small for a sample standard deviation"),
        )
        .into());
    }

    let required = window + 1;
    if returns.len() < required {
        return Err(AnalyticsError::InsufficientData {
            symbol: returns.symbol.clone(),
            window,
            required,
            available: returns.len(),
        });
    }

    let values: Vec<f64> = returns.records[1..=window]
        .iter()
        .filter_map(|r| r.daily_return)
        .collect();
    if values.len() < window {
        return Err(AnalyticsError::InsufficientData {
            symbol: returns.symbol.clone(),
            window,
            required,
            available: values.len() + 1,
        });
    }

    sample_std(&values)
        .map(|std| round_dp(std, 5))
        .ok_or_else(|| AnalyticsError::InsufficientData {
            symbol: returns.symbol.clone(),
            window,
            required,
            available: returns.len(),
        })
}

/// Scales a daily volatility to a yearly one using 252 trading days.
pub fn annualize(daily_vol: f64) -> f64 {
    annualize_with(daily_vol, TRADING_DAYS_PER_YEAR)
}

pub fn annualize_with(daily_vol: f64, trading_days_per_year: u32) -> f64 {
    daily_vol * f64::from(trading_days_per_year).sqrt()
}

/// Rejects a request spanning fewer than `min_period_days` calendar days.
///
/// This is the request-boundary check; it runs before any data is fetched.
pub fn check_period(range: DateRange, params: &AnalyticsParams) -> Result<i64, AnalyticsError> {
    let days = range.span_days();
    if days < params.min_period_days {
        return Err(AnalyticsError::PeriodTooShort {
            range,
            days,
            min_days: params.min_period_days,
        });
    }
    Ok(days)
}

/// Runs the ordered window chain.
///
/// Each window is tried only if the previous one succeeded, the span covers
/// at least `window` calendar days and the series holds at least `window`
/// observations. The first window that fails any of those ends the chain.
pub fn volatility_profile(
    returns: &ReturnSeries,
    span_days: i64,
    params: &AnalyticsParams,
) -> Result<VolatilityProfile, AnalyticsError> {
    let mut windows = Vec::with_capacity(params.volatility_windows.len());

    for &window in &params.volatility_windows {
        if span_days < window as i64 || returns.len() < window {
            tracing::debug!(symbol = %returns.symbol, window, span_days, rows = returns.len(), "Window does not fit, stopping.");
            break;
        }

        let daily_volatility = match rolling_volatility(returns, window) {
            Ok(vol) => vol,
            Err(AnalyticsError::InsufficientData { available, .. }) => {
                tracing::debug!(symbol = %returns.symbol, window, available, "Insufficient data for window, stopping.");
                break;
            }
            Err(e) => return Err(e),
        };

        windows.push(WindowVolatility {
            window,
            daily_volatility,
            annualized_volatility: round_dp(
                annualize_with(daily_volatility, params.trading_days_per_year),
                5,
            ),
        });
    }

    Ok(VolatilityProfile {
        symbol: returns.symbol.clone(),
        span_days,
        windows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::ReturnRecord;
    use approx::assert_abs_diff_eq;
    use chrono::{Days, NaiveDate};
    use rstest::rstest;

    /// A series of `n` observations whose returns alternate +0.01 / -0.01.
    fn alternating(n: usize) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = (0..n)
            .map(|i| ReturnRecord {
                date: start + Days::new(i as u64),
                open: 100.0,
                close: 100.0,
                daily_return: match i {
                    0 => None,
                    i if i % 2 == 1 => Some(0.01),
                    _ => Some(-0.01),
                },
            })
            .collect();
        ReturnSeries {
            symbol: "ALT".to_string(),
            records,
        }
    }

    #[test]
    fn test_first_full_window_is_deterministic() {
        let vol = rolling_volatility(&alternating(21), 20).unwrap();
        // sqrt(20 * 0.0001 / 19)
        assert_eq!(vol, 0.01026);
        assert_eq!(rolling_volatility(&alternating(21), 20).unwrap(), vol);
    }

    #[test]
    fn test_window_uses_first_window_not_latest() {
        let mut series = alternating(30);
        for record in series.records.iter_mut().skip(21) {
            record.daily_return = Some(0.5);
        }
        assert_eq!(rolling_volatility(&series, 20).unwrap(), 0.01026);
    }

    #[rstest]
    #[case(19)]
    #[case(20)]
    fn test_short_series_is_insufficient(#[case] n: usize) {
        let err = rolling_volatility(&alternating(n), 20).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InsufficientData {
                symbol: "ALT".to_string(),
                window: 20,
                required: 21,
                available: n
            }
        );
        assert!(err.to_string().contains("ALT"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_check_period_boundary() {
        let params = AnalyticsParams::default();
        let short = DateRange::from_ymd((2024, 1, 1), (2024, 1, 20)).unwrap();
        let exact = DateRange::from_ymd((2024, 1, 1), (2024, 1, 21)).unwrap();
        assert!(matches!(
            check_period(short, &params),
            Err(AnalyticsError::PeriodTooShort { days: 19, .. })
        ));
        assert_eq!(check_period(exact, &params), Ok(20));
    }

    #[test]
    fn test_annualize() {
        assert_abs_diff_eq!(annualize(0.01), 0.01 * 252f64.sqrt());
        assert_abs_diff_eq!(annualize_with(0.02, 365), 0.02 * 365f64.sqrt());
    }

    #[rstest]
    #[case(101, 400, vec![20, 40, 60, 80, 100])]
    #[case(101, 59, vec![20, 40])]
    #[case(45, 400, vec![20, 40])]
    #[case(40, 400, vec![20])]
    #[case(20, 400, vec![])]
    fn test_profile_short_circuits(
        #[case] rows: usize,
        #[case] span_days: i64,
        #[case] expected: Vec<usize>,
    ) {
        let profile = volatility_profile(&alternating(rows), span_days, &AnalyticsParams::default()).unwrap();
        let windows: Vec<usize> = profile.windows.iter().map(|w| w.window).collect();
        assert_eq!(windows, expected);
    }

    #[test]
    fn test_profile_annualizes_rounded_daily_volatility() {
        let profile = volatility_profile(&alternating(21), 30, &AnalyticsParams::default()).unwrap();
        let w = profile.windows[0];
        assert_eq!(w.daily_volatility, 0.01026);
        assert_eq!(w.annualized_volatility, round_dp(0.01026 * 252f64.sqrt(), 5));
    }
}
