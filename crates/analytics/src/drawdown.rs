use crate::error::AnalyticsError;
use crate::returns::ReturnSeries;
use crate::stats::round_dp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a symbol's drawdown trace, aligned with its `ReturnSeries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub running_peak: f64,
    /// Percentage below the running peak, rounded to 2 decimals. Exactly 0 at a peak.
    pub drawdown_pct: f64,
    pub running_trough: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownTrace {
    pub symbol: String,
    pub records: Vec<DrawdownRecord>,
}

/// Accumulator threaded through the drawdown scan.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extremes {
    peak: f64,
    trough: f64,
}

impl Extremes {
    fn start(close: f64) -> Self {
        Self {
            peak: close,
            trough: close,
        }
    }

    fn observe(self, close: f64) -> Self {
        Self {
            peak: self.peak.max(close),
            trough: self.trough.min(close),
        }
    }

    fn drawdown_pct(&self, close: f64) -> f64 {
        if close >= self.peak {
            0.0
        } else {
            round_dp((close / self.peak - 1.0) * 100.0, 2)
        }
    }
}

/// Builds the running peak / drawdown / running trough trace in one forward pass.
pub fn compute_drawdown(returns: &ReturnSeries) -> DrawdownTrace {
    let records = returns
        .records
        .iter()
        .scan(None::<Extremes>, |state, record| {
            let extremes = state.map_or_else(
                || Extremes::start(record.close),
                |prev| prev.observe(record.close),
            );
            *state = Some(extremes);

            Some(DrawdownRecord {
                date: record.date,
                close: record.close,
                running_peak: extremes.peak,
                drawdown_pct: extremes.drawdown_pct(record.close),
                running_trough: extremes.trough,
            })
        })
        .collect();

    DrawdownTrace {
        symbol: returns.symbol.clone(),
        records,
    }
}

/// The deepest drawdown episode of a trace, from the peak that preceded it
/// to the first close that regained that peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MddEpisode {
    pub symbol: String,
    pub peak_date: NaiveDate,
    pub peak_value: f64,
    pub trough_date: NaiveDate,
    pub trough_value: f64,
    pub loss_pct: f64,
    pub recovery_date: NaiveDate,
    pub recovery_value: f64,
    pub days_peak_to_trough: i64,
    pub days_trough_to_recovery: i64,
    pub days_total: i64,
}

/// Locates the worst drawdown of the trace and measures its duration.
///
/// Ties on the deepest drawdown go to the earliest date. A series that never
/// falls below its peak yields a zero-length, zero-loss episode on its first
/// day. Returns `AnalyticsError::NoRecovery` while the episode is still open.
pub fn find_worst_episode(trace: &DrawdownTrace) -> Result<MddEpisode, AnalyticsError> {
    let records = &trace.records;
    let Some((trough_idx, trough)) = records
        .iter()
        .enumerate()
        .reduce(|best, candidate| {
            if candidate.1.drawdown_pct < best.1.drawdown_pct {
                candidate
            } else {
                best
            }
        })
    else {
        return Err(AnalyticsError::NoData {
            symbol: trace.symbol.clone(),
            range: None,
        });
    };

    let peak_value = trough.running_peak;

    // Walk back over the run of days sharing this running peak to find where it was set.
    let peak_idx = records[..=trough_idx]
        .iter()
        .rposition(|r| r.running_peak != peak_value)
        .map_or(0, |i| i + 1);
    let peak = &records[peak_idx];

    let Some(recovery) = records[trough_idx..].iter().find(|r| r.close >= peak_value) else {
        tracing::debug!(symbol = %trace.symbol, peak = peak_value, "Worst drawdown has not recovered.");
        return Err(AnalyticsError::NoRecovery {
            symbol: trace.symbol.clone(),
            peak_date: peak.date,
            peak_value,
            trough_date: trough.date,
            trough_value: trough.close,
            loss_pct: trough.drawdown_pct,
        });
    };

    Ok(MddEpisode {
        symbol: trace.symbol.clone(),
        peak_date: peak.date,
        peak_value,
        trough_date: trough.date,
        trough_value: trough.close,
        loss_pct: trough.drawdown_pct,
        recovery_date: recovery.date,
        recovery_value: recovery.close,
        days_peak_to_trough: (trough.date - peak.date).num_days(),
        days_trough_to_recovery: (recovery.date - trough.date).num_days(),
        days_total: (recovery.date - peak.date).num_days(),
    })
}
