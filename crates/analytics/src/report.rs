use crate::drawdown::DrawdownTrace;
use crate::returns::{AdjustedReturnSummary, ReturnSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One output row of the adjusted-return table: a day's returns and drawdown
/// state for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedReturnRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub daily_return: Option<f64>,
    pub running_peak: f64,
    pub drawdown_pct: f64,
    pub running_trough: f64,
}

/// The full adjusted-return result for a single symbol.
///
/// This is the data transfer object handed to rendering or storage layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedReturnReport {
    pub symbol: String,
    pub summary: AdjustedReturnSummary,
    pub rows: Vec<AdjustedReturnRow>,
}

impl AdjustedReturnReport {
    /// Zips a return series with the drawdown trace derived from it.
    pub fn new(returns: &ReturnSeries, trace: &DrawdownTrace, summary: AdjustedReturnSummary) -> Self {
        let rows = returns
            .records
            .iter()
            .zip(&trace.records)
            .map(|(ret, dd)| AdjustedReturnRow {
                symbol: returns.symbol.clone(),
                date: ret.date,
                open: ret.open,
                close: ret.close,
                daily_return: ret.daily_return,
                running_peak: dd.running_peak,
                drawdown_pct: dd.drawdown_pct,
                running_trough: dd.running_trough,
            })
            .collect();

        Self {
            symbol: returns.symbol.clone(),
            summary,
            rows,
        }
    }
}
