//! Multi-symbol results: per-symbol outcomes, correlation and distribution statistics.

use crate::error::AnalyticsError;
use crate::report::{AdjustedReturnReport, AdjustedReturnRow};
use crate::returns::ReturnSeries;
use crate::stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a symbol is missing from an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Exclusion {
    /// The provider returned nothing, or could not be reached, for this symbol.
    NoData,
    /// Data was present but the computation failed.
    Failed(String),
}

impl From<&AnalyticsError> for Exclusion {
    fn from(err: &AnalyticsError) -> Self {
        match err {
            AnalyticsError::NoData { .. } | AnalyticsError::Provider { .. } => Exclusion::NoData,
            other => Exclusion::Failed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolOutcome<T> {
    Computed(T),
    Excluded(Exclusion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolResult<T> {
    pub symbol: String,
    pub outcome: SymbolOutcome<T>,
}

/// A partial result over several symbols, in request order.
///
/// A failing symbol never aborts its siblings; it is recorded as excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolResults<T> {
    pub entries: Vec<SymbolResult<T>>,
}

impl<T> SymbolResults<T> {
    pub fn from_results(results: Vec<(String, Result<T, AnalyticsError>)>) -> Self {
        let entries = results
            .into_iter()
            .map(|(symbol, result)| {
                let outcome = match result {
                    Ok(value) => SymbolOutcome::Computed(value),
                    Err(err) => {
                        tracing::warn!(symbol = %symbol, error = %err, "Excluding symbol from aggregate.");
                        SymbolOutcome::Excluded(Exclusion::from(&err))
                    }
                };
                SymbolResult { symbol, outcome }
            })
            .collect();
        Self { entries }
    }

    pub fn computed(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            SymbolOutcome::Computed(value) => Some((e.symbol.as_str(), value)),
            SymbolOutcome::Excluded(_) => None,
        })
    }

    pub fn excluded(&self) -> impl Iterator<Item = (&str, &Exclusion)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            SymbolOutcome::Excluded(reason) => Some((e.symbol.as_str(), reason)),
            SymbolOutcome::Computed(_) => None,
        })
    }

    /// True when no symbol produced a result.
    pub fn is_empty(&self) -> bool {
        self.computed().next().is_none()
    }
}

impl SymbolResults<AdjustedReturnReport> {
    /// All computed rows concatenated by symbol (request order), then date.
    pub fn rows(&self) -> Vec<&AdjustedReturnRow> {
        self.computed().flat_map(|(_, report)| report.rows.iter()).collect()
    }
}

/// Mean, sample standard deviation, min and max of a symbol's daily returns,
/// each rounded to 5 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    pub symbol: String,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn describe(returns: &ReturnSeries) -> ReturnStats {
    let values = returns.daily_returns();
    let round5 = |v: f64| stats::round_dp(v, 5);
    ReturnStats {
        symbol: returns.symbol.clone(),
        mean: stats::mean(&values).map(round5),
        std: stats::sample_std(&values).map(round5),
        min: stats::min(&values).map(round5),
        max: stats::max(&values).map(round5),
    }
}

/// Tail quantiles of a symbol's daily returns, rounded to 5 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnQuantiles {
    pub symbol: String,
    pub lower_level: f64,
    pub upper_level: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

pub fn quantiles_of(returns: &ReturnSeries, lower_level: f64, upper_level: f64) -> ReturnQuantiles {
    let values = returns.daily_returns();
    ReturnQuantiles {
        symbol: returns.symbol.clone(),
        lower_level,
        upper_level,
        lower: stats::quantile(&values, lower_level).map(|q| stats::round_dp(q, 5)),
        upper: stats::quantile(&values, upper_level).map(|q| stats::round_dp(q, 5)),
    }
}

/// Symmetric matrix of pairwise Pearson correlations of daily returns.
///
/// Each pair uses only the dates on which both symbols have a return.
/// An entry is `None` when a pair shares fewer than two such dates or one
/// side has no variance over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.values[i][j]
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

pub fn correlation_matrix(series: &[&ReturnSeries]) -> CorrelationMatrix {
    // Pivot: one date -> return lookup per symbol.
    let columns: Vec<HashMap<NaiveDate, f64>> = series
        .iter()
        .map(|s| {
            s.records
                .iter()
                .filter_map(|r| r.daily_return.map(|ret| (r.date, ret)))
                .collect()
        })
        .collect();

    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = series[i]
                .records
                .iter()
                .filter_map(|r| {
                    let x = columns[i].get(&r.date)?;
                    let y = columns[j].get(&r.date)?;
                    Some((*x, *y))
                })
                .collect();
            let corr = stats::pearson(&pairs);
            values[i][j] = corr;
            values[j][i] = corr;
        }
    }

    CorrelationMatrix {
        symbols: series.iter().map(|s| s.symbol.clone()).collect(),
        values,
    }
}
