//! Terminal rendering of analytics results.

use analytics::{
    AdjustedReturnReport, AnalyticsError, CorrelationMatrix, Exclusion, MddEpisode, ReturnQuantiles,
    ReturnStats, SymbolResults, VolatilityProfile,
};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

pub fn adjusted_returns(results: &SymbolResults<AdjustedReturnReport>) -> String {
    let mut summary = new_table(vec![
        "Symbol",
        "Annual return",
        "Annualized volatility",
        "Sharpe ratio",
    ]);
    for (symbol, report) in results.computed() {
        summary.add_row(vec![
            symbol.to_string(),
            opt(report.summary.annual_return, 2),
            opt(report.summary.annualized_volatility, 2),
            opt(report.summary.sharpe_ratio, 2),
        ]);
    }

    let mut rows = new_table(vec![
        "Date",
        "Symbol",
        "Open",
        "Close",
        "Daily return",
        "Running peak",
        "Drawdown %",
        "Running trough",
    ]);
    for row in results.rows() {
        rows.add_row(vec![
            row.date.to_string(),
            row.symbol.clone(),
            row.open.to_string(),
            row.close.to_string(),
            opt(row.daily_return, 2),
            row.running_peak.to_string(),
            format!("{:.2}", row.drawdown_pct),
            row.running_trough.to_string(),
        ]);
    }

    format!("{rows}\n{summary}{}", exclusions(results))
}

/// Renders one line per symbol: a completed episode, an open one, or the failure.
pub fn mdd(outcomes: &[(String, Result<MddEpisode, AnalyticsError>)]) -> String {
    let mut table = new_table(vec![
        "Symbol",
        "Peak date",
        "Peak value",
        "Trough date",
        "Trough value",
        "Loss %",
        "Recovery date",
        "Recovery value",
        "Days peak->trough",
        "Days trough->recovery",
        "Days total",
    ]);
    let mut notes = Vec::new();

    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(e) => {
                table.add_row(vec![
                    e.symbol.clone(),
                    e.peak_date.to_string(),
                    e.peak_value.to_string(),
                    e.trough_date.to_string(),
                    e.trough_value.to_string(),
                    format!("{:.2}", e.loss_pct),
                    e.recovery_date.to_string(),
                    e.recovery_value.to_string(),
                    e.days_peak_to_trough.to_string(),
                    e.days_trough_to_recovery.to_string(),
                    e.days_total.to_string(),
                ]);
            }
            Err(AnalyticsError::NoRecovery {
                peak_date,
                peak_value,
                trough_date,
                trough_value,
                loss_pct,
                ..
            }) => {
                table.add_row(vec![
                    symbol.clone(),
                    peak_date.to_string(),
                    peak_value.to_string(),
                    trough_date.to_string(),
                    trough_value.to_string(),
                    format!("{loss_pct:.2}"),
                    "not recovered".to_string(),
                    "-".to_string(),
                    (*trough_date - *peak_date).num_days().to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]);
            }
            Err(e) => notes.push(format!("{symbol}: {e}")),
        }
    }

    with_notes(table.to_string(), notes)
}

pub fn volatility(outcomes: &[(String, Result<VolatilityProfile, AnalyticsError>)]) -> String {
    let mut table = new_table(vec!["Symbol", "Window", "Daily volatility", "Annualized volatility"]);
    let mut notes = Vec::new();

    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(profile) if profile.windows.is_empty() => {
                notes.push(format!("{symbol}: not enough data for any window"));
            }
            Ok(profile) => {
                for w in &profile.windows {
                    table.add_row(vec![
                        symbol.clone(),
                        format!("{}D", w.window),
                        format!("{:.5}", w.daily_volatility),
                        format!("{:.5}", w.annualized_volatility),
                    ]);
                }
            }
            Err(e) => notes.push(format!("{symbol}: {e}")),
        }
    }

    with_notes(table.to_string(), notes)
}

pub fn correlation(matrix: &CorrelationMatrix) -> String {
    let mut header = vec![""];
    header.extend(matrix.symbols.iter().map(String::as_str));
    let mut table = new_table(header);

    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        let mut cells = vec![symbol.clone()];
        cells.extend(row.iter().map(|v| opt(*v, 4)));
        table.add_row(cells);
    }
    table.to_string()
}

pub fn stats(results: &SymbolResults<ReturnStats>) -> String {
    let mut table = new_table(vec!["Symbol", "Mean", "Std dev", "Min", "Max"]);
    for (symbol, s) in results.computed() {
        table.add_row(vec![
            symbol.to_string(),
            opt(s.mean, 5),
            opt(s.std, 5),
            opt(s.min, 5),
            opt(s.max, 5),
        ]);
    }
    format!("{table}{}", exclusions(results))
}

pub fn quantiles(results: &SymbolResults<ReturnQuantiles>) -> String {
    let mut table = new_table(vec!["Symbol", "Lower level", "Lower", "Upper level", "Upper"]);
    for (symbol, q) in results.computed() {
        table.add_row(vec![
            symbol.to_string(),
            q.lower_level.to_string(),
            opt(q.lower, 5),
            q.upper_level.to_string(),
            opt(q.upper, 5),
        ]);
    }
    format!("{table}{}", exclusions(results))
}

fn exclusions<T>(results: &SymbolResults<T>) -> String {
    let notes: Vec<String> = results
        .excluded()
        .map(|(symbol, reason)| match reason {
            Exclusion::NoData => format!("{symbol}: excluded, no data"),
            Exclusion::Failed(msg) => format!("{symbol}: excluded, {msg}"),
        })
        .collect();
    with_notes(String::new(), notes)
}

fn with_notes(mut out: String, notes: Vec<String>) -> String {
    for note in notes {
        out.push('\n');
        out.push_str(&note);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_formats_missing_values() {
        assert_eq!(opt(None, 2), "-");
        assert_eq!(opt(Some(0.1), 2), "0.10");
        assert_eq!(opt(Some(-0.000123), 5), "-0.00012");
    }

    #[test]
    fn test_correlation_table_lists_symbols() {
        let matrix = CorrelationMatrix {
            symbols: vec!["AAA".to_string(), "BBB".to_string()],
            values: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
        };
        let out = correlation(&matrix);
        assert!(out.contains("AAA"));
        assert!(out.contains("1.0000"));
        assert!(out.contains('-'));
    }
}
