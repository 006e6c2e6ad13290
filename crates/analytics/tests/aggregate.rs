use analytics::{
    AnalyticsEngine, AnalyticsError, Exclusion, InMemoryProvider, PriceSeriesProvider, SymbolOutcome,
};
use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use core_types::{DateRange, PricePoint};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rstest::{fixture, rstest};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn points(symbol: &str, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let price = Decimal::from_f64(*c).unwrap();
            PricePoint::new(start() + Days::new(i as u64), symbol, price, price)
        })
        .collect()
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A provider whose backing store is unreachable for one symbol.
struct FlakyProvider {
    inner: InMemoryProvider,
    down: &'static str,
}

impl PriceSeriesProvider for FlakyProvider {
    fn fetch(&self, symbol: &str, range: DateRange) -> Result<Vec<PricePoint>, AnalyticsError> {
        if symbol.eq_ignore_ascii_case(self.down) {
            return Err(AnalyticsError::Provider {
                symbol: symbol.to_string(),
                message: "connection timed out".to_string(),
            });
        }
        self.inner.fetch(symbol, range)
    }
}

#[fixture]
fn engine() -> AnalyticsEngine<FlakyProvider> {
    let closes = [100.0, 101.0, 99.0, 103.0, 104.0, 102.0, 106.0, 105.0];
    let mut rows = points("AAA", &closes);
    rows.extend(points("BBB", &closes));
    rows.extend(points("CCC", &[50.0, 0.0, 51.0]));
    rows.extend(points("DDD", &[10.0, 11.0]));
    let inner = InMemoryProvider::from_points(rows).unwrap();
    AnalyticsEngine::new(FlakyProvider { inner, down: "DDD" })
}

#[fixture]
fn january() -> DateRange {
    DateRange::from_ymd((2024, 1, 1), (2024, 1, 31)).unwrap()
}

#[rstest]
fn test_adjusted_returns_isolate_failures(engine: AnalyticsEngine<FlakyProvider>, january: DateRange) {
    let results = engine.adjusted_returns_for(&symbols(&["BBB", "CCC", "ZZZ", "DDD", "AAA"]), january);

    let computed: Vec<&str> = results.computed().map(|(s, _)| s).collect();
    assert_eq!(computed, vec!["BBB", "AAA"]);

    let excluded: Vec<(&str, &Exclusion)> = results.excluded().collect();
    assert_eq!(excluded.len(), 3);
    assert!(matches!(excluded[0], ("CCC", Exclusion::Failed(msg)) if msg.contains("Invalid close price")));
    assert_eq!(excluded[1], ("ZZZ", &Exclusion::NoData));
    assert_eq!(excluded[2], ("DDD", &Exclusion::NoData));

    // Concatenated rows: BBB's days first, then AAA's, each chronological.
    let rows = results.rows();
    assert_eq!(rows.len(), 16);
    assert!(rows[..8].iter().all(|r| r.symbol == "BBB"));
    assert!(rows[8..].iter().all(|r| r.symbol == "AAA"));
    assert!(rows[..8].windows(2).all(|w| w[0].date < w[1].date));
}

#[rstest]
fn test_fetch_many_treats_provider_failure_as_empty(engine: AnalyticsEngine<FlakyProvider>, january: DateRange) {
    let rows = engine
        .provider()
        .fetch_many(&symbols(&["AAA", "DDD", "BBB"]), january)
        .unwrap();

    assert_eq!(rows.len(), 16);
    assert!(rows.iter().all(|p| p.symbol != "DDD"));
    assert!(rows.windows(2).all(|w| (w[0].date, &w[0].symbol) <= (w[1].date, &w[1].symbol)));
}

#[rstest]
fn test_all_symbols_failing_is_an_empty_result(engine: AnalyticsEngine<FlakyProvider>, january: DateRange) {
    let results = engine.adjusted_returns_for(&symbols(&["ZZZ", "DDD"]), january);
    assert!(results.is_empty());
    assert!(results.rows().is_empty());
    assert!(results
        .entries
        .iter()
        .all(|e| matches!(e.outcome, SymbolOutcome::Excluded(_))));
}

#[rstest]
fn test_identical_series_correlation_matrix(engine: AnalyticsEngine<FlakyProvider>, january: DateRange) {
    let matrix = engine.correlation(&symbols(&["AAA", "BBB", "DDD"]), january);
    assert_eq!(matrix.symbols, vec!["AAA", "BBB"]);
    assert_eq!(matrix.values.len(), 2);
    for row in &matrix.values {
        assert_eq!(row.len(), 2);
        for value in row {
            assert_abs_diff_eq!(value.unwrap(), 1.0, epsilon = 1e-9);
        }
    }
}

#[rstest]
fn test_stats_and_quantiles_cover_each_symbol(engine: AnalyticsEngine<FlakyProvider>, january: DateRange) {
    let stats = engine.descriptive_stats(&symbols(&["AAA", "CCC"]), january);
    let (symbol, aaa) = stats.computed().next().unwrap();
    assert_eq!(symbol, "AAA");
    assert_eq!(aaa.min, Some(-0.02));
    assert_eq!(aaa.max, Some(0.04));
    assert_eq!(stats.excluded().count(), 1);

    let quantiles = engine.quantiles(&symbols(&["AAA"]), january);
    let (_, q) = quantiles.computed().next().unwrap();
    assert_eq!(q.lower_level, 0.01);
    assert_eq!(q.upper_level, 0.99);
    assert!(q.lower.unwrap() <= q.upper.unwrap());
}

#[rstest]
fn test_operations_are_idempotent(engine: AnalyticsEngine<FlakyProvider>, january: DateRange) {
    let list = symbols(&["AAA", "BBB", "CCC"]);
    assert_eq!(engine.adjusted_returns_for(&list, january), engine.adjusted_returns_for(&list, january));
    assert_eq!(engine.correlation(&list, january), engine.correlation(&list, january));
    assert_eq!(engine.descriptive_stats(&list, january), engine.descriptive_stats(&list, january));
}

#[rstest]
fn test_volatility_profile_over_long_series() {
    let closes: Vec<f64> = (0..61).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    let provider = InMemoryProvider::from_points(points("VOL", &closes)).unwrap();
    let engine = AnalyticsEngine::new(provider);

    let range = DateRange::from_ymd((2024, 1, 1), (2024, 12, 31)).unwrap();
    let profile = engine.volatility_profile("VOL", range).unwrap();
    let windows: Vec<usize> = profile.windows.iter().map(|w| w.window).collect();
    assert_eq!(windows, vec![20, 40, 60]);
    assert!(profile.windows.iter().all(|w| w.daily_volatility > 0.0));
}
