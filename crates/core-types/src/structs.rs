use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One trading day for one symbol.
///
/// Dates carry no intraday component. Within a single symbol's series the
/// provider guarantees strictly increasing, unique dates; non-trading days are
/// simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: Decimal,
    pub close: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, symbol: impl Into<String>, open: Decimal, close: Decimal) -> Self {
        Self {
            date,
            symbol: symbol.into(),
            open,
            close,
        }
    }
}

/// An inclusive calendar date range used for every price query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form; deserialized ranges go through `DateRange::new`.
#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = CoreError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a range, rejecting one that ends before it starts.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvalidInput(
                "date range".to_string(),
                format!("end date {end} is before start date {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from `(year, month, day)` triples.
    pub fn from_ymd(start: (i32, u32, u32), end: (i32, u32, u32)) -> Result<Self, CoreError> {
        let to_date = |(y, m, d): (i32, u32, u32)| {
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
                CoreError::InvalidInput("date".to_string(), format!("{y}-{m}-{d} is not a calendar date"))
            })
        };
        Self::new(to_date(start)?, to_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days between start and end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
