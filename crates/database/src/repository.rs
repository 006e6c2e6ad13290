use crate::DbError;
use chrono::NaiveDate;
use core_types::{DateRange, PricePoint};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

/// Read-only access to the `stock_info` daily price table.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches one symbol's open/close prices between two dates, inclusive,
    /// ordered by date.
    pub async fn get_price_series(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<Vec<PricePoint>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT fecha, symbol, open, close_price
            FROM stock_info
            WHERE symbol = $1 AND fecha BETWEEN $2 AND $3
            ORDER BY fecha ASC
            "#,
        )
        .bind(symbol.trim().to_uppercase())
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        let points = rows_to_points(&rows)?;
        tracing::debug!(symbol, %range, rows = points.len(), "Fetched price series.");
        Ok(points)
    }

    /// Fetches several symbols in one query, ordered by date then symbol.
    pub async fn get_price_series_many(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<Vec<PricePoint>, DbError> {
        let symbols = normalize_symbols(symbols);
        let rows = sqlx::query(
            r#"
            SELECT fecha, symbol, open, close_price
            FROM stock_info
            WHERE symbol = ANY($1) AND fecha BETWEEN $2 AND $3
            ORDER BY fecha ASC, symbol ASC
            "#,
        )
        .bind(&symbols)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await?;

        let points = rows_to_points(&rows)?;
        tracing::info!(symbols = symbols.len(), %range, rows = points.len(), "Fetched price table.");
        Ok(points)
    }
}

fn rows_to_points(rows: &[PgRow]) -> Result<Vec<PricePoint>, DbError> {
    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(point) = row_to_point(row)? {
            points.push(point);
        }
    }
    Ok(points)
}

/// Decodes one row. Both price columns are nullable in `stock_info`; a row
/// missing either price is skipped rather than failing the whole query.
fn row_to_point(row: &PgRow) -> Result<Option<PricePoint>, DbError> {
    let date: NaiveDate = row.try_get("fecha")?;
    let symbol: String = row.try_get("symbol")?;
    let open: Option<Decimal> = row.try_get("open")?;
    let close: Option<Decimal> = row.try_get("close_price")?;
    Ok(point_from_columns(date, symbol, open, close))
}

fn point_from_columns(
    date: NaiveDate,
    symbol: String,
    open: Option<Decimal>,
    close: Option<Decimal>,
) -> Option<PricePoint> {
    match (open, close) {
        (Some(open), Some(close)) => Some(PricePoint {
            date,
            symbol,
            open,
            close,
        }),
        _ => {
            tracing::warn!(
                symbol = %symbol,
                %date,
                open_missing = open.is_none(),
                close_missing = close.is_none(),
                "Skipping row with a NULL price."
            );
            None
        }
    }
}

/// Upper-cases and de-duplicates symbols, keeping their first-seen order.
fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut unique = Vec::with_capacity(symbols.len());
    for symbol in symbols.iter().map(|s| s.trim().to_uppercase()) {
        if !unique.contains(&symbol) {
            unique.push(symbol);
        }
    }
    unique
}
