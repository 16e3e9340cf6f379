use sqlx::SqlitePool;

use crate::domain::{GenerationRecord, TableName};

/// Row count of one `(businessType, psrType)` pair.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CombinationCount {
    pub business_type: String,
    pub psr_type: String,
    pub count: i64,
}

/// Summed quantity of one production type over one UTC day.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DailyTotal {
    pub day: String,
    pub psr_type: String,
    pub total_mw: f64,
}

/// Distinct `(businessType, psrType)` pairs with their row counts.
///
/// Row order is whatever SQLite's grouping produces; callers must not rely on it.
pub async fn summarize_combinations(
    pool: &SqlitePool,
    table: &TableName,
) -> Result<Vec<CombinationCount>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT
            businessType AS business_type,
            psrType      AS psr_type,
            COUNT(*)     AS count
        FROM {table}
        GROUP BY psrType, businessType
        "#
    );

    sqlx::query_as::<_, CombinationCount>(&sql).fetch_all(pool).await
}

pub async fn count_rows(pool: &SqlitePool, table: &TableName) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await
}

/// Full-table read in `startTime` order.
pub async fn load_all(
    pool: &SqlitePool,
    table: &TableName,
) -> Result<Vec<GenerationRecord>, sqlx::Error> {
    let sql = format!("SELECT * FROM {table} ORDER BY startTime");
    sqlx::query_as::<_, GenerationRecord>(&sql).fetch_all(pool).await
}

/// Time-ordered series for a single production type (e.g. "Solar").
pub async fn load_series(
    pool: &SqlitePool,
    table: &TableName,
    psr_type: &str,
) -> Result<Vec<GenerationRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT *
        FROM {table}
        WHERE psrType = ?1
        ORDER BY startTime
        "#
    );

    sqlx::query_as::<_, GenerationRecord>(&sql)
        .bind(psr_type)
        .fetch_all(pool)
        .await
}

/// Daily generation per production type.
///
/// The day is the date prefix of `startTime`, which the API reports in UTC.
/// `TOTAL` yields 0.0 rather than NULL for groups without quantities.
pub async fn daily_totals(
    pool: &SqlitePool,
    table: &TableName,
) -> Result<Vec<DailyTotal>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT
            substr(startTime, 1, 10) AS day,
            psrType                  AS psr_type,
            TOTAL(quantity)          AS total_mw
        FROM {table}
        GROUP BY day, psrType
        ORDER BY day, psrType
        "#
    );

    sqlx::query_as::<_, DailyTotal>(&sql).fetch_all(pool).await
}
