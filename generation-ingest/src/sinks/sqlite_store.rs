use std::str::FromStr;

use generation_client::{
    db::{self, CombinationCount, DailyTotal},
    GenerationRecord, TableName,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    QueryBuilder, Sqlite,
};

use crate::{config::StoreConfig, pipeline::RecordSink, sinks::StoreError};

/// Rows per INSERT statement. Seven binds each keeps a statement well under
/// SQLite's bound-parameter limit.
const INSERT_CHUNK_ROWS: usize = 500;

/// Append-only SQLite table of generation records.
///
/// Every call opens its own transaction; nothing is held across a run.
#[derive(Debug, Clone)]
pub struct SqliteGenerationStore {
    pool: SqlitePool,
    table: TableName,
}

impl SqliteGenerationStore {
    /// Opens (and creates, if missing) the database named in `cfg`.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let table = cfg.table_name()?;
        let options = SqliteConnectOptions::from_str(&cfg.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections.max(1))
            .connect_with(options)
            .await?;
        Ok(Self { pool, table })
    }

    /// Private in-memory database. The pool is pinned to one connection that
    /// never expires, since each SQLite memory connection is its own database.
    pub async fn in_memory(table: TableName) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool, table })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the table if absent. Existing rows are left alone.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                publishTime TEXT,
                businessType TEXT,
                psrType TEXT,
                quantity REAL,
                startTime TEXT,
                settlementDate TEXT,
                settlementPeriod INTEGER
            )
            "#,
            self.table
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query(&sql).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Appends `records` atomically. An empty slice touches nothing.
    pub async fn append(&self, records: &[GenerationRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut builder = QueryBuilder::<Sqlite>::new(format!(
                "INSERT INTO {} ({}) ",
                self.table,
                GenerationRecord::COLUMNS.join(", ")
            ));

            builder.push_values(chunk, |mut b, r| {
                b.push_bind(&r.publish_time)
                    .push_bind(&r.business_type)
                    .push_bind(&r.psr_type)
                    .push_bind(r.quantity)
                    .push_bind(&r.start_time)
                    .push_bind(&r.settlement_date)
                    .push_bind(r.settlement_period);
            });

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        metrics::counter!("store_appended_records_total").increment(inserted);
        Ok(inserted)
    }

    pub async fn summarize_combinations(&self) -> Result<Vec<CombinationCount>, StoreError> {
        Ok(db::summarize_combinations(&self.pool, &self.table).await?)
    }

    pub async fn count_rows(&self) -> Result<i64, StoreError> {
        Ok(db::count_rows(&self.pool, &self.table).await?)
    }

    pub async fn load_all(&self) -> Result<Vec<GenerationRecord>, StoreError> {
        Ok(db::load_all(&self.pool, &self.table).await?)
    }

    pub async fn load_series(&self, psr_type: &str) -> Result<Vec<GenerationRecord>, StoreError> {
        Ok(db::load_series(&self.pool, &self.table, psr_type).await?)
    }

    pub async fn daily_totals(&self) -> Result<Vec<DailyTotal>, StoreError> {
        Ok(db::daily_totals(&self.pool, &self.table).await?)
    }
}

#[async_trait::async_trait]
impl RecordSink for SqliteGenerationStore {
    async fn append(&self, records: &[GenerationRecord]) -> Result<u64, StoreError> {
        SqliteGenerationStore::append(self, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(psr_type: &str, period: i64) -> GenerationRecord {
        GenerationRecord {
            publish_time: "2024-01-01T01:00:00Z".into(),
            business_type: "A".into(),
            psr_type: psr_type.into(),
            quantity: 100.0 + period as f64,
            start_time: format!("2024-01-01T{:02}:00:00Z", period),
            settlement_date: "2024-01-01".into(),
            settlement_period: period,
        }
    }

    async fn store() -> SqliteGenerationStore {
        let store = SqliteGenerationStore::in_memory(TableName::new("wind_solar_data").unwrap())
            .await
            .unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent_and_keeps_rows() {
        let store = store().await;
        store.append(&[record("Solar", 1)]).await.unwrap();

        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        assert_eq!(store.count_rows().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_append_is_a_no_op() {
        let store = store().await;

        assert_eq!(store.append(&[]).await.unwrap(), 0);
        assert_eq!(store.count_rows().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn overlapping_appends_both_persist() {
        let store = store().await;
        let first: Vec<_> = (1..=3).map(|p| record("Solar", p)).collect();
        let second: Vec<_> = (3..=6).map(|p| record("Solar", p)).collect();

        assert_eq!(store.append(&first).await.unwrap(), 3);
        assert_eq!(store.append(&second).await.unwrap(), 4);

        assert_eq!(store.count_rows().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn append_round_trips_every_column() {
        let store = store().await;
        let original = record("Wind Offshore", 17);

        store.append(std::slice::from_ref(&original)).await.unwrap();

        assert_eq!(store.load_all().await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn large_batches_span_several_statements() {
        let store = store().await;
        let records: Vec<_> = (0..(INSERT_CHUNK_ROWS as i64 * 2 + 7))
            .map(|p| record("Wind Onshore", p))
            .collect();

        let inserted = store.append(&records).await.unwrap();

        assert_eq!(inserted, records.len() as u64);
        assert_eq!(store.count_rows().await.unwrap(), records.len() as i64);
    }

    #[tokio::test]
    async fn failed_chunk_rolls_back_the_whole_append() {
        let store = SqliteGenerationStore::in_memory(TableName::new("capped").unwrap())
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE capped (publishTime TEXT, businessType TEXT, psrType TEXT, quantity REAL, \
             startTime TEXT, settlementDate TEXT, settlementPeriod INTEGER CHECK (settlementPeriod < 700))",
        )
        .execute(store.pool())
        .await
        .unwrap();
        let records: Vec<_> = (0..(INSERT_CHUNK_ROWS as i64 * 2 + 7))
            .map(|p| record("Solar", p))
            .collect();

        let err = store.append(&records).await.unwrap_err();

        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(store.count_rows().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn summary_counts_each_pair() {
        let store = store().await;
        let mut rows: Vec<_> = (1..=3).map(|p| record("Solar", p)).collect();
        rows.extend((1..=2).map(|p| record("Wind Onshore", p)));
        store.append(&rows).await.unwrap();

        let mut summary = store.summarize_combinations().await.unwrap();
        summary.sort_by(|a, b| a.psr_type.cmp(&b.psr_type));

        let counts: Vec<_> = summary
            .iter()
            .map(|c| (c.business_type.as_str(), c.psr_type.as_str(), c.count))
            .collect();
        assert_eq!(counts, [("A", "Solar", 3), ("A", "Wind Onshore", 2)]);
    }

    #[tokio::test]
    async fn append_without_schema_fails() {
        let store = SqliteGenerationStore::in_memory(TableName::new("missing").unwrap())
            .await
            .unwrap();

        let err = store.append(&[record("Solar", 1)]).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    async fn file_backed_store_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig {
            database_url: format!("sqlite://{}", dir.path().join("generation_data.db").display()),
            ..StoreConfig::default()
        };

        let store = SqliteGenerationStore::connect(&cfg).await.unwrap();
        store.ensure_schema().await.unwrap();
        store.append(&[record("Solar", 1), record("Solar", 2)]).await.unwrap();
        store.pool().close().await;

        let reopened = SqliteGenerationStore::connect(&cfg).await.unwrap();
        reopened.ensure_schema().await.unwrap();
        assert_eq!(reopened.count_rows().await.unwrap(), 2);
    }
}
