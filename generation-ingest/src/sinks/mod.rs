pub mod sqlite_store;

pub use sqlite_store::SqliteGenerationStore;

/// Persistence failures. Unlike fetch failures these end the run.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Table(#[from] generation_client::InvalidTableName),
}
