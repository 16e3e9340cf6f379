use anyhow::Result;
use generation_ingest::{config::AppConfig, observability, report, sinks::SqliteGenerationStore};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    let store = SqliteGenerationStore::connect(&cfg.store).await?;
    store.ensure_schema().await?;

    let summary = store.summarize_combinations().await?;
    println!("\nUnique (psrType, businessType) combinations:\n");
    print!("{}", report::combinations_table(&summary));

    Ok(())
}
