use anyhow::{bail, Result};
use generation_ingest::{config::AppConfig, observability, sinks::SqliteGenerationStore};
use std::env;

/// Writes per-day, per-type generation totals as CSV for charting.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: export_daily <output_csv_path>");
    }
    let out_path = &args[1];

    let cfg = AppConfig::load()?;

    let store = SqliteGenerationStore::connect(&cfg.store).await?;
    store.ensure_schema().await?;

    let totals = store.daily_totals().await?;

    let mut writer = csv::Writer::from_path(out_path)?;
    for row in &totals {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!(rows = totals.len(), path = %out_path, "daily totals exported");

    Ok(())
}
