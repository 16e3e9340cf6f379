use anyhow::Result;
use generation_ingest::{
    config::AppConfig,
    metrics_server, observability,
    pipeline::{FixedPacing, IngestionSpan, Pipeline},
    report,
    sinks::SqliteGenerationStore,
    sources::BmrsHttpSource,
};
use time::OffsetDateTime;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store = SqliteGenerationStore::connect(&cfg.store).await?;
    store.ensure_schema().await?;

    let today = OffsetDateTime::now_utc().date();
    let span = IngestionSpan::trailing_years(today, cfg.pipeline.lookback_years);

    let pipeline = Pipeline {
        source: BmrsHttpSource::new(&cfg.api)?,
        sink: store.clone(),
        pacer: FixedPacing(cfg.pipeline.pacing()),
        window: cfg.pipeline.window(),
    };
    pipeline.run(span).await?;

    let summary = store.summarize_combinations().await?;
    println!("\nUnique (psrType, businessType) combinations:\n");
    print!("{}", report::combinations_table(&summary));

    Ok(())
}
