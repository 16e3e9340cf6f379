use anyhow::{bail, Context, Result};
use generation_ingest::{
    config::AppConfig,
    observability,
    pipeline::{FixedPacing, IngestionSpan, Pipeline},
    sinks::SqliteGenerationStore,
    sources::BmrsHttpSource,
};
use std::env;
use time::{macros::format_description, Date};

fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: backfill_range <from YYYY-MM-DD> <to YYYY-MM-DD>");
    }
    let span = IngestionSpan::new(parse_date(&args[1])?, parse_date(&args[2])?);

    // Load configuration (can point GENERATION_INGEST_CONFIG to a backfill-specific file).
    let cfg = AppConfig::load()?;

    let store = SqliteGenerationStore::connect(&cfg.store).await?;
    store.ensure_schema().await?;

    let pipeline = Pipeline {
        source: BmrsHttpSource::new(&cfg.api)?,
        sink: store,
        pacer: FixedPacing(cfg.pipeline.pacing()),
        window: cfg.pipeline.window(),
    };

    let report = pipeline.run(span).await?;
    tracing::info!(
        from = %span.start,
        to = %span.end,
        windows = report.windows,
        failed_windows = report.failed_windows,
        records = report.records_stored,
        "backfill finished"
    );

    Ok(())
}
