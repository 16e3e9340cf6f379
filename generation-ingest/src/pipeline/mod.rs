mod pacing;
mod window;

pub use pacing::{FixedPacing, NoPacing, Pacer};
pub use window::{FetchWindow, IngestionSpan, Windows};

use generation_client::GenerationRecord;

use crate::{sinks::StoreError, sources::FetchError};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Turns one window into records with a single remote call.
#[async_trait::async_trait]
pub trait WindowSource: Send + Sync {
    async fn fetch(&self, window: FetchWindow) -> Result<Vec<GenerationRecord>, FetchError>;
}

/// Append-only destination for fetched records.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Appends all records in one write and returns how many were stored.
    async fn append(&self, records: &[GenerationRecord]) -> Result<u64, StoreError>;
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub windows: usize,
    pub failed_windows: usize,
    pub records_stored: u64,
}

/// Walks a span window by window, strictly one request at a time.
///
/// A failed fetch skips its window; a failed append aborts the run.
pub struct Pipeline<S, K, P> {
    pub source: S,
    pub sink: K,
    pub pacer: P,
    pub window: time::Duration,
}

impl<S, K, P> Pipeline<S, K, P>
where
    S: WindowSource,
    K: RecordSink,
    P: Pacer,
{
    pub async fn run(&self, span: IngestionSpan) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        for (index, window) in span.windows(self.window).enumerate() {
            report.windows += 1;
            metrics::counter!("pipeline_windows_total").increment(1);
            tracing::info!(from = %window.start(), to = %window.end(), "fetching window");

            match self.source.fetch(window).await {
                Ok(records) if records.is_empty() => {
                    tracing::info!(from = %window.start(), to = %window.end(), "window returned no records");
                }
                Ok(records) => {
                    let stored = self.sink.append(&records).await.map_err(|e| {
                        tracing::error!(error = %e, from = %window.start(), to = %window.end(), "append failed, aborting run");
                        e
                    })?;
                    report.records_stored += stored;
                    tracing::info!(from = %window.start(), to = %window.end(), records = stored, "stored window");
                }
                Err(e) => {
                    report.failed_windows += 1;
                    tracing::warn!(error = %e, from = %window.start(), to = %window.end(), "fetch failed, skipping window");
                }
            }

            let delay = self.pacer.delay_after(index);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!(
            windows = report.windows,
            failed_windows = report.failed_windows,
            records = report.records_stored,
            "data fetching and storing complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use time::macros::date;
    use time::Date;

    fn record(start: Date) -> GenerationRecord {
        GenerationRecord {
            publish_time: format!("{start}T00:30:00Z"),
            business_type: "Wind generation".into(),
            psr_type: "Wind Onshore".into(),
            quantity: 1234.5,
            start_time: format!("{start}T00:00:00Z"),
            settlement_date: start.to_string(),
            settlement_period: 1,
        }
    }

    /// A real reqwest error; the URL never parses, so nothing is sent.
    fn transport_fault() -> FetchError {
        let err = reqwest::Client::new()
            .get("http://[::1")
            .build()
            .unwrap_err();
        FetchError::Http(err)
    }

    /// Two records per window; windows starting on a listed date fail.
    #[derive(Default)]
    struct ScriptedSource {
        failing_starts: Vec<Date>,
        empty_starts: Vec<Date>,
        calls: Mutex<Vec<FetchWindow>>,
    }

    #[async_trait::async_trait]
    impl WindowSource for ScriptedSource {
        async fn fetch(&self, window: FetchWindow) -> Result<Vec<GenerationRecord>, FetchError> {
            self.calls.lock().unwrap().push(window);
            if self.failing_starts.contains(&window.start()) {
                return Err(transport_fault());
            }
            if self.empty_starts.contains(&window.start()) {
                return Ok(Vec::new());
            }
            Ok(vec![record(window.start()), record(window.start())])
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<Vec<GenerationRecord>>>,
        fail_on_call: Option<usize>,
    }

    #[async_trait::async_trait]
    impl RecordSink for RecordingSink {
        async fn append(&self, records: &[GenerationRecord]) -> Result<u64, StoreError> {
            let mut batches = self.batches.lock().unwrap();
            if self.fail_on_call == Some(batches.len()) {
                return Err(StoreError::Database(sqlx::Error::PoolClosed));
            }
            batches.push(records.to_vec());
            Ok(records.len() as u64)
        }
    }

    fn pipeline(source: ScriptedSource, sink: RecordingSink) -> Pipeline<ScriptedSource, RecordingSink, NoPacing> {
        Pipeline {
            source,
            sink,
            pacer: NoPacing,
            window: time::Duration::weeks(1),
        }
    }

    #[tokio::test]
    async fn degenerate_span_makes_no_calls() {
        let p = pipeline(ScriptedSource::default(), RecordingSink::default());
        let day = date!(2024-06-01);

        let report = p.run(IngestionSpan::new(day, day)).await.unwrap();

        assert_eq!(report, RunReport::default());
        assert!(p.source.calls.lock().unwrap().is_empty());
        assert!(p.sink.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_window_is_skipped_and_the_run_continues() {
        let source = ScriptedSource {
            failing_starts: vec![date!(2024-01-08)],
            ..Default::default()
        };
        let p = pipeline(source, RecordingSink::default());

        let report = p
            .run(IngestionSpan::new(date!(2024-01-01), date!(2024-01-29)))
            .await
            .unwrap();

        assert_eq!(report.windows, 4);
        assert_eq!(report.failed_windows, 1);
        assert!(matches!(transport_fault(), FetchError::Http(_)));
        assert_eq!(report.records_stored, 6);
        assert_eq!(p.source.calls.lock().unwrap().len(), 4);

        let batches = p.sink.batches.lock().unwrap();
        let starts: Vec<_> = batches.iter().map(|b| b[0].settlement_date.clone()).collect();
        assert_eq!(starts, ["2024-01-01", "2024-01-15", "2024-01-22"]);
    }

    #[tokio::test]
    async fn empty_results_are_not_written() {
        let source = ScriptedSource {
            empty_starts: vec![date!(2024-01-01)],
            ..Default::default()
        };
        let p = pipeline(source, RecordingSink::default());

        let report = p
            .run(IngestionSpan::new(date!(2024-01-01), date!(2024-01-10)))
            .await
            .unwrap();

        assert_eq!(report.windows, 2);
        assert_eq!(report.failed_windows, 0);
        assert_eq!(p.sink.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_failure_aborts_the_run() {
        let sink = RecordingSink {
            fail_on_call: Some(1),
            ..Default::default()
        };
        let p = pipeline(ScriptedSource::default(), sink);

        let res = p
            .run(IngestionSpan::new(date!(2024-01-01), date!(2024-02-01)))
            .await;

        assert!(matches!(res, Err(PipelineError::Store(_))));
        // The second window's append failed, so nothing after it was fetched.
        assert_eq!(p.source.calls.lock().unwrap().len(), 2);
        assert_eq!(p.sink.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn last_window_is_clamped_to_the_span_end() {
        let p = pipeline(ScriptedSource::default(), RecordingSink::default());

        p.run(IngestionSpan::new(date!(2024-01-01), date!(2024-01-10)))
            .await
            .unwrap();

        let calls = p.source.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].start(), date!(2024-01-08));
        assert_eq!(calls[1].end(), date!(2024-01-10));
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_pacing_waits_after_every_window() {
        let p = Pipeline {
            source: ScriptedSource::default(),
            sink: RecordingSink::default(),
            pacer: FixedPacing(std::time::Duration::from_millis(500)),
            window: time::Duration::weeks(1),
        };
        let started = tokio::time::Instant::now();

        p.run(IngestionSpan::new(date!(2024-01-01), date!(2024-01-22)))
            .await
            .unwrap();

        assert!(started.elapsed() >= std::time::Duration::from_millis(1500));
    }
}
