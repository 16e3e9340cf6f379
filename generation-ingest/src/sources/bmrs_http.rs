use generation_client::GenerationRecord;
use time::{macros::format_description, Date};

use crate::{
    config::ApiConfig,
    pipeline::{FetchWindow, WindowSource},
    sources::FetchError,
};

/// Client for the per-type wind and solar generation endpoint.
#[derive(Debug, Clone)]
pub struct BmrsHttpSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    data: Option<Vec<IncomingGenerationRecord>>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingGenerationRecord {
    publish_time: String,
    business_type: String,
    psr_type: String,
    quantity: f64,
    start_time: String,
    settlement_date: String,
    settlement_period: i64,
}

impl From<IncomingGenerationRecord> for GenerationRecord {
    fn from(i: IncomingGenerationRecord) -> Self {
        GenerationRecord {
            publish_time: i.publish_time,
            business_type: i.business_type,
            psr_type: i.psr_type,
            quantity: i.quantity,
            start_time: i.start_time,
            settlement_date: i.settlement_date,
            settlement_period: i.settlement_period,
        }
    }
}

fn format_date(date: Date) -> Result<String, FetchError> {
    Ok(date.format(format_description!("[year]-[month]-[day]"))?)
}

impl BmrsHttpSource {
    pub fn new(cfg: &ApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
        })
    }

    /// Fetches `[from, to)` and returns whatever came back, or nothing.
    ///
    /// Never fails: inverted ranges and request errors are logged and give
    /// an empty vector. An inverted range is not sent to the API.
    pub async fn fetch_range(&self, from: Date, to: Date) -> Vec<GenerationRecord> {
        let Some(window) = FetchWindow::new(from, to) else {
            tracing::warn!(%from, %to, "empty or inverted range, nothing to fetch");
            return Vec::new();
        };

        match self.fetch(window).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, %from, %to, "error fetching range");
                Vec::new()
            }
        }
    }

    async fn request(&self, window: FetchWindow) -> Result<Vec<GenerationRecord>, FetchError> {
        let from = format_date(window.start())?;
        let to = format_date(window.end())?;

        let res = self
            .client
            .get(&self.base_url)
            .query(&[("from", from.as_str()), ("to", to.as_str()), ("format", "json")])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = res.text().await?;
        let payload: ApiResponse = serde_json::from_str(&body)?;
        tracing::debug!(%from, %to, bytes = body.len(), "decoded response");

        Ok(payload
            .data
            .unwrap_or_default()
            .into_iter()
            .map(GenerationRecord::from)
            .collect())
    }
}

#[async_trait::async_trait]
impl WindowSource for BmrsHttpSource {
    async fn fetch(&self, window: FetchWindow) -> Result<Vec<GenerationRecord>, FetchError> {
        metrics::counter!("bmrs_fetch_requests_total").increment(1);

        match self.request(window).await {
            Ok(records) => {
                metrics::counter!("bmrs_fetched_records_total").increment(records.len() as u64);
                Ok(records)
            }
            Err(e) => {
                metrics::counter!("bmrs_fetch_failed_total").increment(1);
                Err(e)
            }
        }
    }
}
