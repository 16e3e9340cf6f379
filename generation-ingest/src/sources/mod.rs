pub mod bmrs_http;

pub use bmrs_http::BmrsHttpSource;

/// Why one window produced no records.
///
/// None of these stop a run; the pipeline logs them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to format date: {0}")]
    DateFormat(#[from] time::error::Format),
}
