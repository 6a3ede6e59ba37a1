use crate::models::responses::{BookResult, SourceKind};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

pub mod gutenberg;
pub mod open_library;

pub use gutenberg::GutenbergSource;
pub use open_library::OpenLibrarySource;

/// Upper bound on how many results a single source contributes.
pub const MAX_RESULTS_PER_SOURCE: usize = 5;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::Decode(err.to_string())
    }
}

/// A single upstream book catalog.
///
/// Implementations issue exactly one request per `fetch` and return at most
/// [`MAX_RESULTS_PER_SOURCE`] results. Errors are reported, not swallowed;
/// the aggregator decides what a failed source contributes.
#[async_trait]
pub trait BookSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, client: &Client, query: &str) -> Result<Vec<BookResult>, UpstreamError>;
}

/// Sends the request and rejects non-2xx statuses.
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, UpstreamError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(UpstreamError::Status(response.status()));
    }

    Ok(response)
}
