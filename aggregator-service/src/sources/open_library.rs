use super::{send_checked, BookSource, UpstreamError, MAX_RESULTS_PER_SOURCE};
use crate::models::responses::{BookResult, SourceKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

pub const OPENLIBRARY_BASE_URL: &str = "https://openlibrary.org";
pub const OPENLIBRARY_COVERS_URL: &str = "https://covers.openlibrary.org";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Open Library's JSON search API.
pub struct OpenLibrarySource {
    api_base_url: String,
    cover_base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    docs: Vec<Value>,
}

/// One entry of the `docs` array; every field is optional upstream.
#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    key: Option<String>,
    cover_i: Option<Value>,
}

impl SearchDoc {
    /// Cover id, if upstream sent an integer; anything else means no cover.
    fn cover_id(&self) -> Option<u64> {
        self.cover_i.as_ref().and_then(Value::as_u64)
    }
}

impl OpenLibrarySource {
    pub fn new(api_base_url: &str, cover_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            cover_base_url: cover_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search.json", self.api_base_url)
    }

    fn cover_url(&self, cover_id: u64) -> String {
        format!("{}/b/id/{}-M.jpg", self.cover_base_url, cover_id)
    }

    /// Maps a search response body to at most [`MAX_RESULTS_PER_SOURCE`] books.
    ///
    /// Docs that fail to decode or carry no `key` are skipped individually.
    pub fn parse_results(&self, body: &str) -> Result<Vec<BookResult>, UpstreamError> {
        let envelope: SearchEnvelope = serde_json::from_str(body)?;

        let books = envelope
            .docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<SearchDoc>(doc) {
                Ok(doc) => self.to_book(doc),
                Err(e) => {
                    debug!("Skipping malformed Open Library doc: {}", e);
                    None
                }
            })
            .take(MAX_RESULTS_PER_SOURCE)
            .collect();

        Ok(books)
    }

    fn to_book(&self, doc: SearchDoc) -> Option<BookResult> {
        let cover_image_url = doc.cover_id().map(|id| self.cover_url(id));

        let Some(key) = doc.key.filter(|key| !key.is_empty()) else {
            debug!("Skipping Open Library doc without a key");
            return None;
        };

        let title = doc
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        Some(BookResult::new(
            SourceKind::OpenLibrary,
            title,
            doc.author_name.unwrap_or_default().join(", "),
            format!("{}{}", self.api_base_url, key),
            cover_image_url,
        ))
    }
}

#[async_trait]
impl BookSource for OpenLibrarySource {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenLibrary
    }

    async fn fetch(&self, client: &Client, query: &str) -> Result<Vec<BookResult>, UpstreamError> {
        info!("Searching Open Library for '{}'", query);

        let limit = MAX_RESULTS_PER_SOURCE.to_string();
        let request = client
            .get(self.search_url())
            .query(&[("q", query), ("limit", limit.as_str())]);

        let body = send_checked(request).await?.text().await?;

        self.parse_results(&body)
    }
}
