use crate::config::Settings;
use crate::models::responses::BookResult;
use crate::sources::{
    BookSource, GutenbergSource, OpenLibrarySource, MAX_RESULTS_PER_SOURCE,
};
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const NOT_FOUND_MESSAGE: &str = "No books found from any source.";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Fans a query out to every registered source and merges what comes back.
pub struct Aggregator {
    sources: Vec<Arc<dyn BookSource>>,
    request_timeout: Duration,
}

impl Aggregator {
    /// Sources are queried and merged in the order given here.
    pub fn new(sources: Vec<Arc<dyn BookSource>>, request_timeout: Duration) -> Self {
        Self {
            sources,
            request_timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, url::ParseError> {
        let gutenberg = GutenbergSource::new(&settings.gutenberg_base_url)?;
        let open_library = OpenLibrarySource::new(
            &settings.openlibrary_base_url,
            &settings.openlibrary_covers_url,
        );

        Ok(Self::new(
            vec![Arc::new(gutenberg), Arc::new(open_library)],
            settings.source_timeout,
        ))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<BookResult>, SearchError> {
        // One client per search; its connections close when it drops below.
        let client = Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(SearchError::Client)?;

        let per_source = join_all(
            self.sources
                .iter()
                .map(|source| fetch_or_empty(source.as_ref(), &client, query)),
        )
        .await;
        drop(client);

        let merged: Vec<BookResult> = per_source.into_iter().flatten().collect();
        let total = merged.len();
        let books = dedupe_by_title(merged);

        info!(
            "Search '{}' merged {} results into {} unique books",
            query,
            total,
            books.len()
        );

        if books.is_empty() {
            return Err(SearchError::NotFound);
        }

        Ok(books)
    }
}

/// Runs one source, turning any failure into an empty contribution.
async fn fetch_or_empty(source: &dyn BookSource, client: &Client, query: &str) -> Vec<BookResult> {
    match source.fetch(client, query).await {
        Ok(mut books) => {
            books.truncate(MAX_RESULTS_PER_SOURCE);
            info!("{} returned {} results", source.kind(), books.len());
            books
        }
        Err(e) => {
            warn!("Error searching {}: {}", source.kind(), e);
            Vec::new()
        }
    }
}

/// Keeps the first book seen for each case-insensitive title.
pub fn dedupe_by_title(books: Vec<BookResult>) -> Vec<BookResult> {
    let mut seen_titles = HashSet::new();

    books
        .into_iter()
        .filter(|book| seen_titles.insert(book.dedup_key()))
        .collect()
}
