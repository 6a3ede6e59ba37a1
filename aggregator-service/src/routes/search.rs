use crate::models::responses::{BookResult, ErrorResponse};
use crate::services::aggregator::{Aggregator, SearchError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info};

pub type SharedAggregator = Arc<Aggregator>;

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            SearchError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            SearchError::Client(e) => {
                error!("Search aborted: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

pub async fn search_books(
    Path(query): Path<String>,
    State(aggregator): State<SharedAggregator>,
) -> Result<Json<Vec<BookResult>>, SearchError> {
    run_search(&aggregator, &query).await
}

/// `/search/` with nothing after it searches for the empty string.
pub async fn search_empty(
    State(aggregator): State<SharedAggregator>,
) -> Result<Json<Vec<BookResult>>, SearchError> {
    run_search(&aggregator, "").await
}

async fn run_search(
    aggregator: &Aggregator,
    query: &str,
) -> Result<Json<Vec<BookResult>>, SearchError> {
    info!("Search query: {:?}", query);

    let books = aggregator.search(query).await?;
    Ok(Json(books))
}
