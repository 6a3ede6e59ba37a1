use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod search;

use health::health_check;
use search::{search_books, search_empty, SharedAggregator};

pub fn build_router(aggregator: SharedAggregator, cors: CorsLayer) -> Router {
    Router::new()
        .route("/status", get(health_check))
        .route("/search/", get(search_empty))
        .route("/search/:query", get(search_books))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(aggregator)
}
