use aggregator_service::config::Settings;
use aggregator_service::routes::build_router;
use aggregator_service::services::aggregator::Aggregator;
use aggregator_service::utils::cors::cors_layer;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aggregator_service=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env();

    let aggregator = match Aggregator::from_settings(&settings) {
        Ok(aggregator) => Arc::new(aggregator),
        Err(e) => {
            error!("Invalid source URL in configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Aggregating {} sources with a {:?} per-source timeout",
        aggregator.source_count(),
        settings.source_timeout
    );

    let app = build_router(aggregator, cors_layer(&settings.cors_allowed_origins));

    let addr = settings.bind_address();
    info!("Aggregator service starting on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
