use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    service: String,
    status: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct BookResult {
    source: String,
    title: String,
    author: String,
    url: String,
    cover_url: Option<String>,
    action: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    detail: String,
}

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000";
const READY_ATTEMPTS: u32 = 15;
const READY_INTERVAL: Duration = Duration::from_secs(2);

struct SearchClient {
    client: Client,
    service_url: String,
    ready_attempts: u32,
    ready_interval: Duration,
}

impl SearchClient {
    fn new(service_url: String) -> Self {
        Self {
            client: Client::new(),
            service_url: service_url.trim_end_matches('/').to_string(),
            ready_attempts: READY_ATTEMPTS,
            ready_interval: READY_INTERVAL,
        }
    }

    fn with_readiness(mut self, attempts: u32, interval: Duration) -> Self {
        self.ready_attempts = attempts;
        self.ready_interval = interval;
        self
    }

    async fn wait_for_service(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Waiting for aggregator service at {}...", self.service_url);
        let url = format!("{}/status", self.service_url);

        for attempt in 1..=self.ready_attempts {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    let health: HealthResponse = response.json().await?;
                    info!("{} is {}", health.service, health.status);
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        "Attempt {}: service responded with status: {}",
                        attempt,
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("Attempt {}: service not ready: {}", attempt, e);
                }
            }
            sleep(self.ready_interval).await;
        }

        Err(format!(
            "service at {} not ready after {} attempts",
            self.service_url, self.ready_attempts
        )
        .into())
    }

    async fn search(&self, query: &str) -> Result<Vec<BookResult>, Box<dyn std::error::Error>> {
        let url = format!(
            "{}/search/{}",
            self.service_url,
            urlencoding::encode(query)
        );
        let response = self.client.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => {
                let body: ErrorResponse = response.json().await?;
                info!("'{}': {}", query, body.detail);
                Ok(Vec::new())
            }
            status => Err(format!("search for '{}' failed: {}", query, status).into()),
        }
    }

    async fn run_queries(&self, queries: &[String]) {
        for query in queries {
            match self.search(query).await {
                Ok(books) if books.is_empty() => {}
                Ok(books) => {
                    info!("'{}': {} books", query, books.len());
                    for book in &books {
                        info!(
                            "  [{}] {} by {} ({}) -> {}",
                            book.source,
                            book.title,
                            if book.author.is_empty() { "unknown" } else { book.author.as_str() },
                            book.action,
                            book.url
                        );
                    }
                }
                Err(e) => error!("✗ {}", e),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("search_client=info")
        .init();

    let service_url =
        std::env::var("SERVICE_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
    let ready_attempts = std::env::var("READY_ATTEMPTS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(READY_ATTEMPTS);
    let client = SearchClient::new(service_url).with_readiness(ready_attempts, READY_INTERVAL);

    client.wait_for_service().await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let queries = if args.is_empty() {
        let default_queries = vec!["dracula".to_string(), "pride and prejudice".to_string()];
        info!(
            "No queries specified, searching defaults: {:?}",
            default_queries
        );
        default_queries
    } else {
        args
    };

    client.run_queries(&queries).await;
    Ok(())
}
