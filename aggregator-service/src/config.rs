use crate::sources::gutenberg::GUTENBERG_BASE_URL;
use crate::sources::open_library::{OPENLIBRARY_BASE_URL, OPENLIBRARY_COVERS_URL};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost,http://127.0.0.1,null";

/// Startup configuration for the service, read once in `main`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub gutenberg_base_url: String,
    pub openlibrary_base_url: String,
    pub openlibrary_covers_url: String,
    pub source_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gutenberg_base_url: GUTENBERG_BASE_URL.to_string(),
            openlibrary_base_url: OPENLIBRARY_BASE_URL.to_string(),
            openlibrary_covers_url: OPENLIBRARY_COVERS_URL.to_string(),
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
            cors_allowed_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port);
        let mut timeout_secs = parse_or(
            &lookup,
            "SOURCE_TIMEOUT_SECS",
            defaults.source_timeout.as_secs(),
        );
        // A zero timeout would fail every upstream call immediately.
        if timeout_secs == 0 {
            warn!("Ignoring SOURCE_TIMEOUT_SECS=0, using {}s", DEFAULT_SOURCE_TIMEOUT_SECS);
            timeout_secs = DEFAULT_SOURCE_TIMEOUT_SECS;
        }

        Self {
            port,
            gutenberg_base_url: lookup("GUTENBERG_BASE_URL")
                .unwrap_or(defaults.gutenberg_base_url),
            openlibrary_base_url: lookup("OPENLIBRARY_BASE_URL")
                .unwrap_or(defaults.openlibrary_base_url),
            openlibrary_covers_url: lookup("OPENLIBRARY_COVERS_URL")
                .unwrap_or(defaults.openlibrary_covers_url),
            source_timeout: Duration::from_secs(timeout_secs),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|origins| split_origins(&origins))
                .unwrap_or(defaults.cors_allowed_origins),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {} value '{}'", key, raw);
            default
        }),
        None => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
