use std::env;
use std::time::Duration;

use crate::oracle::{GoogleNewsFeed, YahooPriceOracle};

/// Runtime configuration, read once at startup. Every field has a default so
/// the service runs with no environment at all.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub price_base_url: String,
    pub news_base_url: String,
    /// Timeout on each outbound HTTP request.
    pub http_timeout: Duration,
    /// Engine-side bound on a single symbol's price or news lookup.
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://stockfolio.db".into()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            price_base_url: env::var("PRICE_BASE_URL")
                .unwrap_or_else(|_| YahooPriceOracle::DEFAULT_BASE_URL.into()),
            news_base_url: env::var("NEWS_BASE_URL")
                .unwrap_or_else(|_| GoogleNewsFeed::DEFAULT_BASE_URL.into()),
            http_timeout: duration_var("HTTP_TIMEOUT_SECS", 10),
            fetch_timeout: duration_var("FETCH_TIMEOUT_SECS", 15),
        }
    }
}

fn duration_var(name: &str, default_secs: u64) -> Duration {
    Duration::from_secs(
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_secs),
    )
}
