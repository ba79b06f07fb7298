//! News aggregation: trait plus the Google News RSS search feed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rss::Channel;
use std::io::Cursor;
use std::time::Duration;

use crate::error::OracleError;
use crate::types::valuation::Headline;

/// External source of recent headlines for a symbol.
#[async_trait]
pub trait NewsAggregator: Send + Sync {
    async fn get_headlines(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Headline>, OracleError>;
}

/// Google News RSS search for "<symbol> stock" on the US english feed.
pub struct GoogleNewsFeed {
    client: Client,
    base_url: String,
}

impl GoogleNewsFeed {
    pub const DEFAULT_BASE_URL: &'static str = "https://news.google.com";

    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn unavailable(symbol: &str, reason: impl ToString) -> OracleError {
        OracleError::FeedUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl NewsAggregator for GoogleNewsFeed {
    async fn get_headlines(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Headline>, OracleError> {
        let url = format!(
            "{}/rss/search?q={}+stock&hl=en-US&gl=US&ceid=US:en",
            self.base_url, symbol
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::unavailable(symbol, e))?;
        if !response.status().is_success() {
            return Err(Self::unavailable(
                symbol,
                format!("HTTP {}", response.status()),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::unavailable(symbol, e))?;
        let channel =
            Channel::read_from(Cursor::new(bytes)).map_err(|e| Self::unavailable(symbol, e))?;

        // Items missing a title or link are feed noise, skip them.
        let headlines = channel
            .items()
            .iter()
            .filter_map(|item| {
                let title = item.title()?.to_string();
                let link = item.link()?.to_string();
                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|d| d.with_timezone(&Utc));
                Some(Headline {
                    title,
                    link,
                    published,
                })
            })
            .take(limit)
            .collect();
        Ok(headlines)
    }
}
