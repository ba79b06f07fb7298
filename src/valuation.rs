//! Valuation engine: merges ledger snapshots with live oracle data.
//!
//! Lookups for distinct symbols run concurrently and fail independently; a
//! dead or slow source degrades its own line, never the whole report.

use futures::future::join_all;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use crate::error::ValuationError;
use crate::oracle::{NewsAggregator, PriceOracle};
use crate::persistence;
use crate::types::position::UserId;
use crate::types::valuation::{NewsDigest, ValuationLine, ValuationReport};

pub struct ValuationEngine {
    pool: SqlitePool,
    prices: Arc<dyn PriceOracle>,
    news: Arc<dyn NewsAggregator>,
    fetch_timeout: Duration,
}

impl ValuationEngine {
    pub fn new(
        pool: SqlitePool,
        prices: Arc<dyn PriceOracle>,
        news: Arc<dyn NewsAggregator>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            prices,
            news,
            fetch_timeout,
        }
    }

    /// Value a user's holdings at current prices. Each lookup is bounded by
    /// `fetch_timeout`; a failed or slow lookup leaves that line without a
    /// price instead of failing the report. Line order follows the snapshot.
    pub async fn valuate(&self, user_id: UserId) -> Result<ValuationReport, ValuationError> {
        let positions = persistence::snapshot(&self.pool, user_id).await?;
        if positions.is_empty() {
            return Err(ValuationError::EmptyPortfolio);
        }

        let quotes = join_all(positions.iter().map(|position| async move {
            match timeout(self.fetch_timeout, self.prices.get_price(&position.symbol)).await {
                Ok(Ok(quote)) => Some(quote),
                Ok(Err(e)) => {
                    warn!("price lookup failed: {}", e);
                    None
                }
                Err(_) => {
                    warn!(
                        "price lookup for {} timed out after {:?}",
                        position.symbol, self.fetch_timeout
                    );
                    None
                }
            }
        }))
        .await;

        let mut total_value = 0.0;
        let lines = positions
            .into_iter()
            .zip(quotes)
            .map(|(position, quote)| {
                let unit_price = quote.map(|q| q.price);
                let line_value = unit_price.map(|p| p * position.shares);
                if let Some(value) = line_value {
                    total_value += value;
                }
                ValuationLine {
                    symbol: position.symbol,
                    shares: position.shares,
                    unit_price,
                    line_value,
                }
            })
            .collect();

        Ok(ValuationReport { lines, total_value })
    }

    /// Fetch recent headlines for each symbol. Every input symbol appears in
    /// the result; a failed fetch and an empty feed both map to
    /// [`NewsDigest::Unavailable`] rather than being dropped.
    pub async fn collect_news(
        &self,
        symbols: &[String],
        limit: usize,
    ) -> HashMap<String, NewsDigest> {
        let digests = join_all(symbols.iter().map(|symbol| async move {
            let digest = match timeout(self.fetch_timeout, self.news.get_headlines(symbol, limit))
                .await
            {
                Ok(Ok(headlines)) if !headlines.is_empty() => NewsDigest::Available(headlines),
                Ok(Ok(_)) => NewsDigest::Unavailable,
                Ok(Err(e)) => {
                    warn!("news fetch failed: {}", e);
                    NewsDigest::Unavailable
                }
                Err(_) => {
                    warn!(
                        "news fetch for {} timed out after {:?}",
                        symbol, self.fetch_timeout
                    );
                    NewsDigest::Unavailable
                }
            };
            (symbol.clone(), digest)
        }))
        .await;
        digests.into_iter().collect()
    }

    /// Headlines for every symbol the user currently holds.
    pub async fn portfolio_news(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<HashMap<String, NewsDigest>, ValuationError> {
        let positions = persistence::snapshot(&self.pool, user_id).await?;
        if positions.is_empty() {
            return Err(ValuationError::EmptyPortfolio);
        }
        let symbols: Vec<String> = positions.into_iter().map(|p| p.symbol).collect();
        Ok(self.collect_news(&symbols, limit).await)
    }
}
