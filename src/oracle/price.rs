//! Price oracle: trait plus the Yahoo Finance chart-endpoint implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::OracleError;
use crate::types::valuation::PriceQuote;

/// External source of a current price. Callers additionally bound each lookup
/// with their own timeout; a failure affects only the symbol it was for.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, OracleError>;
}

/// Yahoo Finance v8 chart endpoint, one day of daily candles. The quote is
/// the meta block's regular market price.
pub struct YahooPriceOracle {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    currency: Option<String>,
}

impl YahooPriceOracle {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn unavailable(symbol: &str, reason: impl ToString) -> OracleError {
        OracleError::PriceUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl PriceOracle for YahooPriceOracle {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, OracleError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
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
        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(symbol, e))?;

        let meta = body
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| Self::unavailable(symbol, "empty chart result"))?;
        let price = meta
            .regular_market_price
            .ok_or_else(|| Self::unavailable(symbol, "no market price in response"))?;
        Ok(PriceQuote {
            price,
            currency: meta.currency.unwrap_or_else(|| "USD".to_string()),
        })
    }
}
