use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spot price for one symbol as returned by a price oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub currency: String,
}

/// One row of a valuation report. `unit_price` and `line_value` are `None`
/// exactly when the price fetch for this symbol failed or timed out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationLine {
    pub symbol: String,
    pub shares: f64,
    pub unit_price: Option<f64>,
    pub line_value: Option<f64>,
}

/// Point-in-time portfolio valuation. Line order follows the ledger snapshot;
/// `total_value` sums only the lines whose price resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub lines: Vec<ValuationLine>,
    pub total_value: f64,
}

/// A single news item for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// Per-symbol news result. A failed fetch and an empty feed both map to
/// `Unavailable`, so callers never have to infer state from a missing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "headlines", rename_all = "lowercase")]
pub enum NewsDigest {
    Available(Vec<Headline>),
    Unavailable,
}
