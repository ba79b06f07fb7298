//! Error taxonomy shared by the ledger, the oracles, and the valuation
//! engine. Validation errors are raised before any store mutation; oracle
//! errors stay scoped to the symbol that caused them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid amount {amount}: must be a finite, positive quantity")]
    InvalidAmount { amount: f64 },

    #[error("invalid symbol: must be non-empty")]
    InvalidSymbol,

    #[error("insufficient shares of {symbol}: held {held}, requested {requested}")]
    InsufficientShares {
        symbol: String,
        held: f64,
        requested: f64,
    },

    #[error("storage unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("price unavailable for {symbol}: {reason}")]
    PriceUnavailable { symbol: String, reason: String },

    #[error("news feed unavailable for {symbol}: {reason}")]
    FeedUnavailable { symbol: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("portfolio is empty")]
    EmptyPortfolio,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
