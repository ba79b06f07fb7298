//! Multi-user holdings ledger with live valuation.
//!
//! Share balances live in SQLite keyed by `(user_id, symbol)`; the valuation
//! engine merges ledger snapshots with prices and news fetched from external
//! oracles. A thin axum surface exposes the operations over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod oracle;
pub mod persistence;
pub mod types;
pub mod valuation;
