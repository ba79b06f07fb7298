//! Ledger persistence: atomic buy/sell, reset, and per-user snapshots.
//!
//! Every mutation is a single statement, so operations on the same
//! `(user_id, symbol)` key serialize in the database and a snapshot never
//! observes a half-applied update.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::LedgerError;
use crate::types::position::{Position, UserId};

/// Residue below this is an f64 subtraction artifact, not a holding.
/// Applied only in the key-scoped cleanup after a sell.
const ZERO_EPSILON: f64 = 1e-9;

/// Reject bad input before any statement runs; returns the normalized symbol.
fn validate(symbol: &str, amount: f64) -> Result<String, LedgerError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::InvalidAmount { amount });
    }
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(LedgerError::InvalidSymbol);
    }
    Ok(symbol)
}

/// Record a purchase: creates the position or atomically increments it.
/// Concurrent buys on the same key never lose updates.
pub async fn buy(
    pool: &SqlitePool,
    user_id: UserId,
    symbol: &str,
    amount: f64,
) -> Result<(), LedgerError> {
    let symbol = validate(symbol, amount)?;
    sqlx::query(
        "INSERT INTO portfolio (user_id, symbol, shares) VALUES (?, ?, ?) \
         ON CONFLICT(user_id, symbol) DO UPDATE SET shares = shares + excluded.shares",
    )
    .bind(user_id)
    .bind(&symbol)
    .bind(amount)
    .execute(pool)
    .await?;
    debug!("recorded buy: user={} {} x{}", user_id, symbol, amount);
    Ok(())
}

/// Record a sale. The balance check and the decrement are one conditional
/// UPDATE, so no other mutation can interleave between them. A position whose
/// balance reaches zero (or an f64 residue of it) is deleted; the cleanup is
/// scoped to this key and never touches other holdings.
pub async fn sell(
    pool: &SqlitePool,
    user_id: UserId,
    symbol: &str,
    amount: f64,
) -> Result<(), LedgerError> {
    let symbol = validate(symbol, amount)?;
    let updated = sqlx::query(
        "UPDATE portfolio SET shares = shares - ?1 \
         WHERE user_id = ?2 AND symbol = ?3 AND shares >= ?1",
    )
    .bind(amount)
    .bind(user_id)
    .bind(&symbol)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        let held = sqlx::query_scalar::<_, f64>(
            "SELECT shares FROM portfolio WHERE user_id = ? AND symbol = ?",
        )
        .bind(user_id)
        .bind(&symbol)
        .fetch_optional(pool)
        .await?
        .unwrap_or(0.0);
        return Err(LedgerError::InsufficientShares {
            symbol,
            held,
            requested: amount,
        });
    }

    sqlx::query("DELETE FROM portfolio WHERE user_id = ? AND symbol = ? AND shares <= ?")
        .bind(user_id)
        .bind(&symbol)
        .bind(ZERO_EPSILON)
        .execute(pool)
        .await?;
    debug!("recorded sell: user={} {} x{}", user_id, symbol, amount);
    Ok(())
}

/// Delete every position the user holds. Idempotent.
pub async fn reset(pool: &SqlitePool, user_id: UserId) -> Result<(), LedgerError> {
    sqlx::query("DELETE FROM portfolio WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    debug!("reset holdings: user={}", user_id);
    Ok(())
}

/// Current holdings for a user, symbol-ascending so report order is stable.
/// Empty when the user holds nothing.
pub async fn snapshot(pool: &SqlitePool, user_id: UserId) -> Result<Vec<Position>, LedgerError> {
    let rows = sqlx::query_as::<_, Position>(
        "SELECT user_id, symbol, shares FROM portfolio WHERE user_id = ? ORDER BY symbol",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
