use serde::{Deserialize, Serialize};

/// Opaque caller-supplied identity. Stored as BIGINT; the ledger never
/// interprets it.
pub type UserId = i64;

/// One user's holding of one symbol. Symbols are stored uppercase; a row only
/// exists while `shares` is positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Position {
    pub user_id: UserId,
    pub symbol: String,
    pub shares: f64,
}
