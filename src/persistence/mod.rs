//! Database layer: pool, migrations, and ledger access.

mod ledger;
mod pool;

pub use ledger::{buy, reset, sell, snapshot};
pub use pool::{create_pool_and_migrate, run_migrations};
pub use sqlx::SqlitePool;
