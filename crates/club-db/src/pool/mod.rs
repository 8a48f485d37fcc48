//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, open_pg_store, PoolTimeouts};
pub use sqlx::PgPool;
