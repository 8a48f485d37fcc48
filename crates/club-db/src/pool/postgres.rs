//! PostgreSQL pool for the item store

use std::time::Duration;

use club_common::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::store::{PgItemStore, StoreResult};

/// Connection lifetimes not exposed through `AppConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTimeouts {
    pub acquire: Duration,
    pub idle: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolTimeouts {
    fn default() -> Self {
        Self {
            acquire: Duration::from_secs(10),
            idle: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Connect a pool sized by `config`
pub async fn create_pool(config: &DatabaseConfig, timeouts: PoolTimeouts) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(timeouts.acquire)
        .idle_timeout(timeouts.idle)
        .max_lifetime(timeouts.max_lifetime)
        .connect(&config.url)
        .await
}

/// Connect and make sure the `kv_items` table exists
pub async fn open_pg_store(config: &DatabaseConfig) -> StoreResult<PgItemStore> {
    let pool = create_pool(config, PoolTimeouts::default()).await?;
    let store = PgItemStore::new(pool);
    store.ensure_schema().await?;

    tracing::info!(
        host = %redact_url(&config.url),
        max_connections = config.max_connections,
        "PostgreSQL item store ready"
    );
    Ok(store)
}

/// Drop credentials from a connection URL for logging
fn redact_url(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}
