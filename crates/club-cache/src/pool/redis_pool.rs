//! deadpool-backed Redis connections for the capability cache

use club_common::RedisConfig;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

/// Redis pool errors
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to build Redis pool: {0}")]
    Build(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Cached value is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Lazily connecting Redis pool storing JSON values
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    /// Build a pool; no connection is opened until first use
    pub fn from_config(config: &RedisConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?
            .max_size(config.max_connections.max(1) as usize)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;

        tracing::info!(
            host = %config.url.rsplit('@').next().unwrap_or(&config.url),
            max_connections = config.max_connections,
            "Redis pool configured"
        );
        Ok(Self { pool })
    }

    async fn conn(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip a PING
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Store `value` as JSON, expiring after `ttl_seconds`
    pub async fn set_json<V: Serialize>(&self, key: &str, value: &V, ttl_seconds: u64) -> RedisResult<()> {
        let encoded = serde_json::to_string(value)?;
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(key, encoded, ttl_seconds).await?;
        Ok(())
    }

    /// Read a JSON value; a missing key is `None`
    pub async fn get_json<V: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<V>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(Into::into)
    }

    /// Remove a key, reporting whether it existed
    pub async fn delete(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
