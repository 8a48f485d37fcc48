//! Redis-backed capability cache, shared across service instances.

use async_trait::async_trait;
use club_core::{SystemCapabilities, UserId};
use std::time::Duration;

use super::SystemCapabilityCache;
use crate::pool::RedisPool;

/// Key prefix for cached system capabilities
pub const CAPABILITY_KEY_PREFIX: &str = "authz:system_caps:";

/// Capability cache stored in Redis with `SET EX`
///
/// Redis failures degrade to cache misses so authorization keeps working
/// from the underlying derivation.
#[derive(Debug, Clone)]
pub struct RedisCapabilityCache {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisCapabilityCache {
    #[must_use]
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl_seconds: ttl.as_secs().max(1),
        }
    }

    fn key(user_id: &UserId) -> String {
        format!("{CAPABILITY_KEY_PREFIX}{user_id}")
    }
}

#[async_trait]
impl SystemCapabilityCache for RedisCapabilityCache {
    async fn get(&self, user_id: &UserId) -> Option<SystemCapabilities> {
        match self.pool.get_json::<SystemCapabilities>(&Self::key(user_id)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Capability cache read failed");
                None
            }
        }
    }

    async fn set(&self, user_id: &UserId, capabilities: SystemCapabilities) {
        if let Err(e) = self
            .pool
            .set_json(&Self::key(user_id), &capabilities, self.ttl_seconds)
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Capability cache write failed");
        }
    }

    async fn evict(&self, user_id: &UserId) {
        if let Err(e) = self.pool.delete(&Self::key(user_id)).await {
            tracing::warn!(user_id = %user_id, error = %e, "Capability cache eviction failed");
        }
    }
}
