//! System capability cache
//!
//! Caches the platform-level capability set derived for an actor, bounded by
//! a TTL that is checked on read. Club-level capabilities never pass through
//! here: every club check reads the membership fresh.

mod memory;
mod redis_cache;

use async_trait::async_trait;
use club_core::{SystemCapabilities, UserId};
use std::sync::Arc;

pub use self::memory::InMemoryCapabilityCache;
pub use self::redis_cache::{RedisCapabilityCache, CAPABILITY_KEY_PREFIX};

/// Injected cache abstraction for platform capabilities
#[async_trait]
pub trait SystemCapabilityCache: Send + Sync {
    /// Cached capabilities for `user_id`, or `None` on miss or expiry
    async fn get(&self, user_id: &UserId) -> Option<SystemCapabilities>;

    /// Store capabilities for `user_id` until the TTL elapses
    async fn set(&self, user_id: &UserId, capabilities: SystemCapabilities);

    /// Drop any cached entry for `user_id`
    async fn evict(&self, user_id: &UserId);
}

/// Shared capability cache handle
pub type SharedCapabilityCache = Arc<dyn SystemCapabilityCache>;
