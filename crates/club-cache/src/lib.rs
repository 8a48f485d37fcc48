//! # club-cache
//!
//! Caching layer for the authorization engine.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **System Capability Cache**: TTL-bounded cache of platform-level
//!   capabilities, in-process or Redis-backed
//!
//! Club-level capabilities are never cached; only the platform-level
//! derivation lives here.
//!
//! ## Example
//!
//! ```ignore
//! use club_cache::{InMemoryCapabilityCache, SystemCapabilityCache};
//! use std::time::Duration;
//!
//! let cache = InMemoryCapabilityCache::new(Duration::from_secs(300));
//! cache.set(&user_id, SystemCapabilities::SITE_ADMIN).await;
//! assert!(cache.get(&user_id).await.is_some());
//! ```

pub mod capability;
pub mod pool;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolError, RedisResult};

// Re-export capability cache types
pub use capability::{
    InMemoryCapabilityCache, RedisCapabilityCache, SharedCapabilityCache, SystemCapabilityCache,
    CAPABILITY_KEY_PREFIX,
};
