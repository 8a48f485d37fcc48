//! In-process capability cache using DashMap for concurrent access.

use async_trait::async_trait;
use club_core::{SystemCapabilities, UserId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::SystemCapabilityCache;

/// Inserts between full sweeps of expired entries
const PURGE_EVERY: usize = 256;

#[derive(Debug, Clone, Copy)]
struct CachedEntry {
    capabilities: SystemCapabilities,
    expires_at: Instant,
}

/// TTL cache held in process memory
///
/// Expiry is evaluated on read. Entries of users who are never read again
/// are swept every `PURGE_EVERY` inserts; there is no background sweeper.
#[derive(Debug)]
pub struct InMemoryCapabilityCache {
    entries: DashMap<UserId, CachedEntry>,
    ttl: Duration,
    inserts: AtomicUsize,
}

impl InMemoryCapabilityCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            inserts: AtomicUsize::new(0),
        }
    }

    /// Number of entries currently held, including expired ones not yet read
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl SystemCapabilityCache for InMemoryCapabilityCache {
    async fn get(&self, user_id: &UserId) -> Option<SystemCapabilities> {
        let now = Instant::now();
        // Atomically drop the entry if it has expired
        if self
            .entries
            .remove_if(user_id, |_, entry| entry.expires_at <= now)
            .is_some()
        {
            tracing::trace!(user_id = %user_id, "Capability cache entry expired");
            return None;
        }
        self.entries.get(user_id).map(|entry| entry.capabilities)
    }

    async fn set(&self, user_id: &UserId, capabilities: SystemCapabilities) {
        self.entries.insert(
            user_id.clone(),
            CachedEntry {
                capabilities,
                expires_at: Instant::now() + self.ttl,
            },
        );

        let inserts = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if inserts % PURGE_EVERY == 0 {
            self.purge_expired();
        }
    }

    async fn evict(&self, user_id: &UserId) {
        self.entries.remove(user_id);
    }
}
