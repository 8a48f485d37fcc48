//! # club-db
//!
//! Storage layer implementing the membership and invitation repository traits
//! on top of a single-table item store.
//!
//! ## Overview
//!
//! Every membership and invitation is persisted as one canonical item plus
//! several index items (by user, by club role, by club, by email, by token).
//! All items touched by one create or update go through a single atomic
//! conditional batch, so readers never observe a canonical record and its
//! index records out of sync.
//!
//! - `store`: the `ItemStore` abstraction with in-memory and PostgreSQL backends
//! - `keys`: the partition/sort key layout
//! - `models` / `mappers`: persisted records and entity conversion
//! - `repositories`: the repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use club_db::{KvMembershipRepository, MemoryItemStore};
//!
//! let store = Arc::new(MemoryItemStore::new());
//! let memberships = KvMembershipRepository::new(store.clone());
//! ```

pub mod cursor;
pub mod keys;
pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod store;

// Re-export commonly used types
pub use pool::{create_pool, open_pg_store, PgPool, PoolTimeouts};
pub use repositories::{KvInvitationRepository, KvMembershipRepository};
pub use store::{
    Condition, Item, ItemKey, ItemQuery, ItemStore, MemoryItemStore, PgItemStore, SharedItemStore,
    StoreError, StoreResult, WriteOp, MAX_BATCH_ITEMS,
};
