//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use club_core::{ClubId, UserId};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn unique_club_id() -> ClubId {
    ClubId::new(format!("club-{}", unique_suffix()))
}

pub fn unique_user_id() -> UserId {
    UserId::new(format!("user-{}", unique_suffix()))
}

pub fn unique_email() -> String {
    format!("rider{}@example.com", unique_suffix())
}
