//! Error handling utilities for repositories

use club_core::DomainError;

use crate::store::StoreError;

/// Convert a store error to DomainError
pub fn map_store_error(e: StoreError) -> DomainError {
    DomainError::Storage(e.to_string())
}

/// Translate a failed write condition into a domain conflict.
///
/// `on_condition` receives the index of the operation whose condition failed.
pub fn map_condition_failure<F>(e: StoreError, on_condition: F) -> DomainError
where
    F: FnOnce(usize) -> DomainError,
{
    match e {
        StoreError::ConditionFailed { index, .. } => on_condition(index),
        other => map_store_error(other),
    }
}
