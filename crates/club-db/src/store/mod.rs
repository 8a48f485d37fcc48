//! Single-table item store
//!
//! Items live under a partition key (`pk`) and a sort key (`sk`). Reads are
//! point lookups or forward range scans over one partition; writes are
//! batches that apply completely or not at all, each operation optionally
//! guarded by a condition on the item's current value.

mod memory;
mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;

/// Largest number of operations accepted in one batch
pub const MAX_BATCH_ITEMS: usize = 25;

/// Composite primary key of an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.pk, self.sk)
    }
}

/// A stored item
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    pub data: Value,
}

impl Item {
    pub fn new(key: ItemKey, data: Value) -> Self {
        Self { key, data }
    }
}

/// Forward range scan over one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub pk: String,
    /// Only sort keys starting with this prefix are returned
    pub sk_prefix: String,
    /// Exclusive lower bound on the sort key
    pub start_after: Option<String>,
    pub limit: usize,
}

impl ItemQuery {
    pub fn new(pk: impl Into<String>, sk_prefix: impl Into<String>, limit: usize) -> Self {
        Self {
            pk: pk.into(),
            sk_prefix: sk_prefix.into(),
            start_after: None,
            limit,
        }
    }

    pub fn after(mut self, sk: Option<String>) -> Self {
        self.start_after = sk;
        self
    }

    /// Whether `sk` falls inside this query's range
    pub fn admits(&self, sk: &str) -> bool {
        sk.starts_with(&self.sk_prefix)
            && self.start_after.as_deref().is_none_or(|after| sk > after)
    }
}

/// Guard evaluated against an item's current value before a write
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No item is stored at the key
    NotExists,
    /// An item is stored and its top-level attribute `name` equals `value`
    AttributeEquals { name: String, value: Value },
    /// Every nested condition holds
    All(Vec<Condition>),
}

impl Condition {
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Evaluate against the currently stored value, if any
    pub fn evaluate(&self, current: Option<&Value>) -> bool {
        match self {
            Self::NotExists => current.is_none(),
            Self::AttributeEquals { name, value } => {
                current.and_then(|data| data.get(name)) == Some(value)
            }
            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(current)),
        }
    }
}

/// One operation of an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put {
        item: Item,
        condition: Option<Condition>,
    },
    Delete {
        key: ItemKey,
        condition: Option<Condition>,
    },
}

impl WriteOp {
    pub fn put(item: Item) -> Self {
        Self::Put {
            item,
            condition: None,
        }
    }

    pub fn put_if(item: Item, condition: Condition) -> Self {
        Self::Put {
            item,
            condition: Some(condition),
        }
    }

    pub fn delete(key: ItemKey) -> Self {
        Self::Delete {
            key,
            condition: None,
        }
    }

    pub fn key(&self) -> &ItemKey {
        match self {
            Self::Put { item, .. } => &item.key,
            Self::Delete { key, .. } => key,
        }
    }

    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Self::Put { condition, .. } | Self::Delete { condition, .. } => condition.as_ref(),
        }
    }
}

/// Store-level errors; never surfaced past the repositories
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Condition failed for operation {index} ({key})")]
    ConditionFailed { index: usize, key: ItemKey },

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store with atomic conditional batches
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Point lookup
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>>;

    /// Items of one partition in ascending sort-key order
    async fn query(&self, query: &ItemQuery) -> StoreResult<Vec<Item>>;

    /// Apply every operation, or none of them if any condition fails
    async fn transact_write(&self, ops: Vec<WriteOp>) -> StoreResult<()>;
}

/// Shared item store handle
pub type SharedItemStore = Arc<dyn ItemStore>;

/// Reject empty, oversized, or self-overlapping batches
pub(crate) fn validate_batch(ops: &[WriteOp]) -> StoreResult<()> {
    if ops.is_empty() {
        return Err(StoreError::InvalidBatch("batch is empty".to_string()));
    }
    if ops.len() > MAX_BATCH_ITEMS {
        return Err(StoreError::InvalidBatch(format!(
            "batch has {} operations, limit is {MAX_BATCH_ITEMS}",
            ops.len()
        )));
    }
    let mut seen = HashSet::with_capacity(ops.len());
    for op in ops {
        if !seen.insert(op.key()) {
            return Err(StoreError::InvalidBatch(format!(
                "key {} appears more than once",
                op.key()
            )));
        }
    }
    Ok(())
}
