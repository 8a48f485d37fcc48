//! In-process item store
//!
//! A sorted map behind a single lock. Batches evaluate every condition
//! before applying anything, all under the write lock.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{validate_batch, Item, ItemKey, ItemQuery, ItemStore, StoreError, StoreResult, WriteOp};

/// In-memory `ItemStore`
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: RwLock<BTreeMap<ItemKey, Value>>,
}

impl MemoryItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Keys of every item in a partition
    #[must_use]
    pub fn partition_keys(&self, pk: &str) -> Vec<ItemKey> {
        self.items
            .read()
            .keys()
            .filter(|key| key.pk == pk)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>> {
        Ok(self
            .items
            .read()
            .get(key)
            .map(|data| Item::new(key.clone(), data.clone())))
    }

    async fn query(&self, query: &ItemQuery) -> StoreResult<Vec<Item>> {
        let lower_sk = match &query.start_after {
            Some(after) if after.as_str() > query.sk_prefix.as_str() => after.clone(),
            _ => query.sk_prefix.clone(),
        };
        let lower = ItemKey::new(query.pk.clone(), lower_sk);

        let items = self.items.read();
        Ok(items
            .range(lower..)
            .take_while(|(key, _)| key.pk == query.pk && key.sk.starts_with(&query.sk_prefix))
            .filter(|(key, _)| query.admits(&key.sk))
            .take(query.limit)
            .map(|(key, data)| Item::new(key.clone(), data.clone()))
            .collect())
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        validate_batch(&ops)?;

        let mut items = self.items.write();
        for (index, op) in ops.iter().enumerate() {
            if let Some(condition) = op.condition() {
                if !condition.evaluate(items.get(op.key())) {
                    return Err(StoreError::ConditionFailed {
                        index,
                        key: op.key().clone(),
                    });
                }
            }
        }

        for op in ops {
            match op {
                WriteOp::Put { item, .. } => {
                    items.insert(item.key, item.data);
                }
                WriteOp::Delete { key, .. } => {
                    items.remove(&key);
                }
            }
        }
        Ok(())
    }
}
