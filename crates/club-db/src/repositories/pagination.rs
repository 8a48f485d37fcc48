//! Cursor pagination over a partition with post-read filtering

use club_core::{Page, RepoResult};

use crate::cursor::{decode_cursor, encode_cursor};
use crate::store::{Item, ItemKey, ItemQuery, ItemStore};

use super::error::map_store_error;

/// Read one page of `pk` items whose sort key starts with `sk_prefix`.
///
/// `decode` returns `None` for items the caller's filter rejects. The store is
/// asked for one record past the page size; a next cursor is returned only
/// when a matching record exists beyond the page.
pub async fn collect_page<T, F>(
    store: &dyn ItemStore,
    pk: &str,
    sk_prefix: &str,
    cursor: Option<&str>,
    limit: usize,
    mut decode: F,
) -> RepoResult<Page<T>>
where
    F: FnMut(&Item) -> RepoResult<Option<T>>,
{
    let limit = limit.max(1);
    let batch = limit + 1;
    let mut start_after = cursor.map(|c| decode_cursor(c, pk)).transpose()?;
    let mut matched: Vec<(ItemKey, T)> = Vec::with_capacity(batch);

    loop {
        let query = ItemQuery::new(pk, sk_prefix, batch).after(start_after.take());
        let items = store.query(&query).await.map_err(map_store_error)?;
        let exhausted = items.len() < batch;

        for item in &items {
            if let Some(value) = decode(item)? {
                matched.push((item.key.clone(), value));
                if matched.len() > limit {
                    break;
                }
            }
        }

        if matched.len() > limit || exhausted {
            break;
        }
        start_after = items.last().map(|item| item.key.sk.clone());
    }

    let next_cursor = if matched.len() > limit {
        matched.truncate(limit);
        matched.last().map(|(key, _)| encode_cursor(key))
    } else {
        None
    };

    Ok(Page::new(
        matched.into_iter().map(|(_, value)| value).collect(),
        next_cursor,
    ))
}

/// Read every item of a partition under a prefix
pub async fn collect_all(store: &dyn ItemStore, pk: &str, sk_prefix: &str) -> RepoResult<Vec<Item>> {
    const BATCH: usize = 100;

    let mut all = Vec::new();
    let mut start_after = None;
    loop {
        let query = ItemQuery::new(pk, sk_prefix, BATCH).after(start_after.take());
        let items = store.query(&query).await.map_err(map_store_error)?;
        let exhausted = items.len() < BATCH;
        start_after = items.last().map(|item| item.key.sk.clone());
        all.extend(items);
        if exhausted {
            return Ok(all);
        }
    }
}
