//! PostgreSQL item store
//!
//! One table keyed by `(pk, sk)` with a JSONB payload. Sort keys use the "C"
//! collation so range scans order bytewise. Each batch runs in a single
//! transaction: conditioned rows are locked with `FOR UPDATE`, and
//! not-exists puts rely on `ON CONFLICT DO NOTHING` so concurrent inserts of
//! the same key cannot both succeed.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::instrument;

use super::{
    validate_batch, Condition, Item, ItemKey, ItemQuery, ItemStore, StoreError, StoreResult,
    WriteOp,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS club_items (
        pk         TEXT COLLATE "C" NOT NULL,
        sk         TEXT COLLATE "C" NOT NULL,
        data       JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (pk, sk)
    )
"#;

#[derive(Debug, FromRow)]
struct ItemRow {
    pk: String,
    sk: String,
    data: Json<Value>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item::new(ItemKey::new(row.pk, row.sk), row.data.0)
    }
}

/// PostgreSQL `ItemStore`
#[derive(Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Create a new PgItemStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if it does not exist
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn current_for_update(
        tx: &mut Transaction<'_, Postgres>,
        key: &ItemKey,
    ) -> StoreResult<Option<Value>> {
        let current = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT data FROM club_items WHERE pk = $1 AND sk = $2 FOR UPDATE
            "#,
        )
        .bind(&key.pk)
        .bind(&key.sk)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(current.map(|json| json.0))
    }

    async fn insert_if_absent(tx: &mut Transaction<'_, Postgres>, item: &Item) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO club_items (pk, sk, data, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (pk, sk) DO NOTHING
            "#,
        )
        .bind(&item.key.pk)
        .bind(&item.key.sk)
        .bind(Json(&item.data))
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn upsert(tx: &mut Transaction<'_, Postgres>, item: &Item) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO club_items (pk, sk, data, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (pk, sk) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(&item.key.pk)
        .bind(&item.key.sk)
        .bind(Json(&item.data))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn delete(tx: &mut Transaction<'_, Postgres>, key: &ItemKey) -> StoreResult<()> {
        sqlx::query(
            r#"
            DELETE FROM club_items WHERE pk = $1 AND sk = $2
            "#,
        )
        .bind(&key.pk)
        .bind(&key.sk)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT pk, sk, data FROM club_items WHERE pk = $1 AND sk = $2
            "#,
        )
        .bind(&key.pk)
        .bind(&key.sk)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Item::from))
    }

    #[instrument(skip(self))]
    async fn query(&self, query: &ItemQuery) -> StoreResult<Vec<Item>> {
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT pk, sk, data
            FROM club_items
            WHERE pk = $1
              AND starts_with(sk, $2)
              AND ($3::text IS NULL OR sk > $3)
            ORDER BY sk
            LIMIT $4
            "#,
        )
        .bind(&query.pk)
        .bind(&query.sk_prefix)
        .bind(query.start_after.as_deref())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    #[instrument(skip(self, ops), fields(ops = ops.len()))]
    async fn transact_write(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        validate_batch(&ops)?;

        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;

        for (index, op) in ops.iter().enumerate() {
            let condition_failed = || StoreError::ConditionFailed {
                index,
                key: op.key().clone(),
            };

            match op {
                WriteOp::Put {
                    item,
                    condition: Some(Condition::NotExists),
                } => {
                    if !Self::insert_if_absent(&mut tx, item).await? {
                        return Err(condition_failed());
                    }
                }
                WriteOp::Put { item, condition } => {
                    if let Some(condition) = condition {
                        let current = Self::current_for_update(&mut tx, &item.key).await?;
                        if !condition.evaluate(current.as_ref()) {
                            return Err(condition_failed());
                        }
                    }
                    Self::upsert(&mut tx, item).await?;
                }
                WriteOp::Delete { key, condition } => {
                    if let Some(condition) = condition {
                        let current = Self::current_for_update(&mut tx, key).await?;
                        if !condition.evaluate(current.as_ref()) {
                            return Err(condition_failed());
                        }
                    }
                    Self::delete(&mut tx, key).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
