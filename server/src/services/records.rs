//! Per-user key/value record storage.
//!
//! DESIGN
//! ======
//! Records are keyed by `(user_id, key)` and upserted, never duplicated. The
//! stored value is always text: string values are kept verbatim and every
//! other JSON value is stored as its serialized form. Reads decode the text
//! as JSON when possible and fall back to the raw string.
//!
//! TRADE-OFFS
//! ==========
//! Storing strings verbatim keeps values readable in the table, at the cost
//! of a string like `"42"` reading back as the number `42`. Clients that need
//! exact string round-trips should wrap values in an object.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One stored record as held by a [`RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: Uuid,
    pub key: String,
    /// Encoded value text, see [`encode_value`].
    pub value: String,
    pub updated_at: OffsetDateTime,
}

impl StoredRecord {
    /// Decoded JSON value of this record.
    #[must_use]
    pub fn decoded(&self) -> Value {
        decode_value(&self.value)
    }
}

/// Encode a JSON value into the stored text form.
#[must_use]
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode stored text, falling back to the raw string when it is not JSON.
#[must_use]
pub fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Storage backend for user records.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record, `None` if the key is absent for this user.
    async fn get(&self, user_id: Uuid, key: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// All records owned by `user_id`, ordered by key.
    async fn list(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, StoreError>;

    /// Insert or replace one record, returning its id.
    async fn upsert(&self, user_id: Uuid, key: &str, value: &str) -> Result<Uuid, StoreError>;

    /// Insert or replace every entry, returning how many were written.
    async fn upsert_many(&self, user_id: Uuid, entries: &[(String, String)]) -> Result<usize, StoreError>;

    /// Remove one record. Returns `true` if a record existed.
    async fn delete(&self, user_id: Uuid, key: &str) -> Result<bool, StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

/// Postgres-backed store over the `user_data` table.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const UPSERT_SQL: &str = r"INSERT INTO user_data (id, user_id, key, value)
     VALUES ($1, $2, $3, $4)
     ON CONFLICT (user_id, key)
     DO UPDATE SET value = EXCLUDED.value, updated_at = now()
     RETURNING id";

fn record_from_row(row: &sqlx::postgres::PgRow) -> StoredRecord {
    StoredRecord {
        id: row.get("id"),
        key: row.get("key"),
        value: row.get("value"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait::async_trait]
impl RecordStore for PgRecordStore {
    async fn get(&self, user_id: Uuid, key: &str) -> Result<Option<StoredRecord>, StoreError> {
        let row = sqlx::query("SELECT id, key, value, updated_at FROM user_data WHERE user_id = $1 AND key = $2")
            .bind(user_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, StoreError> {
        let rows = sqlx::query("SELECT id, key, value, updated_at FROM user_data WHERE user_id = $1 ORDER BY key")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn upsert(&self, user_id: Uuid, key: &str, value: &str) -> Result<Uuid, StoreError> {
        let id: Uuid = sqlx::query_scalar(UPSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(key)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn upsert_many(&self, user_id: Uuid, entries: &[(String, String)]) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(UPSERT_SQL)
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(entries.len())
    }

    async fn delete(&self, user_id: Uuid, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_data WHERE user_id = $1 AND key = $2")
            .bind(user_id)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<(Uuid, String), StoredRecord>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all users.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn upsert_locked(records: &mut HashMap<(Uuid, String), StoredRecord>, user_id: Uuid, key: &str, value: &str) -> Uuid {
        let now = OffsetDateTime::now_utc();
        let record = records
            .entry((user_id, key.to_owned()))
            .or_insert_with(|| StoredRecord {
                id: Uuid::new_v4(),
                key: key.to_owned(),
                value: String::new(),
                updated_at: now,
            });
        value.clone_into(&mut record.value);
        record.updated_at = now;
        record.id
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, user_id: Uuid, key: &str) -> Result<Option<StoredRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&(user_id, key.to_owned())).cloned())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<StoredRecord>, StoreError> {
        let records = self.records.read().await;
        let mut owned: Vec<StoredRecord> = records
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, record)| record.clone())
            .collect();
        owned.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(owned)
    }

    async fn upsert(&self, user_id: Uuid, key: &str, value: &str) -> Result<Uuid, StoreError> {
        let mut records = self.records.write().await;
        Ok(Self::upsert_locked(&mut records, user_id, key, value))
    }

    async fn upsert_many(&self, user_id: Uuid, entries: &[(String, String)]) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        for (key, value) in entries {
            Self::upsert_locked(&mut records, user_id, key, value);
        }
        Ok(entries.len())
    }

    async fn delete(&self, user_id: Uuid, key: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(&(user_id, key.to_owned())).is_some())
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
