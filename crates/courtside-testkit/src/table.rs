//! In-memory single-table backend.
//!
//! Implements the full contract semantics: atomic conditional writes,
//! OR-preconditions, atomic increments, and all-or-nothing multi-key
//! transactions. A transaction checks every precondition against the
//! pre-transaction state and applies either all operations or none.
//!
//! With [`MemoryTable::with_ttl`], rows whose `expires_at` integer
//! attribute has passed are purged lazily on access, mirroring a backend's
//! best-effort TTL. Engines must not rely on this; their own expiry checks
//! are authoritative.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_lock::RwLock;
use async_trait::async_trait;
use courtside_core::Clock;
use courtside_store::{
    FieldChange, Precondition, ReadConsistency, ReturnValues, Row, StoreError, StoreResult, Table,
    WriteOp,
};

/// TTL attribute honored by [`MemoryTable::with_ttl`].
const TTL_ATTR: &str = "expires_at";

type Keyspace = BTreeMap<(String, String), Row>;

/// Shared in-memory table. Cloning shares the underlying data, so several
/// engines in one test observe the same state.
#[derive(Clone)]
pub struct MemoryTable {
    rows: Arc<RwLock<Keyspace>>,
    ttl_clock: Option<Arc<dyn Clock>>,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTable {
    /// Create an empty table with TTL disabled.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            ttl_clock: None,
        }
    }

    /// Create an empty table that lazily purges rows whose `expires_at`
    /// has passed according to `clock`.
    pub fn with_ttl(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            ttl_clock: Some(clock),
        }
    }

    /// Number of stored rows.
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Raw row access bypassing TTL purge (for assertions).
    pub async fn raw_get(&self, pk: &str, sk: &str) -> Option<Row> {
        self.rows
            .read()
            .await
            .get(&(pk.to_string(), sk.to_string()))
            .cloned()
    }

    /// Seed a row directly, bypassing preconditions (test setup only).
    pub async fn seed(&self, row: Row) {
        self.rows
            .write()
            .await
            .insert((row.pk.clone(), row.sk.clone()), row);
    }

    fn expired(&self, row: &Row) -> bool {
        match (&self.ttl_clock, row.get_n(TTL_ATTR)) {
            (Some(clock), Some(expires_at)) => expires_at <= clock.now_unix(),
            _ => false,
        }
    }
}

#[async_trait]
impl Table for MemoryTable {
    async fn get(
        &self,
        pk: &str,
        sk: &str,
        _consistency: ReadConsistency,
    ) -> StoreResult<Option<Row>> {
        let key = (pk.to_string(), sk.to_string());
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.get(&key) {
            if self.expired(row) {
                rows.remove(&key);
                return Ok(None);
            }
            return Ok(Some(row.clone()));
        }
        Ok(None)
    }

    async fn put_if_absent(&self, row: Row) -> StoreResult<()> {
        let key = (row.pk.clone(), row.sk.clone());
        let mut rows = self.rows.write().await;
        if rows.get(&key).is_some_and(|r| !self.expired(r)) {
            return Err(StoreError::ConditionFailed);
        }
        rows.insert(key, row);
        Ok(())
    }

    async fn update(
        &self,
        pk: &str,
        sk: &str,
        changes: Vec<FieldChange>,
        precondition: Precondition,
        return_values: ReturnValues,
    ) -> StoreResult<Option<Row>> {
        let key = (pk.to_string(), sk.to_string());
        let mut rows = self.rows.write().await;

        let existing = rows.get(&key).filter(|r| !self.expired(r));
        if !precondition.holds(existing) {
            return Err(StoreError::ConditionFailed);
        }

        let mut row = existing
            .cloned()
            .unwrap_or_else(|| Row::new(pk.to_string(), sk.to_string()));
        FieldChange::apply_all(&mut row, &changes);
        let result = match return_values {
            ReturnValues::None => None,
            ReturnValues::AllNew => Some(row.clone()),
        };
        rows.insert(key, row);
        Ok(result)
    }

    async fn delete(&self, pk: &str, sk: &str) -> StoreResult<()> {
        let key = (pk.to_string(), sk.to_string());
        self.rows.write().await.remove(&key);
        Ok(())
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: Option<&str>) -> StoreResult<Vec<Row>> {
        let rows = self.rows.read().await;
        let result = rows
            .range((pk.to_string(), String::new())..)
            .take_while(|((row_pk, _), _)| row_pk == pk)
            .filter(|((_, sk), _)| sk_prefix.map_or(true, |p| sk.starts_with(p)))
            .map(|(_, row)| row.clone())
            .filter(|row| !self.expired(row))
            .collect();
        Ok(result)
    }

    async fn transact(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        let mut rows = self.rows.write().await;

        // All preconditions are checked against the pre-transaction state.
        for op in &ops {
            let (pk, sk, precondition) = match op {
                WriteOp::Put { row, precondition } => (&row.pk, &row.sk, precondition),
                WriteOp::Update {
                    pk, sk, precondition, ..
                } => (pk, sk, precondition),
            };
            let existing = rows
                .get(&(pk.clone(), sk.clone()))
                .filter(|r| !self.expired(r));
            if !precondition.holds(existing) {
                return Err(StoreError::TransactionCanceled);
            }
        }

        for op in ops {
            match op {
                WriteOp::Put { row, .. } => {
                    rows.insert((row.pk.clone(), row.sk.clone()), row);
                }
                WriteOp::Update {
                    pk, sk, changes, ..
                } => {
                    let key = (pk.clone(), sk.clone());
                    let mut row = rows.get(&key).cloned().unwrap_or_else(|| Row::new(pk, sk));
                    FieldChange::apply_all(&mut row, &changes);
                    rows.insert(key, row);
                }
            }
        }
        Ok(())
    }
}
