//! # Courtside Store
//!
//! Contract for the single shared table every Courtside engine writes to.
//! The backend offers exactly five primitives: point get, conditional put,
//! conditional update with atomic numeric increment, idempotent delete,
//! partition-prefix range query, and an all-or-nothing multi-key
//! transaction. There is no locking primitive; every concurrency property
//! in the system is expressed as a storage precondition evaluated
//! atomically by the backend.
//!
//! Precondition and field-change semantics are defined here (and unit
//! tested here) so every backend implementation agrees on them.

#![forbid(unsafe_code)]

pub mod error;
pub mod ops;
pub mod row;

use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use ops::{FieldChange, Precondition, ReadConsistency, ReturnValues, WriteOp};
pub use row::{AttrValue, Row};

/// The single-table storage backend.
///
/// Every mutation carries an explicit precondition; the contract has no
/// unconditional overwrite, because one would silently erase concurrent
/// progress (two simultaneous increments must both land).
#[async_trait]
pub trait Table: Send + Sync {
    /// Point lookup. The OTP verify path must request
    /// [`ReadConsistency::Strong`]; a stale read there could accept a code
    /// that a concurrent verification already consumed.
    async fn get(
        &self,
        pk: &str,
        sk: &str,
        consistency: ReadConsistency,
    ) -> StoreResult<Option<Row>>;

    /// Insert a row only if the key is absent. Returns
    /// [`StoreError::ConditionFailed`] when it exists.
    async fn put_if_absent(&self, row: Row) -> StoreResult<()>;

    /// Apply field changes to a row under a precondition, atomically.
    /// `Add` changes are atomic increments creating the field at the delta
    /// when absent. With [`ReturnValues::AllNew`] the updated row is
    /// returned.
    async fn update(
        &self,
        pk: &str,
        sk: &str,
        changes: Vec<FieldChange>,
        precondition: Precondition,
        return_values: ReturnValues,
    ) -> StoreResult<Option<Row>>;

    /// Delete a row. Idempotent; deleting an absent key is not an error.
    async fn delete(&self, pk: &str, sk: &str) -> StoreResult<()>;

    /// All rows of a partition whose sort key starts with `sk_prefix`
    /// (all rows of the partition when `None`), ordered by sort key
    /// ascending. Pagination is the backend's concern; callers receive the
    /// full result.
    async fn query_prefix(&self, pk: &str, sk_prefix: Option<&str>) -> StoreResult<Vec<Row>>;

    /// Commit several writes atomically. Each operation carries its own
    /// precondition; if any fails, nothing is applied and the error is
    /// [`StoreError::TransactionCanceled`].
    async fn transact(&self, ops: Vec<WriteOp>) -> StoreResult<()>;
}
