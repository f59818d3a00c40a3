//! Operation descriptors: preconditions, field changes, write ops.
//!
//! `Precondition::holds` and `FieldChange::apply_all` define the semantics
//! every backend must implement; the in-memory table uses them directly and
//! a remote adapter must translate them faithfully.

use serde::{Deserialize, Serialize};

use crate::row::{AttrValue, Row};

/// Read consistency for point lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadConsistency {
    /// Possibly stale; acceptable for most reads.
    Eventual,
    /// Must observe all completed writes. Required on the OTP verify path.
    Strong,
}

/// Whether an update returns the post-update row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnValues {
    /// Return nothing.
    None,
    /// Return the full row as it is after the update.
    AllNew,
}

/// A condition over the current state of one row, evaluated atomically
/// with the write it guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Precondition {
    /// The row must exist.
    RowExists,
    /// The row must not exist.
    RowNotExists,
    /// The row is absent, or the named field is absent from it.
    FieldMissing(String),
    /// The row exists and the named integer field is `<=` the bound.
    FieldAtMost(String, i64),
    /// Logical OR: at least one branch holds.
    AnyOf(Vec<Precondition>),
}

impl Precondition {
    /// Evaluate against the current row state.
    pub fn holds(&self, existing: Option<&Row>) -> bool {
        match self {
            Self::RowExists => existing.is_some(),
            Self::RowNotExists => existing.is_none(),
            Self::FieldMissing(name) => match existing {
                None => true,
                Some(row) => !row.attrs.contains_key(name),
            },
            Self::FieldAtMost(name, bound) => match existing {
                None => false,
                Some(row) => row.get_n(name).is_some_and(|v| v <= *bound),
            },
            Self::AnyOf(branches) => branches.iter().any(|b| b.holds(existing)),
        }
    }
}

/// A single field mutation within an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldChange {
    /// Set the field to a value, overwriting any previous one.
    Set(String, AttrValue),
    /// Atomically add a delta to an integer field, treating an absent
    /// field as zero.
    Add(String, i64),
}

impl FieldChange {
    /// Apply a batch of changes to a row in order.
    pub fn apply_all(row: &mut Row, changes: &[FieldChange]) {
        for change in changes {
            match change {
                FieldChange::Set(name, value) => {
                    row.attrs.insert(name.clone(), value.clone());
                }
                FieldChange::Add(name, delta) => {
                    let current = row.get_n(name).unwrap_or(0);
                    row.attrs
                        .insert(name.clone(), AttrValue::N(current + delta));
                }
            }
        }
    }
}

/// One operation inside a multi-key transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a full row.
    Put {
        /// Row to write
        row: Row,
        /// Guard evaluated against the existing row at the same key
        precondition: Precondition,
    },
    /// Apply field changes to a row.
    Update {
        /// Partition key
        pk: String,
        /// Sort key
        sk: String,
        /// Changes to apply
        changes: Vec<FieldChange>,
        /// Guard evaluated against the existing row
        precondition: Precondition,
    },
}
