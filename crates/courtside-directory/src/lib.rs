//! # Courtside Directory
//!
//! Maps verified emails to stable user ids and owns the user profile
//! record. The email index and the profile are created together in one
//! transaction, each guarded by a row-does-not-exist precondition, so
//! account creation is exactly-once per email even under concurrent
//! registration. Neither row is ever deleted by this crate.

#![forbid(unsafe_code)]

use std::sync::Arc;

use courtside_core::entity::{Account, EmailIndex, UserProfile};
use courtside_core::error::{CourtsideError, Result};
use courtside_core::keys;
use courtside_store::{
    AttrValue, FieldChange, Precondition, ReadConsistency, ReturnValues, StoreError, Table,
    WriteOp,
};
use tracing::{debug, warn};
use uuid::Uuid;

mod rows;


use rows::{email_index_row, parse_email_index, parse_profile, profile_row};

/// Resolves identities and manages profile records.
#[derive(Clone)]
pub struct AccountDirectory {
    table: Arc<dyn Table>,
}

impl AccountDirectory {
    /// Create a directory over the shared table.
    pub fn new(table: Arc<dyn Table>) -> Self {
        Self { table }
    }

    /// Resolve a normalized email to its stable user id, if registered.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<EmailIndex>> {
        let row = self
            .table
            .get(&keys::email_pk(email), keys::EMAIL_INDEX_SK, ReadConsistency::Eventual)
            .await
            .map_err(storage_error)?;
        row.map(|r| parse_email_index(&r)).transpose()
    }

    /// Load a user's profile record.
    pub async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = self
            .table
            .get(&keys::user_pk(user_id), keys::PROFILE_SK, ReadConsistency::Eventual)
            .await
            .map_err(storage_error)?;
        row.map(|r| parse_profile(&r)).transpose()
    }

    /// Create a new account: a fresh user id, then the email index and the
    /// profile written in one transaction, each under a not-exists guard.
    ///
    /// A canceled transaction means someone else registered this email
    /// concurrently; the caller must re-resolve by email and treat the
    /// pre-existing account as authoritative rather than retrying.
    pub async fn create_account(&self, email: &str, name: &str) -> Result<Account> {
        let user_id = Uuid::new_v4().to_string();

        let ops = vec![
            WriteOp::Put {
                row: email_index_row(email, &user_id),
                precondition: Precondition::RowNotExists,
            },
            WriteOp::Put {
                row: profile_row(&user_id, name),
                precondition: Precondition::RowNotExists,
            },
        ];

        match self.table.transact(ops).await {
            Ok(()) => {
                debug!(user_id, "account created");
                Ok(Account {
                    user_id,
                    email: email.to_string(),
                    name: name.to_string(),
                })
            }
            Err(e) if e.is_condition_failure() => {
                warn!(email, "concurrent account creation detected");
                Err(CourtsideError::conflict("account already exists"))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    /// Update the display name; the profile must already exist.
    pub async fn update_name(&self, user_id: &str, name: &str) -> Result<UserProfile> {
        let updated = self
            .table
            .update(
                &keys::user_pk(user_id),
                keys::PROFILE_SK,
                vec![FieldChange::Set("name".into(), AttrValue::S(name.into()))],
                Precondition::RowExists,
                ReturnValues::AllNew,
            )
            .await;
        match updated {
            Ok(Some(row)) => parse_profile(&row),
            Ok(None) => Err(CourtsideError::internal("update returned no row")),
            Err(StoreError::ConditionFailed) => {
                Err(CourtsideError::not_found("user profile not found"))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    /// Attach (or overwrite) an external billing reference. Idempotent.
    pub async fn attach_billing_ref(&self, user_id: &str, billing_ref: &str) -> Result<()> {
        let result = self
            .table
            .update(
                &keys::user_pk(user_id),
                keys::PROFILE_SK,
                vec![FieldChange::Set(
                    "billing_ref".into(),
                    AttrValue::S(billing_ref.into()),
                )],
                Precondition::RowExists,
                ReturnValues::None,
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(StoreError::ConditionFailed) => {
                Err(CourtsideError::not_found("user profile not found"))
            }
            Err(e) => Err(storage_error(e)),
        }
    }
}

fn storage_error(e: StoreError) -> CourtsideError {
    CourtsideError::internal(format!("directory storage failure: {e}"))
}
