//! One-time-code challenge lifecycle.
//!
//! State machine per email: `Absent -> Active` on issue, then `Verified`,
//! `Expired`, or `Locked` (all terminal, row deleted) or back to `Active`
//! on a resend after the cooldown. Verification and consumption are the
//! same transition; there is no verified-but-not-deleted state.
//!
//! Issuance throttling is a storage precondition, not a read-then-write:
//! the conditional update only lands when no challenge exists, the resend
//! interval has elapsed, or the previous code has expired. The storage
//! layer evaluates that atomically, which closes the race between two
//! concurrent issue requests.

use std::sync::Arc;

use courtside_core::config::AuthConfig;
use courtside_core::entity::sort_timestamp;
use courtside_core::error::{CourtsideError, Result};
use courtside_core::{keys, validate, Clock, EmailDispatch};
use courtside_store::{
    AttrValue, FieldChange, Precondition, ReadConsistency, ReturnValues, StoreError, Table,
};
use rand::Rng;
use tracing::{debug, warn};

use crate::mac::{ct_equal, hmac_sha256};

const EMAIL_SUBJECT: &str = "Your verification code";

/// Engine for issuing and verifying email one-time codes.
pub struct OtpEngine {
    table: Arc<dyn Table>,
    mailer: Arc<dyn EmailDispatch>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl OtpEngine {
    /// Create an engine, validating the config bounds up front.
    pub fn new(
        table: Arc<dyn Table>,
        mailer: Arc<dyn EmailDispatch>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table,
            mailer,
            clock,
            config,
        })
    }

    /// Issue a challenge: store a fresh hashed code under the resend
    /// guard, then dispatch it by email.
    ///
    /// `RateLimited` when the guard rejects the write; nothing is sent.
    /// `DependencyFailure` when dispatch fails; the stored challenge is
    /// kept, so a retry can resend once the cooldown elapses.
    pub async fn issue(&self, email: &str) -> Result<()> {
        let email = validate::normalize_email(email)?;

        let code = generate_code();
        let otp_hash = hash_code(&self.config.otp_secret, &email, &code)?;

        let now = self.clock.now();
        let now_sec = now.timestamp();
        let expires_at = now_sec + i64::from(self.config.ttl_seconds);
        let min_allowed_last_sent = now_sec - i64::from(self.config.min_resend_seconds);

        let guard = Precondition::AnyOf(vec![
            Precondition::FieldMissing("last_sent_at".into()),
            Precondition::FieldAtMost("last_sent_at".into(), min_allowed_last_sent),
            Precondition::FieldAtMost("expires_at".into(), now_sec),
        ]);
        let changes = vec![
            FieldChange::Set("entity_type".into(), AttrValue::S("OTP".into())),
            FieldChange::Set("otp_hash".into(), AttrValue::S(otp_hash)),
            FieldChange::Set("expires_at".into(), AttrValue::N(expires_at)),
            FieldChange::Set("last_sent_at".into(), AttrValue::N(now_sec)),
            FieldChange::Set("created_at".into(), AttrValue::S(sort_timestamp(now))),
            FieldChange::Set("attempt_count".into(), AttrValue::N(0)),
            FieldChange::Add("send_count".into(), 1),
        ];

        let write = self
            .table
            .update(
                &keys::email_pk(&email),
                keys::OTP_SK,
                changes,
                guard,
                ReturnValues::None,
            )
            .await;
        match write {
            Ok(_) => {}
            Err(StoreError::ConditionFailed) => {
                debug!(email, "otp issue throttled");
                return Err(CourtsideError::RateLimited);
            }
            Err(e) => return Err(storage_error(e)),
        }

        let minutes = self.config.ttl_seconds.div_ceil(60);
        let body = format!(
            "Your verification code is: {code}\n\n\
             This code will expire in {minutes} minutes.\n\n\
             If you didn't request this, you can ignore this email."
        );
        self.mailer
            .send(&email, EMAIL_SUBJECT, &body)
            .await
            .map_err(|e| {
                warn!(email, error = %e, "otp email dispatch failed");
                CourtsideError::dependency("failed to send email")
            })?;

        debug!(email, "otp issued");
        Ok(())
    }

    /// Verify a code and consume the challenge.
    ///
    /// Wrong code, expired code, and locked-out challenge all return
    /// `InvalidOrExpired`; callers cannot distinguish them.
    pub async fn verify(&self, email: &str, code: &str) -> Result<()> {
        let email = validate::normalize_email(email)?;
        validate::ensure_six_digit_code(code)?;

        let pk = keys::email_pk(&email);
        // A stale read here could accept a code a concurrent verification
        // already consumed.
        let row = self
            .table
            .get(&pk, keys::OTP_SK, ReadConsistency::Strong)
            .await
            .map_err(storage_error)?;

        let row = match row {
            Some(row) => row,
            None => return Err(CourtsideError::InvalidOrExpired),
        };
        let (stored_hash, expires_at) = match (row.get_s("otp_hash"), row.get_n("expires_at")) {
            (Some(hash), Some(exp)) => (hash.to_string(), exp),
            _ => return Err(CourtsideError::InvalidOrExpired),
        };

        if expires_at <= self.clock.now_unix() {
            self.cleanup(&pk, "expired challenge").await;
            return Err(CourtsideError::InvalidOrExpired);
        }

        let expected = hash_code(&self.config.otp_secret, &email, code)?;
        if hashes_match(&stored_hash, &expected) {
            // Single use: consumption is the same transition as success.
            self.cleanup(&pk, "verified challenge").await;
            debug!(email, "otp verified");
            return Ok(());
        }

        self.record_failed_attempt(&pk, &email).await;
        Err(CourtsideError::InvalidOrExpired)
    }

    /// Count a wrong guess and delete the challenge at the attempt limit.
    /// Failures here are swallowed; the challenge self-expires anyway.
    async fn record_failed_attempt(&self, pk: &str, email: &str) {
        let updated = self
            .table
            .update(
                pk,
                keys::OTP_SK,
                vec![FieldChange::Add("attempt_count".into(), 1)],
                Precondition::RowExists,
                ReturnValues::AllNew,
            )
            .await;
        match updated {
            Ok(Some(row)) => {
                let attempts = row.get_n("attempt_count").unwrap_or(0);
                if attempts >= i64::from(self.config.max_attempts) {
                    debug!(email, attempts, "otp attempt limit reached");
                    self.cleanup(pk, "locked-out challenge").await;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(email, error = %e, "failed to record otp attempt"),
        }
    }

    /// Best-effort delete; the row is logically consumed or self-expiring,
    /// so a failure here must not fail the overarching operation.
    async fn cleanup(&self, pk: &str, what: &str) {
        if let Err(e) = self.table.delete(pk, keys::OTP_SK).await {
            warn!(error = %e, "failed to delete {what}");
        }
    }
}

/// Uniformly random six-digit code, leading zeros preserved.
fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Keyed hash of `"{email}:{code}"`. The email is included so a leaked
/// hash cannot be replayed against another address.
fn hash_code(secret: &str, email: &str, code: &str) -> Result<String> {
    let message = format!("{email}:{code}");
    Ok(hex::encode(hmac_sha256(
        secret.as_bytes(),
        message.as_bytes(),
    )?))
}

/// Constant-time comparison of the hex-encoded hashes as bytes.
fn hashes_match(stored_hex: &str, expected_hex: &str) -> bool {
    match (hex::decode(stored_hex), hex::decode(expected_hex)) {
        (Ok(stored), Ok(expected)) => ct_equal(&stored, &expected),
        _ => false,
    }
}

fn storage_error(e: StoreError) -> CourtsideError {
    CourtsideError::internal(format!("otp storage failure: {e}"))
}

/// Extract the code from a dispatched email body (test support; the body
/// format is part of the issued email, not of the engine contract).
#[cfg(test)]
pub(crate) fn code_from_body(body: &str) -> Option<String> {
    body.split(": ")
        .nth(1)?
        .chars()
        .take(6)
        .collect::<String>()
        .into()
}
