//! End-to-end OTP and login behavior against the in-memory table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use courtside_core::config::AuthConfig;
use courtside_core::{keys, CourtsideError};
use courtside_directory::AccountDirectory;
use courtside_store::{
    FieldChange, Precondition, ReadConsistency, ReturnValues, Row, StoreResult, Table, WriteOp,
};
use courtside_testkit::{ManualClock, MemoryTable, MockMailer};

use crate::flow::AuthFlow;
use crate::otp::{code_from_body, OtpEngine};
use crate::token::SessionSigner;

struct Harness {
    table: MemoryTable,
    mailer: Arc<MockMailer>,
    clock: Arc<ManualClock>,
    otp: OtpEngine,
}

fn config() -> AuthConfig {
    AuthConfig {
        otp_secret: "otp-secret".into(),
        session_secret: "session-secret".into(),
        from_address: "noreply@example.com".into(),
        ttl_seconds: 600,
        min_resend_seconds: 60,
        max_attempts: 5,
    }
}

fn harness() -> Harness {
    harness_on(MemoryTable::new())
}

fn harness_on(table: MemoryTable) -> Harness {
    let mailer = Arc::new(MockMailer::new());
    let clock = Arc::new(ManualClock::new());
    let otp = OtpEngine::new(
        Arc::new(table.clone()),
        mailer.clone(),
        clock.clone(),
        config(),
    )
    .unwrap();
    Harness {
        table,
        mailer,
        clock,
        otp,
    }
}

impl Harness {
    fn last_code(&self) -> String {
        let sent = self.mailer.sent();
        code_from_body(&sent.last().unwrap().body).unwrap()
    }

    fn flow(&self) -> AuthFlow {
        let table: Arc<dyn Table> = Arc::new(self.table.clone());
        AuthFlow::new(
            OtpEngine::new(
                table.clone(),
                self.mailer.clone(),
                self.clock.clone(),
                config(),
            )
            .unwrap(),
            AccountDirectory::new(table),
            SessionSigner::new(b"session-secret".to_vec(), self.clock.clone()),
        )
    }
}

#[tokio::test]
async fn issue_creates_one_challenge_row_with_send_count() {
    let h = harness();
    h.otp.issue("a@b.com").await.unwrap();

    let rows = h.table.query_prefix("EMAIL#a@b.com", None).await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.sk, keys::OTP_SK);
    assert_eq!(row.get_n("send_count"), Some(1));
    assert_eq!(row.get_n("attempt_count"), Some(0));
    assert!(row.get_s("otp_hash").is_some());
    assert_eq!(h.mailer.sent_count(), 1);
}

#[tokio::test]
async fn reissue_within_cooldown_is_rate_limited_and_sends_nothing() {
    let h = harness();
    h.otp.issue("a@b.com").await.unwrap();

    let err = h.otp.issue("a@b.com").await.unwrap_err();
    assert_matches!(err, CourtsideError::RateLimited);
    assert_eq!(h.mailer.sent_count(), 1);

    // Still exactly one challenge row.
    let rows = h.table.query_prefix("EMAIL#a@b.com", None).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn reissue_after_cooldown_overwrites_and_invalidates_the_old_code() {
    let h = harness();
    h.otp.issue("a@b.com").await.unwrap();
    let old_code = h.last_code();

    h.clock.advance_secs(61);
    h.otp.issue("a@b.com").await.unwrap();
    let new_code = h.last_code();

    let row = h.table.raw_get("EMAIL#a@b.com", keys::OTP_SK).await.unwrap();
    assert_eq!(row.get_n("send_count"), Some(2));

    // The prior code no longer verifies (unless the draw collided).
    if old_code != new_code {
        assert_matches!(
            h.otp.verify("a@b.com", &old_code).await.unwrap_err(),
            CourtsideError::InvalidOrExpired
        );
    }
    h.otp.verify("a@b.com", &new_code).await.unwrap();
}

#[tokio::test]
async fn a_code_verifies_at_most_once() {
    let h = harness();
    h.otp.issue("a@b.com").await.unwrap();
    let code = h.last_code();

    h.otp.verify("a@b.com", &code).await.unwrap();
    assert!(h.table.raw_get("EMAIL#a@b.com", keys::OTP_SK).await.is_none());

    assert_matches!(
        h.otp.verify("a@b.com", &code).await.unwrap_err(),
        CourtsideError::InvalidOrExpired
    );
}

#[tokio::test]
async fn lockout_after_max_attempts_deletes_the_challenge() {
    let h = harness();
    h.otp.issue("a@b.com").await.unwrap();
    let code = h.last_code();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    for _ in 0..5 {
        assert_matches!(
            h.otp.verify("a@b.com", wrong).await.unwrap_err(),
            CourtsideError::InvalidOrExpired
        );
    }
    assert!(h.table.raw_get("EMAIL#a@b.com", keys::OTP_SK).await.is_none());

    // Even the correct original code fails now; the row is gone.
    assert_matches!(
        h.otp.verify("a@b.com", &code).await.unwrap_err(),
        CourtsideError::InvalidOrExpired
    );
}

#[tokio::test]
async fn expired_challenges_never_verify_and_get_cleaned_up() {
    let h = harness();
    h.otp.issue("a@b.com").await.unwrap();
    let code = h.last_code();

    h.clock.advance_secs(600);
    assert_matches!(
        h.otp.verify("a@b.com", &code).await.unwrap_err(),
        CourtsideError::InvalidOrExpired
    );
    assert!(h.table.raw_get("EMAIL#a@b.com", keys::OTP_SK).await.is_none());
}

#[tokio::test]
async fn expiry_reopens_issuance_before_the_resend_window() {
    let h = harness();
    let tight = AuthConfig {
        ttl_seconds: 60,
        min_resend_seconds: 600,
        ..config()
    };
    let otp = OtpEngine::new(
        Arc::new(h.table.clone()),
        h.mailer.clone(),
        h.clock.clone(),
        tight,
    )
    .unwrap();

    otp.issue("a@b.com").await.unwrap();
    // Cooldown not elapsed, but the code expired: issuance is allowed again.
    h.clock.advance_secs(61);
    otp.issue("a@b.com").await.unwrap();
    assert_eq!(h.mailer.sent_count(), 2);
}

#[tokio::test]
async fn dispatch_failure_keeps_the_challenge_for_a_later_resend() {
    let h = harness();
    h.mailer.set_failing(true);

    let err = h.otp.issue("a@b.com").await.unwrap_err();
    assert_matches!(err, CourtsideError::DependencyFailure { .. });
    // Not rolled back: the challenge is stored and still throttles.
    assert!(h.table.raw_get("EMAIL#a@b.com", keys::OTP_SK).await.is_some());
    assert_matches!(
        h.otp.issue("a@b.com").await.unwrap_err(),
        CourtsideError::RateLimited
    );

    h.mailer.set_failing(false);
    h.clock.advance_secs(61);
    h.otp.issue("a@b.com").await.unwrap();
    let code = h.last_code();
    h.otp.verify("a@b.com", &code).await.unwrap();
}

#[tokio::test]
async fn malformed_inputs_are_rejected_before_storage() {
    let h = harness();
    assert_matches!(
        h.otp.issue("not-an-email").await.unwrap_err(),
        CourtsideError::Validation { .. }
    );
    assert_matches!(
        h.otp.verify("a@b.com", "12345").await.unwrap_err(),
        CourtsideError::Validation { .. }
    );
    assert_eq!(h.table.row_count().await, 0);
}

#[tokio::test]
async fn first_login_registers_with_derived_name() {
    let h = harness();
    let flow = h.flow();

    flow.request_code("Sam.H@Example.com").await.unwrap();
    let code = h.last_code();
    let session = flow
        .verify_and_login("Sam.H@Example.com", &code, None)
        .await
        .unwrap();

    assert_eq!(session.user.email, "sam.h@example.com");
    assert_eq!(session.user.name, "sam.h");

    // The token asserts the same identity.
    let account = flow.authenticate(&session.token).await.unwrap();
    assert_eq!(account.user_id, session.user.user_id);
}

#[tokio::test]
async fn requested_name_wins_when_usable() {
    let h = harness();
    let flow = h.flow();

    flow.request_code("sam@example.com").await.unwrap();
    let code = h.last_code();
    let session = flow
        .verify_and_login("sam@example.com", &code, Some("  Sam Hart  "))
        .await
        .unwrap();
    assert_eq!(session.user.name, "Sam Hart");
}

#[tokio::test]
async fn second_login_resolves_the_existing_account() {
    let h = harness();
    let flow = h.flow();

    flow.request_code("sam@example.com").await.unwrap();
    let first = flow
        .verify_and_login("sam@example.com", &h.last_code(), Some("Sam"))
        .await
        .unwrap();

    h.clock.advance_secs(61);
    flow.request_code("sam@example.com").await.unwrap();
    let second = flow
        .verify_and_login("sam@example.com", &h.last_code(), Some("Ignored"))
        .await
        .unwrap();

    assert_eq!(second.user.user_id, first.user.user_id);
    assert_eq!(second.user.name, "Sam");
}

#[tokio::test]
async fn missing_profile_behind_an_email_index_is_fatal() {
    let h = harness();
    // Index row without its profile: corrupted directory state.
    h.table
        .seed(
            Row::new("EMAIL#sam@example.com", keys::EMAIL_INDEX_SK)
                .with_s("entity_type", "USER_EMAIL")
                .with_s("user_id", "u-orphan")
                .with_s("email", "sam@example.com"),
        )
        .await;

    let flow = h.flow();
    flow.request_code("sam@example.com").await.unwrap();
    let err = flow
        .verify_and_login("sam@example.com", &h.last_code(), None)
        .await
        .unwrap_err();
    assert_matches!(err, CourtsideError::NotFound { .. });
}

#[tokio::test]
async fn authenticate_rejects_stale_identity_mappings() {
    let h = harness();
    let flow = h.flow();

    flow.request_code("sam@example.com").await.unwrap();
    let session = flow
        .verify_and_login("sam@example.com", &h.last_code(), None)
        .await
        .unwrap();

    // Re-point the email index at a different user id; the old token's
    // identity no longer matches the directory.
    h.table
        .update(
            "EMAIL#sam@example.com",
            keys::EMAIL_INDEX_SK,
            vec![FieldChange::Set(
                "user_id".into(),
                courtside_store::AttrValue::S("u-other".into()),
            )],
            Precondition::RowExists,
            ReturnValues::None,
        )
        .await
        .unwrap();

    assert_matches!(
        flow.authenticate(&session.token).await.unwrap_err(),
        CourtsideError::Unauthorized
    );
    assert_matches!(
        flow.authenticate("garbage-token").await.unwrap_err(),
        CourtsideError::Unauthorized
    );
}

/// Table wrapper that hides the email index from its first reader,
/// reproducing the window where two registrations race: the losing flow
/// resolves "no account", attempts creation, and hits the canceled
/// transaction.
struct RacingTable {
    inner: MemoryTable,
    hide_once: AtomicBool,
}

#[async_trait]
impl Table for RacingTable {
    async fn get(
        &self,
        pk: &str,
        sk: &str,
        consistency: ReadConsistency,
    ) -> StoreResult<Option<Row>> {
        if sk == keys::EMAIL_INDEX_SK && self.hide_once.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get(pk, sk, consistency).await
    }

    async fn put_if_absent(&self, row: Row) -> StoreResult<()> {
        self.inner.put_if_absent(row).await
    }

    async fn update(
        &self,
        pk: &str,
        sk: &str,
        changes: Vec<FieldChange>,
        precondition: Precondition,
        return_values: ReturnValues,
    ) -> StoreResult<Option<Row>> {
        self.inner
            .update(pk, sk, changes, precondition, return_values)
            .await
    }

    async fn delete(&self, pk: &str, sk: &str) -> StoreResult<()> {
        self.inner.delete(pk, sk).await
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: Option<&str>) -> StoreResult<Vec<Row>> {
        self.inner.query_prefix(pk, sk_prefix).await
    }

    async fn transact(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        self.inner.transact(ops).await
    }
}

#[tokio::test]
async fn losing_a_registration_race_logs_into_the_winner() {
    let h = harness();
    let winner_flow = h.flow();

    winner_flow.request_code("sam@example.com").await.unwrap();
    let winner = winner_flow
        .verify_and_login("sam@example.com", &h.last_code(), Some("Sam"))
        .await
        .unwrap();

    // The loser's first index read misses the winner's freshly created
    // account; its creation transaction is canceled and it re-resolves.
    let racing: Arc<dyn Table> = Arc::new(RacingTable {
        inner: h.table.clone(),
        hide_once: AtomicBool::new(true),
    });
    let loser_flow = AuthFlow::new(
        OtpEngine::new(racing.clone(), h.mailer.clone(), h.clock.clone(), config()).unwrap(),
        AccountDirectory::new(racing),
        SessionSigner::new(b"session-secret".to_vec(), h.clock.clone()),
    );

    h.clock.advance_secs(61);
    loser_flow.request_code("sam@example.com").await.unwrap();
    let loser = loser_flow
        .verify_and_login("sam@example.com", &h.last_code(), Some("Impostor Sam"))
        .await
        .unwrap();

    // Exactly one account; the loser observes the winner's.
    assert_eq!(loser.user.user_id, winner.user.user_id);
    assert_eq!(loser.user.name, "Sam");
    let index_rows = h
        .table
        .query_prefix("EMAIL#sam@example.com", Some(keys::EMAIL_INDEX_SK))
        .await
        .unwrap();
    assert_eq!(index_rows.len(), 1);
}
