//! # Courtside Auth
//!
//! Identity verification for the Courtside platform:
//!
//! - [`OtpEngine`] owns the one-time-code challenge lifecycle: issuance
//!   with resend throttling, verification with attempt lockout, expiry,
//!   and cleanup. All concurrency control is expressed as storage
//!   preconditions; there are no locks.
//! - [`SessionSigner`] mints and verifies the signed, time-limited bearer
//!   credential carrying `{user_id, email}`.
//! - [`AuthFlow`] ties both to the account directory: verify a code, then
//!   log in or register, and hand back a session.
//!
//! The plaintext code is never stored; the challenge row holds a keyed
//! hash, and comparisons are constant-time.

#![forbid(unsafe_code)]

pub mod flow;
mod mac;
pub mod mailer;
pub mod otp;
pub mod token;

#[cfg(test)]
mod integration_tests;

pub use flow::{AuthFlow, AuthSession};
pub use mailer::TracingMailer;
pub use otp::OtpEngine;
pub use token::{SameSite, SessionClaims, SessionCookie, SessionSigner, SESSION_COOKIE_NAME};
