//! Authentication configuration.
//!
//! Tunables are validated at construction time so an out-of-bounds value is
//! a startup failure, not a per-request surprise. `from_env` is the
//! production path; tests construct the struct directly.

use std::env;

use crate::error::{CourtsideError, Result};

/// Bounds on the challenge time-to-live, seconds.
pub const TTL_BOUNDS: (u32, u32) = (60, 3600);

/// Bounds on the minimum resend interval, seconds.
pub const MIN_RESEND_BOUNDS: (u32, u32) = (0, 600);

/// Bounds on the verification attempt limit.
pub const MAX_ATTEMPTS_BOUNDS: (u32, u32) = (1, 20);

/// Configuration for the identity verification engine and token issuer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Server-held secret keying the OTP hash
    pub otp_secret: String,
    /// Server-held secret signing session tokens
    pub session_secret: String,
    /// Sender address for verification emails
    pub from_address: String,
    /// Challenge time-to-live, seconds, in [60, 3600]
    pub ttl_seconds: u32,
    /// Minimum interval between issuances, seconds, in [0, 600]
    pub min_resend_seconds: u32,
    /// Wrong guesses before lockout, in [1, 20]
    pub max_attempts: u32,
}

impl AuthConfig {
    /// Validate bounds; call after direct construction.
    pub fn validate(&self) -> Result<()> {
        if self.otp_secret.is_empty() {
            return Err(CourtsideError::configuration("OTP secret is empty"));
        }
        if self.session_secret.is_empty() {
            return Err(CourtsideError::configuration("session secret is empty"));
        }
        check_bounds("ttl_seconds", self.ttl_seconds, TTL_BOUNDS)?;
        check_bounds("min_resend_seconds", self.min_resend_seconds, MIN_RESEND_BOUNDS)?;
        check_bounds("max_attempts", self.max_attempts, MAX_ATTEMPTS_BOUNDS)?;
        Ok(())
    }

    /// Load from the environment: `COURTSIDE_OTP_SECRET`,
    /// `COURTSIDE_SESSION_SECRET`, `COURTSIDE_FROM_ADDRESS` required;
    /// `COURTSIDE_OTP_TTL_SECONDS` (default 600),
    /// `COURTSIDE_OTP_MIN_RESEND_SECONDS` (default 60), and
    /// `COURTSIDE_OTP_MAX_ATTEMPTS` (default 5) optional.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            otp_secret: must_var("COURTSIDE_OTP_SECRET")?,
            session_secret: must_var("COURTSIDE_SESSION_SECRET")?,
            from_address: must_var("COURTSIDE_FROM_ADDRESS")?,
            ttl_seconds: numeric_var("COURTSIDE_OTP_TTL_SECONDS", 600)?,
            min_resend_seconds: numeric_var("COURTSIDE_OTP_MIN_RESEND_SECONDS", 60)?,
            max_attempts: numeric_var("COURTSIDE_OTP_MAX_ATTEMPTS", 5)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn check_bounds(name: &str, value: u32, (lo, hi): (u32, u32)) -> Result<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(CourtsideError::configuration(format!(
            "{name} must be in [{lo}, {hi}], got {value}"
        )))
    }
}

fn must_var(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CourtsideError::configuration(format!("missing required env var {name}")))
}

fn numeric_var(name: &str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            CourtsideError::configuration(format!("invalid numeric value for {name}"))
        }),
        Err(_) => Ok(default),
    }
}
