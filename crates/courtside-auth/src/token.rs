//! Session token issuer.
//!
//! A compact signed bearer credential: URL-safe base64 JSON claims joined
//! to an HMAC-SHA256 signature over the encoded claims, valid for seven
//! days. Verification returns `None` on any structural, signature, or
//! expiry failure; there are no distinguishable error shapes to aid
//! forgery attempts. Transport (cookie, header) is the caller's concern;
//! [`SessionCookie`] only describes the expected cookie settings.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use courtside_core::error::Result;
use courtside_core::Clock;
use serde::{Deserialize, Serialize};

use crate::mac::{ct_equal, hmac_sha256};

/// Token validity window: seven days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "auth-token";

/// The verified identity a token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Stable user id
    pub user_id: String,
    /// Normalized email
    pub email: String,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Mints and verifies session tokens with a symmetric secret.
pub struct SessionSigner {
    secret: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl SessionSigner {
    /// Create a signer from the shared session secret.
    pub fn new(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    /// Mint a token asserting `{user_id, email}` for the next seven days.
    pub fn mint(&self, user_id: &str, email: &str) -> Result<String> {
        let iat = self.clock.now_unix();
        let claims = SessionClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat,
            exp: iat + SESSION_TTL_SECS,
        };
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims)
                .map_err(|e| courtside_core::CourtsideError::internal(e.to_string()))?,
        );
        let signature = hmac_sha256(&self.secret, payload.as_bytes())?;
        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Validate signature and expiry and project out the claims. Any
    /// failure yields `None`.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let (payload, signature_b64) = token.split_once('.')?;
        let presented = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
        let expected = hmac_sha256(&self.secret, payload.as_bytes()).ok()?;
        if !ct_equal(&presented, &expected) {
            return None;
        }
        let claims: SessionClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
        if claims.user_id.is_empty() || claims.email.is_empty() {
            return None;
        }
        if claims.exp <= self.clock.now_unix() {
            return None;
        }
        Some(claims)
    }
}

/// SameSite policy values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on top-level navigations only
    Lax,
    /// Sent only to the issuing site
    Strict,
}

/// Settings for the cookie carrying the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name
    pub name: &'static str,
    /// Not readable from scripts
    pub http_only: bool,
    /// HTTPS only; enabled in production
    pub secure: bool,
    /// SameSite policy
    pub same_site: SameSite,
    /// Lifetime, seconds
    pub max_age_secs: i64,
    /// Cookie path
    pub path: &'static str,
}

impl SessionCookie {
    /// The settings the session surface must apply.
    pub fn settings(production: bool) -> Self {
        Self {
            name: SESSION_COOKIE_NAME,
            http_only: true,
            secure: production,
            same_site: SameSite::Lax,
            max_age_secs: SESSION_TTL_SECS,
            path: "/",
        }
    }
}
