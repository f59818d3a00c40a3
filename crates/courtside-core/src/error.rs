//! Unified error taxonomy for the Courtside core.
//!
//! A single error enum covers every component so callers branch on a closed
//! type. Each variant carries a short human-readable message; `kind()`
//! exposes a stable machine-readable discriminant. Messages never include
//! internal identifiers or storage details.

use serde::{Deserialize, Serialize};

/// Unified error type for all Courtside operations.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum CourtsideError {
    /// Malformed input (email, code, coordinates, name) rejected before
    /// touching storage.
    #[error("Invalid: {message}")]
    Validation {
        /// What was malformed
        message: String,
    },

    /// Resend cooldown has not yet elapsed.
    #[error("Please wait before requesting another code")]
    RateLimited,

    /// Wrong code, expired code, or locked-out challenge. Intentionally
    /// indistinguishable so callers learn nothing about challenge state.
    #[error("Invalid or expired code")]
    InvalidOrExpired,

    /// Missing or invalid session credential, or a token identity that does
    /// not match the resolved account.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource or profile absent.
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Concurrent creation detected via a canceled transaction.
    #[error("Conflict: {message}")]
    Conflict {
        /// What conflicted
        message: String,
    },

    /// Per-court, per-user check-in cooldown still active.
    #[error("Check-in cooldown active for this court")]
    CooldownActive,

    /// Caller is at or beyond the geofence limit.
    #[error("You must be within {limit_miles} miles of the court to check in")]
    TooFar {
        /// The geofence limit that was not met
        limit_miles: f64,
    },

    /// An external collaborator (email dispatch, distance lookup) failed.
    #[error("Dependency failure: {message}")]
    DependencyFailure {
        /// Which dependency failed and how
        message: String,
    },

    /// A required secret or tunable is missing or out of bounds. Fatal for
    /// the affected operation; never retried.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is misconfigured
        message: String,
    },

    /// Unexpected internal failure (storage transport, corrupt row).
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },
}

impl CourtsideError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a dependency-failure error.
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::DependencyFailure {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable discriminant for API surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::RateLimited => "rate_limited",
            Self::InvalidOrExpired => "invalid_or_expired",
            Self::Unauthorized => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::CooldownActive => "cooldown_active",
            Self::TooFar { .. } => "too_far",
            Self::DependencyFailure { .. } => "dependency_failure",
            Self::Configuration { .. } => "configuration",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result alias used throughout the Courtside crates.
pub type Result<T> = std::result::Result<T, CourtsideError>;
