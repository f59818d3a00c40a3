//! Closed error type for the storage contract.
//!
//! Condition failures are first-class variants, not strings to sniff:
//! callers branch on `ConditionFailed` / `TransactionCanceled` to translate
//! them into their own semantics (rate limit, duplicate registration, ...).
//! They are meaningful outcomes, not transient faults, and are never
//! blindly retried.

/// Storage backend errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A single-item precondition did not hold.
    #[error("condition failed")]
    ConditionFailed,

    /// A multi-key transaction was canceled because some operation's
    /// precondition did not hold.
    #[error("transaction canceled")]
    TransactionCanceled,

    /// The backend was unreachable or returned a transport-level failure.
    #[error("storage transport error: {message}")]
    Transport {
        /// Backend-reported failure detail
        message: String,
    },

    /// A stored row could not be interpreted (missing or mistyped fields).
    #[error("corrupt row: {message}")]
    Corrupt {
        /// What could not be interpreted
        message: String,
    },
}

impl StoreError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a corrupt-row error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// True for both single-item and transactional precondition failures.
    pub fn is_condition_failure(&self) -> bool {
        matches!(self, Self::ConditionFailed | Self::TransactionCanceled)
    }
}

/// Result alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
