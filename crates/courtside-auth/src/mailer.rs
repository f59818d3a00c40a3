//! Default outbound email handler.
//!
//! The real transport (SES or similar) is an external collaborator wired
//! in at composition time. This handler logs the dispatch so local and
//! staging environments work without mail credentials; the code itself is
//! only ever logged at debug level.

use async_trait::async_trait;
use courtside_core::{EmailDispatch, EmailError};
use tracing::{debug, info};

/// Mailer that records dispatches in the log instead of sending.
#[derive(Debug, Clone)]
pub struct TracingMailer {
    from: String,
}

impl TracingMailer {
    /// Create the logging mailer sending from the configured address.
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from: from_address.into(),
        }
    }

    /// The configured sender address.
    pub fn from_address(&self) -> &str {
        &self.from
    }
}

#[async_trait]
impl EmailDispatch for TracingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        info!(from = %self.from, to, subject, "email dispatched (logging transport)");
        debug!(body, "email body");
        Ok(())
    }
}
