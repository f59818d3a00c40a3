//! Recording mailer with a failure toggle.

use async_trait::async_trait;
use courtside_core::{EmailDispatch, EmailError};
use parking_lot::Mutex;

/// One captured outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Mailer that records every send and can be told to fail.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail: Mutex<bool>,
}

impl MockMailer {
    /// Create a mailer that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock() = failing;
    }

    /// All messages accepted so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().clone()
    }

    /// Number of messages accepted so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl EmailDispatch for MockMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        if *self.fail.lock() {
            return Err(EmailError::new("mock mailer set to fail"));
        }
        self.sent.lock().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
