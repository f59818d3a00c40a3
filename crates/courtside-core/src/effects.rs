//! Collaborator seams for external services.
//!
//! The engines depend on these traits, never on concrete clients, so
//! composition roots inject production handlers and tests inject fakes.
//! Both collaborators may block on I/O; neither holds engine state.

use async_trait::async_trait;

use crate::entity::Coordinates;

/// Email dispatch failure. A failed dispatch never rolls back state the
/// engine already committed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("email dispatch failed: {message}")]
pub struct EmailError {
    /// Transport-reported detail
    pub message: String,
}

impl EmailError {
    /// Create a dispatch error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outbound email transport.
#[async_trait]
pub trait EmailDispatch: Send + Sync {
    /// Send a plain-text message.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Distance lookup failure. `NoRoute` is a per-destination failure,
/// distinct from the provider being unreachable as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistanceError {
    /// The provider could not be reached or rejected the request.
    #[error("distance provider unreachable: {message}")]
    Unreachable {
        /// Provider-reported detail
        message: String,
    },
    /// The provider answered but could not resolve this destination.
    #[error("no route to destination")]
    NoRoute,
}

impl DistanceError {
    /// Create an unreachable-provider error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }
}

/// Travel (or great-circle) distance between coordinate pairs, in miles.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Distance from origin to one destination.
    async fn distance_miles(
        &self,
        origin: Coordinates,
        dest: Coordinates,
    ) -> Result<f64, DistanceError>;

    /// Distance from origin to several destinations. The outer error is a
    /// global provider failure; inner errors are per-destination.
    async fn distance_miles_batch(
        &self,
        origin: Coordinates,
        dests: &[Coordinates],
    ) -> Result<Vec<Result<f64, DistanceError>>, DistanceError> {
        let mut out = Vec::with_capacity(dests.len());
        for dest in dests {
            out.push(self.distance_miles(origin, *dest).await);
        }
        Ok(out)
    }
}
