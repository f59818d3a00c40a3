//! Scripted distance provider.

use async_trait::async_trait;
use courtside_core::{Coordinates, DistanceError, DistanceProvider};
use parking_lot::Mutex;

/// A provider that returns a programmable result regardless of
/// coordinates. Use [`ScriptedDistance::set_miles`] to move the caller,
/// [`ScriptedDistance::set_error`] to break routing or the provider.
pub struct ScriptedDistance {
    next: Mutex<Result<f64, DistanceError>>,
}

impl ScriptedDistance {
    /// Provider that always reports the given distance.
    pub fn miles(miles: f64) -> Self {
        Self {
            next: Mutex::new(Ok(miles)),
        }
    }

    /// Change the reported distance.
    pub fn set_miles(&self, miles: f64) {
        *self.next.lock() = Ok(miles);
    }

    /// Make lookups fail.
    pub fn set_error(&self, error: DistanceError) {
        *self.next.lock() = Err(error);
    }
}

#[async_trait]
impl DistanceProvider for ScriptedDistance {
    async fn distance_miles(
        &self,
        _origin: Coordinates,
        _dest: Coordinates,
    ) -> Result<f64, DistanceError> {
        self.next.lock().clone()
    }
}
