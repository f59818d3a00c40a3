//! Great-circle distance provider.
//!
//! The haversine distance is the in-tree production implementation; a
//! road-distance client is an external collaborator that plugs into the
//! same [`DistanceProvider`] seam.

use async_trait::async_trait;
use courtside_core::{Coordinates, DistanceError, DistanceProvider};

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine great-circle distance in miles.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircleDistance;

impl GreatCircleDistance {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

/// Pure haversine computation.
pub fn haversine_miles(origin: Coordinates, dest: Coordinates) -> f64 {
    let lat1 = origin.lat.to_radians();
    let lat2 = dest.lat.to_radians();
    let d_lat = (dest.lat - origin.lat).to_radians();
    let d_long = (dest.long - origin.long).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

#[async_trait]
impl DistanceProvider for GreatCircleDistance {
    async fn distance_miles(
        &self,
        origin: Coordinates,
        dest: Coordinates,
    ) -> Result<f64, DistanceError> {
        Ok(haversine_miles(origin, dest))
    }
}
