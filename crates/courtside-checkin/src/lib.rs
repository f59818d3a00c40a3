//! # Courtside Check-in
//!
//! The check-in write path: validate the geofence and the per-court
//! cooldown, then commit one atomic transaction touching three rows (the
//! new check-in entry, the court's live status, and the user's counter).
//! Partial updates are never observable; a reader who sees the court's
//! status change is guaranteed the corresponding check-in entry is also
//! visible.

#![forbid(unsafe_code)]

use std::sync::Arc;

use chrono::DateTime;
use courtside_core::entity::{sort_timestamp, Checkin, Coordinates, Court, CourtStatus};
use courtside_core::error::{CourtsideError, Result};
use courtside_core::{keys, validate, Clock, DistanceProvider};
use courtside_store::{
    AttrValue, FieldChange, Precondition, ReadConsistency, StoreError, Table, WriteOp,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub mod distance;
mod rows;


pub use distance::GreatCircleDistance;
pub use rows::court_row;

/// Minimum elapsed time between two check-ins by the same user on the
/// same court.
pub const CHECKIN_COOLDOWN_SECS: i64 = 2 * 60 * 60;

/// Geofence limit. The check is strictly "must be within": a distance
/// exactly at the limit is rejected.
pub const CHECKIN_DISTANCE_LIMIT_MILES: f64 = 0.5;

/// A check-in request from an already authenticated user.
#[derive(Debug, Clone)]
pub struct CheckinRequest {
    /// Acting user
    pub user_id: String,
    /// Acting user's display name, denormalized onto the entry
    pub user_name: Option<String>,
    /// Target court
    pub court_id: String,
    /// Reported occupancy
    pub status: CourtStatus,
    /// Caller's current position
    pub origin: Coordinates,
    /// Optional photo evidence
    pub photo_url: Option<String>,
}

/// Engine committing location-gated check-ins.
pub struct CheckinEngine {
    table: Arc<dyn Table>,
    distance: Arc<dyn DistanceProvider>,
    clock: Arc<dyn Clock>,
}

impl CheckinEngine {
    /// Create an engine over the shared table and a distance provider.
    pub fn new(
        table: Arc<dyn Table>,
        distance: Arc<dyn DistanceProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            table,
            distance,
            clock,
        }
    }

    /// Load one court record.
    pub async fn get_court(&self, court_id: &str) -> Result<Option<Court>> {
        let row = self
            .table
            .get(keys::COURT_PK, &keys::court_sk(court_id), ReadConsistency::Eventual)
            .await
            .map_err(storage_error)?;
        row.map(|r| rows::parse_court(&r)).transpose()
    }

    /// All court records.
    pub async fn list_courts(&self) -> Result<Vec<Court>> {
        let rows = self
            .table
            .query_prefix(keys::COURT_PK, None)
            .await
            .map_err(storage_error)?;
        rows.iter().map(rows::parse_court).collect()
    }

    /// A court's check-in log, chronological.
    pub async fn list_checkins(&self, court_id: &str) -> Result<Vec<Checkin>> {
        let rows = self
            .table
            .query_prefix(&keys::checkin_pk(court_id), Some(keys::CHECKIN_SK_PREFIX))
            .await
            .map_err(storage_error)?;
        rows.iter().map(rows::parse_checkin).collect()
    }

    /// The user's most recent check-in on a court, by recorded creation
    /// time. The scan order of the range query does not matter; the
    /// comparison is against the maximum `created_at`.
    pub async fn latest_checkin(&self, court_id: &str, user_id: &str) -> Result<Option<Checkin>> {
        let checkins = self.list_checkins(court_id).await?;
        Ok(checkins
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at)))
    }

    /// Validate and commit a check-in.
    pub async fn check_in(&self, request: CheckinRequest) -> Result<Checkin> {
        validate::ensure_coordinate_range(request.origin)?;

        let court = self
            .get_court(&request.court_id)
            .await?
            .ok_or_else(|| CourtsideError::not_found("court not found"))?;
        let court_coords = court.coordinates.ok_or_else(|| {
            CourtsideError::validation("court does not have valid coordinates")
        })?;

        // An absent profile is a caller error, not a write conflict. The
        // transaction still guards against the row vanishing after this
        // read.
        let profile = self
            .table
            .get(
                &keys::user_pk(&request.user_id),
                keys::PROFILE_SK,
                ReadConsistency::Eventual,
            )
            .await
            .map_err(storage_error)?;
        if profile.is_none() {
            return Err(CourtsideError::not_found("user profile not found"));
        }

        // Cooldown before the distance lookup: the cheap local check
        // should reject before we pay for the external call.
        if let Some(latest) = self
            .latest_checkin(&request.court_id, &request.user_id)
            .await?
        {
            let last_at = DateTime::parse_from_rfc3339(&latest.created_at)
                .map_err(|_| CourtsideError::internal("unparseable check-in timestamp"))?;
            let elapsed = self.clock.now_unix() - last_at.timestamp();
            if elapsed < CHECKIN_COOLDOWN_SECS {
                debug!(court_id = %request.court_id, user_id = %request.user_id, elapsed, "check-in throttled");
                return Err(CourtsideError::CooldownActive);
            }
        }

        let miles = self
            .distance
            .distance_miles(request.origin, court_coords)
            .await
            .map_err(|e| {
                warn!(court_id = %request.court_id, error = %e, "distance lookup failed");
                CourtsideError::dependency("distance lookup failed")
            })?;
        if miles >= CHECKIN_DISTANCE_LIMIT_MILES {
            debug!(court_id = %request.court_id, miles, "check-in outside geofence");
            return Err(CourtsideError::TooFar {
                limit_miles: CHECKIN_DISTANCE_LIMIT_MILES,
            });
        }

        let created_at = sort_timestamp(self.clock.now());
        let checkin = Checkin {
            checkin_id: Uuid::new_v4().to_string(),
            court_id: request.court_id.clone(),
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
            status: request.status,
            created_at: created_at.clone(),
            photo_url: request.photo_url.clone(),
        };

        let ops = vec![
            WriteOp::Put {
                row: rows::checkin_row(&checkin),
                precondition: Precondition::RowNotExists,
            },
            WriteOp::Update {
                pk: keys::COURT_PK.into(),
                sk: keys::court_sk(&request.court_id),
                changes: vec![
                    FieldChange::Set(
                        "status".into(),
                        AttrValue::S(request.status.as_str().into()),
                    ),
                    FieldChange::Set("last_updated_at".into(), AttrValue::S(created_at)),
                ],
                precondition: Precondition::RowExists,
            },
            WriteOp::Update {
                pk: keys::user_pk(&request.user_id),
                sk: keys::PROFILE_SK.into(),
                changes: vec![FieldChange::Add("checkin_count".into(), 1)],
                precondition: Precondition::RowExists,
            },
        ];

        match self.table.transact(ops).await {
            Ok(()) => {
                debug!(court_id = %request.court_id, user_id = %request.user_id, "check-in committed");
                Ok(checkin)
            }
            Err(e) if e.is_condition_failure() => Err(CourtsideError::conflict(
                "check-in conflicted with concurrent activity",
            )),
            Err(e) => Err(storage_error(e)),
        }
    }
}

fn storage_error(e: StoreError) -> CourtsideError {
    CourtsideError::internal(format!("check-in storage failure: {e}"))
}
