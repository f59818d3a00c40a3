//! Persisted domain entities.
//!
//! These mirror the rows of the single table. Conversion to and from raw
//! storage rows lives with the engine that owns each entity; this module
//! only defines the shapes and their invariants.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Live occupancy status of a court, as reported by check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourtStatus {
    /// Nobody playing
    Empty,
    /// A few players, open courts remain
    Low,
    /// Most courts taken
    Medium,
    /// Full, expect a wait
    Crowded,
}

impl CourtStatus {
    /// Storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::Crowded => "CROWDED",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EMPTY" => Some(Self::Empty),
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "CROWDED" => Some(Self::Crowded),
            _ => None,
        }
    }
}

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, degrees in [-90, 90]
    pub lat: f64,
    /// Longitude, degrees in [-180, 180]
    pub long: f64,
}

/// The stored one-time-code challenge for one email address.
///
/// At most one exists per email at any instant; it is deleted on successful
/// verification, on expiry detection, and on attempt lockout. The plaintext
/// code is never stored, only its keyed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    /// Hex HMAC-SHA256 over `"{email}:{code}"`
    pub otp_hash: String,
    /// Unix seconds after which the challenge no longer verifies
    pub expires_at: i64,
    /// Unix seconds of the most recent issuance, drives resend throttling
    pub last_sent_at: i64,
    /// Wrong guesses against the current code
    pub attempt_count: i64,
    /// Total codes ever issued for this email (survives overwrites)
    pub send_count: i64,
}

/// Maps a verified email to its stable user id. Created exactly once per
/// email, atomically with the profile, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailIndex {
    /// Stable user id
    pub user_id: String,
    /// Normalized email address
    pub email: String,
}

/// The mutable per-user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user id
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Lifetime check-in count, incremented atomically by the check-in engine
    pub checkin_count: i64,
    /// External billing reference, if attached
    pub billing_ref: Option<String>,
}

/// A resolved account: email index plus profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable user id
    pub user_id: String,
    /// Normalized email address
    pub email: String,
    /// Display name from the profile
    pub name: String,
}

/// A court record. Status and `last_updated_at` are mutated only through
/// the check-in engine's transaction; everything else is seeded externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    /// Court id (sort-key suffix)
    pub id: String,
    /// Human name
    pub name: String,
    /// Street address
    pub address_line: String,
    /// Geofence anchor; a court without coordinates cannot accept check-ins
    pub coordinates: Option<Coordinates>,
    /// Number of physical courts at the site
    pub court_count: Option<i64>,
    /// Live status as of the latest check-in
    pub status: CourtStatus,
    /// RFC 3339 timestamp of the latest status change
    pub last_updated_at: String,
    /// Photo of the site
    pub photo_url: Option<String>,
}

/// An immutable check-in log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkin {
    /// Unique id of this entry
    pub checkin_id: String,
    /// Court checked into
    pub court_id: String,
    /// Acting user
    pub user_id: String,
    /// Acting user's display name at check-in time
    pub user_name: Option<String>,
    /// Status the user reported
    pub status: CourtStatus,
    /// RFC 3339 creation timestamp, also embedded in the sort key
    pub created_at: String,
    /// Optional photo evidence
    pub photo_url: Option<String>,
}

/// Render a timestamp in the fixed-width RFC 3339 form used in sort keys
/// (millisecond precision, `Z` suffix) so lexicographic order matches
/// chronological order.
pub fn sort_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
