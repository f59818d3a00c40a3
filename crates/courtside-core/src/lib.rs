//! # Courtside Core
//!
//! Foundation crate for the Courtside platform: domain entities, the
//! single-table key scheme, the unified error taxonomy, input validation
//! guards, the clock and collaborator seams, and environment-driven
//! configuration.
//!
//! Storage access lives in `courtside-store`; the engines that use these
//! types live in `courtside-auth`, `courtside-directory`, and
//! `courtside-checkin`; production and mock collaborator handlers live
//! with the engines and in `courtside-testkit` respectively.

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod effects;
pub mod entity;
pub mod error;
pub mod keys;
pub mod validate;

pub use clock::{Clock, SystemClock};
pub use config::AuthConfig;
pub use effects::{DistanceError, DistanceProvider, EmailDispatch, EmailError};
pub use entity::{
    Account, Checkin, Coordinates, Court, CourtStatus, EmailIndex, OtpChallenge, UserProfile,
};
pub use error::{CourtsideError, Result};
