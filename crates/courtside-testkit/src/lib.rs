//! # Courtside Testkit
//!
//! Stateful test doubles shared by the engine crates: an in-memory
//! [`courtside_store::Table`] with real conditional-write and transaction
//! semantics, a recording mailer, a scripted distance provider, and a
//! manually advanced clock.
//!
//! These live here, not in the production crates, so engine tests share
//! one set of fakes and production builds never carry them.

#![forbid(unsafe_code)]

pub mod clock;
pub mod distance;
pub mod mailer;
pub mod table;

pub use clock::ManualClock;
pub use distance::ScriptedDistance;
pub use mailer::{MockMailer, SentEmail};
pub use table::MemoryTable;
