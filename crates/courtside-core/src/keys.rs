//! Single-table key scheme.
//!
//! Every entity lives in one table addressed by `(pk, sk)`. Key prefixes
//! carry the entity type so a partition query or point lookup reaches any
//! entity without secondary indexes:
//!
//! | Entity | pk | sk |
//! |---|---|---|
//! | OTP challenge | `EMAIL#{email}` | `OTP` |
//! | Email index | `EMAIL#{email}` | `USER` |
//! | User profile | `USER#{user_id}` | `PROFILE` |
//! | Court record | `COURT` | `COURT#{court_id}` |
//! | Check-in entry | `COURT#{court_id}` | `CHECKIN#{created_at}#{checkin_id}` |
//!
//! The check-in sort key embeds an RFC 3339 timestamp so a prefix range
//! scan returns entries in chronological order.

/// Sort key of the OTP challenge row.
pub const OTP_SK: &str = "OTP";

/// Sort key of the email index row.
pub const EMAIL_INDEX_SK: &str = "USER";

/// Sort key of the user profile row.
pub const PROFILE_SK: &str = "PROFILE";

/// Partition key shared by all court records.
pub const COURT_PK: &str = "COURT";

/// Sort-key prefix of check-in entries within a court partition.
pub const CHECKIN_SK_PREFIX: &str = "CHECKIN#";

/// Partition key of the OTP challenge and email index rows for an email.
pub fn email_pk(email: &str) -> String {
    format!("EMAIL#{email}")
}

/// Partition key of a user profile row.
pub fn user_pk(user_id: &str) -> String {
    format!("USER#{user_id}")
}

/// Sort key of a court record.
pub fn court_sk(court_id: &str) -> String {
    format!("COURT#{court_id}")
}

/// Partition key of a court's check-in log.
pub fn checkin_pk(court_id: &str) -> String {
    format!("COURT#{court_id}")
}

/// Sort key of a check-in entry. `created_at` must be a fixed-width
/// RFC 3339 UTC timestamp so lexicographic order is chronological order.
pub fn checkin_sk(created_at: &str, checkin_id: &str) -> String {
    format!("CHECKIN#{created_at}#{checkin_id}")
}
