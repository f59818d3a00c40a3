//! Input guards applied before any storage access.
//!
//! Deliberately permissive; the email check is not RFC-perfect, just enough
//! to reject garbage before it reaches the table or the mailer.

use crate::entity::Coordinates;
use crate::error::{CourtsideError, Result};

/// Maximum accepted email length (RFC 3696 ceiling).
const MAX_EMAIL_LEN: usize = 320;

/// Maximum accepted display-name length.
pub const MAX_NAME_LEN: usize = 256;

/// Lowercase, trim, and shape-check an email address.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(CourtsideError::validation("Invalid email"));
    }
    // local@domain.tld with no whitespace and exactly one '@'
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(CourtsideError::validation("Invalid email")),
    };
    let domain_ok = {
        let mut labels = domain.split('.');
        let has_dot = domain.contains('.');
        has_dot && labels.all(|l| !l.is_empty())
    };
    if local.is_empty()
        || !domain_ok
        || email.chars().any(char::is_whitespace)
    {
        return Err(CourtsideError::validation("Invalid email"));
    }
    Ok(email)
}

/// Require a code of exactly six ASCII digits.
pub fn ensure_six_digit_code(code: &str) -> Result<()> {
    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CourtsideError::validation("Invalid code"))
    }
}

/// Require finite coordinates within valid degree ranges.
pub fn ensure_coordinate_range(coords: Coordinates) -> Result<()> {
    let lat_ok = coords.lat.is_finite() && (-90.0..=90.0).contains(&coords.lat);
    let long_ok = coords.long.is_finite() && (-180.0..=180.0).contains(&coords.long);
    if lat_ok && long_ok {
        Ok(())
    } else {
        Err(CourtsideError::validation("lat/long out of range"))
    }
}

/// Accept a requested display name, or `None` when it is empty or too long
/// (the caller then falls back to a derived name).
pub fn usable_display_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        None
    } else {
        Some(name)
    }
}

/// Derive a display name from an email's local part. Documented fallback
/// persisted at account creation when no usable name was supplied.
pub fn derived_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
