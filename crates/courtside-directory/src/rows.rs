//! Row conversions for directory entities.

use courtside_core::entity::{EmailIndex, UserProfile};
use courtside_core::error::{CourtsideError, Result};
use courtside_core::keys;
use courtside_store::Row;

pub(crate) fn email_index_row(email: &str, user_id: &str) -> Row {
    Row::new(keys::email_pk(email), keys::EMAIL_INDEX_SK)
        .with_s("entity_type", "USER_EMAIL")
        .with_s("user_id", user_id)
        .with_s("email", email)
}

pub(crate) fn profile_row(user_id: &str, name: &str) -> Row {
    Row::new(keys::user_pk(user_id), keys::PROFILE_SK)
        .with_s("entity_type", "USER_PROFILE")
        .with_s("user_id", user_id)
        .with_s("name", name)
        .with_n("checkin_count", 0)
}

pub(crate) fn parse_email_index(row: &Row) -> Result<EmailIndex> {
    let user_id = require_s(row, "user_id")?;
    let email = require_s(row, "email")?;
    Ok(EmailIndex {
        user_id: user_id.to_string(),
        email: email.to_string(),
    })
}

pub(crate) fn parse_profile(row: &Row) -> Result<UserProfile> {
    Ok(UserProfile {
        user_id: require_s(row, "user_id")?.to_string(),
        name: require_s(row, "name")?.to_string(),
        checkin_count: row.get_n("checkin_count").unwrap_or(0),
        billing_ref: row.get_s("billing_ref").map(str::to_string),
    })
}

fn require_s<'a>(row: &'a Row, name: &str) -> Result<&'a str> {
    row.get_s(name)
        .ok_or_else(|| CourtsideError::internal(format!("corrupt row: missing {name}")))
}
