//! Row conversions for court and check-in entities.

use courtside_core::entity::{Checkin, Coordinates, Court, CourtStatus};
use courtside_core::error::{CourtsideError, Result};
use courtside_core::keys;
use courtside_store::Row;

pub(crate) fn parse_court(row: &Row) -> Result<Court> {
    let coordinates = match (row.get_f("lat"), row.get_f("long")) {
        (Some(lat), Some(long)) => Some(Coordinates { lat, long }),
        _ => None,
    };
    Ok(Court {
        id: require_s(row, "id")?.to_string(),
        name: require_s(row, "name")?.to_string(),
        address_line: require_s(row, "address_line")?.to_string(),
        coordinates,
        court_count: row.get_n("court_count"),
        status: parse_status(row)?,
        last_updated_at: require_s(row, "last_updated_at")?.to_string(),
        photo_url: row.get_s("photo_url").map(str::to_string),
    })
}

pub(crate) fn parse_checkin(row: &Row) -> Result<Checkin> {
    Ok(Checkin {
        checkin_id: require_s(row, "checkin_id")?.to_string(),
        court_id: require_s(row, "court_id")?.to_string(),
        user_id: require_s(row, "user_id")?.to_string(),
        user_name: row.get_s("user_name").map(str::to_string),
        status: parse_status(row)?,
        created_at: require_s(row, "created_at")?.to_string(),
        photo_url: row.get_s("photo_url").map(str::to_string),
    })
}

pub(crate) fn checkin_row(checkin: &Checkin) -> Row {
    let mut row = Row::new(
        keys::checkin_pk(&checkin.court_id),
        keys::checkin_sk(&checkin.created_at, &checkin.checkin_id),
    )
    .with_s("entity_type", "CHECKIN")
    .with_s("checkin_id", &checkin.checkin_id)
    .with_s("court_id", &checkin.court_id)
    .with_s("user_id", &checkin.user_id)
    .with_s("status", checkin.status.as_str())
    .with_s("created_at", &checkin.created_at);
    if let Some(name) = &checkin.user_name {
        row = row.with_s("user_name", name);
    }
    if let Some(url) = &checkin.photo_url {
        row = row.with_s("photo_url", url);
    }
    row
}

/// Court row builder, used by tests and external seeding adapters.
pub fn court_row(court: &Court) -> Row {
    let mut row = Row::new(keys::COURT_PK, keys::court_sk(&court.id))
        .with_s("entity_type", "COURT")
        .with_s("id", &court.id)
        .with_s("name", &court.name)
        .with_s("address_line", &court.address_line)
        .with_s("status", court.status.as_str())
        .with_s("last_updated_at", &court.last_updated_at);
    if let Some(coords) = court.coordinates {
        row = row
            .with("lat", courtside_store::AttrValue::F(coords.lat))
            .with("long", courtside_store::AttrValue::F(coords.long));
    }
    if let Some(count) = court.court_count {
        row = row.with_n("court_count", count);
    }
    if let Some(url) = &court.photo_url {
        row = row.with_s("photo_url", url);
    }
    row
}

fn parse_status(row: &Row) -> Result<CourtStatus> {
    let raw = require_s(row, "status")?;
    CourtStatus::parse(raw)
        .ok_or_else(|| CourtsideError::internal(format!("unknown court status {raw}")))
}

fn require_s<'a>(row: &'a Row, name: &str) -> Result<&'a str> {
    row.get_s(name)
        .ok_or_else(|| CourtsideError::internal(format!("corrupt row: missing {name}")))
}
