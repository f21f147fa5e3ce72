//! Event settings persisted as JSON in `events.settings_json`.

use rusqlite::{Connection, OptionalExtension};
use talkplan_core::errors::{ExError, ExErrorKind};
use talkplan_core::model::EventSettings;

use crate::errors::{from_rusqlite, Result};

/// Load an event's settings
///
/// Returns `None` if no event with the given id exists. Keys missing from
/// the stored JSON take their defaults.
///
/// # Errors
///
/// `Persistence` on database failure; `Serialization` on malformed JSON.
pub fn load_event_settings(conn: &Connection, event_id: &str) -> Result<Option<EventSettings>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT settings_json FROM events WHERE id = ?1",
            [event_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("load_event_settings")
                .with_event_id(event_id)
                .with_message(format!("DB error: {}", e))
        })?;

    payload
        .map(|json| EventSettings::from_json(&json).map_err(|e| e.with_event_id(event_id)))
        .transpose()
}

/// Replace an event's settings
///
/// # Errors
///
/// `NotFound` when the event does not exist; `Persistence` on database
/// failure.
pub fn save_event_settings(conn: &Connection, event_id: &str, settings: &EventSettings) -> Result<()> {
    let json = serde_json::to_string(settings).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("save_event_settings")
            .with_message(e.to_string())
    })?;
    let updated = conn
        .execute(
            "UPDATE events SET settings_json = ?1 WHERE id = ?2",
            rusqlite::params![json, event_id],
        )
        .map_err(from_rusqlite)?;
    if updated == 0 {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("save_event_settings")
            .with_event_id(event_id)
            .with_message("event not found"));
    }
    Ok(())
}
