//! Row decoding for schedule tables
//!
//! Timestamps are stored as Unix milliseconds.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use std::str::FromStr;
use talkplan_core::model::{Room, ScheduleVersion, Slot, SubmissionState};

use crate::errors::{corrupt_column, Result};

/// Columns selected by [`SLOT_SELECT`], in order
pub const SLOT_SELECT: &str = "SELECT ts.id, ts.schedule_id, ts.submission_id, s.state, s.track_id,
        r.id, r.name, r.speaker_info, ts.start_at, ts.end_at, ts.is_visible, ts.warnings_json
     FROM talk_slots ts
     LEFT JOIN submissions s ON s.id = ts.submission_id
     LEFT JOIN rooms r ON r.id = ts.room_id";

pub const VERSION_SELECT: &str = "SELECT id, event_id, version, published_at FROM schedules";

/// Raw slot row before decoding
pub struct SlotRow {
    id: String,
    version_id: String,
    submission_id: String,
    state: Option<String>,
    track_id: Option<String>,
    room_id: Option<String>,
    room_name: Option<String>,
    room_speaker_info: Option<String>,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
    is_visible: i64,
    warnings_json: String,
}

impl SlotRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            version_id: row.get(1)?,
            submission_id: row.get(2)?,
            state: row.get(3)?,
            track_id: row.get(4)?,
            room_id: row.get(5)?,
            room_name: row.get(6)?,
            room_speaker_info: row.get(7)?,
            start_ms: row.get(8)?,
            end_ms: row.get(9)?,
            is_visible: row.get(10)?,
            warnings_json: row.get(11)?,
        })
    }

    /// Decode into a domain slot
    ///
    /// # Errors
    ///
    /// `Serialization` for an unknown state, an out-of-range timestamp or
    /// malformed warnings JSON.
    pub fn into_slot(self) -> Result<Slot> {
        // A slot whose submission row is gone is treated as deleted
        let state = match self.state.as_deref() {
            Some(state) => SubmissionState::from_str(state)?,
            None => SubmissionState::Deleted,
        };
        let mut slot = Slot::new(self.id, self.version_id, self.submission_id, state);
        slot.track_id = self.track_id;
        slot.room = match (self.room_id, self.room_name) {
            (Some(id), Some(name)) => {
                Some(Room::new(id, name).with_speaker_info(self.room_speaker_info.unwrap_or_default()))
            }
            _ => None,
        };
        slot.start = self.start_ms.map(|ms| from_millis("start_at", ms)).transpose()?;
        slot.end = self.end_ms.map(|ms| from_millis("end_at", ms)).transpose()?;
        slot.is_visible = self.is_visible != 0;
        slot.warnings = serde_json::from_str(&self.warnings_json)
            .map_err(|e| corrupt_column("warnings_json", e))?;
        Ok(slot)
    }
}

/// Raw schedule row before decoding
pub struct VersionRow {
    id: String,
    event_id: String,
    label: Option<String>,
    published_ms: Option<i64>,
}

impl VersionRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            event_id: row.get(1)?,
            label: row.get(2)?,
            published_ms: row.get(3)?,
        })
    }

    /// # Errors
    ///
    /// `Serialization` for an out-of-range publication timestamp.
    pub fn into_version(self) -> Result<ScheduleVersion> {
        let mut version = ScheduleVersion::new_wip(self.id, self.event_id);
        version.label = self.label;
        version.published_at = self
            .published_ms
            .map(|ms| from_millis("published_at", ms))
            .transpose()?;
        Ok(version)
    }
}

pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(column: &str, ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| corrupt_column(column, ms))
}
