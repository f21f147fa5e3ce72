//! SQLite-backed schedule store
//!
//! Implements the core storage traits over a borrowed connection. Atomic
//! units are SQLite savepoints, so they nest and also work inside an outer
//! transaction.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use talkplan_core::errors::{ExError, ExErrorKind, ScheduleError};
use talkplan_core::model::{Event, Room, ScheduleVersion, Slot, Speaker, SubmissionState};
use talkplan_core::ops::{ScheduleStore, SpeakerDirectory, SubmissionRecord};
use talkplan_core_types::Sensitive;
use uuid::Uuid;

use crate::errors::{from_rusqlite, Result};
use crate::repo::hydration::{to_millis, SlotRow, VersionRow, SLOT_SELECT, VERSION_SELECT};
use crate::settings::load_event_settings;

const SAVEPOINT: &str = "talkplan_unit";

/// Schedule store over a SQLite connection
pub struct SqliteScheduleStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteScheduleStore<'c> {
    /// Wrap a migrated connection
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    // ===== Seeding =====

    /// Insert an event and open its first work-in-progress version
    ///
    /// # Errors
    ///
    /// `Persistence` on database failure (including a taken id or slug).
    pub fn insert_event(&mut self, event: &Event) -> Result<ScheduleVersion> {
        let settings_json = serde_json::to_string(&event.settings).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("insert_event")
                .with_message(e.to_string())
        })?;
        self.conn
            .execute(
                "INSERT INTO events (id, slug, settings_json, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![event.id, event.slug, settings_json, to_millis(Utc::now())],
            )
            .map_err(from_rusqlite)?;
        self.create_version(&event.id)
    }

    /// # Errors
    ///
    /// `Persistence` on database failure.
    pub fn insert_room(&mut self, event_id: &str, room: &Room, position: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO rooms (id, event_id, name, speaker_info, position) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![room.id, event_id, room.name, room.speaker_info, position],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    /// # Errors
    ///
    /// `Persistence` on database failure.
    pub fn insert_speaker(&mut self, speaker: &Speaker) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO speakers (id, name, email, locale) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    speaker.id,
                    speaker.name,
                    speaker.email.expose(),
                    speaker.locale
                ],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Insert a submission together with its speaker links
    ///
    /// # Errors
    ///
    /// `Persistence` on database failure (including unknown speakers).
    pub fn insert_submission(&mut self, submission: &SubmissionRecord) -> Result<()> {
        self.with_atomic_unit(|store| {
            store
                .conn
                .execute(
                    "INSERT INTO submissions (id, event_id, title, state, track_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        submission.id,
                        submission.event_id,
                        submission.title,
                        submission.state.as_str(),
                        submission.track_id
                    ],
                )
                .map_err(from_rusqlite)?;
            for speaker_id in &submission.speaker_ids {
                store
                    .conn
                    .execute(
                        "INSERT INTO submission_speakers (submission_id, speaker_id) VALUES (?1, ?2)",
                        rusqlite::params![submission.id, speaker_id],
                    )
                    .map_err(from_rusqlite)?;
            }
            Ok(())
        })
    }

    /// # Errors
    ///
    /// `NotFound` when the submission does not exist.
    pub fn set_submission_state(&mut self, submission_id: &str, state: SubmissionState) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE submissions SET state = ?1 WHERE id = ?2",
                rusqlite::params![state.as_str(), submission_id],
            )
            .map_err(from_rusqlite)?;
        if updated == 0 {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("set_submission_state")
                .with_submission_id(submission_id)
                .with_message("submission not found"));
        }
        Ok(())
    }

    /// Place a submission in a version, returning the new slot id
    ///
    /// The slot starts hidden; visibility is recomputed on freeze.
    ///
    /// # Errors
    ///
    /// `VersionNotFound` when the version does not exist.
    pub fn place_slot(
        &mut self,
        version_id: &str,
        submission_id: &str,
        room_id: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<String> {
        self.get_version(version_id)?;
        let id = Uuid::now_v7().to_string();
        self.conn
            .execute(
                "INSERT INTO talk_slots (id, schedule_id, submission_id, room_id, start_at, end_at, is_visible, warnings_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, '[]', ?7)",
                rusqlite::params![
                    id,
                    version_id,
                    submission_id,
                    room_id,
                    start.map(to_millis),
                    end.map(to_millis),
                    to_millis(Utc::now())
                ],
            )
            .map_err(from_rusqlite)?;
        Ok(id)
    }

    /// Change where and when a slot is placed
    ///
    /// # Errors
    ///
    /// `SlotNotFound` when the slot does not exist.
    pub fn move_slot(
        &mut self,
        slot_id: &str,
        room_id: Option<&str>,
        start: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE talk_slots SET room_id = ?1, start_at = ?2 WHERE id = ?3",
                rusqlite::params![room_id, start.map(to_millis), slot_id],
            )
            .map_err(from_rusqlite)?;
        expect_slot(updated, slot_id)
    }

    /// # Errors
    ///
    /// `SlotNotFound` when the slot does not exist.
    pub fn set_slot_warnings(&mut self, slot_id: &str, warnings: &[String]) -> Result<()> {
        let json = serde_json::to_string(warnings).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("set_slot_warnings")
                .with_message(e.to_string())
        })?;
        let updated = self
            .conn
            .execute(
                "UPDATE talk_slots SET warnings_json = ?1 WHERE id = ?2",
                rusqlite::params![json, slot_id],
            )
            .map_err(from_rusqlite)?;
        expect_slot(updated, slot_id)
    }

    fn label_taken(&self, event_id: &str, label: &str, except_version_id: &str) -> Result<bool> {
        let taken: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM schedules WHERE event_id = ?1 AND version = ?2 AND id != ?3",
                rusqlite::params![event_id, label, except_version_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        Ok(taken.is_some())
    }
}

fn expect_slot(updated: usize, slot_id: &str) -> Result<()> {
    if updated == 0 {
        return Err(ScheduleError::SlotNotFound {
            slot_id: slot_id.to_string(),
        }
        .into());
    }
    Ok(())
}

impl ScheduleStore for SqliteScheduleStore<'_> {
    fn get_event(&self, event_id: &str) -> Result<Event> {
        let slug: Option<String> = self
            .conn
            .query_row("SELECT slug FROM events WHERE id = ?1", [event_id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(from_rusqlite)?;
        let slug = slug.ok_or_else(|| {
            ExError::from(ScheduleError::EventNotFound {
                event_id: event_id.to_string(),
            })
        })?;
        let settings = load_event_settings(self.conn, event_id)?.unwrap_or_default();
        Ok(Event::new(event_id, slug).with_settings(settings))
    }

    fn get_version(&self, version_id: &str) -> Result<ScheduleVersion> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", VERSION_SELECT),
                [version_id],
                VersionRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        match row {
            Some(row) => row.into_version(),
            None => Err(ScheduleError::VersionNotFound {
                version_id: version_id.to_string(),
            }
            .into()),
        }
    }

    fn list_versions(&self, event_id: &str) -> Result<Vec<ScheduleVersion>> {
        self.get_event(event_id)?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{} WHERE event_id = ?1 ORDER BY version IS NULL, published_at, id",
                VERSION_SELECT
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([event_id], VersionRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(VersionRow::into_version).collect()
    }

    fn load_slots(&self, version_id: &str) -> Result<Vec<Slot>> {
        self.get_version(version_id)?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{} WHERE ts.schedule_id = ?1 ORDER BY ts.rowid",
                SLOT_SELECT
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([version_id], SlotRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(SlotRow::into_slot).collect()
    }

    fn create_version(&mut self, event_id: &str) -> Result<ScheduleVersion> {
        if self.find_wip_version(event_id)?.is_some() {
            return Err(ScheduleError::WorkInProgressExists {
                event_id: event_id.to_string(),
            }
            .into());
        }
        let version = ScheduleVersion::new_wip(Uuid::now_v7().to_string(), event_id);
        self.conn
            .execute(
                "INSERT INTO schedules (id, event_id, version, published_at, created_at) VALUES (?1, ?2, NULL, NULL, ?3)",
                rusqlite::params![version.id, event_id, to_millis(Utc::now())],
            )
            .map_err(from_rusqlite)?;
        tracing::debug!(event_id = %event_id, version_id = %version.id, "created wip version");
        Ok(version)
    }

    fn stamp_version(
        &mut self,
        version_id: &str,
        label: &str,
        published_at: DateTime<Utc>,
    ) -> Result<ScheduleVersion> {
        let version = self.get_version(version_id)?;
        if self.label_taken(&version.event_id, label, version_id)? {
            return Err(ScheduleError::DuplicateVersionLabel {
                event_id: version.event_id,
                label: label.to_string(),
            }
            .into());
        }
        self.conn
            .execute(
                "UPDATE schedules SET version = ?1, published_at = ?2 WHERE id = ?3",
                rusqlite::params![label, to_millis(published_at), version_id],
            )
            .map_err(from_rusqlite)?;
        self.get_version(version_id)
    }

    fn set_slot_visibility(&mut self, slot_id: &str, is_visible: bool) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE talk_slots SET is_visible = ?1 WHERE id = ?2",
                rusqlite::params![is_visible, slot_id],
            )
            .map_err(from_rusqlite)?;
        expect_slot(updated, slot_id)
    }

    fn copy_slot(&mut self, slot: &Slot, target_version_id: &str) -> Result<String> {
        self.get_version(target_version_id)?;
        let warnings_json = serde_json::to_string(&slot.warnings).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("copy_slot")
                .with_message(e.to_string())
        })?;
        let id = Uuid::now_v7().to_string();
        self.conn
            .execute(
                "INSERT INTO talk_slots (id, schedule_id, submission_id, room_id, start_at, end_at, is_visible, warnings_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    id,
                    target_version_id,
                    slot.submission_id,
                    slot.room_id(),
                    slot.start.map(to_millis),
                    slot.end.map(to_millis),
                    slot.is_visible,
                    warnings_json,
                    to_millis(Utc::now())
                ],
            )
            .map_err(from_rusqlite)?;
        Ok(id)
    }

    fn delete_version(&mut self, version_id: &str) -> Result<()> {
        self.get_version(version_id)?;
        self.conn
            .execute("DELETE FROM talk_slots WHERE schedule_id = ?1", [version_id])
            .map_err(from_rusqlite)?;
        self.conn
            .execute("DELETE FROM schedules WHERE id = ?1", [version_id])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn with_atomic_unit<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {}", SAVEPOINT))
            .map_err(from_rusqlite)?;

        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {}", SAVEPOINT))
                    .map_err(from_rusqlite)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {sp}; RELEASE {sp}",
                    sp = SAVEPOINT
                )) {
                    tracing::error!(error = %rollback, "savepoint rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl SpeakerDirectory for SqliteScheduleStore<'_> {
    fn speakers_for(&self, submission_id: &str) -> Result<Vec<Speaker>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT sp.id, sp.name, sp.email, sp.locale
                 FROM submission_speakers ss
                 JOIN speakers sp ON sp.id = ss.speaker_id
                 WHERE ss.submission_id = ?1
                 ORDER BY sp.id",
            )
            .map_err(from_rusqlite)?;
        let speakers = stmt
            .query_map([submission_id], |row| {
                Ok(Speaker {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: Sensitive::new(row.get::<_, String>(2)?),
                    locale: row.get(3)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(speakers)
    }
}
