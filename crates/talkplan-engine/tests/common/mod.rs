#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use std::cell::RefCell;
use talkplan_core::errors::{ExError, ExErrorKind, Result};
use talkplan_core::hooks::ReleaseHooks;
use talkplan_core::model::{Event, EventSettings, Room, ScheduleVersion, Speaker, SubmissionState};
use talkplan_core::ops::SubmissionRecord;
use talkplan_core::speakers::SpeakerChanges;
use talkplan_store::SqliteScheduleStore;
use tempfile::TempDir;

pub const EVENT_ID: &str = "event-1";

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

/// File-backed, migrated database; keep the TempDir alive for the test
pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let conn = talkplan_store::db::open_migrated(dir.path().join("talkplan.db"))
        .expect("Failed to open database");
    (dir, conn)
}

/// Event in Berlin time with two rooms and two talks placed in the WIP
///
/// Returns the WIP version id.
pub fn seed_schedule(conn: &Connection, settings: EventSettings) -> String {
    let mut store = SqliteScheduleStore::new(conn);
    let wip = store
        .insert_event(&Event::new(EVENT_ID, "conf-2026").with_settings(settings))
        .unwrap();
    store
        .insert_room(EVENT_ID, &Room::new("r1", "Main Hall"), 0)
        .unwrap();
    store
        .insert_room(EVENT_ID, &Room::new("r2", "Workshop").with_speaker_info("Bring a laptop"), 1)
        .unwrap();
    store
        .insert_speaker(&Speaker::new("sp-ada", "Ada", "ada@example.org").with_locale("de"))
        .unwrap();
    store
        .insert_speaker(&Speaker::new("sp-bob", "Bob", "bob@example.org"))
        .unwrap();
    store
        .insert_submission(
            &SubmissionRecord::new("t1", EVENT_ID, "Ownership", SubmissionState::Confirmed)
                .with_speaker("sp-ada"),
        )
        .unwrap();
    store
        .insert_submission(
            &SubmissionRecord::new("t2", EVENT_ID, "Lifetimes", SubmissionState::Accepted)
                .with_speaker("sp-bob"),
        )
        .unwrap();
    store
        .place_slot(&wip.id, "t1", Some("r1"), Some(at(9)), Some(at(10)))
        .unwrap();
    store
        .place_slot(&wip.id, "t2", Some("r2"), Some(at(9)), Some(at(10)))
        .unwrap();
    wip.id
}

pub fn berlin_settings() -> EventSettings {
    EventSettings {
        timezone: "Europe/Berlin".to_string(),
        ..EventSettings::default()
    }
}

/// Hooks recording what the release asked for
#[derive(Default)]
pub struct RecordingHooks {
    pub fail_notify: bool,
    pub notified: RefCell<Vec<Vec<SpeakerChanges>>>,
    pub exports: RefCell<Vec<String>>,
}

impl ReleaseHooks for RecordingHooks {
    fn notify_speakers(&self, _version: &ScheduleVersion, concerned: &[SpeakerChanges]) -> Result<()> {
        if self.fail_notify {
            return Err(ExError::new(ExErrorKind::ExternalService).with_message("mail relay down"));
        }
        self.notified.borrow_mut().push(concerned.to_vec());
        Ok(())
    }

    fn enqueue_export(&self, event_id: &str) -> Result<()> {
        self.exports.borrow_mut().push(event_id.to_string());
        Ok(())
    }
}
