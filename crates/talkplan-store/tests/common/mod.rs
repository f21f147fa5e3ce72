#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use talkplan_core::model::{Event, EventSettings, Room, Speaker, SubmissionState};
use talkplan_core::ops::SubmissionRecord;
use talkplan_store::SqliteScheduleStore;

pub const EVENT_ID: &str = "event-1";

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

/// In-memory database with foreign keys on and migrations applied
pub fn setup_test_db() -> Connection {
    let mut conn = talkplan_store::db::open_in_memory().expect("Failed to open in-memory database");
    talkplan_store::db::configure(&conn).unwrap();
    talkplan_store::migrations::apply_migrations(&mut conn).expect("Failed to apply migrations");
    conn
}

/// Seed an event with two rooms, two speakers and three confirmed talks
///
/// Returns the id of the initial work-in-progress version.
pub fn seed_conference(conn: &Connection, settings: EventSettings) -> String {
    let mut store = SqliteScheduleStore::new(conn);
    let wip = store
        .insert_event(&Event::new(EVENT_ID, "conf-2026").with_settings(settings))
        .unwrap();

    store
        .insert_room(EVENT_ID, &Room::new("r1", "Main Hall").with_speaker_info("Ground floor"), 0)
        .unwrap();
    store
        .insert_room(EVENT_ID, &Room::new("r2", "Workshop"), 1)
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
                .with_track("systems")
                .with_speaker("sp-ada"),
        )
        .unwrap();
    store
        .insert_submission(
            &SubmissionRecord::new("t2", EVENT_ID, "Lifetimes", SubmissionState::Confirmed)
                .with_track("systems")
                .with_speaker("sp-bob")
                .with_speaker("sp-ada"),
        )
        .unwrap();
    store
        .insert_submission(&SubmissionRecord::new(
            "t3",
            EVENT_ID,
            "Async",
            SubmissionState::Confirmed,
        ))
        .unwrap();

    wip.id
}

pub fn berlin_settings() -> EventSettings {
    EventSettings {
        timezone: "Europe/Berlin".to_string(),
        ..EventSettings::default()
    }
}
