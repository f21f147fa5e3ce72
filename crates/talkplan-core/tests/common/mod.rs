#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use talkplan_core::errors::{ExError, ExErrorKind, Result};
use talkplan_core::hooks::ReleaseHooks;
use talkplan_core::model::{Event, EventSettings, Room, ScheduleVersion, Slot, Speaker, SubmissionState};
use talkplan_core::ops::{MemoryStore, ScheduleStore, SpeakerDirectory, SubmissionRecord};
use talkplan_core::snapshot::Snapshot;
use talkplan_core::speakers::SpeakerChanges;

pub const EVENT_ID: &str = "event-1";

/// Start time on the first conference day
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

pub fn room_name(room_id: &str) -> String {
    format!("Room {}", room_id)
}

/// A visible, confirmed slot ready to be put into a snapshot
pub fn placed_slot(id: &str, submission: &str, room: &str, hour: u32) -> Slot {
    let mut slot = Slot::new(id, "v", submission, SubmissionState::Confirmed);
    slot.room = Some(Room::new(room, room_name(room)).with_speaker_info(format!("{} info", room)));
    slot.start = Some(at(hour));
    slot.end = Some(at(hour + 1));
    slot.is_visible = true;
    slot
}

pub fn snapshot_of(version_id: &str, slots: Vec<Slot>) -> Snapshot {
    Snapshot::from_slots(version_id, slots).unwrap()
}

/// Event with three rooms, three speakers and four confirmed talks
///
/// Returns the store and the id of the initial work-in-progress version.
pub fn conference(settings: EventSettings) -> (MemoryStore, ScheduleVersion) {
    let mut store = MemoryStore::new();
    let wip = store
        .add_event(Event::new(EVENT_ID, "conf-2026").with_settings(settings))
        .unwrap();

    for room in ["r1", "r2", "r3"] {
        store.add_room(Room::new(room, room_name(room)));
    }
    store.add_speaker(Speaker::new("sp-ada", "Ada", "ada@example.org").with_locale("de"));
    store.add_speaker(Speaker::new("sp-bob", "Bob", "bob@example.org"));
    store.add_speaker(Speaker::new("sp-cy", "Cy", "cy@example.org"));

    store.add_submission(
        SubmissionRecord::new("t1", EVENT_ID, "Ownership", SubmissionState::Confirmed)
            .with_track("systems")
            .with_speaker("sp-ada"),
    );
    store.add_submission(
        SubmissionRecord::new("t2", EVENT_ID, "Lifetimes", SubmissionState::Confirmed)
            .with_track("systems")
            .with_speaker("sp-bob")
            .with_speaker("sp-ada"),
    );
    store.add_submission(
        SubmissionRecord::new("t3", EVENT_ID, "Async", SubmissionState::Confirmed)
            .with_track("web")
            .with_speaker("sp-cy"),
    );
    store.add_submission(
        SubmissionRecord::new("t4", EVENT_ID, "Macros", SubmissionState::Confirmed)
            .with_speaker("sp-cy"),
    );

    (store, wip)
}

pub fn berlin_settings() -> EventSettings {
    EventSettings {
        timezone: "Europe/Berlin".to_string(),
        ..EventSettings::default()
    }
}

/// Release hooks that record calls and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub fail_notify: bool,
    pub fail_export: bool,
    pub notified: RefCell<Vec<(String, Vec<SpeakerChanges>)>>,
    pub exports: RefCell<Vec<String>>,
}

impl RecordingHooks {
    pub fn failing_notify() -> Self {
        Self {
            fail_notify: true,
            ..Self::default()
        }
    }

    pub fn failing_export() -> Self {
        Self {
            fail_export: true,
            ..Self::default()
        }
    }
}

impl ReleaseHooks for RecordingHooks {
    fn notify_speakers(&self, version: &ScheduleVersion, concerned: &[SpeakerChanges]) -> Result<()> {
        if self.fail_notify {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("notify_speakers")
                .with_message("mail queue unavailable"));
        }
        self.notified
            .borrow_mut()
            .push((version.id.clone(), concerned.to_vec()));
        Ok(())
    }

    fn enqueue_export(&self, event_id: &str) -> Result<()> {
        if self.fail_export {
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op("enqueue_export")
                .with_message("task queue unavailable"));
        }
        self.exports.borrow_mut().push(event_id.to_string());
        Ok(())
    }
}

/// In-memory store whose slot copies fail once `fail_copy` is set
#[derive(Debug, Default)]
pub struct FailingCopyStore {
    pub inner: MemoryStore,
    pub fail_copy: bool,
}

impl FailingCopyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_copy: false,
        }
    }
}

impl ScheduleStore for FailingCopyStore {
    fn get_event(&self, event_id: &str) -> Result<Event> {
        self.inner.get_event(event_id)
    }

    fn get_version(&self, version_id: &str) -> Result<ScheduleVersion> {
        self.inner.get_version(version_id)
    }

    fn list_versions(&self, event_id: &str) -> Result<Vec<ScheduleVersion>> {
        self.inner.list_versions(event_id)
    }

    fn load_slots(&self, version_id: &str) -> Result<Vec<Slot>> {
        self.inner.load_slots(version_id)
    }

    fn create_version(&mut self, event_id: &str) -> Result<ScheduleVersion> {
        self.inner.create_version(event_id)
    }

    fn stamp_version(
        &mut self,
        version_id: &str,
        label: &str,
        published_at: DateTime<Utc>,
    ) -> Result<ScheduleVersion> {
        self.inner.stamp_version(version_id, label, published_at)
    }

    fn set_slot_visibility(&mut self, slot_id: &str, is_visible: bool) -> Result<()> {
        self.inner.set_slot_visibility(slot_id, is_visible)
    }

    fn copy_slot(&mut self, slot: &Slot, target_version_id: &str) -> Result<String> {
        if self.fail_copy {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("copy_slot")
                .with_message("disk full"));
        }
        self.inner.copy_slot(slot, target_version_id)
    }

    fn delete_version(&mut self, version_id: &str) -> Result<()> {
        self.inner.delete_version(version_id)
    }

    fn with_atomic_unit<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let backup = self.inner.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.inner = backup;
                Err(err)
            }
        }
    }
}

impl SpeakerDirectory for FailingCopyStore {
    fn speakers_for(&self, submission_id: &str) -> Result<Vec<Speaker>> {
        self.inner.speakers_for(submission_id)
    }
}
