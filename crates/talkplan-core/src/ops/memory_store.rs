use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{ExError, ExErrorKind, Result, ScheduleError};
use crate::model::{Event, Room, ScheduleVersion, Slot, Speaker, SubmissionState};
use crate::ops::store::{ScheduleStore, SpeakerDirectory};

/// Submission attributes joined into slots on load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub state: SubmissionState,
    pub track_id: Option<String>,
    pub speaker_ids: Vec<String>,
}

impl SubmissionRecord {
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        title: impl Into<String>,
        state: SubmissionState,
    ) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            title: title.into(),
            state,
            track_id: None,
            speaker_ids: Vec::new(),
        }
    }

    pub fn with_track(mut self, track_id: impl Into<String>) -> Self {
        self.track_id = Some(track_id.into());
        self
    }

    pub fn with_speaker(mut self, speaker_id: impl Into<String>) -> Self {
        self.speaker_ids.push(speaker_id.into());
        self
    }
}

/// Placement fields owned by a slot row
#[derive(Debug, Clone, PartialEq)]
struct SlotRecord {
    id: String,
    version_id: String,
    submission_id: String,
    room_id: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    is_visible: bool,
    warnings: Vec<String>,
    /// Insertion order; keeps `load_slots` deterministic
    seq: u64,
}

/// In-memory schedule store
///
/// HashMap-based and single-threaded. Atomic units snapshot the whole store
/// and restore it when the closure fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: HashMap<String, Event>,
    rooms: HashMap<String, Room>,
    submissions: HashMap<String, SubmissionRecord>,
    speakers: HashMap<String, Speaker>,
    versions: HashMap<String, ScheduleVersion>,
    slots: HashMap<String, SlotRecord>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event and open its first work-in-progress version
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the event id is taken.
    pub fn add_event(&mut self, event: Event) -> Result<ScheduleVersion> {
        if self.events.contains_key(&event.id) {
            return Err(ExError::new(ExErrorKind::AlreadyExists)
                .with_op("add_event")
                .with_event_id(event.id.clone())
                .with_message("event already exists"));
        }
        let event_id = event.id.clone();
        self.events.insert(event_id.clone(), event);
        self.create_version(&event_id)
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn add_speaker(&mut self, speaker: Speaker) {
        self.speakers.insert(speaker.id.clone(), speaker);
    }

    pub fn add_submission(&mut self, submission: SubmissionRecord) {
        self.submissions.insert(submission.id.clone(), submission);
    }

    /// Change the review state of a submission
    ///
    /// # Errors
    ///
    /// `NotFound` when the submission does not exist.
    pub fn set_submission_state(&mut self, submission_id: &str, state: SubmissionState) -> Result<()> {
        let submission = self.submissions.get_mut(submission_id).ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("set_submission_state")
                .with_submission_id(submission_id)
                .with_message("submission not found")
        })?;
        submission.state = state;
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
        self.version(version_id)?;
        let id = Uuid::now_v7().to_string();
        let seq = self.bump_seq();
        self.slots.insert(
            id.clone(),
            SlotRecord {
                id: id.clone(),
                version_id: version_id.to_string(),
                submission_id: submission_id.to_string(),
                room_id: room_id.map(str::to_string),
                start,
                end,
                is_visible: false,
                warnings: Vec::new(),
                seq,
            },
        );
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
        let record = self.slot_mut(slot_id)?;
        record.room_id = room_id.map(str::to_string);
        record.start = start;
        Ok(())
    }

    /// Replace the talk-level warnings of a slot
    ///
    /// # Errors
    ///
    /// `SlotNotFound` when the slot does not exist.
    pub fn set_slot_warnings(&mut self, slot_id: &str, warnings: Vec<String>) -> Result<()> {
        self.slot_mut(slot_id)?.warnings = warnings;
        Ok(())
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn version(&self, version_id: &str) -> Result<&ScheduleVersion> {
        self.versions.get(version_id).ok_or_else(|| {
            ScheduleError::VersionNotFound {
                version_id: version_id.to_string(),
            }
            .into()
        })
    }

    fn slot_mut(&mut self, slot_id: &str) -> Result<&mut SlotRecord> {
        self.slots.get_mut(slot_id).ok_or_else(|| {
            ScheduleError::SlotNotFound {
                slot_id: slot_id.to_string(),
            }
            .into()
        })
    }

    fn hydrate(&self, record: &SlotRecord) -> Slot {
        let submission = self.submissions.get(&record.submission_id);
        // Unknown submissions load as deleted so snapshots skip them
        let state = submission
            .map(|s| s.state)
            .unwrap_or(SubmissionState::Deleted);
        let mut slot = Slot::new(
            record.id.clone(),
            record.version_id.clone(),
            record.submission_id.clone(),
            state,
        );
        slot.track_id = submission.and_then(|s| s.track_id.clone());
        slot.room = record
            .room_id
            .as_ref()
            .and_then(|room_id| self.rooms.get(room_id).cloned());
        slot.start = record.start;
        slot.end = record.end;
        slot.is_visible = record.is_visible;
        slot.warnings = record.warnings.clone();
        slot
    }
}

impl ScheduleStore for MemoryStore {
    fn get_event(&self, event_id: &str) -> Result<Event> {
        self.events.get(event_id).cloned().ok_or_else(|| {
            ScheduleError::EventNotFound {
                event_id: event_id.to_string(),
            }
            .into()
        })
    }

    fn get_version(&self, version_id: &str) -> Result<ScheduleVersion> {
        self.version(version_id).cloned()
    }

    fn list_versions(&self, event_id: &str) -> Result<Vec<ScheduleVersion>> {
        self.get_event(event_id)?;
        let mut versions: Vec<ScheduleVersion> = self
            .versions
            .values()
            .filter(|v| v.event_id == event_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| {
            (a.is_wip(), a.published_at, &a.id).cmp(&(b.is_wip(), b.published_at, &b.id))
        });
        Ok(versions)
    }

    fn load_slots(&self, version_id: &str) -> Result<Vec<Slot>> {
        self.version(version_id)?;
        let mut records: Vec<&SlotRecord> = self
            .slots
            .values()
            .filter(|r| r.version_id == version_id)
            .collect();
        records.sort_by_key(|r| r.seq);
        Ok(records.into_iter().map(|r| self.hydrate(r)).collect())
    }

    fn create_version(&mut self, event_id: &str) -> Result<ScheduleVersion> {
        self.get_event(event_id)?;
        if self
            .versions
            .values()
            .any(|v| v.event_id == event_id && v.is_wip())
        {
            return Err(ScheduleError::WorkInProgressExists {
                event_id: event_id.to_string(),
            }
            .into());
        }
        let version = ScheduleVersion::new_wip(Uuid::now_v7().to_string(), event_id);
        self.versions.insert(version.id.clone(), version.clone());
        tracing::debug!(event_id = %event_id, version_id = %version.id, "created wip version");
        Ok(version)
    }

    fn stamp_version(
        &mut self,
        version_id: &str,
        label: &str,
        published_at: DateTime<Utc>,
    ) -> Result<ScheduleVersion> {
        let event_id = self.version(version_id)?.event_id.clone();
        if self
            .versions
            .values()
            .any(|v| v.event_id == event_id && v.id != version_id && v.label.as_deref() == Some(label))
        {
            return Err(ScheduleError::DuplicateVersionLabel {
                event_id,
                label: label.to_string(),
            }
            .into());
        }
        let version = self.versions.get_mut(version_id).ok_or_else(|| {
            ExError::from(ScheduleError::VersionNotFound {
                version_id: version_id.to_string(),
            })
        })?;
        version.label = Some(label.to_string());
        version.published_at = Some(published_at);
        Ok(version.clone())
    }

    fn set_slot_visibility(&mut self, slot_id: &str, is_visible: bool) -> Result<()> {
        self.slot_mut(slot_id)?.is_visible = is_visible;
        Ok(())
    }

    fn copy_slot(&mut self, slot: &Slot, target_version_id: &str) -> Result<String> {
        self.version(target_version_id)?;
        let id = Uuid::now_v7().to_string();
        let seq = self.bump_seq();
        self.slots.insert(
            id.clone(),
            SlotRecord {
                id: id.clone(),
                version_id: target_version_id.to_string(),
                submission_id: slot.submission_id.clone(),
                room_id: slot.room_id().map(str::to_string),
                start: slot.start,
                end: slot.end,
                is_visible: slot.is_visible,
                warnings: slot.warnings.clone(),
                seq,
            },
        );
        Ok(id)
    }

    fn delete_version(&mut self, version_id: &str) -> Result<()> {
        self.version(version_id)?;
        self.slots.retain(|_, r| r.version_id != version_id);
        self.versions.remove(version_id);
        Ok(())
    }

    fn with_atomic_unit<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let backup = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = backup;
                Err(err)
            }
        }
    }
}

impl SpeakerDirectory for MemoryStore {
    fn speakers_for(&self, submission_id: &str) -> Result<Vec<Speaker>> {
        let Some(submission) = self.submissions.get(submission_id) else {
            return Ok(Vec::new());
        };
        let mut speakers: Vec<Speaker> = submission
            .speaker_ids
            .iter()
            .filter_map(|id| self.speakers.get(id).cloned())
            .collect();
        speakers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(speakers)
    }
}
