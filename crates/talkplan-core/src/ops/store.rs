//! Storage seams for schedule versions and speakers.

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::model::{Event, ScheduleVersion, Slot, Speaker};

/// Persistence operations the schedule lifecycle needs
///
/// Implementations enforce at most one work-in-progress version per event
/// and unique labels per event. Every failure is reported as an
/// [`ExError`](crate::errors::ExError) whose kind is stable across backends.
pub trait ScheduleStore {
    /// # Errors
    ///
    /// `EventNotFound` when the event does not exist.
    fn get_event(&self, event_id: &str) -> Result<Event>;

    /// # Errors
    ///
    /// `VersionNotFound` when the version does not exist.
    fn get_version(&self, version_id: &str) -> Result<ScheduleVersion>;

    /// All versions of an event: frozen ones in publication order, the
    /// work-in-progress version last
    ///
    /// # Errors
    ///
    /// `EventNotFound` when the event does not exist.
    fn list_versions(&self, event_id: &str) -> Result<Vec<ScheduleVersion>>;

    /// Raw slots of a version with submission and room attributes joined in
    ///
    /// # Errors
    ///
    /// `VersionNotFound` when the version does not exist.
    fn load_slots(&self, version_id: &str) -> Result<Vec<Slot>>;

    /// Create an empty work-in-progress version
    ///
    /// # Errors
    ///
    /// `WorkInProgressExists` when the event already has one.
    fn create_version(&mut self, event_id: &str) -> Result<ScheduleVersion>;

    /// Set label and publication time, turning the version into a frozen one
    ///
    /// # Errors
    ///
    /// `DuplicateVersionLabel` when another version of the event carries the
    /// label; `VersionNotFound` when the version does not exist.
    fn stamp_version(
        &mut self,
        version_id: &str,
        label: &str,
        published_at: DateTime<Utc>,
    ) -> Result<ScheduleVersion>;

    /// # Errors
    ///
    /// `SlotNotFound` when the slot does not exist.
    fn set_slot_visibility(&mut self, slot_id: &str, is_visible: bool) -> Result<()>;

    /// Copy a slot's placement into another version, returning the new slot id
    ///
    /// # Errors
    ///
    /// `VersionNotFound` when the target version does not exist.
    fn copy_slot(&mut self, slot: &Slot, target_version_id: &str) -> Result<String>;

    /// Delete a version together with its slots
    ///
    /// # Errors
    ///
    /// `VersionNotFound` when the version does not exist.
    fn delete_version(&mut self, version_id: &str) -> Result<()>;

    /// Run `f` so that either all of its writes persist or none do
    ///
    /// # Errors
    ///
    /// Returns the error from `f` after rolling back, or a persistence error
    /// from the backend.
    fn with_atomic_unit<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;

    /// The event's work-in-progress version, if any
    ///
    /// # Errors
    ///
    /// Propagates [`ScheduleStore::list_versions`] errors.
    fn find_wip_version(&self, event_id: &str) -> Result<Option<ScheduleVersion>> {
        Ok(self
            .list_versions(event_id)?
            .into_iter()
            .find(ScheduleVersion::is_wip))
    }
}

/// Lookup of the speakers attached to a submission
pub trait SpeakerDirectory {
    /// Speakers of a submission, ordered by speaker id
    ///
    /// # Errors
    ///
    /// Backend failures only; an unknown submission has no speakers.
    fn speakers_for(&self, submission_id: &str) -> Result<Vec<Speaker>>;
}
