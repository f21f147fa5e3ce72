//! Schedule version lifecycle.
//!
//! [`ScheduleManager`] owns a storage backend and drives the two state
//! transitions of a schedule version:
//!
//! - `freeze`: stamp the work-in-progress version with a label and
//!   publication time and reopen a fresh work-in-progress copy
//! - `unfreeze`: rebuild the work-in-progress version from a frozen one,
//!   keeping submissions scheduled since
//!
//! Both run as one atomic unit of the backend. The manager also answers the
//! read-side questions built on top of versions: previous release, changes,
//! warnings and the speakers a release concerns.
//!
//! ## Example
//!
//! ```
//! use talkplan_core::hooks::NoopReleaseHooks;
//! use talkplan_core::lifecycle::ScheduleManager;
//! use talkplan_core::model::Event;
//! use talkplan_core::ops::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let wip = store.add_event(Event::new("e1", "conf")).unwrap();
//!
//! let mut manager = ScheduleManager::new(store);
//! let (frozen, next_wip) = manager.freeze(&wip.id, "v1", false, &NoopReleaseHooks).unwrap();
//! assert_eq!(frozen.label.as_deref(), Some("v1"));
//! assert!(next_wip.is_wip());
//! ```

use chrono::{DateTime, Duration, DurationRound, Utc};
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};

use crate::diff::{compute_changes, ChangeSet};
use crate::errors::{Result, ScheduleError};
use crate::hooks::ReleaseHooks;
use crate::model::{ScheduleVersion, Slot};
use crate::ops::{ScheduleStore, SpeakerDirectory};
use crate::snapshot::{load_snapshot, Snapshot};
use crate::speakers::{speakers_concerned, SpeakerChanges};
use crate::warnings::ScheduleWarnings;

/// Cached version references of one event
#[derive(Debug, Clone, Default)]
struct EventVersions {
    current: Option<Option<ScheduleVersion>>,
    wip: Option<ScheduleVersion>,
}

/// Lifecycle operations over a schedule store
#[derive(Debug)]
pub struct ScheduleManager<S> {
    store: S,
    cache: HashMap<String, EventVersions>,
}

impl<S> ScheduleManager<S>
where
    S: ScheduleStore + SpeakerDirectory,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backend; drops every cached reference
    pub fn store_mut(&mut self) -> &mut S {
        self.cache.clear();
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Release a work-in-progress version under `label`
    ///
    /// Returns the frozen version and the new work-in-progress version.
    /// When `notify` is set the concerned speakers are handed to
    /// `hooks.notify_speakers` inside the atomic unit. The export hook runs
    /// after commit if the event enables it.
    ///
    /// # Errors
    ///
    /// - `ReservedVersionLabel`, `AlreadyFrozen`, `EmptyVersionLabel`
    ///   (InvalidOperation), checked in that order
    /// - `DuplicateVersionLabel` (AlreadyExists)
    /// - storage and hook errors, after rolling back
    pub fn freeze<H: ReleaseHooks + ?Sized>(
        &mut self,
        version_id: &str,
        label: &str,
        notify: bool,
        hooks: &H,
    ) -> Result<(ScheduleVersion, ScheduleVersion)> {
        let version = self.store.get_version(version_id)?;
        version.validate_freeze(label)?;

        let event = self.store.get_event(&version.event_id)?;
        let versions = self.store.list_versions(&event.id)?;
        if versions
            .iter()
            .any(|v| v.id != version.id && v.label.as_deref() == Some(label))
        {
            return Err(ScheduleError::DuplicateVersionLabel {
                event_id: event.id.clone(),
                label: label.to_string(),
            }
            .into());
        }
        let published_at = next_publication_time(&versions, publication_clock());
        let tz = if notify {
            Some(event.settings.tz()?)
        } else {
            None
        };

        let (frozen, wip) = self.store.with_atomic_unit(|store| {
            for slot in store.load_slots(version_id)? {
                let visible = slot.should_be_visible();
                if slot.is_visible != visible {
                    store.set_slot_visibility(&slot.id, visible)?;
                }
            }

            let frozen = store.stamp_version(version_id, label, published_at)?;
            let wip = store.create_version(&frozen.event_id)?;
            let released = store.load_slots(version_id)?;
            let copied = copy_slots(store, &released, &wip.id)?;
            tracing::debug!(
                version_id = %frozen.id,
                wip_version_id = %wip.id,
                slot_count = copied,
                "froze schedule version"
            );

            if let Some(tz) = tz {
                let concerned = release_concerned(&*store, &frozen, tz)?;
                hooks.notify_speakers(&frozen, &concerned)?;
            }
            Ok((frozen, wip))
        })?;

        self.invalidate(&event.id);

        if event.settings.export_html_on_schedule_release {
            if let Err(err) = hooks.enqueue_export(&event.id) {
                tracing::warn!(
                    event_id = %event.id,
                    version_id = %frozen.id,
                    error = %err,
                    "schedule export could not be queued"
                );
            }
        }

        Ok((frozen, wip))
    }

    /// Reopen a frozen version as the work-in-progress schedule
    ///
    /// The new work-in-progress version holds every slot of the frozen
    /// version plus the slots of submissions that the current
    /// work-in-progress version has and the frozen one lacks. The old
    /// work-in-progress version is deleted. Returns the (unchanged) frozen
    /// version and the new work-in-progress version.
    ///
    /// # Errors
    ///
    /// `NotFrozen` (InvalidOperation) for a work-in-progress version;
    /// storage errors after rolling back.
    pub fn unfreeze(&mut self, version_id: &str) -> Result<(ScheduleVersion, ScheduleVersion)> {
        let version = self.store.get_version(version_id)?;
        if !version.is_frozen() {
            return Err(ScheduleError::NotFrozen {
                version_id: version.id,
            }
            .into());
        }

        let wip = self.store.with_atomic_unit(|store| {
            let frozen_slots = store.load_slots(&version.id)?;
            let frozen_submissions: HashSet<&str> = frozen_slots
                .iter()
                .map(|slot| slot.submission_id.as_str())
                .collect();

            let mut added = Vec::new();
            if let Some(old_wip) = store.find_wip_version(&version.event_id)? {
                added = store
                    .load_slots(&old_wip.id)?
                    .into_iter()
                    .filter(|slot| !frozen_submissions.contains(slot.submission_id.as_str()))
                    .collect();
                store.delete_version(&old_wip.id)?;
            }

            let wip = store.create_version(&version.event_id)?;
            let copied = copy_slots(store, &frozen_slots, &wip.id)?;
            let preserved = copy_slots(store, &added, &wip.id)?;
            tracing::debug!(
                version_id = %version.id,
                wip_version_id = %wip.id,
                slot_count = copied,
                preserved_count = preserved,
                "unfroze schedule version"
            );
            Ok(wip)
        })?;

        self.invalidate(&version.event_id);
        Ok((version, wip))
    }

    /// Changes between two versions; `None` for `previous_version_id`
    /// yields a `Create` change set
    ///
    /// # Errors
    ///
    /// Storage errors, `InvalidTimeZone`, and diff `InternalInconsistency`.
    pub fn compute_changes(
        &self,
        previous_version_id: Option<&str>,
        current_version_id: &str,
    ) -> Result<ChangeSet> {
        let current = self.store.get_version(current_version_id)?;
        let tz = self.store.get_event(&current.event_id)?.settings.tz()?;
        let (changes, _) = diff_versions(&self.store, previous_version_id, &current.id, tz)?;
        Ok(changes)
    }

    /// Changes of a version against its previous release
    ///
    /// # Errors
    ///
    /// See [`ScheduleManager::compute_changes`].
    pub fn changes(&self, version_id: &str) -> Result<ChangeSet> {
        let version = self.store.get_version(version_id)?;
        let previous = previous_version(&self.store, &version)?;
        self.compute_changes(previous.as_ref().map(|v| v.id.as_str()), &version.id)
    }

    /// Most recent release before `version_id`
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub fn previous_version(&self, version_id: &str) -> Result<Option<ScheduleVersion>> {
        let version = self.store.get_version(version_id)?;
        previous_version(&self.store, &version)
    }

    /// Organizer warnings over every slot of a version
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub fn warnings(&self, version_id: &str) -> Result<ScheduleWarnings> {
        let version = self.store.get_version(version_id)?;
        let event = self.store.get_event(&version.event_id)?;
        let slots = self.store.load_slots(&version.id)?;
        Ok(ScheduleWarnings::collect(&slots, &event.settings))
    }

    /// Speakers affected by a version's changes
    ///
    /// # Errors
    ///
    /// Storage errors, `InvalidTimeZone`, and diff `InternalInconsistency`.
    pub fn speakers_concerned(&self, version_id: &str) -> Result<Vec<SpeakerChanges>> {
        let version = self.store.get_version(version_id)?;
        let tz = self.store.get_event(&version.event_id)?.settings.tz()?;
        release_concerned(&self.store, &version, tz)
    }

    /// Latest frozen version of an event
    ///
    /// # Errors
    ///
    /// `EventNotFound` and other storage errors.
    pub fn current_version(&mut self, event_id: &str) -> Result<Option<ScheduleVersion>> {
        if let Some(current) = self.cache.get(event_id).and_then(|c| c.current.clone()) {
            return Ok(current);
        }
        let current = self
            .store
            .list_versions(event_id)?
            .into_iter()
            .filter(ScheduleVersion::is_frozen)
            .max_by(|a, b| (a.published_at, &a.id).cmp(&(b.published_at, &b.id)));
        self.cache.entry(event_id.to_string()).or_default().current = Some(current.clone());
        Ok(current)
    }

    /// The event's work-in-progress version
    ///
    /// # Errors
    ///
    /// `NoWorkInProgress` (NotFound) when the event has none.
    pub fn wip_version(&mut self, event_id: &str) -> Result<ScheduleVersion> {
        if let Some(wip) = self.cache.get(event_id).and_then(|c| c.wip.clone()) {
            return Ok(wip);
        }
        let wip = self
            .store
            .find_wip_version(event_id)?
            .ok_or_else(|| ScheduleError::NoWorkInProgress {
                event_id: event_id.to_string(),
            })?;
        self.cache.entry(event_id.to_string()).or_default().wip = Some(wip.clone());
        Ok(wip)
    }

    /// Frozen and superseded by a later release
    ///
    /// # Errors
    ///
    /// Storage errors.
    pub fn is_archived(&mut self, version_id: &str) -> Result<bool> {
        let version = self.store.get_version(version_id)?;
        if !version.is_frozen() {
            return Ok(false);
        }
        let current = self.current_version(&version.event_id)?;
        Ok(current.map_or(true, |c| c.id != version.id))
    }

    fn invalidate(&mut self, event_id: &str) {
        self.cache.remove(event_id);
    }
}

/// Publication times are kept at millisecond precision
fn publication_clock() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now)
}

/// Earliest publication time after `now` that keeps releases strictly ordered
fn next_publication_time(versions: &[ScheduleVersion], now: DateTime<Utc>) -> DateTime<Utc> {
    match versions.iter().filter_map(|v| v.published_at).max() {
        Some(latest) if latest >= now => latest + Duration::milliseconds(1),
        _ => now,
    }
}

fn copy_slots<S: ScheduleStore>(store: &mut S, slots: &[Slot], target_version_id: &str) -> Result<usize> {
    for slot in slots {
        store.copy_slot(slot, target_version_id)?;
    }
    Ok(slots.len())
}

fn previous_version<S: ScheduleStore + ?Sized>(
    store: &S,
    version: &ScheduleVersion,
) -> Result<Option<ScheduleVersion>> {
    Ok(store
        .list_versions(&version.event_id)?
        .into_iter()
        .filter(|v| v.is_frozen() && v.id != version.id)
        .filter(|v| match (version.published_at, v.published_at) {
            (Some(own), Some(other)) => other < own,
            (None, _) => true,
            (Some(_), None) => false,
        })
        .max_by(|a, b| (a.published_at, &a.id).cmp(&(b.published_at, &b.id))))
}

fn diff_versions<S: ScheduleStore + ?Sized>(
    store: &S,
    previous_version_id: Option<&str>,
    current_version_id: &str,
    tz: Tz,
) -> Result<(ChangeSet, Snapshot)> {
    let current = load_snapshot(store, current_version_id)?;
    let previous = previous_version_id
        .map(|id| load_snapshot(store, id))
        .transpose()?;
    let changes = compute_changes(previous.as_ref(), &current, tz)?;
    Ok((changes, current))
}

fn release_concerned<S: ScheduleStore + SpeakerDirectory + ?Sized>(
    store: &S,
    version: &ScheduleVersion,
    tz: Tz,
) -> Result<Vec<SpeakerChanges>> {
    let previous = previous_version(store, version)?;
    let (changes, snapshot) =
        diff_versions(store, previous.as_ref().map(|v| v.id.as_str()), &version.id, tz)?;
    speakers_concerned(&changes, &snapshot, store)
}
