//! Snapshot construction.
//!
//! A [`Snapshot`] is the view of one schedule version that the diff engine
//! compares: only slots that are visible, have a room and a start time, and
//! whose submission is not deleted. Slots are keyed by their identity triple
//! and iterate in `(submission, room, start)` order.

use std::collections::BTreeMap;

use crate::errors::{Result, ScheduleError};
use crate::model::{Slot, SlotKey};
use crate::ops::ScheduleStore;

/// Filtered, ordered, de-duplicated slots of one schedule version
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    version_id: String,
    slots: BTreeMap<SlotKey, Slot>,
}

impl Snapshot {
    /// Build a snapshot from the raw slots of a version
    ///
    /// # Errors
    ///
    /// `DuplicateSlotTriple` (InternalInconsistency) when two included slots
    /// share submission, room and start.
    pub fn from_slots(version_id: impl Into<String>, slots: Vec<Slot>) -> Result<Self> {
        let version_id = version_id.into();
        let mut keyed = BTreeMap::new();

        for slot in slots {
            if !slot.is_visible || slot.is_deleted() {
                continue;
            }
            let Some(key) = slot.key() else {
                continue;
            };
            if keyed.contains_key(&key) {
                tracing::error!(
                    version_id = %version_id,
                    submission_id = %key.submission_id,
                    room_id = %key.room_id,
                    start = %key.start,
                    "duplicate slot triple in snapshot"
                );
                return Err(ScheduleError::DuplicateSlotTriple {
                    version_id,
                    submission_id: key.submission_id,
                    room_id: key.room_id,
                    start: key.start,
                }
                .into());
            }
            keyed.insert(key, slot);
        }

        Ok(Self {
            version_id,
            slots: keyed,
        })
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn get(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(key)
    }

    /// Stored key and slot for a lookup key
    pub fn entry(&self, key: &SlotKey) -> Option<(&SlotKey, &Slot)> {
        self.slots.get_key_value(key)
    }

    /// Identity triples in sort order
    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.slots.keys()
    }

    /// Slots in identity order
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }
}

/// Load and filter the snapshot of a schedule version
///
/// # Errors
///
/// Propagates storage errors unchanged; `DuplicateSlotTriple` on an
/// integrity breach.
pub fn load_snapshot<S: ScheduleStore + ?Sized>(store: &S, version_id: &str) -> Result<Snapshot> {
    let slots = store.load_slots(version_id)?;
    let snapshot = Snapshot::from_slots(version_id, slots)?;
    tracing::debug!(
        version_id = %version_id,
        slot_count = snapshot.len(),
        "loaded schedule snapshot"
    );
    Ok(snapshot)
}
