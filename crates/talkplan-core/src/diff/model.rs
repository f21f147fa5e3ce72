//! Schedule diff output types.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::Slot;

/// Whether a change set describes a first release or an update
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// There is no earlier version to compare against
    Create,
    /// Compared against the previous release
    Update,
}

/// A submission that changed room and/or start time
///
/// Times are expressed in the event's configured time zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRecord {
    pub submission_id: String,
    pub old_start: DateTime<FixedOffset>,
    pub new_start: DateTime<FixedOffset>,
    pub old_room_name: String,
    pub new_room_name: String,
    pub new_room_speaker_info: String,
}

/// Classified difference between two schedule versions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeSet {
    pub action: ChangeAction,
    /// Always `new_talks.len() + canceled_talks.len() + moved_talks.len()`
    pub count: usize,
    pub new_talks: Vec<Slot>,
    pub canceled_talks: Vec<Slot>,
    pub moved_talks: Vec<MoveRecord>,
}

impl ChangeSet {
    /// Change set of a version with nothing to compare against
    pub fn create() -> Self {
        Self {
            action: ChangeAction::Create,
            count: 0,
            new_talks: Vec::new(),
            canceled_talks: Vec::new(),
            moved_talks: Vec::new(),
        }
    }

    /// Assemble an update change set, deriving `count`
    pub fn update(
        new_talks: Vec<Slot>,
        canceled_talks: Vec<Slot>,
        moved_talks: Vec<MoveRecord>,
    ) -> Self {
        Self {
            action: ChangeAction::Update,
            count: new_talks.len() + canceled_talks.len() + moved_talks.len(),
            new_talks,
            canceled_talks,
            moved_talks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when every change is a cancellation (nobody has a talk to attend)
    pub fn only_cancellations(&self) -> bool {
        self.count == self.canceled_talks.len()
    }
}
