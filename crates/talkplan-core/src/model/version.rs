use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;

/// Labels used as URL aliases for the WIP and the current release
pub const RESERVED_VERSION_LABELS: [&str; 2] = ["wip", "latest"];

/// A schedule version of one event
///
/// `label == None` marks the event's single work-in-progress version.
/// Once labelled, a version is frozen and never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVersion {
    pub id: String,
    pub event_id: String,
    pub label: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ScheduleVersion {
    /// A fresh work-in-progress version
    pub fn new_wip(id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            label: None,
            published_at: None,
        }
    }

    pub fn is_wip(&self) -> bool {
        self.label.is_none()
    }

    pub fn is_frozen(&self) -> bool {
        self.label.is_some()
    }

    /// Check that this version may be frozen under `label`
    ///
    /// Rejections are checked in order: reserved label, already frozen,
    /// empty label.
    ///
    /// # Errors
    ///
    /// `ReservedVersionLabel`, `AlreadyFrozen` or `EmptyVersionLabel`.
    pub fn validate_freeze(&self, label: &str) -> Result<(), ScheduleError> {
        if RESERVED_VERSION_LABELS.contains(&label) {
            return Err(ScheduleError::ReservedVersionLabel {
                label: label.to_string(),
            });
        }
        if let Some(existing) = &self.label {
            return Err(ScheduleError::AlreadyFrozen {
                version_id: self.id.clone(),
                label: existing.clone(),
            });
        }
        if label.is_empty() {
            return Err(ScheduleError::EmptyVersionLabel {
                version_id: self.id.clone(),
            });
        }
        Ok(())
    }
}
