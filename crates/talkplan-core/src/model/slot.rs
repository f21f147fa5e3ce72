use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{ExError, ExErrorKind};

/// Review state of the submission a slot places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Submitted,
    Accepted,
    Confirmed,
    Rejected,
    Canceled,
    Withdrawn,
    Deleted,
}

impl SubmissionState {
    /// Stable storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Submitted => "submitted",
            SubmissionState::Accepted => "accepted",
            SubmissionState::Confirmed => "confirmed",
            SubmissionState::Rejected => "rejected",
            SubmissionState::Canceled => "canceled",
            SubmissionState::Withdrawn => "withdrawn",
            SubmissionState::Deleted => "deleted",
        }
    }
}

impl FromStr for SubmissionState {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionState::Submitted),
            "accepted" => Ok(SubmissionState::Accepted),
            "confirmed" => Ok(SubmissionState::Confirmed),
            "rejected" => Ok(SubmissionState::Rejected),
            "canceled" => Ok(SubmissionState::Canceled),
            "withdrawn" => Ok(SubmissionState::Withdrawn),
            "deleted" => Ok(SubmissionState::Deleted),
            other => Err(ExError::new(ExErrorKind::Serialization)
                .with_op("parse_submission_state")
                .with_message(format!("unknown submission state '{}'", other))),
        }
    }
}

/// A room talks can be placed in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Practical information shown to speakers (e.g. directions, AV setup)
    pub speaker_info: String,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            speaker_info: String::new(),
        }
    }

    pub fn with_speaker_info(mut self, info: impl Into<String>) -> Self {
        self.speaker_info = info.into();
        self
    }
}

/// Comparison identity of a placed slot
///
/// Field order defines the sort order (submission, room, start) that drives
/// every tie-break in the diff.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub submission_id: String,
    pub room_id: String,
    pub start: DateTime<Utc>,
}

/// One placement of a submission, scoped to one schedule version
///
/// Submission and room attributes are joined in when the slot is loaded;
/// only the placement fields belong to the slot record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub version_id: String,
    pub submission_id: String,
    pub submission_state: SubmissionState,
    pub track_id: Option<String>,
    pub room: Option<Room>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub is_visible: bool,
    /// Talk-level warnings computed by the placement layer
    pub warnings: Vec<String>,
}

impl Slot {
    /// Create an unplaced, hidden slot for a submission
    pub fn new(
        id: impl Into<String>,
        version_id: impl Into<String>,
        submission_id: impl Into<String>,
        submission_state: SubmissionState,
    ) -> Self {
        Self {
            id: id.into(),
            version_id: version_id.into(),
            submission_id: submission_id.into(),
            submission_state,
            track_id: None,
            room: None,
            start: None,
            end: None,
            is_visible: false,
            warnings: Vec::new(),
        }
    }

    /// Identity triple, or `None` while room or start is unset
    pub fn key(&self) -> Option<SlotKey> {
        match (&self.room, self.start) {
            (Some(room), Some(start)) => Some(SlotKey {
                submission_id: self.submission_id.clone(),
                room_id: room.id.clone(),
                start,
            }),
            _ => None,
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.id.as_str())
    }

    /// Visibility a slot must have once its version is released
    pub fn should_be_visible(&self) -> bool {
        self.start.is_some() && self.submission_state == SubmissionState::Confirmed
    }

    pub fn is_deleted(&self) -> bool {
        self.submission_state == SubmissionState::Deleted
    }
}
