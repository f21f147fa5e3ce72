//! Organizer-facing problems in a schedule version.

use serde::Serialize;

use crate::model::{EventSettings, Slot, SubmissionState};

/// Slots of one version grouped by the problem they show
///
/// A slot can appear in several groups, except that `talk_warnings` only
/// lists scheduled slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleWarnings {
    /// No start time yet
    pub unscheduled: Vec<Slot>,
    /// Scheduled, with warnings from the placement layer
    pub talk_warnings: Vec<Slot>,
    /// Submission not confirmed by its speakers
    pub unconfirmed: Vec<Slot>,
    /// Tracks are in use but the submission has none
    pub no_track: Vec<Slot>,
}

impl ScheduleWarnings {
    /// Scan every slot of a version, hidden and unplaced ones included
    pub fn collect(slots: &[Slot], settings: &EventSettings) -> Self {
        let mut warnings = Self::default();
        for slot in slots {
            if slot.start.is_none() {
                warnings.unscheduled.push(slot.clone());
            } else if !slot.warnings.is_empty() {
                warnings.talk_warnings.push(slot.clone());
            }
            if slot.submission_state != SubmissionState::Confirmed {
                warnings.unconfirmed.push(slot.clone());
            }
            if settings.use_tracks && slot.track_id.is_none() {
                warnings.no_track.push(slot.clone());
            }
        }
        warnings
    }

    pub fn is_empty(&self) -> bool {
        self.unscheduled.is_empty()
            && self.talk_warnings.is_empty()
            && self.unconfirmed.is_empty()
            && self.no_track.is_empty()
    }
}
