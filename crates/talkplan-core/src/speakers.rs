//! Per-speaker view of a change set.
//!
//! [`speakers_concerned`] groups the changes of a release by the people who
//! need to hear about them; [`compose_notifications`] turns those groups into
//! plain-text messages for the notification layer.

use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;
use talkplan_core_types::Sensitive;

use crate::diff::{ChangeAction, ChangeSet, MoveRecord};
use crate::errors::Result;
use crate::model::{Slot, Speaker};
use crate::ops::SpeakerDirectory;
use crate::snapshot::Snapshot;

/// Subject line of every release notification
pub const NOTIFICATION_SUBJECT: &str = "New schedule!";

/// What one speaker needs to know about a release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerChanges {
    pub speaker: Speaker,
    /// Talks newly on the schedule
    pub create: Vec<Slot>,
    /// Talks that changed room or time
    pub update: Vec<MoveRecord>,
}

impl SpeakerChanges {
    fn new(speaker: Speaker) -> Self {
        Self {
            speaker,
            create: Vec::new(),
            update: Vec::new(),
        }
    }
}

/// Group a change set by speaker
///
/// - `Create`: every speaker of a talk in `snapshot`, with all their talks
///   under `create`
/// - only cancellations (or no changes): nobody
/// - otherwise: new talks under `create`, moves under `update`
///
/// The result is ordered by speaker id.
///
/// # Errors
///
/// Propagates directory lookup failures.
pub fn speakers_concerned<D: SpeakerDirectory + ?Sized>(
    changes: &ChangeSet,
    snapshot: &Snapshot,
    directory: &D,
) -> Result<Vec<SpeakerChanges>> {
    let mut grouped: BTreeMap<String, SpeakerChanges> = BTreeMap::new();

    if changes.action == ChangeAction::Create {
        for slot in snapshot.slots() {
            for speaker in directory.speakers_for(&slot.submission_id)? {
                entry(&mut grouped, speaker).create.push(slot.clone());
            }
        }
        return Ok(grouped.into_values().collect());
    }

    if changes.only_cancellations() {
        return Ok(Vec::new());
    }

    for slot in &changes.new_talks {
        for speaker in directory.speakers_for(&slot.submission_id)? {
            entry(&mut grouped, speaker).create.push(slot.clone());
        }
    }
    for moved in &changes.moved_talks {
        for speaker in directory.speakers_for(&moved.submission_id)? {
            entry(&mut grouped, speaker).update.push(moved.clone());
        }
    }

    Ok(grouped.into_values().collect())
}

fn entry(grouped: &mut BTreeMap<String, SpeakerChanges>, speaker: Speaker) -> &mut SpeakerChanges {
    grouped
        .entry(speaker.id.clone())
        .or_insert_with(|| SpeakerChanges::new(speaker))
}

/// A message ready to be queued for one speaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeakerNotification {
    pub speaker_id: String,
    pub to: Sensitive<String>,
    pub locale: String,
    pub subject: String,
    pub body: String,
}

/// Render one notification per concerned speaker, times in `tz`
pub fn compose_notifications(concerned: &[SpeakerChanges], tz: Tz) -> Vec<SpeakerNotification> {
    concerned
        .iter()
        .map(|changes| SpeakerNotification {
            speaker_id: changes.speaker.id.clone(),
            to: changes.speaker.email.clone(),
            locale: changes.speaker.locale.clone(),
            subject: NOTIFICATION_SUBJECT.to_string(),
            body: render_body(changes, tz),
        })
        .collect()
}

fn render_body(changes: &SpeakerChanges, tz: Tz) -> String {
    let mut body = format!("Hi {},\n\nthe schedule has been updated.\n", changes.speaker.name);

    if !changes.create.is_empty() {
        body.push_str("\nYour talks on the schedule:\n");
        for slot in &changes.create {
            let room = slot.room.as_ref().map(|r| r.name.as_str()).unwrap_or("");
            let start = slot
                .start
                .map(|s| s.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            body.push_str(&format!("- {}: {} in {}\n", slot.submission_id, start, room));
        }
    }

    if !changes.update.is_empty() {
        body.push_str("\nYour talks that moved:\n");
        for moved in &changes.update {
            body.push_str(&format!(
                "- {}: now {} in {} (was {} in {})\n",
                moved.submission_id,
                moved.new_start.format("%Y-%m-%d %H:%M"),
                moved.new_room_name,
                moved.old_start.format("%Y-%m-%d %H:%M"),
                moved.old_room_name,
            ));
            if !moved.new_room_speaker_info.is_empty() {
                body.push_str(&format!("  {}\n", moved.new_room_speaker_info));
            }
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, Room, SubmissionState};
    use crate::ops::{MemoryStore, SubmissionRecord};
    use chrono::{TimeZone, Utc};

    fn directory() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_event(Event::new("e1", "conf")).unwrap();
        store.add_speaker(Speaker::new("sp-b", "Bea", "bea@example.org"));
        store.add_speaker(Speaker::new("sp-a", "Ann", "ann@example.org"));
        store.add_submission(
            SubmissionRecord::new("t1", "e1", "One", SubmissionState::Confirmed)
                .with_speaker("sp-b")
                .with_speaker("sp-a"),
        );
        store.add_submission(
            SubmissionRecord::new("t2", "e1", "Two", SubmissionState::Confirmed).with_speaker("sp-b"),
        );
        store
    }

    fn placed(id: &str, submission: &str) -> Slot {
        let mut slot = Slot::new(id, "v1", submission, SubmissionState::Confirmed);
        slot.room = Some(Room::new("r1", "Main Hall"));
        slot.start = Some(Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap());
        slot.is_visible = true;
        slot
    }

    #[test]
    fn test_create_groups_all_snapshot_talks_by_speaker() {
        let snapshot =
            Snapshot::from_slots("v1", vec![placed("s1", "t1"), placed("s2", "t2")]).unwrap();
        let concerned = speakers_concerned(&ChangeSet::create(), &snapshot, &directory()).unwrap();

        let ids: Vec<&str> = concerned.iter().map(|c| c.speaker.id.as_str()).collect();
        assert_eq!(ids, vec!["sp-a", "sp-b"]);
        assert_eq!(concerned[0].create.len(), 1);
        assert_eq!(concerned[1].create.len(), 2);
    }

    #[test]
    fn test_only_cancellations_concern_nobody() {
        let snapshot = Snapshot::from_slots("v2", Vec::new()).unwrap();
        let changes = ChangeSet::update(Vec::new(), vec![placed("s1", "t1")], Vec::new());
        assert!(speakers_concerned(&changes, &snapshot, &directory())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_moves_go_to_update() {
        let snapshot = Snapshot::from_slots("v2", Vec::new()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap().fixed_offset();
        let moved = MoveRecord {
            submission_id: "t2".to_string(),
            old_start: at,
            new_start: at,
            old_room_name: "Main Hall".to_string(),
            new_room_name: "Side Room".to_string(),
            new_room_speaker_info: "Second floor".to_string(),
        };
        let changes = ChangeSet::update(Vec::new(), Vec::new(), vec![moved]);

        let concerned = speakers_concerned(&changes, &snapshot, &directory()).unwrap();
        assert_eq!(concerned.len(), 1);
        assert_eq!(concerned[0].speaker.id, "sp-b");
        assert!(concerned[0].create.is_empty());
        assert_eq!(concerned[0].update.len(), 1);

        let mails = compose_notifications(&concerned, chrono_tz::UTC);
        assert_eq!(mails[0].subject, NOTIFICATION_SUBJECT);
        assert!(mails[0].body.contains("now 2026-05-01 09:00 in Side Room"));
        assert!(mails[0].body.contains("Second floor"));
        assert_eq!(mails[0].to.expose(), "bea@example.org");
    }
}
