//! Freeze/unfreeze lifecycle over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{at, berlin_settings, conference, FailingCopyStore, RecordingHooks, EVENT_ID};
use talkplan_core::diff::ChangeAction;
use talkplan_core::errors::{ExErrorKind, ScheduleError};
use talkplan_core::hooks::NoopReleaseHooks;
use talkplan_core::lifecycle::ScheduleManager;
use talkplan_core::model::{EventSettings, SubmissionState};
use talkplan_core::ops::{MemoryStore, ScheduleStore};

fn manager_with_wip() -> (ScheduleManager<MemoryStore>, String) {
    let (mut store, wip) = conference(berlin_settings());
    store
        .place_slot(&wip.id, "t1", Some("r1"), Some(at(9)), Some(at(10)))
        .unwrap();
    store
        .place_slot(&wip.id, "t2", Some("r2"), Some(at(9)), Some(at(10)))
        .unwrap();
    (ScheduleManager::new(store), wip.id)
}

// ---------------------------------------------------------------------------
// freeze
// ---------------------------------------------------------------------------

#[test]
fn test_freeze_rejects_reserved_labels() {
    let (mut manager, wip_id) = manager_with_wip();
    for label in ["wip", "latest"] {
        let err = manager
            .freeze(&wip_id, label, false, &NoopReleaseHooks)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidOperation);
        assert!(matches!(
            err.cause(),
            Some(ScheduleError::ReservedVersionLabel { .. })
        ));
    }
    assert!(manager.store().get_version(&wip_id).unwrap().is_wip());
}

#[test]
fn test_freeze_rejects_empty_label() {
    let (mut manager, wip_id) = manager_with_wip();
    let err = manager
        .freeze(&wip_id, "", false, &NoopReleaseHooks)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidOperation);
    assert!(matches!(
        err.cause(),
        Some(ScheduleError::EmptyVersionLabel { .. })
    ));
}

#[test]
fn test_freeze_rejects_frozen_version_after_reserved_check() {
    let (mut manager, wip_id) = manager_with_wip();
    manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();

    let err = manager
        .freeze(&wip_id, "v2", false, &NoopReleaseHooks)
        .unwrap_err();
    assert!(matches!(err.cause(), Some(ScheduleError::AlreadyFrozen { .. })));

    let err = manager
        .freeze(&wip_id, "latest", false, &NoopReleaseHooks)
        .unwrap_err();
    assert!(matches!(
        err.cause(),
        Some(ScheduleError::ReservedVersionLabel { .. })
    ));
}

#[test]
fn test_freeze_rejects_duplicate_label() {
    let (mut manager, wip_id) = manager_with_wip();
    let (_, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();

    let err = manager
        .freeze(&next.id, "v1", false, &NoopReleaseHooks)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    assert!(manager.store().get_version(&next.id).unwrap().is_wip());
}

#[test]
fn test_freeze_stamps_version_and_copies_slots_into_new_wip() {
    let (mut manager, wip_id) = manager_with_wip();

    let (frozen, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();

    assert_eq!(frozen.id, wip_id);
    assert_eq!(frozen.label.as_deref(), Some("v1"));
    assert!(frozen.published_at.is_some());
    assert!(next.is_wip());
    assert_ne!(next.id, frozen.id);

    let frozen_slots = manager.store().load_slots(&frozen.id).unwrap();
    let wip_slots = manager.store().load_slots(&next.id).unwrap();
    assert_eq!(frozen_slots.len(), 2);
    assert_eq!(wip_slots.len(), 2);
    for (a, b) in frozen_slots.iter().zip(wip_slots.iter()) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.is_visible, b.is_visible);
    }
}

#[test]
fn test_freeze_recomputes_visibility() {
    let (mut store, wip) = conference(berlin_settings());
    let confirmed = store
        .place_slot(&wip.id, "t1", Some("r1"), Some(at(9)), None)
        .unwrap();
    let unscheduled = store.place_slot(&wip.id, "t3", Some("r1"), None, None).unwrap();
    let accepted = store
        .place_slot(&wip.id, "t2", Some("r2"), Some(at(9)), None)
        .unwrap();
    store.set_submission_state("t2", SubmissionState::Accepted).unwrap();
    store.set_slot_visibility(&accepted, true).unwrap();

    let mut manager = ScheduleManager::new(store);
    manager.freeze(&wip.id, "v1", false, &NoopReleaseHooks).unwrap();

    let slots = manager.store().load_slots(&wip.id).unwrap();
    let visible = |id: &str| slots.iter().find(|s| s.id == id).unwrap().is_visible;
    assert!(visible(&confirmed));
    assert!(!visible(&unscheduled));
    assert!(!visible(&accepted));
}

#[test]
fn test_publication_times_strictly_increase() {
    let (mut manager, wip_id) = manager_with_wip();
    let (first, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();
    let (second, _) = manager.freeze(&next.id, "v2", false, &NoopReleaseHooks).unwrap();
    assert!(second.published_at.unwrap() > first.published_at.unwrap());
}

#[test]
fn test_first_release_notifies_every_speaker() {
    let (mut manager, wip_id) = manager_with_wip();
    let hooks = RecordingHooks::default();

    manager.freeze(&wip_id, "v1", true, &hooks).unwrap();

    let notified = hooks.notified.borrow();
    assert_eq!(notified.len(), 1);
    let (version_id, concerned) = &notified[0];
    assert_eq!(version_id, &wip_id);
    let speakers: Vec<&str> = concerned.iter().map(|c| c.speaker.id.as_str()).collect();
    assert_eq!(speakers, vec!["sp-ada", "sp-bob"]);
    // Ada speaks in both talks
    assert_eq!(concerned[0].create.len(), 2);
}

#[test]
fn test_update_release_notifies_only_moved_speakers() {
    let (mut manager, wip_id) = manager_with_wip();
    let (_, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();

    let slot_id = manager
        .store()
        .load_slots(&next.id)
        .unwrap()
        .into_iter()
        .find(|s| s.submission_id == "t1")
        .unwrap()
        .id;
    manager
        .store_mut()
        .move_slot(&slot_id, Some("r3"), Some(at(14)))
        .unwrap();

    let hooks = RecordingHooks::default();
    manager.freeze(&next.id, "v2", true, &hooks).unwrap();

    let notified = hooks.notified.borrow();
    let concerned = &notified[0].1;
    assert_eq!(concerned.len(), 1);
    assert_eq!(concerned[0].speaker.id, "sp-ada");
    assert!(concerned[0].create.is_empty());
    assert_eq!(concerned[0].update.len(), 1);
    assert_eq!(concerned[0].update[0].new_room_name, "Room r3");
    // 14:00 UTC is 16:00 in Berlin
    assert_eq!(
        concerned[0].update[0].new_start.to_rfc3339(),
        "2026-05-01T16:00:00+02:00"
    );
}

#[test]
fn test_failing_notification_rolls_freeze_back() {
    let (mut manager, wip_id) = manager_with_wip();
    let hooks = RecordingHooks::failing_notify();

    let err = manager.freeze(&wip_id, "v1", true, &hooks).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ExternalService);
    let versions = manager.store().list_versions(EVENT_ID).unwrap();
    assert_eq!(versions.len(), 1);
    assert!(versions[0].is_wip());
    assert!(manager
        .store()
        .load_slots(&wip_id)
        .unwrap()
        .iter()
        .all(|s| !s.is_visible));
}

#[test]
fn test_export_runs_only_when_enabled_and_failure_keeps_release() {
    let settings = EventSettings {
        export_html_on_schedule_release: true,
        ..berlin_settings()
    };
    let (store, wip) = conference(settings);
    let mut manager = ScheduleManager::new(store);

    let hooks = RecordingHooks::failing_export();
    let (frozen, next) = manager.freeze(&wip.id, "v1", false, &hooks).unwrap();
    assert!(manager.store().get_version(&frozen.id).unwrap().is_frozen());

    let hooks = RecordingHooks::default();
    manager.freeze(&next.id, "v2", false, &hooks).unwrap();
    assert_eq!(*hooks.exports.borrow(), vec![EVENT_ID.to_string()]);

    let (store, wip) = conference(berlin_settings());
    let mut disabled = ScheduleManager::new(store);
    let hooks = RecordingHooks::default();
    disabled.freeze(&wip.id, "v1", false, &hooks).unwrap();
    assert!(hooks.exports.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// unfreeze
// ---------------------------------------------------------------------------

#[test]
fn test_unfreeze_rejects_wip_version() {
    let (mut manager, wip_id) = manager_with_wip();
    let err = manager.unfreeze(&wip_id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidOperation);
    assert!(matches!(err.cause(), Some(ScheduleError::NotFrozen { .. })));
}

#[test]
fn test_unfreeze_preserves_submissions_added_since() {
    let (mut manager, wip_id) = manager_with_wip();
    let (frozen, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();

    // t3 is scheduled after the release; the extra t1 placement is dropped
    // because t1 is part of the release
    let store = manager.store_mut();
    store
        .place_slot(&next.id, "t3", Some("r3"), Some(at(11)), None)
        .unwrap();
    store
        .place_slot(&next.id, "t1", Some("r3"), Some(at(15)), None)
        .unwrap();

    let (reopened, reopened_wip) = manager.unfreeze(&frozen.id).unwrap();

    assert_eq!(reopened, manager.store().get_version(&frozen.id).unwrap());
    assert!(manager.store().get_version(&next.id).is_err());

    let mut placed: Vec<(String, Option<String>)> = manager
        .store()
        .load_slots(&reopened_wip.id)
        .unwrap()
        .into_iter()
        .map(|s| (s.submission_id.clone(), s.room_id().map(str::to_string)))
        .collect();
    placed.sort();
    assert_eq!(
        placed,
        vec![
            ("t1".to_string(), Some("r1".to_string())),
            ("t2".to_string(), Some("r2".to_string())),
            ("t3".to_string(), Some("r3".to_string())),
        ]
    );
    assert_eq!(manager.wip_version(EVENT_ID).unwrap().id, reopened_wip.id);
}

#[test]
fn test_failed_unfreeze_keeps_wip_version_and_slots() {
    let (manager, wip_id) = manager_with_wip();
    let mut manager = ScheduleManager::new(FailingCopyStore::new(manager.into_store()));
    let (frozen, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();
    manager
        .store_mut()
        .inner
        .place_slot(&next.id, "t3", Some("r3"), Some(at(11)), None)
        .unwrap();
    let versions_before = manager.store().list_versions(EVENT_ID).unwrap();
    let mut slots_before: Vec<String> = manager
        .store()
        .load_slots(&next.id)
        .unwrap()
        .into_iter()
        .map(|s| s.submission_id)
        .collect();
    slots_before.sort();

    manager.store_mut().fail_copy = true;
    let err = manager.unfreeze(&frozen.id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);

    assert_eq!(manager.store().list_versions(EVENT_ID).unwrap(), versions_before);
    assert_eq!(manager.wip_version(EVENT_ID).unwrap().id, next.id);
    let mut slots_after: Vec<String> = manager
        .store()
        .load_slots(&next.id)
        .unwrap()
        .into_iter()
        .map(|s| s.submission_id)
        .collect();
    slots_after.sort();
    assert_eq!(slots_after, slots_before);
    assert_eq!(slots_after, vec!["t1", "t2", "t3"]);
}

// ---------------------------------------------------------------------------
// Version queries
// ---------------------------------------------------------------------------

#[test]
fn test_previous_current_and_archived_versions() {
    let (mut manager, wip_id) = manager_with_wip();
    assert!(manager.current_version(EVENT_ID).unwrap().is_none());

    let (v1, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();
    assert_eq!(manager.current_version(EVENT_ID).unwrap().unwrap().id, v1.id);
    let (v2, wip) = manager.freeze(&next.id, "v2", false, &NoopReleaseHooks).unwrap();

    assert_eq!(manager.current_version(EVENT_ID).unwrap().unwrap().id, v2.id);
    assert_eq!(manager.wip_version(EVENT_ID).unwrap().id, wip.id);
    assert_eq!(manager.previous_version(&v2.id).unwrap().unwrap().id, v1.id);
    assert!(manager.previous_version(&v1.id).unwrap().is_none());
    assert_eq!(manager.previous_version(&wip.id).unwrap().unwrap().id, v2.id);

    assert!(manager.is_archived(&v1.id).unwrap());
    assert!(!manager.is_archived(&v2.id).unwrap());
    assert!(!manager.is_archived(&wip.id).unwrap());
}

#[test]
fn test_changes_of_first_release_is_create() {
    let (mut manager, wip_id) = manager_with_wip();
    let (v1, next) = manager.freeze(&wip_id, "v1", false, &NoopReleaseHooks).unwrap();

    assert_eq!(manager.changes(&v1.id).unwrap().action, ChangeAction::Create);
    let unchanged = manager.changes(&next.id).unwrap();
    assert_eq!(unchanged.action, ChangeAction::Update);
    assert_eq!(unchanged.count, 0);
    assert_eq!(manager.compute_changes(None, &next.id).unwrap().action, ChangeAction::Create);
}

#[test]
fn test_warnings_cover_unplaced_and_unconfirmed_slots() {
    let settings = EventSettings {
        use_tracks: true,
        ..berlin_settings()
    };
    let (mut store, wip) = conference(settings);
    store.place_slot(&wip.id, "t3", Some("r1"), None, None).unwrap();
    let flagged = store
        .place_slot(&wip.id, "t4", Some("r2"), Some(at(9)), None)
        .unwrap();
    store
        .set_slot_warnings(&flagged, vec!["Room is too small".to_string()])
        .unwrap();
    store.set_submission_state("t4", SubmissionState::Accepted).unwrap();

    let manager = ScheduleManager::new(store);
    let warnings = manager.warnings(&wip.id).unwrap();

    assert_eq!(warnings.unscheduled.len(), 1);
    assert_eq!(warnings.unscheduled[0].submission_id, "t3");
    assert_eq!(warnings.talk_warnings.len(), 1);
    assert_eq!(warnings.unconfirmed.len(), 1);
    assert_eq!(warnings.no_track.len(), 1);
    assert_eq!(warnings.no_track[0].submission_id, "t4");
}

#[test]
fn test_unknown_version_is_not_found() {
    let (mut manager, _) = manager_with_wip();
    let err = manager
        .freeze("missing", "v1", false, &NoopReleaseHooks)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.version_id(), Some("missing"));
}
