//! Change detection between two schedule snapshots.
//!
//! The core entry point is [`compute_changes`]. It walks the symmetric
//! difference of the two snapshots in identity order and, for each entry not
//! yet handled, looks for a placement of the same submission on the other
//! side. Rooms are searched own-room first; the first hit wins.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;

use crate::diff::model::{ChangeSet, MoveRecord};
use crate::diff::pool::CandidatePool;
use crate::errors::{ExError, Result, ScheduleError};
use crate::model::{Room, Slot, SlotKey};
use crate::snapshot::Snapshot;

/// Classify the changes from `previous` to `current`
///
/// Without a previous snapshot the result is a `Create` change set with no
/// entries. Move times are rendered in `tz`.
///
/// # Errors
///
/// - `DiffEntryOnBothSides` / `UnmatchedDiffEntry` (InternalInconsistency)
///   when a difference entry cannot be attributed to exactly one side
/// - `MissingPlacement` (InternalInconsistency) when a snapshot slot lacks a
///   room or start
/// - `CandidatePoolExhausted` (InternalInconsistency) when a handled entry
///   has no start time left in the pool
pub fn compute_changes(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    tz: Tz,
) -> Result<ChangeSet> {
    let Some(previous) = previous else {
        return Ok(ChangeSet::create());
    };

    let entries = symmetric_difference(previous, current);
    let mut pool = CandidatePool::from_keys(entries.iter().copied());
    let mut handled: HashSet<&SlotKey> = HashSet::with_capacity(entries.len());

    let mut new_talks = Vec::new();
    let mut canceled_talks = Vec::new();
    let mut moved_talks = Vec::new();

    for &key in &entries {
        if handled.contains(key) {
            continue;
        }

        let (old_slot, new_slot, counterpart) = match (previous.get(key), current.get(key)) {
            (Some(_), Some(_)) => {
                return Err(diff_defect(ScheduleError::DiffEntryOnBothSides {
                    submission_id: key.submission_id.clone(),
                    room_id: key.room_id.clone(),
                    start: key.start,
                }));
            }
            (None, None) => {
                return Err(diff_defect(ScheduleError::UnmatchedDiffEntry {
                    submission_id: key.submission_id.clone(),
                    room_id: key.room_id.clone(),
                    start: key.start,
                }));
            }
            (None, Some(new_slot)) => {
                let found = find_counterpart(key, previous, current, &pool, &handled);
                (found.map(|(_, slot)| slot), Some(new_slot), found.map(|(k, _)| k))
            }
            (Some(old_slot), None) => {
                let found = find_counterpart(key, current, previous, &pool, &handled);
                (Some(old_slot), found.map(|(_, slot)| slot), found.map(|(k, _)| k))
            }
        };

        handled.insert(key);
        consume_entry(&mut pool, key)?;
        if let Some(other) = counterpart {
            handled.insert(other);
            consume_entry(&mut pool, other)?;
        }

        match (old_slot, new_slot) {
            (Some(old_slot), Some(new_slot)) => {
                moved_talks.push(move_record(old_slot, new_slot, tz)?);
            }
            (Some(old_slot), None) => canceled_talks.push(old_slot.clone()),
            (None, Some(new_slot)) => new_talks.push(new_slot.clone()),
            (None, None) => {}
        }
    }

    let changes = ChangeSet::update(new_talks, canceled_talks, moved_talks);
    tracing::debug!(
        previous_version_id = %previous.version_id(),
        version_id = %current.version_id(),
        difference = entries.len(),
        new = changes.new_talks.len(),
        canceled = changes.canceled_talks.len(),
        moved = changes.moved_talks.len(),
        "computed schedule changes"
    );
    Ok(changes)
}

/// Keys present in exactly one snapshot, in identity order
fn symmetric_difference<'a>(previous: &'a Snapshot, current: &'a Snapshot) -> Vec<&'a SlotKey> {
    let mut entries: Vec<&SlotKey> = previous
        .keys()
        .filter(|key| !current.contains(key))
        .chain(current.keys().filter(|key| !previous.contains(key)))
        .collect();
    entries.sort();
    entries
}

/// First placement of the same submission on the opposite side
///
/// A candidate must itself be an unhandled difference entry: present in
/// `other_side`, absent from `own_side`.
fn find_counterpart<'a>(
    key: &SlotKey,
    other_side: &'a Snapshot,
    own_side: &Snapshot,
    pool: &CandidatePool,
    handled: &HashSet<&'a SlotKey>,
) -> Option<(&'a SlotKey, &'a Slot)> {
    for room_id in pool.search_order(&key.room_id) {
        for start in pool.starts(room_id) {
            let candidate = SlotKey {
                submission_id: key.submission_id.clone(),
                room_id: room_id.to_string(),
                start: *start,
            };
            if own_side.contains(&candidate) {
                continue;
            }
            if let Some((found, slot)) = other_side.entry(&candidate) {
                if !handled.contains(found) {
                    return Some((found, slot));
                }
            }
        }
    }
    None
}

fn move_record(old_slot: &Slot, new_slot: &Slot, tz: Tz) -> Result<MoveRecord> {
    let (old_room, old_start) = placement(old_slot)?;
    let (new_room, new_start) = placement(new_slot)?;
    Ok(MoveRecord {
        submission_id: new_slot.submission_id.clone(),
        old_start: old_start.with_timezone(&tz).fixed_offset(),
        new_start: new_start.with_timezone(&tz).fixed_offset(),
        old_room_name: old_room.name.clone(),
        new_room_name: new_room.name.clone(),
        new_room_speaker_info: new_room.speaker_info.clone(),
    })
}

fn placement(slot: &Slot) -> Result<(&Room, DateTime<Utc>)> {
    match (&slot.room, slot.start) {
        (Some(room), Some(start)) => Ok((room, start)),
        _ => Err(diff_defect(ScheduleError::MissingPlacement {
            slot_id: slot.id.clone(),
        })),
    }
}

/// Pool counts track unhandled entries, so a handled entry always has a
/// start left to remove
fn consume_entry(pool: &mut CandidatePool, key: &SlotKey) -> Result<()> {
    if pool.consume(&key.room_id, key.start) {
        return Ok(());
    }
    Err(diff_defect(ScheduleError::CandidatePoolExhausted {
        submission_id: key.submission_id.clone(),
        room_id: key.room_id.clone(),
        start: key.start,
    }))
}

fn diff_defect(err: ScheduleError) -> ExError {
    tracing::error!(error = %err, "schedule diff invariant breached");
    ExError::from(err).with_op("compute_changes")
}
