//! Engine-level read-only query surface.
//!
//! `apply_schedule_query` is the single entry point for read-only schedule
//! queries. It never writes to the database.

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use serde::Serialize;
use talkplan_core::diff::{render_change_summary, ChangeSet};
use talkplan_core::lifecycle::ScheduleManager;
use talkplan_core::model::ScheduleVersion;
use talkplan_core::ops::ScheduleStore;
use talkplan_core::speakers::{compose_notifications, SpeakerChanges, SpeakerNotification};
use talkplan_core::warnings::ScheduleWarnings;
use talkplan_core::{log_op_end, log_op_error, log_op_start};
use talkplan_store::errors::Result;
use talkplan_store::SqliteScheduleStore;

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum ScheduleQuery {
    // ── Diff ──────────────────────────────────────────────────────────────────
    /// Changes of a version against its previous release.
    Changes { version_id: String },
    /// Changes between two explicit versions; no previous version yields a
    /// `create` change set.
    ChangesBetween {
        previous_version_id: Option<String>,
        version_id: String,
    },
    /// Markdown summary of a version's changes, times in the event zone.
    ChangeSummary { version_id: String },

    // ── Organizer checks ─────────────────────────────────────────────────────
    /// Warnings over every slot of a version.
    Warnings { version_id: String },

    // ── Speakers ─────────────────────────────────────────────────────────────
    /// Speakers affected by a version's changes.
    SpeakersConcerned { version_id: String },
    /// Rendered messages for every affected speaker.
    SpeakerNotifications { version_id: String },

    // ── Versions ─────────────────────────────────────────────────────────────
    /// Latest release of an event, if any.
    CurrentVersion { event_id: String },
    /// The event's work-in-progress version.
    WipVersion { event_id: String },
    /// Whether a version is a superseded release.
    IsArchived { version_id: String },
}

/// Result of a schedule query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScheduleQueryResult {
    Changes(ChangeSet),
    ChangeSummary(String),
    Warnings(ScheduleWarnings),
    SpeakersConcerned(Vec<SpeakerChanges>),
    SpeakerNotifications(Vec<SpeakerNotification>),
    Version(Option<ScheduleVersion>),
    IsArchived(bool),
}

impl ScheduleQuery {
    /// Operation name used in boundary logs
    fn op(&self) -> &'static str {
        match self {
            ScheduleQuery::Changes { .. } => "schedule_changes",
            ScheduleQuery::ChangesBetween { .. } => "schedule_changes_between",
            ScheduleQuery::ChangeSummary { .. } => "schedule_change_summary",
            ScheduleQuery::Warnings { .. } => "schedule_warnings",
            ScheduleQuery::SpeakersConcerned { .. } => "schedule_speakers_concerned",
            ScheduleQuery::SpeakerNotifications { .. } => "schedule_speaker_notifications",
            ScheduleQuery::CurrentVersion { .. } => "schedule_current_version",
            ScheduleQuery::WipVersion { .. } => "schedule_wip_version",
            ScheduleQuery::IsArchived { .. } => "schedule_is_archived",
        }
    }
}

/// Run a read-only schedule query.
///
/// # Errors
///
/// `NotFound` for unknown events and versions (and `WipVersion` on an event
/// without one), `InvalidInput` for an unknown event time zone,
/// `InternalInconsistency` from the diff, and persistence errors.
pub fn apply_schedule_query(query: ScheduleQuery, conn: &Connection) -> Result<ScheduleQueryResult> {
    let op = query.op();
    log_op_start!(op);
    let start = std::time::Instant::now();

    let result = run_query(query, ScheduleManager::new(SqliteScheduleStore::new(conn)));

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => log_op_end!(op, duration_ms = elapsed),
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!(op, e_clone, duration_ms = elapsed);
        }
    }
    result
}

fn run_query(
    query: ScheduleQuery,
    mut manager: ScheduleManager<SqliteScheduleStore<'_>>,
) -> Result<ScheduleQueryResult> {
    match query {
        ScheduleQuery::Changes { version_id } => {
            manager.changes(&version_id).map(ScheduleQueryResult::Changes)
        }
        ScheduleQuery::ChangesBetween {
            previous_version_id,
            version_id,
        } => manager
            .compute_changes(previous_version_id.as_deref(), &version_id)
            .map(ScheduleQueryResult::Changes),
        ScheduleQuery::ChangeSummary { version_id } => {
            let tz = event_tz(manager.store(), &version_id)?;
            let changes = manager.changes(&version_id)?;
            Ok(ScheduleQueryResult::ChangeSummary(render_change_summary(
                &changes, tz,
            )))
        }
        ScheduleQuery::Warnings { version_id } => {
            manager.warnings(&version_id).map(ScheduleQueryResult::Warnings)
        }
        ScheduleQuery::SpeakersConcerned { version_id } => manager
            .speakers_concerned(&version_id)
            .map(ScheduleQueryResult::SpeakersConcerned),
        ScheduleQuery::SpeakerNotifications { version_id } => {
            let tz = event_tz(manager.store(), &version_id)?;
            let concerned = manager.speakers_concerned(&version_id)?;
            Ok(ScheduleQueryResult::SpeakerNotifications(
                compose_notifications(&concerned, tz),
            ))
        }
        ScheduleQuery::CurrentVersion { event_id } => manager
            .current_version(&event_id)
            .map(ScheduleQueryResult::Version),
        ScheduleQuery::WipVersion { event_id } => manager
            .wip_version(&event_id)
            .map(|wip| ScheduleQueryResult::Version(Some(wip))),
        ScheduleQuery::IsArchived { version_id } => manager
            .is_archived(&version_id)
            .map(ScheduleQueryResult::IsArchived),
    }
}

fn event_tz(store: &SqliteScheduleStore<'_>, version_id: &str) -> Result<chrono_tz::Tz> {
    let version = store.get_version(version_id)?;
    Ok(store.get_event(&version.event_id)?.settings.tz()?)
}
