//! Engine-level schedule release commands.
//!
//! Freeze and unfreeze run inside a store savepoint; a failing command
//! leaves the database untouched.

#![allow(clippy::result_large_err)]

use rusqlite::Connection;
use serde::Serialize;
use talkplan_core::hooks::ReleaseHooks;
use talkplan_core::lifecycle::ScheduleManager;
use talkplan_core::model::ScheduleVersion;
use talkplan_core::{log_op_end, log_op_error, log_op_start};
use talkplan_store::errors::Result;
use talkplan_store::SqliteScheduleStore;

/// Commands that change which schedule versions exist
#[derive(Debug, Clone)]
pub enum ScheduleCommand {
    /// Release a work-in-progress version under `label`.
    Freeze {
        version_id: String,
        label: String,
        /// Notify concerned speakers inside the release.
        notify: bool,
    },
    /// Reopen a released version as the work-in-progress schedule.
    Unfreeze { version_id: String },
}

/// Result of applying a schedule command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScheduleCommandResult {
    Freeze {
        /// The version as released
        frozen: ScheduleVersion,
        /// The new work-in-progress copy
        wip: ScheduleVersion,
    },
    Unfreeze {
        /// The released version, unchanged
        version: ScheduleVersion,
        /// The new work-in-progress version built from it
        wip: ScheduleVersion,
    },
}

/// Apply a schedule command with the given release hooks.
///
/// # Errors
///
/// Freeze and unfreeze rejections (`InvalidOperation`, `AlreadyExists`),
/// `NotFound` for unknown versions, hook failures, and persistence errors.
pub fn apply_schedule_command(
    cmd: ScheduleCommand,
    conn: &Connection,
    hooks: &dyn ReleaseHooks,
) -> Result<ScheduleCommandResult> {
    let mut manager = ScheduleManager::new(SqliteScheduleStore::new(conn));

    match cmd {
        ScheduleCommand::Freeze {
            version_id,
            label,
            notify,
        } => {
            log_op_start!("schedule_freeze", version_id = %version_id, notify = notify);
            let start = std::time::Instant::now();

            let result = manager
                .freeze(&version_id, &label, notify, hooks)
                .map(|(frozen, wip)| ScheduleCommandResult::Freeze { frozen, wip });

            let elapsed = start.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => log_op_end!("schedule_freeze", duration_ms = elapsed, version_id = %version_id),
                Err(e) => {
                    let e_clone = e.clone();
                    log_op_error!("schedule_freeze", e_clone, duration_ms = elapsed, version_id = %version_id);
                }
            }
            result
        }

        ScheduleCommand::Unfreeze { version_id } => {
            log_op_start!("schedule_unfreeze", version_id = %version_id);
            let start = std::time::Instant::now();

            let result = manager
                .unfreeze(&version_id)
                .map(|(version, wip)| ScheduleCommandResult::Unfreeze { version, wip });

            let elapsed = start.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => log_op_end!("schedule_unfreeze", duration_ms = elapsed, version_id = %version_id),
                Err(e) => {
                    let e_clone = e.clone();
                    log_op_error!("schedule_unfreeze", e_clone, duration_ms = elapsed, version_id = %version_id);
                }
            }
            result
        }
    }
}
