//! Talkplan Engine - Orchestration layer
//!
//! Runs schedule commands and queries against a migrated SQLite connection,
//! coordinating the core lifecycle with the store. Operation boundaries are
//! logged here.

pub mod commands;

pub use commands::schedule_command::{apply_schedule_command, ScheduleCommand, ScheduleCommandResult};
pub use commands::schedule_query::{apply_schedule_query, ScheduleQuery, ScheduleQueryResult};
