//! Command orchestration layer.
//!
//! Mutating commands (freeze, unfreeze) and read-only queries, each a
//! single entry point over a SQLite connection.

pub mod schedule_command;
pub mod schedule_query;
