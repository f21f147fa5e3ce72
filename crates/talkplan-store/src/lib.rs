//! Talkplan Store - SQLite persistence for schedule versions
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - [`repo::SqliteScheduleStore`], the SQLite backend of
//!   `talkplan_core::ops::ScheduleStore`
//! - Event settings stored as JSON per event

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod settings;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteScheduleStore;
