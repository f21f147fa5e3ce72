//! Talkplan Core - versioned conference schedules
//!
//! This crate provides the schedule domain and its algorithms:
//! - Slot, room, speaker and schedule version models
//! - Snapshot construction (the filtered view a diff compares)
//! - The change diff between two versions with greedy move matching
//! - Freeze/unfreeze lifecycle over a pluggable store
//! - Organizer warnings and per-speaker release notifications
//!
//! Storage is abstracted behind [`ops::ScheduleStore`]; [`ops::MemoryStore`]
//! is the in-memory backend, `talkplan-store` the SQLite one.

pub mod diff;
pub mod errors;
pub mod hooks;
pub mod lifecycle;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod snapshot;
pub mod speakers;
pub mod warnings;

// Used by the logging macros
#[doc(hidden)]
pub use tracing;
pub use talkplan_core_types::schema;

// Re-export commonly used types
pub use diff::{compute_changes, ChangeAction, ChangeSet, MoveRecord};
pub use errors::{ExError, ExErrorKind, Result, ScheduleError};
pub use hooks::{NoopReleaseHooks, ReleaseHooks};
pub use lifecycle::ScheduleManager;
pub use model::{Event, EventSettings, Room, ScheduleVersion, Slot, SlotKey, Speaker, SubmissionState};
pub use ops::{MemoryStore, ScheduleStore, SpeakerDirectory};
pub use snapshot::Snapshot;
pub use speakers::{SpeakerChanges, SpeakerNotification};
pub use warnings::ScheduleWarnings;
