//! Domain models for schedules
//!
//! - [`Slot`]: one placement of a submission in a schedule version
//! - [`ScheduleVersion`]: a work-in-progress or frozen schedule
//! - [`Event`] and [`EventSettings`]: owning event and its configuration
//! - [`Speaker`]: a person attached to a submission

pub mod event;
pub mod slot;
pub mod speaker;
pub mod version;

pub use event::{Event, EventSettings};
pub use slot::{Room, Slot, SlotKey, SubmissionState};
pub use speaker::Speaker;
pub use version::{ScheduleVersion, RESERVED_VERSION_LABELS};
