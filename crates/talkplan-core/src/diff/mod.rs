//! Schedule diff engine.
//!
//! Compares the snapshots of two schedule versions and classifies every
//! changed placement as a new, canceled or moved talk.
//!
//! ## Entry point
//!
//! ```ignore
//! use talkplan_core::diff::compute_changes;
//!
//! let changes = compute_changes(Some(&previous), &current, chrono_tz::UTC)?;
//! let summary = talkplan_core::diff::render_change_summary(&changes, chrono_tz::UTC);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: the classification depends only on the two snapshots;
//!   ties are broken by `(submission, room, start)` order.
//! - **Conservation**: every placement in the symmetric difference lands in
//!   exactly one output list.
//! - **Isolation**: matching state lives in a [`pool::CandidatePool`] owned by
//!   one computation, so independent diffs can run in parallel.

pub mod engine;
pub mod human_summary;
pub mod model;
pub mod pool;

pub use engine::compute_changes;
pub use human_summary::render_change_summary;
pub use model::{ChangeAction, ChangeSet, MoveRecord};
