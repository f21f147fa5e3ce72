//! Release side effects
//!
//! [`ReleaseHooks`] is injected into the lifecycle manager so that speaker
//! notification and static export stay outside the core.

use crate::errors::Result;
use crate::model::ScheduleVersion;
use crate::speakers::SpeakerChanges;

/// Side effects triggered by releasing a schedule version
pub trait ReleaseHooks {
    /// Hand the per-speaker changes of a freshly frozen version to the
    /// notification layer
    ///
    /// Runs inside the freeze's atomic unit; an error rolls the freeze back.
    ///
    /// # Errors
    ///
    /// Implementation-defined, typically `ExternalService`.
    fn notify_speakers(&self, version: &ScheduleVersion, concerned: &[SpeakerChanges]) -> Result<()>;

    /// Queue the static HTML export of an event
    ///
    /// Runs after the freeze is committed; an error does not undo it.
    ///
    /// # Errors
    ///
    /// Implementation-defined, typically `ExternalService`.
    fn enqueue_export(&self, event_id: &str) -> Result<()>;
}

/// Hooks that do nothing
///
/// # Example
/// ```
/// use talkplan_core::hooks::{NoopReleaseHooks, ReleaseHooks};
///
/// assert!(NoopReleaseHooks.enqueue_export("event-1").is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReleaseHooks;

impl ReleaseHooks for NoopReleaseHooks {
    fn notify_speakers(&self, _version: &ScheduleVersion, _concerned: &[SpeakerChanges]) -> Result<()> {
        Ok(())
    }

    fn enqueue_export(&self, _event_id: &str) -> Result<()> {
        Ok(())
    }
}
