use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::{ExError, ExErrorKind, ScheduleError};

/// Per-event schedule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// IANA time zone name used for speaker-facing times
    pub timezone: String,
    /// Whether submissions are expected to carry a track
    pub use_tracks: bool,
    /// Enqueue the static HTML export when a version is released
    pub export_html_on_schedule_release: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            use_tracks: false,
            export_html_on_schedule_release: false,
        }
    }
}

impl EventSettings {
    /// Parse settings from their stored JSON form; missing keys take defaults
    ///
    /// # Errors
    ///
    /// `Serialization` when the payload is not a JSON object of settings.
    pub fn from_json(payload: &str) -> Result<Self, ExError> {
        serde_json::from_str(payload).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("parse_event_settings")
                .with_message(format!("Invalid event settings JSON: {}", e))
        })
    }

    /// Resolve the configured time zone
    ///
    /// # Errors
    ///
    /// `InvalidTimeZone` when the name is not in the tz database.
    pub fn tz(&self) -> Result<Tz, ScheduleError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ScheduleError::InvalidTimeZone {
                timezone: self.timezone.clone(),
            })
    }
}

/// The event owning a set of schedule versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub slug: String,
    pub settings: EventSettings,
}

impl Event {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            settings: EventSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EventSettings) -> Self {
        self.settings = settings;
        self
    }
}
