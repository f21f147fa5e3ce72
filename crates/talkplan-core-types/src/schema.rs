//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical between the log macros,
//! the error facility and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_EVENT_ID: &str = "event_id";
pub const FIELD_VERSION_ID: &str = "version_id";
pub const FIELD_VERSION_LABEL: &str = "version_label";
pub const FIELD_SUBMISSION_ID: &str = "submission_id";

// Collection sizes
pub const FIELD_SLOT_COUNT: &str = "slot_count";
pub const FIELD_CHANGE_COUNT: &str = "change_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
