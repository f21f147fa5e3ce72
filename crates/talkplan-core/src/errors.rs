use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and external responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,

    // Lifecycle
    /// Reserved or empty label, freezing a frozen version, unfreezing a WIP version
    InvalidOperation,
    AlreadyExists,
    ConstraintViolation,

    // Diff
    /// A diff or snapshot invariant was breached; fatal to the computation
    InternalInconsistency,

    // Integration/IO
    Persistence,
    Serialization,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidOperation => "ERR_INVALID_OPERATION",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InternalInconsistency => "ERR_INTERNAL_INCONSISTENCY",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for classification, optional entity context, a free-form
/// message and, for domain failures, the originating [`ScheduleError`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    event_id: Option<String>,
    version_id: Option<String>,
    submission_id: Option<String>,
    message: String,
    cause: Option<ScheduleError>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            event_id: None,
            version_id: None,
            submission_id: None,
            message: String::new(),
            cause: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add event ID context
    pub fn with_event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Add schedule version ID context
    pub fn with_version_id(mut self, id: impl Into<String>) -> Self {
        self.version_id = Some(id.into());
        self
    }

    /// Add submission ID context
    pub fn with_submission_id(mut self, id: impl Into<String>) -> Self {
        self.submission_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the domain error this one was raised from
    pub fn with_cause(mut self, cause: ScheduleError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the domain error, if this error was raised from one
    pub fn cause(&self) -> Option<&ScheduleError> {
        self.cause.as_ref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(event_id) = &self.event_id {
            write!(f, " (event_id: {})", event_id)?;
        }
        if let Some(version_id) = &self.version_id {
            write!(f, " (version_id: {})", version_id)?;
        }
        if let Some(submission_id) = &self.submission_id {
            write!(f, " (submission_id: {})", submission_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for schedule versions, snapshots and diffs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    // ===== Freeze / unfreeze =====
    /// `wip` and `latest` name URL aliases and cannot label a version
    #[error("Cannot use reserved name \"{label}\" for schedule version")]
    ReservedVersionLabel { label: String },

    #[error("Cannot freeze schedule version {version_id}: already versioned as \"{label}\"")]
    AlreadyFrozen { version_id: String, label: String },

    #[error("Cannot freeze schedule version {version_id} without a version name")]
    EmptyVersionLabel { version_id: String },

    #[error("Cannot unfreeze schedule version {version_id}: not released yet")]
    NotFrozen { version_id: String },

    #[error("Event {event_id} already has a schedule version named \"{label}\"")]
    DuplicateVersionLabel { event_id: String, label: String },

    // ===== Lookup =====
    #[error("Schedule version not found: {version_id}")]
    VersionNotFound { version_id: String },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: String },

    #[error("Talk slot not found: {slot_id}")]
    SlotNotFound { slot_id: String },

    #[error("Event {event_id} has no work-in-progress schedule")]
    NoWorkInProgress { event_id: String },

    /// Exactly one work-in-progress version may exist per event
    #[error("Event {event_id} already has a work-in-progress schedule")]
    WorkInProgressExists { event_id: String },

    // ===== Snapshot / diff invariants =====
    #[error("Schedule version {version_id} places submission {submission_id} twice in room {room_id} at {start}")]
    DuplicateSlotTriple {
        version_id: String,
        submission_id: String,
        room_id: String,
        start: DateTime<Utc>,
    },

    #[error("Diff entry for submission {submission_id} in room {room_id} at {start} exists in neither snapshot")]
    UnmatchedDiffEntry {
        submission_id: String,
        room_id: String,
        start: DateTime<Utc>,
    },

    #[error("Diff entry for submission {submission_id} in room {room_id} at {start} exists in both snapshots")]
    DiffEntryOnBothSides {
        submission_id: String,
        room_id: String,
        start: DateTime<Utc>,
    },

    #[error("No start time left in room {room_id} at {start} for submission {submission_id}")]
    CandidatePoolExhausted {
        submission_id: String,
        room_id: String,
        start: DateTime<Utc>,
    },

    #[error("Snapshot slot {slot_id} has no room or start time")]
    MissingPlacement { slot_id: String },

    // ===== Configuration =====
    #[error("Unknown time zone: {timezone}")]
    InvalidTimeZone { timezone: String },
}

impl ScheduleError {
    /// Classification of this domain error in the canonical taxonomy
    pub fn kind(&self) -> ExErrorKind {
        match self {
            ScheduleError::ReservedVersionLabel { .. }
            | ScheduleError::AlreadyFrozen { .. }
            | ScheduleError::EmptyVersionLabel { .. }
            | ScheduleError::NotFrozen { .. } => ExErrorKind::InvalidOperation,
            ScheduleError::DuplicateVersionLabel { .. } => ExErrorKind::AlreadyExists,
            ScheduleError::VersionNotFound { .. }
            | ScheduleError::EventNotFound { .. }
            | ScheduleError::SlotNotFound { .. }
            | ScheduleError::NoWorkInProgress { .. } => ExErrorKind::NotFound,
            ScheduleError::WorkInProgressExists { .. } => ExErrorKind::ConstraintViolation,
            ScheduleError::DuplicateSlotTriple { .. }
            | ScheduleError::UnmatchedDiffEntry { .. }
            | ScheduleError::DiffEntryOnBothSides { .. }
            | ScheduleError::CandidatePoolExhausted { .. }
            | ScheduleError::MissingPlacement { .. } => ExErrorKind::InternalInconsistency,
            ScheduleError::InvalidTimeZone { .. } => ExErrorKind::InvalidInput,
        }
    }
}

/// Conversion from ScheduleError to ExError
///
/// The domain variant is kept as the cause so callers can tell apart
/// sub-reasons that share a kind (e.g. the three freeze rejections).
impl From<ScheduleError> for ExError {
    fn from(err: ScheduleError) -> Self {
        let base = ExError::new(err.kind()).with_message(err.to_string());
        let base = match &err {
            ScheduleError::AlreadyFrozen { version_id, .. }
            | ScheduleError::EmptyVersionLabel { version_id }
            | ScheduleError::NotFrozen { version_id }
            | ScheduleError::VersionNotFound { version_id } => {
                base.with_version_id(version_id.clone())
            }
            ScheduleError::DuplicateVersionLabel { event_id, .. }
            | ScheduleError::EventNotFound { event_id }
            | ScheduleError::NoWorkInProgress { event_id }
            | ScheduleError::WorkInProgressExists { event_id } => {
                base.with_event_id(event_id.clone())
            }
            ScheduleError::DuplicateSlotTriple {
                version_id,
                submission_id,
                ..
            } => base
                .with_version_id(version_id.clone())
                .with_submission_id(submission_id.clone()),
            ScheduleError::UnmatchedDiffEntry { submission_id, .. }
            | ScheduleError::DiffEntryOnBothSides { submission_id, .. }
            | ScheduleError::CandidatePoolExhausted { submission_id, .. } => {
                base.with_op("compute_changes")
                    .with_submission_id(submission_id.clone())
            }
            ScheduleError::ReservedVersionLabel { .. }
            | ScheduleError::SlotNotFound { .. }
            | ScheduleError::MissingPlacement { .. }
            | ScheduleError::InvalidTimeZone { .. } => base,
        };
        base.with_cause(err)
    }
}
