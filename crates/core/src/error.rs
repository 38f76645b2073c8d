//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The business-rule variants are deterministic and user-facing; they are
/// never retried automatically. `ConcurrentModification` and `Persistence`
/// surface failures at the storage boundary, translated at the orchestration
/// layer so raw store errors never leak to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, bounds exceeded).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The event has already been cancelled.
    #[error("this event is cancelled")]
    EventCancelled,

    /// The requested date lies in the past.
    #[error("cannot set an event's date in the past")]
    DateInPast,

    /// The requested date does not leave the minimum lead time before start.
    #[error("an event's date must be set at least {min_lead_hours} hours ahead")]
    LeadTimeTooShort { min_lead_hours: i64 },

    /// The event's date has already passed.
    #[error("this event was in the past")]
    EventInPast,

    /// The user does not meet the event's minimum registration age.
    #[error("minimum age to register is {required}, user age is {actual}")]
    AgeTooLow { required: u8, actual: u8 },

    /// An active registration already exists for this (event, user) pair.
    #[error("user is already registered for this event")]
    AlreadyRegistered,

    /// A requested resource does not exist or is not visible to the tenant.
    #[error("not found")]
    NotFound,

    /// Optimistic concurrency conflict at persistence commit. The caller may
    /// retry the whole operation once with fresh state.
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Storage/transport failure. Not a domain concern; propagated unchanged.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn concurrent_modification(msg: impl Into<String>) -> Self {
        Self::ConcurrentModification(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
