//! # DomainError
//!
//! Centralized error handling for the CleanSight core.
//! Every business-rule violation is a typed, recoverable value; nothing in
//! this crate family panics on bad input.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g. Report, Task, UserProfile, Perk)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Another worker already owns this task
    #[error("task {0} has already been claimed")]
    AlreadyClaimed(Uuid),

    /// The task finished earlier; no second reward is issued
    #[error("task {0} is already completed")]
    AlreadyCompleted(Uuid),

    /// Completion attempted before the work was started
    #[error("task {0} has not been started")]
    NotStarted(Uuid),

    /// Start attempted on work that is already underway
    #[error("task {0} is already in progress")]
    AlreadyStarted(Uuid),

    /// The caller is not the worker the task is assigned to
    #[error("task {0} is not assigned to this worker")]
    WrongAssignee(Uuid),

    /// Ownership check failed (e.g. deleting someone else's report)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The report has already been picked up and can no longer be removed
    #[error("report {0} is no longer pending and cannot be deleted")]
    NotDeletable(Uuid),

    /// Validation failure (e.g. negative weight)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Redemption cost exceeds the user's available balance
    #[error("insufficient points: available {available}, required {required}")]
    InsufficientPoints { available: u64, required: u64 },

    /// A perk's unlock predicate (e.g. lifetime points minimum) failed
    #[error("requirements not met: {0}")]
    RequirementsNotMet(String),

    /// Infrastructure failure (store unavailable, corrupt snapshot, ...)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True for the state-precondition conflicts a caller should surface as
    /// "this task/account changed, re-read" rather than retry verbatim.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::AlreadyClaimed(_)
                | DomainError::AlreadyCompleted(_)
                | DomainError::NotStarted(_)
                | DomainError::AlreadyStarted(_)
                | DomainError::NotDeletable(_)
        )
    }
}

/// A specialized Result type for CleanSight domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
