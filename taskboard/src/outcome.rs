//! Presentation-facing result of a mutation request.

use crate::tasks::{BulkOutcome, MutationError, ShapeViolation, ValidationError};

/// Message shown when the server gives no reason for a failure.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to update task";

/// Message shown when a bulk edit is attempted with nothing selected.
pub const DEFAULT_NOTHING_SELECTED_MESSAGE: &str = "Select at least one task to update";

/// What the user should be told about a finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome<T> {
    /// Everything succeeded.
    Success(T),
    /// Rejected locally; nothing was sent.
    Validation(ValidationError),
    /// The request failed. Holds the message to show inline.
    Transport(String),
    /// A bulk edit completed but some tasks were not updated.
    Partial(BulkOutcome),
    /// The server's response did not account for the request.
    Shape(ShapeViolation),
}

impl<T> RequestOutcome<T> {
    /// Converts a single-task mutation result.
    #[must_use]
    pub fn from_mutation(result: Result<T, MutationError>, fallback: &str) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(MutationError::Validation(e)) => Self::Validation(e),
            Err(MutationError::Api(e)) => Self::Transport(e.user_message(fallback)),
            Err(MutationError::Shape(e)) => Self::Shape(e),
        }
    }

    /// Returns `true` for [`RequestOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl RequestOutcome<BulkOutcome> {
    /// Converts a bulk result, separating full success from partial failure.
    #[must_use]
    pub fn from_bulk(result: Result<BulkOutcome, MutationError>, fallback: &str) -> Self {
        match Self::from_mutation(result, fallback) {
            Self::Success(outcome) if !outcome.is_complete_success() => Self::Partial(outcome),
            other => other,
        }
    }
}
