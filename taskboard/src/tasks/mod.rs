//! Task mutation and synchronization engine.
//!
//! Computes minimal patches from editor drafts, resolves drag-and-drop
//! gestures into status transitions, fans bulk patches out over many tasks,
//! merges server-confirmed records back into the board, and classifies
//! change history for display.

pub mod board;
pub mod bulk;
pub mod drag;
pub mod draft;
pub mod history;
pub mod merge;
pub mod patch;

pub use board::{DropOutcome, TaskBoard};
pub use bulk::{BulkCoordinator, BulkFailure, BulkOutcome, ShapeViolation};
pub use drag::{DropDecision, DropTarget, TaskLookup, plan_drop, resolve};
pub use draft::TaskDraft;
pub use history::{Classification, HistoryFilter, classify, describe};
pub use merge::{merge_many, merge_one, merged};
pub use patch::diff;

use thiserror::Error;

use crate::api::ApiError;
use taskboard_proto::task::TaskId;

/// Local, pre-request validation failures. Nothing is sent when one occurs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The patch carries no field.
    #[error("nothing to update")]
    EmptyPatch,
    /// A bulk edit was requested with no task selected.
    #[error("no tasks selected")]
    NoTasksSelected,
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task with the given ID is not on the board.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The board is not bound to a project, so tasks cannot be created.
    #[error("board has no project")]
    NoProject,
}

/// Any failure of a task mutation.
#[derive(Debug, Error)]
pub enum MutationError {
    /// Rejected before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request failed or the server answered non-2xx.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The server's response did not account for the request.
    #[error(transparent)]
    Shape(#[from] ShapeViolation),
}

impl MutationError {
    /// Text to show the user for this error.
    ///
    /// Transport failures show the server's message when there is one and
    /// `fallback` otherwise; local errors show their own description.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(e) => e.user_message(fallback),
            Self::Validation(e) => e.to_string(),
            Self::Shape(_) => fallback.to_string(),
        }
    }
}
