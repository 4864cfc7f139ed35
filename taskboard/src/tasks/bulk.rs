//! Bulk mutation: one patch over many tasks in a single request.
//!
//! The server reports a per-id result. [`BulkOutcome::from_response`]
//! checks that the report accounts for every requested id exactly once
//! before anything is merged. A report with failures is still a completed
//! operation; a report that does not add up is a [`ShapeViolation`].

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use taskboard_proto::bulk::{BulkUpdateRequest, BulkUpdateResponse};
use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{Task, TaskId};

use super::merge::merge_many;
use super::{MutationError, ValidationError};
use crate::api::TaskApi;
use crate::outcome::DEFAULT_FAILURE_MESSAGE;

/// A bulk response that does not match its request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeViolation {
    /// Requested ids that appear in neither list.
    #[error("{} requested task(s) missing from the response", .0.len())]
    Missing(Vec<TaskId>),
    /// An id reported more than once.
    #[error("task {0} reported more than once")]
    Duplicate(TaskId),
    /// An id that was never requested.
    #[error("task {0} was not part of the request")]
    Unrequested(TaskId),
    /// A reported total disagrees with the lists.
    #[error("{field} reported as {reported}, lists give {actual}")]
    TotalMismatch {
        /// Which total.
        field: &'static str,
        /// What the server said.
        reported: usize,
        /// What the lists add up to.
        actual: usize,
    },
}

/// One task a bulk update did not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// The task.
    pub id: TaskId,
    /// Reason to show the user.
    pub message: String,
    /// Machine-readable code, if the server sent one.
    pub code: Option<String>,
}

/// Validated result of a bulk update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Number of ids requested.
    pub total_requested: usize,
    /// Number of ids updated.
    pub total_successful: usize,
    /// Number of ids not updated.
    pub total_failed: usize,
    /// Ids updated.
    pub succeeded_ids: BTreeSet<TaskId>,
    /// Ids not updated, in the server's order.
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    /// Validates `response` against the `requested` ids.
    ///
    /// Every requested id must be reported exactly once, in either list, and
    /// nothing else may be reported. Totals the server sent must match the
    /// lists. Failures without a message get `fallback`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeViolation`] found.
    pub fn from_response(
        requested: &BTreeSet<TaskId>,
        response: BulkUpdateResponse,
        fallback: &str,
    ) -> Result<Self, ShapeViolation> {
        let mut seen: HashSet<&TaskId> = HashSet::with_capacity(requested.len());
        let reported = response
            .successful_updates
            .iter()
            .chain(response.failed_updates.iter().map(|f| &f.task_id));
        for id in reported {
            if !requested.contains(id) {
                return Err(ShapeViolation::Unrequested(id.clone()));
            }
            if !seen.insert(id) {
                return Err(ShapeViolation::Duplicate(id.clone()));
            }
        }
        let missing: Vec<TaskId> = requested
            .iter()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ShapeViolation::Missing(missing));
        }

        let total_successful = response.successful_updates.len();
        let total_failed = response.failed_updates.len();
        let checks = [
            ("totalRequested", response.total_requested, requested.len()),
            ("totalSuccessful", response.total_successful, total_successful),
            ("totalFailed", response.total_failed, total_failed),
        ];
        for (field, reported, actual) in checks {
            match reported {
                Some(reported) if reported != actual => {
                    return Err(ShapeViolation::TotalMismatch {
                        field,
                        reported,
                        actual,
                    });
                }
                _ => {}
            }
        }

        let failures = response
            .failed_updates
            .into_iter()
            .map(|f| BulkFailure {
                id: f.task_id,
                message: f
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
                code: f.error_code,
            })
            .collect();

        Ok(Self {
            total_requested: requested.len(),
            total_successful,
            total_failed,
            succeeded_ids: response.successful_updates.into_iter().collect(),
            failures,
        })
    }

    /// Returns `true` if every requested task was updated.
    #[must_use]
    pub const fn is_complete_success(&self) -> bool {
        self.total_failed == 0
    }

    /// Ids that were not updated.
    #[must_use]
    pub fn failed_ids(&self) -> BTreeSet<TaskId> {
        self.failures.iter().map(|f| f.id.clone()).collect()
    }
}

/// Runs bulk updates against a [`TaskApi`] and merges the result.
pub struct BulkCoordinator<'a, A> {
    api: &'a A,
    failure_message: String,
}

impl<'a, A: TaskApi> BulkCoordinator<'a, A> {
    /// Creates a coordinator using the default failure message.
    #[must_use]
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Sets the message used for failures the server did not explain.
    #[must_use]
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Applies `patch` to every task in `ids` with one request.
    ///
    /// Succeeded ids get the patch applied to a copy of their held record,
    /// and the copies are merged into `tasks` in one pass. Failed ids keep
    /// their pre-bulk state. Partial failure is reported in
    /// the returned outcome, not as an error.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyPatch`] / [`ValidationError::NoTasksSelected`]
    ///   before any request.
    /// - [`MutationError::Api`] if the request fails.
    /// - [`MutationError::Shape`] if the response does not account for the
    ///   request; `tasks` is left untouched.
    pub async fn apply(
        &self,
        tasks: &mut [Task],
        ids: &BTreeSet<TaskId>,
        patch: &TaskPatch,
    ) -> Result<BulkOutcome, MutationError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }
        if ids.is_empty() {
            return Err(ValidationError::NoTasksSelected.into());
        }

        let request = BulkUpdateRequest {
            task_ids: ids.iter().cloned().collect(),
            updates: patch.clone(),
        };
        let response = self.api.bulk_update(&request).await.inspect_err(|e| {
            tracing::warn!(count = ids.len(), error = %e, "bulk update failed");
        })?;

        let outcome = BulkOutcome::from_response(ids, response, &self.failure_message)
            .inspect_err(|e| {
                tracing::warn!(count = ids.len(), error = %e, "bulk response rejected");
            })?;

        let patched: Vec<Task> = tasks
            .iter()
            .filter(|t| outcome.succeeded_ids.contains(&t.id))
            .map(|t| {
                let mut next = t.clone();
                patch.apply_to(&mut next);
                next
            })
            .collect();
        merge_many(tasks, &patched);

        tracing::info!(
            requested = outcome.total_requested,
            succeeded = outcome.total_successful,
            failed = outcome.total_failed,
            "bulk update completed"
        );
        Ok(outcome)
    }
}
