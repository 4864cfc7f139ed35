//! Wire types for `POST /tasks/bulk-update`.
//!
//! The server applies one [`TaskPatch`] to every listed task and reports a
//! per-id result. The response is taken at face value here; validating that
//! it accounts for every requested id is the client's job.

use serde::{Deserialize, Serialize};

use crate::patch::TaskPatch;
use crate::task::TaskId;

/// Request body: one patch applied to many tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    /// Tasks to update.
    pub task_ids: Vec<TaskId>,
    /// The shared change set.
    pub updates: TaskPatch,
}

/// A single task that the server failed to update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateError {
    /// The task that was not updated.
    pub task_id: TaskId,
    /// Human-readable reason, if the server gave one.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Machine-readable code (e.g. `UPDATE_FAILED`).
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Response body of a bulk update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    /// Ids the server updated.
    #[serde(default)]
    pub successful_updates: Vec<TaskId>,
    /// Ids the server could not update.
    #[serde(default)]
    pub failed_updates: Vec<BulkUpdateError>,
    /// Number of ids the server saw in the request.
    #[serde(default)]
    pub total_requested: Option<usize>,
    /// Reported success count.
    #[serde(default)]
    pub total_successful: Option<usize>,
    /// Reported failure count.
    #[serde(default)]
    pub total_failed: Option<usize>,
}
