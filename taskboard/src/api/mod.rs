//! RPC seam between the engine and the task board server.
//!
//! Defines the [`TaskApi`] trait that every backend must satisfy. The engine
//! never sees HTTP; it calls these six operations and gets typed results.
//! Implementations:
//! - [`memory::MemoryApi`]: in-process fake with failure injection, for tests
//!   and offline use
//!
//! [`endpoint::Endpoint`] describes the HTTP method and URL each operation
//! maps to, for backends that do speak HTTP.

pub mod endpoint;
pub mod memory;

use std::future::Future;

use taskboard_proto::bulk::{BulkUpdateRequest, BulkUpdateResponse};
use taskboard_proto::codec::CodecError;
use taskboard_proto::history::HistoryEntry;
use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{NewTask, ProjectId, Task, TaskId, TaskUpdate};

/// Errors a [`TaskApi`] call can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("server responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the error body, if any.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] CodecError),
}

impl ApiError {
    /// Builds a status error from a raw response body, extracting the
    /// message if the body carries one.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            message: taskboard_proto::codec::error_message(body),
        }
    }

    /// The server-provided message, if there was one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(m), ..
            } => Some(m),
            _ => None,
        }
    }

    /// Text to show the user: the server's message, or `fallback` when the
    /// server gave none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Async client for the task board REST contract.
///
/// Every method is one request/response round-trip and the only place the
/// engine suspends. Implementations must not retry or cancel on their own;
/// staleness is handled by the callers.
pub trait TaskApi: Send + Sync {
    /// `PATCH /tasks/{id}`: apply a sparse patch, returning the full task.
    fn patch_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// `PUT /tasks/{id}`: replace the core fields, returning the full task.
    fn update_task(
        &self,
        id: &TaskId,
        body: &TaskUpdate,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// `POST /tasks/bulk-update`: one patch over many tasks.
    fn bulk_update(
        &self,
        request: &BulkUpdateRequest,
    ) -> impl Future<Output = Result<BulkUpdateResponse, ApiError>> + Send;

    /// `GET /tasks/{id}/history`: newest-first change records.
    fn task_history(
        &self,
        id: &TaskId,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, ApiError>> + Send;

    /// `GET /tasks/projects/{projectId}`: every task of a project, in board
    /// order.
    fn list_tasks(
        &self,
        project: &ProjectId,
    ) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// `POST /tasks/projects/{projectId}`: create a task.
    fn create_task(
        &self,
        project: &ProjectId,
        task: &NewTask,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;
}
