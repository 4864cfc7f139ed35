//! HTTP method and URL for each [`TaskApi`](super::TaskApi) operation.

use std::fmt;

use taskboard_proto::task::{ProjectId, TaskId};
use url::Url;

/// HTTP verbs used by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        })
    }
}

/// One operation of the REST contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `PATCH /tasks/{id}`
    PatchTask(&'a TaskId),
    /// `PUT /tasks/{id}`
    UpdateTask(&'a TaskId),
    /// `POST /tasks/bulk-update`
    BulkUpdate,
    /// `GET /tasks/{id}/history`
    TaskHistory(&'a TaskId),
    /// `GET /tasks/projects/{projectId}`
    ListTasks(&'a ProjectId),
    /// `POST /tasks/projects/{projectId}`
    CreateTask(&'a ProjectId),
}

impl Endpoint<'_> {
    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        match self {
            Self::PatchTask(_) => Method::Patch,
            Self::UpdateTask(_) => Method::Put,
            Self::BulkUpdate | Self::CreateTask(_) => Method::Post,
            Self::TaskHistory(_) | Self::ListTasks(_) => Method::Get,
        }
    }

    /// Path relative to the API root, without a leading slash.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::PatchTask(id) | Self::UpdateTask(id) => format!("tasks/{id}"),
            Self::BulkUpdate => "tasks/bulk-update".to_string(),
            Self::TaskHistory(id) => format!("tasks/{id}/history"),
            Self::ListTasks(project) | Self::CreateTask(project) => {
                format!("tasks/projects/{project}")
            }
        }
    }

    /// Absolute URL under `base`.
    ///
    /// `base` is treated as a directory whether or not it ends in `/`, so
    /// `http://host/api` and `http://host/api/` give the same result.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the joined URL is invalid (e.g. `base` cannot
    /// be a base).
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut root = base.clone();
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        root.join(&self.path())
    }
}
