//! The held task collection for one board.
//!
//! `TaskBoard` owns the list of tasks shown on the board. All changes go
//! through it: confirmed records are merged by id, drags become status
//! transitions, bulk edits are merged for the ids that succeeded.

use std::collections::{BTreeSet, HashSet};

use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{NewTask, ProjectId, Task, TaskId, TaskStatus, TaskUpdate};

use super::bulk::{BulkCoordinator, BulkOutcome};
use super::drag::{DropDecision, plan_drop};
use super::merge::merge_one;
use super::{MutationError, ValidationError};
use crate::api::TaskApi;
use crate::editor::Completion;
use crate::outcome::DEFAULT_FAILURE_MESSAGE;

/// Result of a drag-and-drop gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The task moved; holds the confirmed record.
    Moved(Task),
    /// Dropped into its own column; nothing was sent.
    Unchanged,
    /// The drop target could not be resolved; nothing was sent.
    Unresolved,
}

/// Owned task list for one board.
#[derive(Debug, Clone)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    project: Option<ProjectId>,
    failure_message: String,
}

impl TaskBoard {
    /// Creates a board from a fetched task list.
    ///
    /// Repeated ids keep their first occurrence.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::with_capacity(tasks.len());
        let total = tasks.len();
        let tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        if tasks.len() < total {
            tracing::warn!(
                dropped = total - tasks.len(),
                "duplicate task ids in board listing"
            );
        }
        Self {
            tasks,
            project: None,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Fetches a project's tasks and builds a board bound to it.
    ///
    /// # Errors
    ///
    /// [`MutationError::Api`] if the listing fails.
    pub async fn load<A: TaskApi>(api: &A, project: ProjectId) -> Result<Self, MutationError> {
        let tasks = api.list_tasks(&project).await.inspect_err(|e| {
            tracing::warn!(project = %project, error = %e, "board listing failed");
        })?;
        tracing::debug!(project = %project, count = tasks.len(), "board loaded");
        Ok(Self::new(tasks).with_project(project))
    }

    /// Binds the board to a project, enabling task creation.
    #[must_use]
    pub fn with_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    /// Sets the message used when the server gives no reason for a failure.
    #[must_use]
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// All held tasks in board order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The project this board belongs to, if bound.
    #[must_use]
    pub const fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Tasks in one column, in board order.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Every column in board order with its tasks.
    #[must_use]
    pub fn columns(&self) -> Vec<(TaskStatus, Vec<&Task>)> {
        TaskStatus::ALL
            .into_iter()
            .map(|s| (s, self.column(s)))
            .collect()
    }

    /// Merges the record confirmed by an editor save, including one that
    /// finished after its session was cancelled. Returns `true` if a held
    /// task was replaced.
    pub fn apply_completion(&mut self, completion: &Completion) -> bool {
        let Some(confirmed) = completion.confirmed() else {
            return false;
        };
        let merged = merge_one(&mut self.tasks, confirmed);
        if merged {
            tracing::debug!(task = %confirmed.id, "editor save merged into board");
        }
        merged
    }

    /// Adds a newly created task at the end, or replaces it if already held.
    pub fn insert_created(&mut self, task: Task) {
        if !merge_one(&mut self.tasks, &task) {
            self.tasks.push(task);
        }
    }

    /// Handles dropping task `dragged` onto `drop_target` (a column literal
    /// or another task's id).
    ///
    /// Sends exactly one full-replace update when the resolved status
    /// differs from the task's current one, and none otherwise.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TaskNotFound`] if `dragged` is not on the board.
    /// - [`MutationError::Api`] if the update fails; the held task is left
    ///   as it was.
    pub async fn move_task<A: TaskApi>(
        &mut self,
        api: &A,
        dragged: &TaskId,
        drop_target: &str,
    ) -> Result<DropOutcome, MutationError> {
        let Some(task) = self.get(dragged) else {
            return Err(ValidationError::TaskNotFound(dragged.clone()).into());
        };
        let to = match plan_drop(dragged, drop_target, self.tasks.as_slice()) {
            DropDecision::Move { to, .. } => to,
            DropDecision::NoChange => return Ok(DropOutcome::Unchanged),
            DropDecision::Unresolved => {
                tracing::debug!(task = %dragged, target = drop_target, "drop target not resolved");
                return Ok(DropOutcome::Unresolved);
            }
        };

        let body = TaskUpdate::status_transition(task, to);
        let confirmed = api.update_task(dragged, &body).await.inspect_err(|e| {
            tracing::warn!(task = %dragged, status = %to, error = %e, "status update failed");
        })?;
        merge_one(&mut self.tasks, &confirmed);
        tracing::info!(task = %dragged, status = %confirmed.status, "task moved");
        Ok(DropOutcome::Moved(confirmed))
    }

    /// Creates a task in this board's project and appends it.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TitleEmpty`] for a blank title.
    /// - [`ValidationError::NoProject`] if the board has no project.
    /// - [`MutationError::Api`] if the request fails.
    pub async fn create_task<A: TaskApi>(
        &mut self,
        api: &A,
        mut new: NewTask,
    ) -> Result<Task, MutationError> {
        new.title = new.title.trim().to_string();
        if new.title.is_empty() {
            return Err(ValidationError::TitleEmpty.into());
        }
        let project = self.project.clone().ok_or(ValidationError::NoProject)?;

        let created = api.create_task(&project, &new).await.inspect_err(|e| {
            tracing::warn!(project = %project, error = %e, "task creation failed");
        })?;
        self.insert_created(created.clone());
        tracing::info!(task = %created.id, "task created");
        Ok(created)
    }

    /// Applies `patch` to every task in `ids` with one bulk request.
    ///
    /// # Errors
    ///
    /// See [`BulkCoordinator::apply`].
    pub async fn apply_bulk<A: TaskApi>(
        &mut self,
        api: &A,
        ids: &BTreeSet<TaskId>,
        patch: &TaskPatch,
    ) -> Result<BulkOutcome, MutationError> {
        BulkCoordinator::new(api)
            .with_failure_message(self.failure_message.clone())
            .apply(&mut self.tasks, ids, patch)
            .await
    }
}
