//! In-memory [`TaskApi`] for tests and offline use.
//!
//! Behaves like the server's contract: patches are applied field by field
//! and recorded in a per-task history, bulk updates fan out and report
//! per-id results, and unknown ids fail. Every request is logged in
//! [`MemoryApi::calls`] so callers can assert how many round-trips happened.
//! Failures can be injected per task or for the next request.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use taskboard_proto::bulk::{BulkUpdateError, BulkUpdateRequest, BulkUpdateResponse};
use taskboard_proto::history::{ChangeType, HistoryEntry};
use taskboard_proto::patch::{PatchField, TaskPatch};
use taskboard_proto::task::{NewTask, ProjectId, Task, TaskId, TaskUpdate};

use super::{ApiError, TaskApi};

const NOT_FOUND: &str = "Task not found or access denied.";
const UPDATE_FAILED: &str = "UPDATE_FAILED";

/// A request received by [`MemoryApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `PATCH /tasks/{id}`
    Patch(TaskId, TaskPatch),
    /// `PUT /tasks/{id}`
    Update(TaskId, TaskUpdate),
    /// `POST /tasks/bulk-update`
    Bulk(BulkUpdateRequest),
    /// `GET /tasks/{id}/history`
    History(TaskId),
    /// `GET /tasks/projects/{projectId}`
    List(ProjectId),
    /// `POST /tasks/projects/{projectId}`
    Create(ProjectId, NewTask),
}

impl Call {
    /// Returns `true` for requests that mutate tasks.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::History(_) | Self::List(_))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    history: HashMap<TaskId, Vec<HistoryEntry>>,
    failing: HashSet<TaskId>,
    fail_next: Option<(u16, Option<String>)>,
    calls: Vec<Call>,
}

impl MemoryState {
    fn take_injected_failure(&mut self) -> Result<(), ApiError> {
        match self.fail_next.take() {
            Some((status, message)) => Err(ApiError::Status { status, message }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, task: Task) {
        if !self.tasks.contains_key(&task.id) {
            self.order.push(task.id.clone());
        }
        self.tasks.insert(task.id.clone(), task);
    }

    fn task_mut(&mut self, id: &TaskId) -> Result<&mut Task, ApiError> {
        if self.failing.contains(id) {
            return Err(not_found());
        }
        self.tasks.get_mut(id).ok_or_else(not_found)
    }

    fn patch(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let task = self.task_mut(id)?;
        let before = task.clone();
        patch.apply_to(task);
        touch(task);
        let after = task.clone();

        let records = self.history.entry(id.clone()).or_default();
        for field in patch.fields() {
            let entry = history_record(id, field, &before, &after);
            // newest first
            records.insert(0, entry);
        }
        Ok(after)
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: Some(NOT_FOUND.to_string()),
    }
}

fn touch(task: &mut Task) {
    task.version = Some(task.version.unwrap_or(0) + 1);
    task.updated_at = Some(Utc::now().naive_utc());
}

fn field_value(task: &Task, field: PatchField) -> Option<String> {
    match field {
        PatchField::Title => Some(task.title.clone()),
        PatchField::Description => task.description.clone(),
        PatchField::Status => Some(task.status.to_string()),
        PatchField::Priority => Some(task.priority.to_string()),
        PatchField::AssigneeId => task.assignee_id.as_ref().map(ToString::to_string),
        PatchField::StartDate => task.start_date.map(|d| d.to_string()),
        PatchField::DueDate => task.due_date.map(|d| d.to_string()),
        PatchField::Tags => Some(format!("{:?}", task.tags.as_slice())),
        PatchField::CustomFields => serde_json::to_string(&task.custom_fields).ok(),
    }
}

fn history_record(id: &TaskId, field: PatchField, before: &Task, after: &Task) -> HistoryEntry {
    let old_value = field_value(before, field);
    let new_value = field_value(after, field);
    let description = format!(
        "Changed {field} from '{}' to '{}'",
        old_value.as_deref().unwrap_or("null"),
        new_value.as_deref().unwrap_or("null"),
    );
    HistoryEntry {
        id: Uuid::now_v7(),
        task_id: Some(id.clone()),
        field_name: Some(field.as_str().to_string()),
        old_value,
        new_value,
        change_type: ChangeType::Update,
        changed_by: after.last_edited_by.clone(),
        changed_at: after.updated_at,
        description: Some(description),
    }
}

/// In-process task store implementing [`TaskApi`].
#[derive(Debug, Default)]
pub struct MemoryApi {
    state: Mutex<MemoryState>,
}

impl MemoryApi {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock();
            for task in tasks {
                state.insert(task);
            }
        }
        api
    }

    /// Replaces the stored history for a task (newest first).
    pub fn seed_history(&self, id: &TaskId, entries: Vec<HistoryEntry>) {
        self.state.lock().history.insert(id.clone(), entries);
    }

    /// Makes every patch, update and bulk item for `id` fail as not found.
    pub fn fail_task(&self, id: &TaskId) {
        self.state.lock().failing.insert(id.clone());
    }

    /// Makes the next request fail with `status` and an optional message.
    pub fn fail_next(&self, status: u16, message: Option<&str>) {
        self.state.lock().fail_next = Some((status, message.map(String::from)));
    }

    /// The stored version of a task.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.state.lock().tasks.get(id).cloned()
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Number of mutating requests received so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .count()
    }
}

impl TaskApi for MemoryApi {
    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Patch(id.clone(), patch.clone()));
        state.take_injected_failure()?;
        state.patch(id, patch)
    }

    async fn update_task(&self, id: &TaskId, body: &TaskUpdate) -> Result<Task, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Update(id.clone(), body.clone()));
        state.take_injected_failure()?;
        let task = state.task_mut(id)?;
        body.apply_to(task);
        touch(task);
        Ok(task.clone())
    }

    async fn bulk_update(
        &self,
        request: &BulkUpdateRequest,
    ) -> Result<BulkUpdateResponse, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Bulk(request.clone()));
        state.take_injected_failure()?;

        let mut response = BulkUpdateResponse::default();
        for id in &request.task_ids {
            match state.patch(id, &request.updates) {
                Ok(_) => response.successful_updates.push(id.clone()),
                Err(e) => response.failed_updates.push(BulkUpdateError {
                    task_id: id.clone(),
                    error_message: e.server_message().map(String::from),
                    error_code: Some(UPDATE_FAILED.to_string()),
                }),
            }
        }
        response.total_requested = Some(request.task_ids.len());
        response.total_successful = Some(response.successful_updates.len());
        response.total_failed = Some(response.failed_updates.len());
        Ok(response)
    }

    async fn task_history(&self, id: &TaskId) -> Result<Vec<HistoryEntry>, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::History(id.clone()));
        state.take_injected_failure()?;
        if !state.tasks.contains_key(id) {
            return Err(not_found());
        }
        Ok(state.history.get(id).cloned().unwrap_or_default())
    }

    async fn list_tasks(&self, project: &ProjectId) -> Result<Vec<Task>, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::List(project.clone()));
        state.take_injected_failure()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|t| t.project_id.as_ref() == Some(project))
            .cloned()
            .collect())
    }

    async fn create_task(&self, project: &ProjectId, new: &NewTask) -> Result<Task, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Create(project.clone(), new.clone()));
        state.take_injected_failure()?;

        let now = Utc::now().naive_utc();
        let mut task = Task::new(TaskId::new(), new.title.clone());
        task.project_id = Some(project.clone());
        task.description.clone_from(&new.description);
        if let Some(status) = new.status {
            task.status = status;
        }
        if let Some(priority) = new.priority {
            task.priority = priority;
        }
        task.assignee_id.clone_from(&new.assignee_id);
        task.due_date = new.due_date;
        task.created_at = Some(now);
        task.updated_at = Some(now);
        task.version = Some(1);

        state.history.insert(
            task.id.clone(),
            vec![HistoryEntry {
                id: Uuid::now_v7(),
                task_id: Some(task.id.clone()),
                field_name: None,
                old_value: None,
                new_value: None,
                change_type: ChangeType::Create,
                changed_by: None,
                changed_at: Some(now),
                description: Some(format!("Created task '{}'", task.title)),
            }],
        );
        state.insert(task.clone());
        Ok(task)
    }
}
