//! Integration tests for bulk edits: partial failure, per-task messages,
//! validation before sending, and rejection of malformed responses.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeSet;

use taskboard::api::memory::{Call, MemoryApi};
use taskboard::api::{ApiError, TaskApi};
use taskboard::outcome::RequestOutcome;
use taskboard::tasks::{MutationError, ShapeViolation, TaskBoard, ValidationError};
use taskboard_proto::bulk::{BulkUpdateRequest, BulkUpdateResponse};
use taskboard_proto::history::HistoryEntry;
use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{NewTask, Priority, ProjectId, Task, TaskId, TaskUpdate};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

const FALLBACK: &str = "Failed to update task";

/// `n` low-priority tasks.
fn make_tasks(n: usize) -> Vec<Task> {
    (0..n)
        .map(|i| {
            let mut task = Task::new(TaskId::new(), format!("task {i}"));
            task.priority = Priority::Low;
            task
        })
        .collect()
}

fn high_priority() -> TaskPatch {
    TaskPatch {
        priority: Some(Priority::High),
        ..TaskPatch::default()
    }
}

fn id_set(tasks: &[Task]) -> BTreeSet<TaskId> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

/// An API whose bulk endpoint always answers with a fixed response.
struct FixedBulkApi {
    response: BulkUpdateResponse,
}

impl TaskApi for FixedBulkApi {
    async fn patch_task(&self, _id: &TaskId, _patch: &TaskPatch) -> Result<Task, ApiError> {
        Err(ApiError::Transport("not used".to_string()))
    }

    async fn update_task(&self, _id: &TaskId, _body: &TaskUpdate) -> Result<Task, ApiError> {
        Err(ApiError::Transport("not used".to_string()))
    }

    async fn bulk_update(
        &self,
        _request: &BulkUpdateRequest,
    ) -> Result<BulkUpdateResponse, ApiError> {
        Ok(self.response.clone())
    }

    async fn task_history(&self, _id: &TaskId) -> Result<Vec<HistoryEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn list_tasks(&self, _project: &ProjectId) -> Result<Vec<Task>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_task(&self, _project: &ProjectId, _task: &NewTask) -> Result<Task, ApiError> {
        Err(ApiError::Transport("not used".to_string()))
    }
}

// ===========================================================================
// Partial success
// ===========================================================================

#[tokio::test]
async fn partial_failure_updates_only_succeeded_tasks() {
    let tasks = make_tasks(5);
    let api = MemoryApi::with_tasks(tasks.iter().cloned());
    api.fail_task(&tasks[1].id);
    api.fail_task(&tasks[3].id);
    let mut board = TaskBoard::new(tasks.clone());

    let outcome = board
        .apply_bulk(&api, &id_set(&tasks), &high_priority())
        .await
        .unwrap();

    assert_eq!(outcome.total_requested, 5);
    assert_eq!(outcome.total_successful, 3);
    assert_eq!(outcome.total_failed, 2);
    assert!(!outcome.is_complete_success());
    let expected: BTreeSet<TaskId> = [tasks[1].id.clone(), tasks[3].id.clone()].into();
    assert_eq!(outcome.failed_ids(), expected);
    for failure in &outcome.failures {
        assert_eq!(failure.message, "Task not found or access denied.");
        assert_eq!(failure.code.as_deref(), Some("UPDATE_FAILED"));
    }

    let high = board
        .tasks()
        .iter()
        .filter(|t| t.priority == Priority::High)
        .count();
    assert_eq!(high, 3);
    assert_eq!(board.get(&tasks[1].id).unwrap().priority, Priority::Low);
    assert_eq!(board.get(&tasks[3].id).unwrap().priority, Priority::Low);

    // one request for the whole selection
    assert_eq!(api.calls().len(), 1);
    assert!(matches!(&api.calls()[0], Call::Bulk(r) if r.task_ids.len() == 5));

    let shown = RequestOutcome::from_bulk(Ok(outcome), FALLBACK);
    assert!(matches!(shown, RequestOutcome::Partial(ref o) if o.total_failed == 2));
}

#[tokio::test]
async fn full_success_is_reported_as_success() {
    let tasks = make_tasks(3);
    let api = MemoryApi::with_tasks(tasks.iter().cloned());
    let mut board = TaskBoard::new(tasks.clone());

    let result = board
        .apply_bulk(&api, &id_set(&tasks), &high_priority())
        .await;
    let shown = RequestOutcome::from_bulk(result, FALLBACK);

    let RequestOutcome::Success(outcome) = shown else {
        panic!("expected success, got {shown:?}");
    };
    assert!(outcome.failures.is_empty());
    assert!(board.tasks().iter().all(|t| t.priority == Priority::High));
    for task in &tasks {
        assert_eq!(api.task(&task.id).unwrap().priority, Priority::High);
    }
}

#[tokio::test]
async fn unknown_ids_in_selection_fail_individually() {
    let tasks = make_tasks(2);
    let api = MemoryApi::with_tasks(tasks.iter().cloned());
    let mut board = TaskBoard::new(tasks.clone());
    let stranger = TaskId::new();
    let mut ids = id_set(&tasks);
    ids.insert(stranger.clone());

    let outcome = board.apply_bulk(&api, &ids, &high_priority()).await.unwrap();
    assert_eq!(outcome.total_successful, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].id, stranger);
    assert_eq!(board.tasks().len(), 2);
}

// ===========================================================================
// Validation and transport errors
// ===========================================================================

#[tokio::test]
async fn empty_selection_or_patch_sends_nothing() {
    let tasks = make_tasks(2);
    let api = MemoryApi::with_tasks(tasks.iter().cloned());
    let mut board = TaskBoard::new(tasks.clone());

    let err = board
        .apply_bulk(&api, &BTreeSet::new(), &high_priority())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MutationError::Validation(ValidationError::NoTasksSelected)
    ));

    let err = board
        .apply_bulk(&api, &id_set(&tasks), &TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MutationError::Validation(ValidationError::EmptyPatch)
    ));

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn request_failure_changes_nothing() {
    let tasks = make_tasks(2);
    let api = MemoryApi::with_tasks(tasks.iter().cloned());
    let mut board = TaskBoard::new(tasks.clone());
    api.fail_next(500, None);

    let result = board
        .apply_bulk(&api, &id_set(&tasks), &high_priority())
        .await;
    let shown = RequestOutcome::from_bulk(result, FALLBACK);
    assert_eq!(shown, RequestOutcome::Transport(FALLBACK.to_string()));
    assert!(board.tasks().iter().all(|t| t.priority == Priority::Low));
}

// ===========================================================================
// Malformed responses
// ===========================================================================

#[tokio::test]
async fn response_missing_ids_is_rejected() {
    let tasks = make_tasks(3);
    let api = FixedBulkApi {
        response: BulkUpdateResponse {
            successful_updates: vec![tasks[0].id.clone()],
            ..BulkUpdateResponse::default()
        },
    };
    let mut board = TaskBoard::new(tasks.clone());

    let err = board
        .apply_bulk(&api, &id_set(&tasks), &high_priority())
        .await
        .unwrap_err();
    let MutationError::Shape(ShapeViolation::Missing(missing)) = err else {
        panic!("expected missing ids, got {err:?}");
    };
    assert_eq!(missing.len(), 2);
    assert!(board.tasks().iter().all(|t| t.priority == Priority::Low));
}

#[tokio::test]
async fn response_with_wrong_totals_is_rejected() {
    let tasks = make_tasks(1);
    let api = FixedBulkApi {
        response: BulkUpdateResponse {
            successful_updates: vec![tasks[0].id.clone()],
            total_successful: Some(2),
            ..BulkUpdateResponse::default()
        },
    };
    let mut board = TaskBoard::new(tasks.clone());

    let result = board
        .apply_bulk(&api, &id_set(&tasks), &high_priority())
        .await;
    assert!(matches!(
        RequestOutcome::from_bulk(result, FALLBACK),
        RequestOutcome::Shape(ShapeViolation::TotalMismatch {
            field: "totalSuccessful",
            reported: 2,
            actual: 1,
        })
    ));
    assert_eq!(board.tasks()[0].priority, Priority::Low);
}
