//! Integration tests for the board: loading, drag-and-drop moves, task
//! creation, editor saves and history lookups against the in-memory API.
//!
//! Every test counts round-trips through `MemoryApi::calls` to check that
//! no-op gestures never reach the server.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use uuid::Uuid;

use taskboard::api::TaskApi;
use taskboard::api::memory::{Call, MemoryApi};
use taskboard::editor::{AutoSaveConfig, Completion, EditorSession};
use taskboard::tasks::history::{self, HistoryFilter};
use taskboard::tasks::{DropOutcome, MutationError, TaskBoard, ValidationError};
use taskboard_proto::history::{ChangeType, HistoryEntry};
use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{NewTask, Priority, ProjectId, Task, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Creates a task in `status` with a fresh id.
fn make_task(title: &str, status: TaskStatus) -> Task {
    let mut task = Task::new(TaskId::new(), title);
    task.status = status;
    task.priority = Priority::Medium;
    task
}

/// Builds a board and a store holding the same tasks.
fn make_board(tasks: &[Task]) -> (TaskBoard, MemoryApi) {
    let api = MemoryApi::with_tasks(tasks.iter().cloned());
    (TaskBoard::new(tasks.to_vec()), api)
}

/// A server-written history record.
fn record(task: &TaskId, change_type: ChangeType, description: &str) -> HistoryEntry {
    HistoryEntry {
        id: Uuid::now_v7(),
        task_id: Some(task.clone()),
        field_name: None,
        old_value: None,
        new_value: None,
        change_type,
        changed_by: None,
        changed_at: None,
        description: Some(description.to_string()),
    }
}

// ===========================================================================
// Loading
// ===========================================================================

#[tokio::test]
async fn load_lists_only_the_project_tasks() {
    let project = ProjectId::new();
    let mut first = make_task("first", TaskStatus::Todo);
    first.project_id = Some(project.clone());
    let mut second = make_task("second", TaskStatus::Done);
    second.project_id = Some(project.clone());
    let mut other = make_task("other", TaskStatus::Todo);
    other.project_id = Some(ProjectId::new());
    let api = MemoryApi::with_tasks([first.clone(), other, second.clone()]);

    let mut board = TaskBoard::load(&api, project.clone()).await.unwrap();
    let titles: Vec<&str> = board.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["first", "second"]);
    assert_eq!(board.column(TaskStatus::Done)[0].id, second.id);
    assert_eq!(api.mutation_count(), 0);

    // the loaded board is bound to its project
    let created = board
        .create_task(&api, NewTask::titled("third"))
        .await
        .unwrap();
    assert_eq!(created.project_id, Some(project));
    assert_eq!(board.tasks().len(), 3);
}

// ===========================================================================
// Drag and drop
// ===========================================================================

#[tokio::test]
async fn drop_on_other_column_sends_one_update() {
    let todo = make_task("Write docs", TaskStatus::Todo);
    let (mut board, api) = make_board(&[todo.clone()]);

    let outcome = board.move_task(&api, &todo.id, "DONE").await.unwrap();

    let DropOutcome::Moved(moved) = outcome else {
        panic!("expected a move, got {outcome:?}");
    };
    assert_eq!(moved.status, TaskStatus::Done);
    assert_eq!(board.get(&todo.id).unwrap().status, TaskStatus::Done);

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    let Call::Update(id, body) = &calls[0] else {
        panic!("expected a PUT, got {:?}", calls[0]);
    };
    assert_eq!(id, &todo.id);
    assert_eq!(body.status, TaskStatus::Done);
    assert_eq!(body.title, "Write docs");
    assert_eq!(body.priority, Priority::Medium);
}

#[tokio::test]
async fn drop_on_task_adopts_its_column() {
    let todo = make_task("Dragged", TaskStatus::Todo);
    let target = make_task("Target", TaskStatus::InProgress);
    let (mut board, api) = make_board(&[todo.clone(), target.clone()]);

    let outcome = board
        .move_task(&api, &todo.id, &target.id.to_string())
        .await
        .unwrap();

    assert!(matches!(outcome, DropOutcome::Moved(ref t) if t.status == TaskStatus::InProgress));
    assert_eq!(api.mutation_count(), 1);
    assert_eq!(board.column(TaskStatus::InProgress).len(), 2);
    assert!(board.column(TaskStatus::Todo).is_empty());
}

#[tokio::test]
async fn drop_on_same_column_task_sends_nothing() {
    let a = make_task("a", TaskStatus::Todo);
    let b = make_task("b", TaskStatus::Todo);
    let (mut board, api) = make_board(&[a.clone(), b.clone()]);

    let outcome = board.move_task(&api, &a.id, &b.id.to_string()).await.unwrap();
    assert_eq!(outcome, DropOutcome::Unchanged);

    let outcome = board.move_task(&api, &a.id, "TODO").await.unwrap();
    assert_eq!(outcome, DropOutcome::Unchanged);

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn unknown_target_sends_nothing() {
    let a = make_task("a", TaskStatus::Todo);
    let (mut board, api) = make_board(&[a.clone()]);

    let stranger = TaskId::new().to_string();
    for target in ["BACKLOG", "done", "", stranger.as_str()] {
        let outcome = board.move_task(&api, &a.id, target).await.unwrap();
        assert_eq!(outcome, DropOutcome::Unresolved, "target {target:?}");
    }

    assert!(api.calls().is_empty());
    assert_eq!(board.get(&a.id).unwrap().status, TaskStatus::Todo);
}

#[tokio::test]
async fn dragging_an_unheld_task_is_rejected() {
    let a = make_task("a", TaskStatus::Todo);
    let (mut board, api) = make_board(&[a.clone()]);

    let missing = TaskId::new();
    let err = board.move_task(&api, &missing, "DONE").await.unwrap_err();
    assert!(matches!(
        err,
        MutationError::Validation(ValidationError::TaskNotFound(ref id)) if *id == missing
    ));
    assert_eq!(
        err.user_message("Failed to update task"),
        format!("task not found: {missing}")
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn failed_move_leaves_task_in_place() {
    let a = make_task("a", TaskStatus::Todo);
    let (mut board, api) = make_board(&[a.clone()]);
    api.fail_next(500, Some("Database unavailable"));

    let err = board.move_task(&api, &a.id, "DONE").await.unwrap_err();
    assert_eq!(err.user_message("Failed to update task"), "Database unavailable");
    assert_eq!(board.get(&a.id).unwrap().status, TaskStatus::Todo);
    assert_eq!(api.mutation_count(), 1);
}

// ===========================================================================
// Creation
// ===========================================================================

#[tokio::test]
async fn create_appends_and_lands_in_column() {
    let existing = make_task("existing", TaskStatus::Todo);
    let project = ProjectId::new();
    let (board, api) = make_board(&[existing]);
    let mut board = board.with_project(project.clone());

    let mut new = NewTask::titled("  Plan sprint  ");
    new.status = Some(TaskStatus::InProgress);
    let created = board.create_task(&api, new).await.unwrap();

    assert_eq!(created.title, "Plan sprint");
    assert_eq!(created.project_id.as_ref(), Some(&project));
    assert_eq!(board.tasks().len(), 2);
    assert_eq!(board.tasks()[1].id, created.id);

    let columns = board.columns();
    let statuses: Vec<TaskStatus> = columns.iter().map(|(s, _)| *s).collect();
    assert_eq!(statuses, TaskStatus::ALL.to_vec());
    assert_eq!(columns[1].1.len(), 1);
    assert_eq!(columns[1].1[0].title, "Plan sprint");
}

#[tokio::test]
async fn create_validates_before_sending() {
    let api = MemoryApi::new();
    let mut board = TaskBoard::new(Vec::new());

    let err = board
        .create_task(&api, NewTask::titled("No project"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MutationError::Validation(ValidationError::NoProject)
    ));

    let mut board = board.with_project(ProjectId::new());
    let err = board
        .create_task(&api, NewTask::titled("   "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MutationError::Validation(ValidationError::TitleEmpty)
    ));
    assert!(api.calls().is_empty());
}

// ===========================================================================
// Editor saves
// ===========================================================================

#[tokio::test]
async fn editor_save_reaches_the_board() {
    let left = make_task("left", TaskStatus::Todo);
    let edited = make_task("edited", TaskStatus::Todo);
    let right = make_task("right", TaskStatus::Done);
    let (mut board, api) = make_board(&[left.clone(), edited.clone(), right.clone()]);

    let mut session = EditorSession::open(&api, edited.clone(), AutoSaveConfig::default());
    session.edit(|d| d.title = "edited and saved".to_string());
    let done = session.save_now().await;
    assert!(matches!(done, Completion::Saved(_)));

    assert!(board.apply_completion(&done));
    assert_eq!(board.get(&edited.id).unwrap().title, "edited and saved");
    assert_eq!(board.tasks()[1].id, edited.id);
    assert_eq!(board.get(&left.id).unwrap(), &left);
    assert_eq!(board.get(&right.id).unwrap(), &right);
}

#[tokio::test]
async fn failed_editor_save_leaves_the_board() {
    let task = make_task("kept", TaskStatus::Todo);
    let (mut board, api) = make_board(&[task.clone()]);
    api.fail_next(409, Some("Task was modified by another user"));

    let mut session = EditorSession::open(&api, task.clone(), AutoSaveConfig::default());
    session.edit(|d| d.title = "lost".to_string());
    let done = session.save_now().await;

    assert!(!board.apply_completion(&done));
    assert_eq!(board.get(&task.id).unwrap(), &task);
}

// ===========================================================================
// History
// ===========================================================================

#[tokio::test]
async fn seeded_history_filters_through_the_editor() {
    let task = make_task("Tracked", TaskStatus::Todo);
    let api = MemoryApi::with_tasks([task.clone()]);
    api.seed_history(
        &task.id,
        vec![
            record(&task.id, ChangeType::from_wire("LABEL_ADDED"), "Added label 'urgent'"),
            record(&task.id, ChangeType::CommentAdded, "Commented"),
            record(&task.id, ChangeType::from_wire("OTHER"), "Imported"),
            record(&task.id, ChangeType::Create, "Created task 'Tracked'"),
        ],
    );
    let session = EditorSession::open(&api, task, AutoSaveConfig::default());

    let all = session.history(&HistoryFilter::All).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].change_type.as_str(), "LABEL_ADDED");

    let comments = session
        .history(&HistoryFilter::Only(ChangeType::CommentAdded))
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(history::describe(&comments[0]), "Commented");

    let other = session
        .history(&HistoryFilter::Only(ChangeType::Other))
        .await
        .unwrap();
    let described: Vec<String> = other.iter().map(history::describe).collect();
    assert_eq!(described, ["Added label 'urgent'", "Imported"]);
    assert_eq!(other[1].change_type, ChangeType::Other);
}

#[tokio::test]
async fn patch_history_is_newest_first_and_filterable() {
    let task = make_task("Tracked", TaskStatus::Todo);
    let api = MemoryApi::with_tasks([task.clone()]);

    let first = TaskPatch {
        priority: Some(Priority::High),
        ..TaskPatch::default()
    };
    api.patch_task(&task.id, &first).await.unwrap();
    let second = TaskPatch {
        title: Some("Tracked (renamed)".to_string()),
        ..TaskPatch::default()
    };
    api.patch_task(&task.id, &second).await.unwrap();

    let entries = api.task_history(&task.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].field_name.as_deref(), Some("title"));
    assert_eq!(entries[1].field_name.as_deref(), Some("priority"));
    assert_eq!(
        history::describe(&entries[1]),
        "Changed priority from 'MEDIUM' to 'HIGH'"
    );

    let updates = history::filter(&entries, &HistoryFilter::Only(ChangeType::Update));
    assert_eq!(updates.len(), 2);
    let creates = history::filter(&entries, &HistoryFilter::Only(ChangeType::Create));
    assert!(creates.is_empty());
}
