//! Integration tests for editor auto-save: debounce timing, edits made while
//! a save is in flight, cancellation and stale completions.
//!
//! The controller is driven by hand with explicit instants so that request
//! and response can be interleaved; the session tests run on tokio's paused
//! clock.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use taskboard::api::memory::{Call, MemoryApi};
use taskboard::api::{ApiError, TaskApi};
use taskboard::editor::{
    AutoSaveConfig, AutoSaveController, BeginSave, Completion, EditorSession, IgnoreReason,
    SaveRequest, SaveState,
};
use taskboard_proto::bulk::{BulkUpdateRequest, BulkUpdateResponse};
use taskboard_proto::history::HistoryEntry;
use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{NewTask, Priority, ProjectId, Task, TaskId, TaskUpdate};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// A stored task and a store that knows it.
fn seeded(title: &str) -> (MemoryApi, Task) {
    let task = Task::new(TaskId::new(), title);
    (MemoryApi::with_tasks([task.clone()]), task)
}

/// Asks for a save and unwraps the request.
fn begin(controller: &mut AutoSaveController) -> SaveRequest {
    match controller.request_save() {
        BeginSave::Request(request) => request,
        other => panic!("expected a request, got {other:?}"),
    }
}

const DELAY: Duration = Duration::from_millis(2000);

/// A store whose patches wait until [`GatedApi::release`] is called.
struct GatedApi {
    store: MemoryApi,
    gate: Notify,
}

impl GatedApi {
    fn new(task: Task) -> Self {
        Self {
            store: MemoryApi::with_tasks([task]),
            gate: Notify::new(),
        }
    }

    /// Lets one waiting (or the next) patch through.
    fn release(&self) {
        self.gate.notify_one();
    }
}

impl TaskApi for GatedApi {
    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.gate.notified().await;
        self.store.patch_task(id, patch).await
    }

    async fn update_task(&self, id: &TaskId, body: &TaskUpdate) -> Result<Task, ApiError> {
        self.store.update_task(id, body).await
    }

    async fn bulk_update(
        &self,
        request: &BulkUpdateRequest,
    ) -> Result<BulkUpdateResponse, ApiError> {
        self.store.bulk_update(request).await
    }

    async fn task_history(&self, id: &TaskId) -> Result<Vec<HistoryEntry>, ApiError> {
        self.store.task_history(id).await
    }

    async fn list_tasks(&self, project: &ProjectId) -> Result<Vec<Task>, ApiError> {
        self.store.list_tasks(project).await
    }

    async fn create_task(&self, project: &ProjectId, new: &NewTask) -> Result<Task, ApiError> {
        self.store.create_task(project, new).await
    }
}

// ===========================================================================
// Edits while a save is in flight
// ===========================================================================

#[tokio::test]
async fn edit_during_flight_survives_the_response() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default());
    let t0 = Instant::now();

    controller.edit(t0, |d| d.title = "First".to_string());
    let request = begin(&mut controller);
    assert_eq!(controller.state(), SaveState::Saving);

    // user keeps typing before the response arrives
    assert_eq!(
        controller.edit(t0, |d| d.title = "Second".to_string()),
        SaveState::Saving
    );

    let result = api.patch_task(&request.task_id, &request.patch).await;
    let done = controller.complete(request.ticket, result, t0 + Duration::from_millis(300));

    let Completion::SavedWithPendingEdits(saved) = done else {
        panic!("expected pending edits, got {done:?}");
    };
    assert_eq!(saved.title, "First");
    assert_eq!(controller.baseline().title, "First");
    assert_eq!(controller.draft().unwrap().title, "Second");
    assert_eq!(controller.state(), SaveState::Dirty);
    assert_eq!(controller.pending_patch().title.as_deref(), Some("Second"));
    assert_eq!(
        controller.deadline(),
        Some(t0 + Duration::from_millis(300) + DELAY)
    );
}

#[tokio::test]
async fn unrelated_field_edited_in_flight_is_kept() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default());
    let t0 = Instant::now();

    controller.edit(t0, |d| d.title = "Renamed".to_string());
    let request = begin(&mut controller);
    controller.edit(t0, |d| d.priority = Priority::High);

    let result = api.patch_task(&request.task_id, &request.patch).await;
    controller.complete(request.ticket, result, t0);

    let draft = controller.draft().unwrap();
    assert_eq!(draft.title, "Renamed");
    assert_eq!(draft.priority, Priority::High);
    let pending = controller.pending_patch();
    assert_eq!(pending.fields().len(), 1);
    assert_eq!(pending.priority, Some(Priority::High));
}

#[tokio::test]
async fn manual_save_while_saving_is_refused() {
    let (_api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default());
    controller.edit(Instant::now(), |d| d.title = "Once".to_string());

    let _request = begin(&mut controller);
    assert_eq!(controller.request_save(), BeginSave::InFlight);
    assert_eq!(controller.poll_timer(Instant::now() + DELAY * 2), None);
}

// ===========================================================================
// Cancellation and stale responses
// ===========================================================================

#[tokio::test]
async fn cancel_during_flight_detaches_the_result() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task.clone(), AutoSaveConfig::default());
    let t0 = Instant::now();

    controller.edit(t0, |d| d.title = "Kept on server".to_string());
    let request = begin(&mut controller);
    controller.cancel();
    assert!(!controller.is_open());

    let result = api.patch_task(&request.task_id, &request.patch).await;
    let done = controller.complete(request.ticket, result, t0);

    let Completion::Detached(confirmed) = done else {
        panic!("expected a detached completion, got {done:?}");
    };
    assert_eq!(confirmed.title, "Kept on server");
    assert_eq!(controller.baseline().title, "Original");
    assert_eq!(controller.state(), SaveState::Clean);
}

#[tokio::test]
async fn failed_save_after_cancel_is_ignored() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default());
    controller.edit(Instant::now(), |d| d.title = "Lost".to_string());
    let request = begin(&mut controller);
    controller.cancel();

    api.fail_next(503, None);
    let result = api.patch_task(&request.task_id, &request.patch).await;
    let done = controller.complete(request.ticket, result, Instant::now());
    assert_eq!(done, Completion::Ignored(IgnoreReason::SessionClosed));
    assert_eq!(controller.last_error(), None);
}

#[tokio::test]
async fn repeated_completion_is_stale() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default());
    controller.edit(Instant::now(), |d| d.title = "Twice".to_string());
    let request = begin(&mut controller);

    let result = api.patch_task(&request.task_id, &request.patch).await;
    let first = controller.complete(request.ticket, result, Instant::now());
    let Completion::Saved(saved) = first else {
        panic!("expected a save, got {first:?}");
    };

    let second = controller.complete(request.ticket, Ok(saved), Instant::now());
    assert_eq!(second, Completion::Ignored(IgnoreReason::Superseded));
    assert_eq!(controller.state(), SaveState::Clean);
}

// ===========================================================================
// Failures
// ===========================================================================

#[tokio::test]
async fn failure_keeps_draft_and_next_edit_recovers() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default())
        .with_failure_message("Could not save");
    let t0 = Instant::now();

    controller.edit(t0, |d| d.title = "Unsaved".to_string());
    let request = begin(&mut controller);
    api.fail_next(500, None);
    let result = api.patch_task(&request.task_id, &request.patch).await;

    let done = controller.complete(request.ticket, result, t0);
    assert_eq!(done, Completion::Failed("Could not save".to_string()));
    assert_eq!(controller.state(), SaveState::Error);
    assert_eq!(controller.last_error(), Some("Could not save"));
    assert_eq!(controller.draft().unwrap().title, "Unsaved");
    assert_eq!(controller.baseline().title, "Original");

    assert_eq!(
        controller.edit(t0, |d| d.title = "Unsaved!".to_string()),
        SaveState::Dirty
    );
    let retry = begin(&mut controller);
    let result = api.patch_task(&retry.task_id, &retry.patch).await;
    assert!(matches!(
        controller.complete(retry.ticket, result, t0),
        Completion::Saved(ref t) if t.title == "Unsaved!"
    ));
    assert_eq!(controller.last_error(), None);
}

#[tokio::test]
async fn server_message_wins_over_fallback() {
    let (api, task) = seeded("Original");
    let mut controller = AutoSaveController::new(task, AutoSaveConfig::default());
    controller.edit(Instant::now(), |d| d.title = "x".to_string());
    let request = begin(&mut controller);

    api.fail_next(409, Some("Task was modified by another user"));
    let result = api.patch_task(&request.task_id, &request.patch).await;
    assert_eq!(
        controller.complete(request.ticket, result, Instant::now()),
        Completion::Failed("Task was modified by another user".to_string())
    );
}

#[tokio::test]
async fn session_keeps_typing_while_the_request_waits() {
    let task = Task::new(TaskId::new(), "Original");
    let api = GatedApi::new(task.clone());
    let mut session = EditorSession::open(&api, task, AutoSaveConfig::default());
    session.edit(|d| d.title = "Sent".to_string());

    let BeginSave::Request(request) = session.begin_save() else {
        panic!("expected a request");
    };
    let client = session.api();
    let (result, state) = tokio::join!(
        client.patch_task(&request.task_id, &request.patch),
        async {
            let state = session.edit(|d| d.title = "Typed in flight".to_string());
            api.release();
            state
        },
    );
    assert_eq!(state, SaveState::Saving);

    let done = session.finish_save(request.ticket, result);
    assert!(matches!(done, Completion::SavedWithPendingEdits(ref t) if t.title == "Sent"));
    assert_eq!(session.state(), SaveState::Dirty);

    // the follow-up save carries only the in-flight edit
    api.release();
    let done = session.save_now().await;
    assert!(matches!(done, Completion::Saved(ref t) if t.title == "Typed in flight"));
    let calls = api.store.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[1], Call::Patch(_, p) if p.title.as_deref() == Some("Typed in flight")));
}

// ===========================================================================
// Debounce on the paused clock
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn typing_restarts_the_debounce() {
    let (api, task) = seeded("Original");
    let mut session = EditorSession::open(&api, task, AutoSaveConfig::default());

    session.edit(|d| d.title = "T".to_string());
    tokio::time::advance(Duration::from_millis(1500)).await;
    session.edit(|d| d.title = "Ty".to_string());
    tokio::time::advance(Duration::from_millis(1500)).await;

    assert!(session.tick().await.is_none());
    assert!(api.calls().is_empty());

    tokio::time::advance(Duration::from_millis(500)).await;
    let done = session.tick().await;
    assert!(matches!(done, Some(Completion::Saved(ref t)) if t.title == "Ty"));

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::Patch(_, p) if p.title.as_deref() == Some("Ty")));
}

#[tokio::test(start_paused = true)]
async fn disabled_autosave_never_fires() {
    let (api, task) = seeded("Original");
    let config = AutoSaveConfig {
        enabled: false,
        ..AutoSaveConfig::default()
    };
    let mut session = EditorSession::open(&api, task, config);

    session.edit(|d| d.title = "Manual only".to_string());
    tokio::time::advance(DELAY * 5).await;
    assert!(session.tick().await.is_none());
    assert!(session.wait_and_save().await.is_none());
    assert_eq!(session.state(), SaveState::Dirty);

    assert!(matches!(session.save_now().await, Completion::Saved(_)));
    assert_eq!(api.mutation_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn reverting_an_edit_cancels_the_pending_save() {
    let (api, task) = seeded("Original");
    let mut session = EditorSession::open(&api, task, AutoSaveConfig::default());

    session.edit(|d| d.title = "Changed".to_string());
    assert_eq!(session.state(), SaveState::Dirty);
    assert_eq!(
        session.edit(|d| d.title = "Original".to_string()),
        SaveState::Clean
    );

    tokio::time::advance(DELAY * 2).await;
    assert!(session.tick().await.is_none());
    assert!(api.calls().is_empty());
}
