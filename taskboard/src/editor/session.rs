//! An open task editor wired to a [`TaskApi`].
//!
//! Drives an [`AutoSaveController`] against the server: sends the requests
//! it hands out, feeds the results back, and maps keyboard shortcuts to
//! editor actions.
//!
//! [`EditorSession::save_now`] and [`EditorSession::tick`] hold the session
//! for the whole round-trip. Callers that keep editing while a save is in
//! flight split it into [`EditorSession::begin_save`], a request sent
//! through [`EditorSession::api`], and [`EditorSession::finish_save`].

use tokio::time::Instant;

use taskboard_proto::history::HistoryEntry;
use taskboard_proto::task::Task;

use super::autosave::{
    AutoSaveConfig, AutoSaveController, BeginSave, Completion, IgnoreReason, SaveRequest,
    SaveState, SaveTicket,
};
use super::shortcuts::{EditorCommand, KeyChord, Keymap};
use crate::api::{ApiError, TaskApi};
use crate::tasks::draft::TaskDraft;
use crate::tasks::history::{self, HistoryFilter};

/// What a keyboard command did.
#[derive(Debug)]
pub enum CommandOutcome {
    /// A save ran (or was skipped because nothing changed).
    Saved(Completion),
    /// The draft was discarded.
    Cancelled,
    /// History was fetched.
    History(Result<Vec<HistoryEntry>, ApiError>),
    /// Help overlay is now shown (`true`) or hidden.
    Help(bool),
}

/// An editor session for one task.
pub struct EditorSession<'a, A> {
    api: &'a A,
    controller: AutoSaveController,
    keymap: Keymap,
    show_help: bool,
}

impl<'a, A: TaskApi> EditorSession<'a, A> {
    /// Opens an editor on `task`.
    #[must_use]
    pub fn open(api: &'a A, task: Task, config: AutoSaveConfig) -> Self {
        Self {
            api,
            controller: AutoSaveController::new(task, config),
            keymap: Keymap::editor_default(),
            show_help: false,
        }
    }

    /// Sets the message shown when a failed save carries no server message.
    #[must_use]
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.controller = self.controller.with_failure_message(message);
        self
    }

    /// The underlying state machine.
    #[must_use]
    pub const fn controller(&self) -> &AutoSaveController {
        &self.controller
    }

    /// Current save state.
    #[must_use]
    pub const fn state(&self) -> SaveState {
        self.controller.state()
    }

    /// Whether the shortcut help overlay is shown.
    #[must_use]
    pub const fn help_visible(&self) -> bool {
        self.show_help
    }

    /// The client requests are sent through. The reference outlives the
    /// session borrow, so a request can be awaited while the session is
    /// edited.
    #[must_use]
    pub const fn api(&self) -> &'a A {
        self.api
    }

    /// The keymap in use.
    #[must_use]
    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Mutates the draft.
    pub fn edit(&mut self, mutate: impl FnOnce(&mut TaskDraft)) -> SaveState {
        self.controller.edit(Instant::now(), mutate)
    }

    /// Turns automatic saving on or off.
    pub fn set_auto_save(&mut self, enabled: bool) {
        self.controller.set_auto_save(enabled, Instant::now());
    }

    /// Starts a save without sending it. Send a returned request with
    /// [`TaskApi::patch_task`] and hand the result to
    /// [`EditorSession::finish_save`].
    pub fn begin_save(&mut self) -> BeginSave {
        self.controller.request_save()
    }

    /// Starts the automatic save if the debounce timer is due.
    pub fn due_save(&mut self) -> Option<SaveRequest> {
        self.controller.poll_timer(Instant::now())
    }

    /// Feeds the server's answer for `ticket` back into the session.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<Task, ApiError>,
    ) -> Completion {
        self.controller.complete(ticket, result, Instant::now())
    }

    async fn submit(&mut self, request: SaveRequest) -> Completion {
        let result = self.api.patch_task(&request.task_id, &request.patch).await;
        self.finish_save(request.ticket, result)
    }

    /// Saves immediately, skipping the debounce.
    ///
    /// With no changes nothing is sent and the baseline is returned as
    /// [`Completion::Saved`].
    pub async fn save_now(&mut self) -> Completion {
        match self.begin_save() {
            BeginSave::Request(request) => self.submit(request).await,
            BeginSave::NoChanges(task) => Completion::Saved(task),
            BeginSave::InFlight => Completion::Ignored(IgnoreReason::Superseded),
            BeginSave::Closed => Completion::Ignored(IgnoreReason::SessionClosed),
        }
    }

    /// Runs the automatic save if the debounce timer is due.
    pub async fn tick(&mut self) -> Option<Completion> {
        let request = self.due_save()?;
        Some(self.submit(request).await)
    }

    /// Sleeps until the pending automatic save is due, then runs it.
    ///
    /// Returns `None` immediately when no save is scheduled.
    pub async fn wait_and_save(&mut self) -> Option<Completion> {
        let deadline = self.controller.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.tick().await
    }

    /// Discards the draft.
    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// Fetches this task's history (newest first) and applies `filter`.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] if the request fails.
    pub async fn history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, ApiError> {
        let id = &self.controller.baseline().id;
        let entries = self.api.task_history(id).await?;
        Ok(history::filter(&entries, filter).into_iter().cloned().collect())
    }

    /// Handles a key press. Returns `None` when the chord is unbound or
    /// focus is in a text input.
    pub async fn handle_key(
        &mut self,
        chord: &KeyChord,
        in_text_input: bool,
    ) -> Option<CommandOutcome> {
        let command = self.keymap.resolve(chord, in_text_input)?;
        Some(self.perform(command).await)
    }

    /// Runs an editor command.
    pub async fn perform(&mut self, command: EditorCommand) -> CommandOutcome {
        match command {
            EditorCommand::Save => CommandOutcome::Saved(self.save_now().await),
            EditorCommand::Cancel => {
                self.cancel();
                CommandOutcome::Cancelled
            }
            EditorCommand::ShowHistory => {
                CommandOutcome::History(self.history(&HistoryFilter::All).await)
            }
            EditorCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                CommandOutcome::Help(self.show_help)
            }
        }
    }
}
