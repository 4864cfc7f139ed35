//! Auto-save state machine for one editor session.
//!
//! ```text
//! CLEAN --edit--> DIRTY --timer/manual--> SAVING --ok, no edits--> CLEAN
//!                   ^                        |--ok, edits in flight--> DIRTY
//!                   |                        '--failed--> ERROR
//!                   '--------edit / manual save--------------'
//! ```
//!
//! The controller performs no I/O. [`AutoSaveController::request_save`] and
//! [`AutoSaveController::poll_timer`] hand out a [`SaveRequest`]; the caller
//! sends it and reports back through [`AutoSaveController::complete`] with
//! the request's ticket. A completion whose ticket is not the one in flight
//! is ignored.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::{Task, TaskId};

use super::timer::DebounceTimer;
use crate::api::ApiError;
use crate::outcome::DEFAULT_FAILURE_MESSAGE;
use crate::tasks::draft::TaskDraft;
use crate::tasks::patch::diff;

/// Default debounce delay between the last edit and an automatic save.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// Auto-save behaviour for an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// Whether the debounce timer triggers saves.
    pub enabled: bool,
    /// Quiet period after the last edit before saving.
    pub delay: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }
}

/// Where an editor session is in its save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveState {
    /// Draft matches the baseline.
    Clean,
    /// Draft has unsaved changes.
    Dirty,
    /// A save is in flight.
    Saving,
    /// The last save failed; the draft is kept.
    Error,
}

/// Identifies one save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveTicket(u64);

/// A patch ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Pass back to [`AutoSaveController::complete`].
    pub ticket: SaveTicket,
    /// Task being saved.
    pub task_id: TaskId,
    /// Non-empty change set.
    pub patch: TaskPatch,
}

/// Result of asking to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginSave {
    /// Send this request.
    Request(SaveRequest),
    /// Nothing changed; the baseline is the saved result.
    NoChanges(Task),
    /// A save is already in flight.
    InFlight,
    /// The session was cancelled.
    Closed,
}

/// Why a completion was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The ticket is not the one in flight.
    Superseded,
    /// The session was cancelled and the save failed.
    SessionClosed,
}

/// What a finished save did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Saved; the session is clean.
    Saved(Task),
    /// Saved, but edits made in flight keep the session dirty.
    SavedWithPendingEdits(Task),
    /// The save failed; holds the message to show.
    Failed(String),
    /// The session was cancelled while saving but the server accepted the
    /// change. The record is not merged into the session.
    Detached(Task),
    /// Not applied.
    Ignored(IgnoreReason),
}

impl Completion {
    /// The server-confirmed record, if this completion carries one.
    #[must_use]
    pub const fn confirmed(&self) -> Option<&Task> {
        match self {
            Self::Saved(t) | Self::SavedWithPendingEdits(t) | Self::Detached(t) => Some(t),
            Self::Failed(_) | Self::Ignored(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: SaveTicket,
    revision: u64,
    sent: TaskDraft,
}

/// Debounce, in-flight and staleness tracking for one task's editor.
#[derive(Debug, Clone)]
pub struct AutoSaveController {
    baseline: Task,
    draft: Option<TaskDraft>,
    state: SaveState,
    revision: u64,
    next_ticket: u64,
    in_flight: Option<InFlight>,
    timer: DebounceTimer,
    auto_save: bool,
    last_saved: Option<DateTime<Utc>>,
    last_error: Option<String>,
    failure_message: String,
}

impl AutoSaveController {
    /// Opens a session on `baseline`.
    #[must_use]
    pub fn new(baseline: Task, config: AutoSaveConfig) -> Self {
        let draft = TaskDraft::from_task(&baseline);
        Self {
            baseline,
            draft: Some(draft),
            state: SaveState::Clean,
            revision: 0,
            next_ticket: 0,
            in_flight: None,
            timer: DebounceTimer::new(config.delay),
            auto_save: config.enabled,
            last_saved: None,
            last_error: None,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Sets the message shown when a failed save carries no server message.
    #[must_use]
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SaveState {
        self.state
    }

    /// Last server-confirmed record.
    #[must_use]
    pub const fn baseline(&self) -> &Task {
        &self.baseline
    }

    /// The working copy, or `None` once cancelled.
    #[must_use]
    pub const fn draft(&self) -> Option<&TaskDraft> {
        self.draft.as_ref()
    }

    /// Returns `true` until the session is cancelled.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// When the last save succeeded.
    #[must_use]
    pub const fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Message of the last failed save, cleared by the next edit or success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the debounce timer triggers saves.
    #[must_use]
    pub const fn auto_save(&self) -> bool {
        self.auto_save
    }

    /// When the pending automatic save is due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// The change set the draft currently implies.
    #[must_use]
    pub fn pending_patch(&self) -> TaskPatch {
        self.draft
            .as_ref()
            .map(|d| diff(&self.baseline, d))
            .unwrap_or_default()
    }

    /// Returns `true` if the draft differs from the baseline.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.pending_patch().is_empty()
    }

    /// Mutates the draft and updates the state.
    ///
    /// An edit that changes a field re-arms the debounce timer. An edit that
    /// brings the draft back to the baseline returns the session to `Clean`.
    /// While saving, edits are recorded and picked up when the save completes.
    pub fn edit(&mut self, now: Instant, mutate: impl FnOnce(&mut TaskDraft)) -> SaveState {
        let Some(draft) = self.draft.as_mut() else {
            return self.state;
        };
        let before = draft.clone();
        mutate(draft);
        if draft.same_fields(&before) {
            return self.state;
        }
        self.revision += 1;

        if self.state == SaveState::Saving {
            return self.state;
        }
        self.last_error = None;
        if self.has_changes() {
            self.state = SaveState::Dirty;
            if self.auto_save {
                self.timer.arm(now);
            }
        } else {
            self.state = SaveState::Clean;
            self.timer.cancel();
        }
        self.state
    }

    /// Starts an automatic save if the debounce timer has fired.
    pub fn poll_timer(&mut self, now: Instant) -> Option<SaveRequest> {
        self.timer.fire_if_due(now)?;
        if !self.auto_save || self.state != SaveState::Dirty {
            return None;
        }
        match self.begin() {
            BeginSave::Request(request) => Some(request),
            _ => None,
        }
    }

    /// Saves now, skipping the debounce.
    pub fn request_save(&mut self) -> BeginSave {
        if self.state == SaveState::Saving {
            return BeginSave::InFlight;
        }
        self.begin()
    }

    fn begin(&mut self) -> BeginSave {
        let Some(draft) = self.draft.as_ref() else {
            return BeginSave::Closed;
        };
        let patch = diff(&self.baseline, draft);
        self.timer.cancel();
        if patch.is_empty() {
            tracing::debug!(task = %self.baseline.id, "no changes, save skipped");
            self.state = SaveState::Clean;
            return BeginSave::NoChanges(self.baseline.clone());
        }

        self.next_ticket += 1;
        let ticket = SaveTicket(self.next_ticket);
        self.in_flight = Some(InFlight {
            ticket,
            revision: self.revision,
            sent: draft.clone(),
        });
        self.state = SaveState::Saving;
        tracing::debug!(task = %self.baseline.id, fields = patch.len(), "save started");
        BeginSave::Request(SaveRequest {
            ticket,
            task_id: self.baseline.id.clone(),
            patch,
        })
    }

    /// Applies the result of the save identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: SaveTicket,
        result: Result<Task, ApiError>,
        now: Instant,
    ) -> Completion {
        let Some(flight) = self.in_flight.take_if(|f| f.ticket == ticket) else {
            tracing::debug!(task = %self.baseline.id, ?ticket, "stale save completion ignored");
            return Completion::Ignored(IgnoreReason::Superseded);
        };

        let Some(draft) = self.draft.as_mut() else {
            return match result {
                Ok(task) => {
                    tracing::debug!(task = %task.id, "save completed after cancel");
                    Completion::Detached(task)
                }
                Err(_) => Completion::Ignored(IgnoreReason::SessionClosed),
            };
        };
        let edited_in_flight = self.revision != flight.revision;

        match result {
            Ok(confirmed) => {
                draft.rebase(&flight.sent, &confirmed);
                self.baseline = confirmed;
                self.last_saved = Some(Utc::now());
                self.last_error = None;

                if edited_in_flight && self.has_changes() {
                    self.state = SaveState::Dirty;
                    if self.auto_save {
                        self.timer.arm(now);
                    }
                    tracing::info!(task = %self.baseline.id, "saved, newer edits pending");
                    Completion::SavedWithPendingEdits(self.baseline.clone())
                } else {
                    self.state = SaveState::Clean;
                    tracing::info!(task = %self.baseline.id, "saved");
                    Completion::Saved(self.baseline.clone())
                }
            }
            Err(e) => {
                let message = e.user_message(&self.failure_message);
                tracing::warn!(task = %self.baseline.id, error = %e, "save failed");
                self.last_error = Some(message.clone());
                if edited_in_flight && self.has_changes() {
                    self.state = SaveState::Dirty;
                    if self.auto_save {
                        self.timer.arm(now);
                    }
                } else {
                    self.state = SaveState::Error;
                }
                Completion::Failed(message)
            }
        }
    }

    /// Discards the draft. A save in flight may still complete, but its
    /// result is reported as [`Completion::Detached`] and not merged.
    pub fn cancel(&mut self) {
        self.draft = None;
        self.timer.cancel();
        self.state = SaveState::Clean;
    }

    /// Turns automatic saving on or off. Turning it on while dirty starts a
    /// debounce cycle at `now`.
    pub fn set_auto_save(&mut self, enabled: bool, now: Instant) {
        self.auto_save = enabled;
        if !enabled {
            self.timer.cancel();
        } else if self.state == SaveState::Dirty && !self.timer.is_armed() {
            self.timer.arm(now);
        }
    }
}
