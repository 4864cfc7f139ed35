//! Drag-and-drop resolution.
//!
//! A drop lands either on a status column, identified by its status literal,
//! or on another task card, identified by the task's UUID. Dropping on a
//! card means "move into that card's column".

use std::collections::HashMap;
use std::hash::BuildHasher;

use taskboard_proto::task::{Task, TaskId, TaskStatus};

/// What a drop target identifier refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A status column.
    Column(TaskStatus),
    /// A task card.
    Task(TaskId),
    /// Neither a column literal nor a task id.
    Unknown(String),
}

impl DropTarget {
    /// Classifies a raw drop target identifier.
    ///
    /// Column literals are checked first. The two namespaces cannot overlap
    /// because no column literal is a valid UUID.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(status) = TaskStatus::from_column_id(raw) {
            return Self::Column(status);
        }
        raw.parse::<TaskId>()
            .map_or_else(|_| Self::Unknown(raw.to_string()), Self::Task)
    }
}

/// Read access to tasks by id.
pub trait TaskLookup {
    /// Returns the task with `id`, if held.
    fn lookup(&self, id: &TaskId) -> Option<&Task>;
}

impl TaskLookup for [Task] {
    fn lookup(&self, id: &TaskId) -> Option<&Task> {
        self.iter().find(|t| &t.id == id)
    }
}

impl<S: BuildHasher> TaskLookup for HashMap<TaskId, Task, S> {
    fn lookup(&self, id: &TaskId) -> Option<&Task> {
        self.get(id)
    }
}

/// Resolves a drop target identifier to the status it stands for.
///
/// Returns `None` when the identifier is neither a column nor a known task.
#[must_use]
pub fn resolve<L: TaskLookup + ?Sized>(drop_target: &str, tasks: &L) -> Option<TaskStatus> {
    match DropTarget::parse(drop_target) {
        DropTarget::Column(status) => Some(status),
        DropTarget::Task(id) => tasks.lookup(&id).map(|t| t.status),
        DropTarget::Unknown(_) => None,
    }
}

/// What a completed drag gesture should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDecision {
    /// Move the task from one column to another.
    Move {
        /// The dragged task's current status.
        from: TaskStatus,
        /// The status to move it to.
        to: TaskStatus,
    },
    /// Dropped into the column it is already in.
    NoChange,
    /// The dragged task or the drop target could not be resolved.
    Unresolved,
}

impl DropDecision {
    /// Returns `true` if the gesture requires a request.
    #[must_use]
    pub const fn is_move(self) -> bool {
        matches!(self, Self::Move { .. })
    }
}

/// Decides what dropping `dragged` on `drop_target` should do.
#[must_use]
pub fn plan_drop<L: TaskLookup + ?Sized>(
    dragged: &TaskId,
    drop_target: &str,
    tasks: &L,
) -> DropDecision {
    let Some(task) = tasks.lookup(dragged) else {
        return DropDecision::Unresolved;
    };
    match resolve(drop_target, tasks) {
        None => DropDecision::Unresolved,
        Some(to) if to == task.status => DropDecision::NoChange,
        Some(to) => DropDecision::Move {
            from: task.status,
            to,
        },
    }
}
