//! Reconciliation of server-confirmed records into the held task list.
//!
//! The server is authoritative for the records it returns, so a confirmed
//! record replaces the held one wholesale. The list never changes length or
//! order here; creating a task goes through
//! [`TaskBoard::insert_created`](super::TaskBoard::insert_created).

use std::collections::HashMap;

use taskboard_proto::task::{Task, TaskId};

/// Replaces held tasks with the confirmed records sharing their id.
///
/// When `updates` holds the same id twice, the later record wins. Records
/// whose id is not held are dropped. Returns the number of tasks replaced.
pub fn merge_many(current: &mut [Task], updates: &[Task]) -> usize {
    if updates.is_empty() {
        return 0;
    }
    let by_id: HashMap<&TaskId, &Task> = updates.iter().map(|t| (&t.id, t)).collect();

    let mut replaced = 0;
    for task in current.iter_mut() {
        if let Some(update) = by_id.get(&task.id) {
            task.clone_from(update);
            replaced += 1;
        }
    }

    if replaced < by_id.len() {
        tracing::debug!(
            dropped = by_id.len() - replaced,
            "confirmed records for tasks not on the board were dropped"
        );
    }
    replaced
}

/// Replaces the held task sharing `update`'s id. Returns `true` if one was
/// found.
pub fn merge_one(current: &mut [Task], update: &Task) -> bool {
    merge_many(current, std::slice::from_ref(update)) == 1
}

/// Non-mutating form of [`merge_many`].
#[must_use]
pub fn merged(current: &[Task], updates: &[Task]) -> Vec<Task> {
    let mut next = current.to_vec();
    merge_many(&mut next, updates);
    next
}
