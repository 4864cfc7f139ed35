//! Minimal change set between a baseline task and an editor draft.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use taskboard_proto::patch::TaskPatch;
use taskboard_proto::task::Task;

use super::draft::TaskDraft;

fn day(value: Option<NaiveDateTime>) -> Option<NaiveDate> {
    value.map(|d| d.date())
}

fn midnight(value: Option<NaiveDate>) -> Option<NaiveDateTime> {
    value.map(|d| d.and_time(NaiveTime::MIN))
}

/// Computes the fields of `draft` that differ from `baseline`.
///
/// Equality is structural. Dates compare by calendar day and are sent at
/// midnight. A baseline with no description equals an empty draft
/// description. A cleared assignee or date is carried as an explicit null.
/// The result is empty when nothing changed.
#[must_use]
pub fn diff(baseline: &Task, draft: &TaskDraft) -> TaskPatch {
    let mut patch = TaskPatch::default();

    if draft.title != baseline.title {
        patch.title = Some(draft.title.clone());
    }
    if draft.description != baseline.description.as_deref().unwrap_or_default() {
        patch.description = Some(draft.description.clone());
    }
    if draft.status != baseline.status {
        patch.status = Some(draft.status);
    }
    if draft.priority != baseline.priority {
        patch.priority = Some(draft.priority);
    }
    if draft.assignee_id != baseline.assignee_id {
        patch.assignee_id = Some(draft.assignee_id.clone());
    }
    if draft.start_date != day(baseline.start_date) {
        patch.start_date = Some(midnight(draft.start_date));
    }
    if draft.due_date != day(baseline.due_date) {
        patch.due_date = Some(midnight(draft.due_date));
    }
    if draft.tags != baseline.tags {
        patch.tags = Some(draft.tags.clone());
    }
    if draft.custom_fields != baseline.custom_fields {
        patch.custom_fields = Some(draft.custom_fields.clone());
    }

    patch
}
