//! Sparse field-level change set for `PATCH /tasks/{id}` and bulk updates.
//!
//! A [`TaskPatch`] only carries the fields that changed. Absent means
//! "leave unchanged". Nullable fields (`assigneeId`, `startDate`, `dueDate`)
//! distinguish absent from an explicit `null`, which clears the value.
//! Collections (`tags`, `customFields`) replace the whole stored value.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::task::{CustomFields, Priority, Tags, Task, TaskStatus, UserId};

/// Deserializes a present field (including `null`) as `Some(..)`, so that
/// together with `#[serde(default)]` an absent field stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Names of the editable task fields, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatchField {
    /// `title`
    Title,
    /// `description`
    Description,
    /// `status`
    Status,
    /// `priority`
    Priority,
    /// `assigneeId`
    AssigneeId,
    /// `startDate`
    StartDate,
    /// `dueDate`
    DueDate,
    /// `tags`
    Tags,
    /// `customFields`
    CustomFields,
}

impl PatchField {
    /// Every editable field in wire order.
    pub const ALL: [Self; 9] = [
        Self::Title,
        Self::Description,
        Self::Status,
        Self::Priority,
        Self::AssigneeId,
        Self::StartDate,
        Self::DueDate,
        Self::Tags,
        Self::CustomFields,
    ];

    /// Wire (camelCase) name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::AssigneeId => "assigneeId",
            Self::StartDate => "startDate",
            Self::DueDate => "dueDate",
            Self::Tags => "tags",
            Self::CustomFields => "customFields",
        }
    }
}

impl fmt::Display for PatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sparse set of field changes to apply to one or more tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New assignee; `Some(None)` unassigns.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub assignee_id: Option<Option<UserId>>,
    /// New start date; `Some(None)` clears it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub start_date: Option<Option<NaiveDateTime>>,
    /// New due date; `Some(None)` clears it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub due_date: Option<Option<NaiveDateTime>>,
    /// Replacement tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    /// Replacement custom field map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<CustomFields>,
}

impl TaskPatch {
    /// Returns `true` if the patch carries no field at all.
    ///
    /// An empty patch must never be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Number of fields carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields().len()
    }

    /// Returns `true` if `field` is present.
    #[must_use]
    pub const fn contains(&self, field: PatchField) -> bool {
        match field {
            PatchField::Title => self.title.is_some(),
            PatchField::Description => self.description.is_some(),
            PatchField::Status => self.status.is_some(),
            PatchField::Priority => self.priority.is_some(),
            PatchField::AssigneeId => self.assignee_id.is_some(),
            PatchField::StartDate => self.start_date.is_some(),
            PatchField::DueDate => self.due_date.is_some(),
            PatchField::Tags => self.tags.is_some(),
            PatchField::CustomFields => self.custom_fields.is_some(),
        }
    }

    /// The fields carried by this patch, in wire order.
    #[must_use]
    pub fn fields(&self) -> Vec<PatchField> {
        PatchField::ALL
            .into_iter()
            .filter(|f| self.contains(*f))
            .collect()
    }

    /// Writes every carried field onto `task`, overwriting collections whole.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee) = &self.assignee_id {
            task.assignee_id.clone_from(assignee);
        }
        if let Some(start) = self.start_date {
            task.start_date = start;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(tags) = &self.tags {
            task.tags.clone_from(tags);
        }
        if let Some(fields) = &self.custom_fields {
            task.custom_fields.clone_from(fields);
        }
    }
}
