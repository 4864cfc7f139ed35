//! Editable working copy of a task.
//!
//! A [`TaskDraft`] lives only while an editor session is open. Besides the
//! editable fields it holds the input buffers for a tag and a custom field
//! that have been typed but not yet committed.

use chrono::NaiveDate;

use taskboard_proto::task::{CustomFields, CustomValue, Priority, Tags, Task, TaskStatus, UserId};

/// The editable fields of a task plus uncommitted input buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title.
    pub title: String,
    /// Description; empty means none.
    pub description: String,
    /// Status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
    /// Assignee.
    pub assignee_id: Option<UserId>,
    /// Start date (calendar day).
    pub start_date: Option<NaiveDate>,
    /// Due date (calendar day).
    pub due_date: Option<NaiveDate>,
    /// Tags.
    pub tags: Tags,
    /// Custom fields.
    pub custom_fields: CustomFields,
    /// Tag text typed but not yet added.
    pub pending_tag: String,
    /// Custom field name typed but not yet added.
    pub pending_field_key: String,
    /// Custom field value typed but not yet added.
    pub pending_field_value: String,
}

impl TaskDraft {
    /// Opens a draft on `task` with empty input buffers.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            assignee_id: task.assignee_id.clone(),
            start_date: task.start_date.map(|d| d.date()),
            due_date: task.due_date.map(|d| d.date()),
            tags: task.tags.clone(),
            custom_fields: task.custom_fields.clone(),
            pending_tag: String::new(),
            pending_field_key: String::new(),
            pending_field_value: String::new(),
        }
    }

    /// Adds the pending tag if it is non-blank and not already present.
    ///
    /// The buffer is cleared either way. Returns `true` if a tag was added.
    pub fn commit_pending_tag(&mut self) -> bool {
        let tag = std::mem::take(&mut self.pending_tag);
        let tag = tag.trim();
        !tag.is_empty() && self.tags.insert(tag)
    }

    /// Removes a tag. Returns `true` if it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Adds the pending custom field as text when both the trimmed key and
    /// value are non-empty, replacing any field with the same key.
    ///
    /// Both buffers are cleared only when the field was committed.
    pub fn commit_pending_field(&mut self) -> bool {
        let key = self.pending_field_key.trim();
        let value = self.pending_field_value.trim();
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.custom_fields
            .insert(key.to_string(), CustomValue::from_input(value));
        self.pending_field_key.clear();
        self.pending_field_value.clear();
        true
    }

    /// Removes a custom field. Returns `true` if it was present.
    pub fn remove_custom_field(&mut self, key: &str) -> bool {
        self.custom_fields.remove(key).is_some()
    }

    /// Returns `true` if the editable fields match, ignoring input buffers.
    #[must_use]
    pub fn same_fields(&self, other: &Self) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.status == other.status
            && self.priority == other.priority
            && self.assignee_id == other.assignee_id
            && self.start_date == other.start_date
            && self.due_date == other.due_date
            && self.tags == other.tags
            && self.custom_fields == other.custom_fields
    }

    /// Folds a server-confirmed record into a draft that kept changing
    /// while the save carrying `sent` was in flight.
    ///
    /// Fields still equal to what was sent take the confirmed value. Fields
    /// edited since keep their local value.
    pub fn rebase(&mut self, sent: &Self, confirmed: &Task) {
        let server = Self::from_task(confirmed);

        macro_rules! adopt {
            ($($field:ident),+) => {
                $(
                    if self.$field == sent.$field {
                        self.$field = server.$field;
                    }
                )+
            };
        }

        adopt!(
            title,
            description,
            status,
            priority,
            assignee_id,
            start_date,
            due_date,
            tags,
            custom_fields
        );
    }
}
