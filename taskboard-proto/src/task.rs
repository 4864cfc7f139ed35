//! Task model types for the task board REST contract.
//!
//! Mirrors the JSON shape the server returns for a task (camelCase field
//! names, server-local date-times) plus the request bodies used to create a
//! task and to replace its core fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (UUID v7).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID value.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a task.
    TaskId
}

uuid_id! {
    /// Unique identifier for a project (the owner of a task list).
    ProjectId
}

uuid_id! {
    /// Unique identifier for a user (assignee, creator, editor).
    UserId
}

/// Workflow status of a task. Each status is also a board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Returns the wire literal, which doubles as the column identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Parses a column identifier. Returns `None` for anything that is not
    /// exactly one of the three literals.
    #[must_use]
    pub fn from_column_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == id)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown enum literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} literal: {value}")]
pub struct UnknownLiteral {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl FromStr for TaskStatus {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_column_id(s).ok_or_else(|| UnknownLiteral {
            kind: "status",
            value: s.to_string(),
        })
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Default priority for new tasks.
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the wire literal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownLiteral {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// Ordered set of tag strings. Insertion order is kept and duplicates are
/// dropped on insert and on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Creates an empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a tag unless an equal tag is already present.
    ///
    /// Returns `true` if the tag was added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Removes a tag by value. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Returns `true` if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates tags in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Self::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<String>>::deserialize(deserializer)?;
        Ok(raw.unwrap_or_default().into_iter().collect())
    }
}

/// Scalar value stored in a task's custom fields.
///
/// The editor always stores what the user typed as [`CustomValue::Text`];
/// numbers and booleans only arrive from the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    /// A boolean flag.
    Flag(bool),
    /// A JSON number, kept in its exact wire form.
    Number(serde_json::Number),
    /// Free text.
    Text(String),
}

impl CustomValue {
    /// Builds a text value from editor input, trimming surrounding whitespace.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        Self::Text(input.trim().to_string())
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Custom fields keyed by name. A sorted map so that equality is structural
/// and independent of insertion order.
pub type CustomFields = BTreeMap<String, CustomValue>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A task as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identity.
    pub id: TaskId,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Short title.
    pub title: String,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status (board column).
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
    /// Assigned user, if any.
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    /// Planned start.
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    /// Ordered, de-duplicated tags.
    #[serde(default)]
    pub tags: Tags,
    /// Custom scalar fields.
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_fields: CustomFields,
    /// Creator (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    /// Creation time (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Last modification time (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    /// Server-side revision counter (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Last editor (read-only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<UserId>,
}

impl Task {
    /// Creates a task with server defaults: `TODO`, `MEDIUM`, no assignee,
    /// no dates, no tags, no custom fields.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            project_id: None,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee_id: None,
            start_date: None,
            due_date: None,
            tags: Tags::new(),
            custom_fields: CustomFields::new(),
            created_by: None,
            created_at: None,
            updated_at: None,
            version: None,
            last_edited_by: None,
        }
    }
}

/// Body of `POST /tasks/projects/{projectId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Title of the new task (required).
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status; the server defaults to `TODO` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Initial priority; the server defaults to `MEDIUM` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Initial assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    /// Initial due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
}

impl NewTask {
    /// A creation request carrying only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            assignee_id: None,
            due_date: None,
        }
    }
}

/// Body of `PUT /tasks/{id}`: the full core field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    /// Title (always sent).
    pub title: String,
    /// Description (sent as `null` when the task has none).
    pub description: Option<String>,
    /// Status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
}

impl TaskUpdate {
    /// Builds the full-replace body for moving `task` to `status`.
    ///
    /// Every other core field is carried over unchanged, because the PUT
    /// endpoint overwrites whatever it is not given.
    #[must_use]
    pub fn status_transition(task: &Task, status: TaskStatus) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status,
            priority: task.priority,
        }
    }

    /// Writes the carried fields onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        task.title.clone_from(&self.title);
        task.description.clone_from(&self.description);
        task.status = self.status;
        task.priority = self.priority;
    }
}
