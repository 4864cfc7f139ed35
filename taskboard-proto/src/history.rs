//! Field-level change history records (`GET /tasks/{id}/history`).
//!
//! History is produced server-side and is read-only for the client.
//! Deserialization of the change type never fails: literals this crate does
//! not know are kept as [`ChangeType::Unknown`].

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::task::{TaskId, UserId};

const OTHER: &str = "OTHER";

/// Category of a history record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Task created.
    Create,
    /// Generic field update.
    Update,
    /// Task deleted.
    Delete,
    /// Status moved between columns.
    StatusChange,
    /// Assignee changed.
    AssignmentChange,
    /// Priority changed.
    PriorityChange,
    /// Due date changed.
    DueDateChange,
    /// Comment added.
    CommentAdded,
    /// Attachment added.
    AttachmentAdded,
    /// Subtask added.
    SubtaskAdded,
    /// Dependency added.
    DependencyAdded,
    /// No change type was given, or the literal `OTHER`.
    #[default]
    Other,
    /// A literal this client does not recognize, kept verbatim.
    Unknown(String),
}

impl ChangeType {
    /// Every known change type, in the server's declaration order.
    pub const KNOWN: [Self; 11] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::StatusChange,
        Self::AssignmentChange,
        Self::PriorityChange,
        Self::DueDateChange,
        Self::CommentAdded,
        Self::AttachmentAdded,
        Self::SubtaskAdded,
        Self::DependencyAdded,
    ];

    /// Maps a wire literal to a change type. Never fails.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|t| t.as_str() == raw)
            .unwrap_or_else(|| match raw {
                "" | OTHER => Self::Other,
                _ => Self::Unknown(raw.to_string()),
            })
    }

    /// Wire literal. `Other` renders as `OTHER`; `Unknown` keeps its raw text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::StatusChange => "STATUS_CHANGE",
            Self::AssignmentChange => "ASSIGNMENT_CHANGE",
            Self::PriorityChange => "PRIORITY_CHANGE",
            Self::DueDateChange => "DUE_DATE_CHANGE",
            Self::CommentAdded => "COMMENT_ADDED",
            Self::AttachmentAdded => "ATTACHMENT_ADDED",
            Self::SubtaskAdded => "SUBTASK_ADDED",
            Self::DependencyAdded => "DEPENDENCY_ADDED",
            Self::Other => OTHER,
            Self::Unknown(raw) => raw,
        }
    }

    /// Returns `true` for the eleven server-declared types.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other | Self::Unknown(_))
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChangeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::Other, |r| Self::from_wire(&r)))
    }
}

/// One immutable history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Record identity.
    pub id: Uuid,
    /// Task the record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Changed field (wire name), if the record is field-level.
    #[serde(default)]
    pub field_name: Option<String>,
    /// Stringified previous value.
    #[serde(default)]
    pub old_value: Option<String>,
    /// Stringified new value.
    #[serde(default)]
    pub new_value: Option<String>,
    /// Category.
    #[serde(default)]
    pub change_type: ChangeType,
    /// Who made the change.
    #[serde(default)]
    pub changed_by: Option<UserId>,
    /// When the change happened.
    #[serde(default)]
    pub changed_at: Option<NaiveDateTime>,
    /// Server-written summary.
    #[serde(default)]
    pub description: Option<String>,
}
