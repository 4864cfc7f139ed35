//! Display classification and filtering of task change history.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use taskboard_proto::history::{ChangeType, HistoryEntry};

/// How a history record is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Single-glyph icon.
    pub icon: &'static str,
    /// Short human-readable category.
    pub label: &'static str,
}

const OTHER: Classification = Classification {
    icon: "📝",
    label: "Other",
};

/// Classifies a change type. Unrecognized types fall into the "Other" bucket.
#[must_use]
pub const fn classify_type(change_type: &ChangeType) -> Classification {
    let (icon, label) = match change_type {
        ChangeType::Create => ("✅", "Created"),
        ChangeType::Update => ("✏️", "Updated"),
        ChangeType::Delete => ("🗑️", "Deleted"),
        ChangeType::StatusChange => ("🔄", "Status changed"),
        ChangeType::AssignmentChange => ("👤", "Assignee changed"),
        ChangeType::PriorityChange => ("⚡", "Priority changed"),
        ChangeType::DueDateChange => ("📅", "Due date changed"),
        ChangeType::CommentAdded => ("💬", "Comment added"),
        ChangeType::AttachmentAdded => ("📎", "Attachment added"),
        ChangeType::SubtaskAdded => ("📋", "Subtask added"),
        ChangeType::DependencyAdded => ("🔗", "Dependency added"),
        ChangeType::Other | ChangeType::Unknown(_) => return OTHER,
    };
    Classification { icon, label }
}

/// Classifies a history record.
#[must_use]
pub const fn classify(entry: &HistoryEntry) -> Classification {
    classify_type(&entry.change_type)
}

/// One-line summary of a record.
///
/// Uses the server's description when present. Otherwise field-level
/// records render as `Changed {field} from '{old}' to '{new}'` and anything
/// else as its category label.
#[must_use]
pub fn describe(entry: &HistoryEntry) -> String {
    if let Some(text) = entry.description.as_deref().filter(|d| !d.trim().is_empty()) {
        return text.to_string();
    }
    match entry.field_name.as_deref() {
        Some(field) => format!(
            "Changed {field} from '{}' to '{}'",
            entry.old_value.as_deref().unwrap_or_default(),
            entry.new_value.as_deref().unwrap_or_default(),
        ),
        None => classify(entry).label.to_string(),
    }
}

/// Predicate over change types, with an "all" wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    /// Every record.
    #[default]
    All,
    /// Only records of one type. `Only(Other)` and `Only(Unknown(_))` both
    /// select every record outside the known types.
    Only(ChangeType),
}

impl HistoryFilter {
    /// Returns `true` if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) if wanted.is_known() => &entry.change_type == wanted,
            Self::Only(_) => !entry.change_type.is_known(),
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(ChangeType::from_wire(s)))
        }
    }
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(t) => write!(f, "{t}"),
        }
    }
}

/// Records passing `filter`, in their original (newest-first) order.
#[must_use]
pub fn filter<'a>(entries: &'a [HistoryEntry], filter: &HistoryFilter) -> Vec<&'a HistoryEntry> {
    entries.iter().filter(|e| filter.matches(e)).collect()
}
