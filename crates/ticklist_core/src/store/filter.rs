//! Read-only filter criteria over a task collection.
//!
//! # Responsibility
//! - Express the status + search views the presentation layer renders.
//!
//! # Invariants
//! - Filtering derives a view; it never touches the collection itself.
//! - The Active and Completed slices partition the collection: their union
//!   is the whole list.

use crate::model::task::Task;

/// Completion-status slice of the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks with `completed == false`.
    Active,
    /// Tasks with `completed == true`.
    Completed,
}

impl StatusFilter {
    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Parses a case-insensitive status name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns whether `task` falls into this slice.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Combined status + search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Completion-status slice. Defaults to [`StatusFilter::All`].
    pub status: StatusFilter,
    /// Case-insensitive substring match on the title. Blank matches all.
    pub search: Option<String>,
}

impl TaskFilter {
    /// Returns whether `task` satisfies both criteria.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => task.title.to_lowercase().contains(&term.to_lowercase()),
        }
    }
}
