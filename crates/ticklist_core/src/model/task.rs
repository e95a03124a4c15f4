//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its serialized (mirror) shape.
//! - Provide creation and validation helpers shared by store and tests.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reused for another task.
//! - `title` is non-empty after trimming.
//! - `created_at` and `deadline` are Unix epoch milliseconds.

use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// UUIDv7, so identifiers sort roughly by creation time while staying
/// opaque and collision-free (bare millisecond timestamps can collide
/// within one tick).
pub type TaskId = Uuid;

/// Task urgency level.
///
/// Optional on the record: the simple list variant never sets one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Returns the canonical lowercase name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a case-insensitive priority name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Validation error for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task id is the nil UUID.
    NilId,
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// The optional fields cover every list variant: a minimal list needs only
/// `title` and `completed`, a rich editor adds `description`, `priority`
/// and `deadline`, and per-account lists set `owner`. One serialized shape
/// backs them all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable id used for toggle/update/remove addressing.
    pub id: TaskId,
    /// Display text. Non-empty after trimming.
    pub title: String,
    /// Optional free-form detail text.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion flag. New tasks start unfinished.
    #[serde(default)]
    pub completed: bool,
    /// Optional urgency level.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Optional due instant, Unix epoch milliseconds.
    #[serde(default)]
    pub deadline: Option<i64>,
    /// Creation instant, Unix epoch milliseconds.
    pub created_at: i64,
    /// Owning account when the collection is partitioned per user.
    #[serde(default)]
    pub owner: Option<UserId>,
}

impl Task {
    /// Creates a task with a fresh id and the current timestamp.
    ///
    /// Optional fields start unset; callers fill them in directly before
    /// the record reaches a store.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::now_v7(), title)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by tests that need deterministic identifiers. The id must stay
    /// stable for the task's lifetime.
    pub fn with_id(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            completed: false,
            priority: None,
            deadline: None,
            created_at: now_epoch_ms(),
            owner: None,
        }
    }

    /// Checks the record invariants.
    ///
    /// # Errors
    /// - [`TaskValidationError::NilId`] when the id is nil.
    /// - [`TaskValidationError::EmptyTitle`] when the title trims to nothing.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Returns whether the task is past its deadline and still open.
    ///
    /// `now_ms` is passed in so callers control the clock.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.completed && self.deadline.is_some_and(|deadline| deadline < now_ms)
    }
}
