//! The task store: one owner's ordered collection plus its durable mirror.
//!
//! # Responsibility
//! - Own the authoritative in-memory task collection for the session.
//! - Write the whole collection through to storage after every effective
//!   mutation (no batching or coalescing; local writes are cheap).
//! - Serve derived filter views and counts for rendering.
//!
//! # Invariants
//! - Task ids are unique within the collection.
//! - Newest tasks sit at the front; insertion order is display order.
//! - Mirror failures degrade to logged warnings and never block a
//!   mutation; the in-memory state stays authoritative.

use crate::model::task::{Priority, Task, TaskId};
use crate::model::user::UserId;
use crate::storage::StorageBackend;
use crate::store::filter::TaskFilter;
use log::{info, warn};
use std::collections::HashSet;

const TASKS_KEY: &str = "tasks";

/// Mirror key for an owner's collection: `tasks` for the global list,
/// `tasks:<id>` for a per-account one.
pub fn tasks_mirror_key(owner: Option<&UserId>) -> String {
    match owner {
        Some(owner) => format!("{TASKS_KEY}:{owner}"),
        None => TASKS_KEY.to_string(),
    }
}

/// Optional attributes supplied when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Free-form detail text; whitespace-only input is stored as absent.
    pub description: Option<String>,
    /// Urgency level.
    pub priority: Option<Priority>,
    /// Due instant, Unix epoch milliseconds.
    pub deadline: Option<i64>,
}

/// Fields to merge into an existing task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title. A whitespace-only value is ignored: saving an
    /// empty edit keeps the old text instead of clearing it.
    pub title: Option<String>,
    /// Replacement description; whitespace-only input clears the field.
    pub description: Option<String>,
    /// Replacement urgency level.
    pub priority: Option<Priority>,
    /// Replacement due instant, Unix epoch milliseconds.
    pub deadline: Option<i64>,
}

impl TaskPatch {
    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
    }
}

/// Owning component for one owner's task collection.
///
/// Borrows the storage backend for its lifetime so auth and store phases
/// can share a single mirror within a session.
pub struct TaskStore<'s, S: StorageBackend> {
    storage: &'s mut S,
    owner: Option<UserId>,
    tasks: Vec<Task>,
}

impl<'s, S: StorageBackend> TaskStore<'s, S> {
    /// Loads the collection mirrored under `owner`'s key.
    ///
    /// Fail-soft by contract: a missing key, a storage read error and
    /// malformed JSON all yield an empty collection. Records that parse
    /// but violate the title invariant are dropped individually, as is
    /// every record repeating an id already seen.
    pub fn load(storage: &'s mut S, owner: Option<UserId>) -> Self {
        let key = tasks_mirror_key(owner.as_ref());
        let tasks = match storage.get(&key) {
            Ok(Some(raw)) => decode_collection(&key, &raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("event=mirror_read module=store status=error key={key} error={err}");
                Vec::new()
            }
        };
        info!(
            "event=store_load module=store status=ok key={key} count={}",
            tasks.len()
        );
        Self {
            storage,
            owner,
            tasks,
        }
    }

    /// Adds a task to the front of the collection.
    ///
    /// Returns `None` without touching collection or mirror when the
    /// trimmed title is empty; invalid input degrades to a no-op.
    pub fn add(&mut self, title: &str, draft: TaskDraft) -> Option<TaskId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let mut task = Task::new(title);
        task.description = normalize_text(draft.description);
        task.priority = draft.priority;
        task.deadline = draft.deadline;
        task.owner = self.owner;

        let id = task.id;
        self.tasks.insert(0, task);
        self.persist();
        Some(id)
    }

    /// Flips the completion flag of the matching task.
    ///
    /// Returns `false` (and writes nothing) when the id is unknown.
    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        self.persist();
        true
    }

    /// Merges `patch` into the matching task.
    ///
    /// Per-field semantics are documented on [`TaskPatch`]. Returns
    /// `false` when the id is unknown; a patch with no effective field
    /// leaves the mirror untouched.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        let mut changed = false;
        if let Some(title) = patch.title {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                task.title = trimmed.to_string();
                changed = true;
            }
        }
        if let Some(description) = patch.description {
            task.description = normalize_text(Some(description));
            changed = true;
        }
        if let Some(priority) = patch.priority {
            task.priority = Some(priority);
            changed = true;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = Some(deadline);
            changed = true;
        }

        if changed {
            self.persist();
        }
        true
    }

    /// Removes the matching task. Returns `false` when the id is unknown.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Removes every completed task, returning how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Returns the tasks matching `filter`, newest first.
    ///
    /// A derived view; the underlying collection is never mutated.
    pub fn filter(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    /// Full collection, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up one task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of tasks in the collection.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of still-open tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    /// Number of completed tasks.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// Owner the collection is partitioned under, if any.
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Serializes the collection and writes it under the owner's key.
    ///
    /// Runs automatically after every effective mutation. Returns `false`
    /// when the mirror write failed; the in-memory collection is not
    /// touched by a failure.
    pub fn persist(&mut self) -> bool {
        let key = tasks_mirror_key(self.owner.as_ref());
        let encoded = match serde_json::to_string(&self.tasks) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("event=mirror_write module=store status=error key={key} error={err}");
                return false;
            }
        };
        match self.storage.set(&key, &encoded) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=mirror_write module=store status=error key={key} error={err}");
                false
            }
        }
    }
}

/// Trims free-form text; whitespace-only input becomes absent.
fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn decode_collection(key: &str, raw: &str) -> Vec<Task> {
    let mut tasks: Vec<Task> = match serde_json::from_str(raw) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!("event=mirror_decode module=store status=error key={key} error={err}");
            return Vec::new();
        }
    };
    let mut seen_ids = HashSet::new();
    tasks.retain(|task| {
        if let Err(err) = task.validate() {
            warn!(
                "event=mirror_decode module=store status=dropped_record key={key} task_id={} error={err}",
                task.id
            );
            return false;
        }
        // Ids must stay unique; a tampered mirror repeating one would make
        // toggle and remove disagree about which task they address.
        if !seen_ids.insert(task.id) {
            warn!(
                "event=mirror_decode module=store status=dropped_record key={key} task_id={} reason=duplicate_id",
                task.id
            );
            return false;
        }
        true
    });
    tasks
}
