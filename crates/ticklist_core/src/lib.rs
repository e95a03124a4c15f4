//! Core domain logic for Ticklist.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use auth::accounts::{AuthError, AuthResult, AuthService, SESSION_KEY, USERS_KEY};
pub use logging::{default_log_level, init_logging};
pub use model::now_epoch_ms;
pub use model::task::{Priority, Task, TaskId, TaskValidationError};
pub use model::user::{User, UserId, UserValidationError, MIN_PASSWORD_CHARS};
pub use storage::{
    latest_schema_version, MemoryStorage, SqliteStorage, StorageBackend, StorageError,
    StorageResult,
};
pub use store::filter::{StatusFilter, TaskFilter};
pub use store::task_store::{tasks_mirror_key, TaskDraft, TaskPatch, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
