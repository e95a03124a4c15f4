//! Canonical domain records for the task list.
//!
//! # Responsibility
//! - Define the one task schema shared by every caller, a superset wide
//!   enough for minimal and rich list frontends alike.
//! - Define the account record used by the multi-user variant.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at creation.
//! - Timestamps are Unix epoch milliseconds throughout.

use chrono::Utc;

pub mod task;
pub mod user;

/// Returns the current wall-clock time as Unix epoch milliseconds.
///
/// Operations that compare against "now" (overdue checks) take the timestamp
/// as a parameter instead of calling this, so they stay deterministic in
/// tests.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
