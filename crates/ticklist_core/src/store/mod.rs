//! The task store and its derived views.
//!
//! # Responsibility
//! - Own the in-memory task collection and keep its durable mirror in sync.
//! - Keep filtering read-only and separate from mutation.
//!
//! # Invariants
//! - Mutations go through [`task_store::TaskStore`]; views never mutate.

pub mod filter;
pub mod task_store;
