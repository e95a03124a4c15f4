//! Account registration and session lookup.
//!
//! # Responsibility
//! - Keep the locally stored user list and the current-session marker.
//! - Hand the store layer the owner id that partitions task collections.
//!
//! # Invariants
//! - Credentials are matched verbatim against the stored list; there is no
//!   hashing or rate limiting here, by explicit scope decision. Do not put
//!   this in front of anything that matters.
//! - Log lines carry account ids only, never emails or passwords.

pub mod accounts;
