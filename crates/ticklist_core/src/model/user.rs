//! Account domain model for the multi-user variant.
//!
//! # Responsibility
//! - Define the stored account record and its registration-time checks.
//!
//! # Invariants
//! - `email` is unique within the stored user list (enforced by the auth
//!   layer, which owns the list).
//! - `password` is held verbatim. Credential hardening is deliberately out
//!   of scope; this record is unsuitable for anything beyond a local
//!   single-machine list.

use crate::model::now_epoch_ms;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an account. Also partitions task collections.
pub type UserId = Uuid;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Validation error for account records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Account id is the nil UUID.
    NilId,
    /// Display name is empty or whitespace-only.
    EmptyName,
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Password is shorter than [`MIN_PASSWORD_CHARS`].
    WeakPassword { min_chars: usize },
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "user id must not be nil"),
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::WeakPassword { min_chars } => {
                write!(f, "password must be at least {min_chars} characters long")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Stored account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable account id; task collections are keyed by it.
    pub id: UserId,
    /// Display name shown by presentation layers.
    pub name: String,
    /// Login email. Compared verbatim, no normalization.
    pub email: String,
    /// Plaintext password. Known weakness, kept deliberately (see module docs).
    pub password: String,
    /// Registration instant, Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Creates an account record with a fresh id and the current timestamp.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
            created_at: now_epoch_ms(),
        }
    }

    /// Checks the registration invariants.
    ///
    /// # Errors
    /// - [`UserValidationError::NilId`] when the id is nil.
    /// - [`UserValidationError::EmptyName`] when the name trims to nothing.
    /// - [`UserValidationError::InvalidEmail`] when the email shape is off.
    /// - [`UserValidationError::WeakPassword`] when the password is too short.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.id.is_nil() {
            return Err(UserValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(UserValidationError::WeakPassword {
                min_chars: MIN_PASSWORD_CHARS,
            });
        }
        Ok(())
    }
}
