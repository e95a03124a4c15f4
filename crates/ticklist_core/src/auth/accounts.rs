//! Registration, login and session marker handling over the mirror.
//!
//! # Responsibility
//! - Persist the account list under [`USERS_KEY`] as one JSON array.
//! - Persist the signed-in account id under [`SESSION_KEY`].
//!
//! # See also
//! - `model::user` for the account schema and validation rules.
//! - `store::task_store` for the per-owner task collections this gates.

use std::error::Error;
use std::fmt;

use log::{info, warn};

use crate::model::user::{User, UserId, UserValidationError};
use crate::storage::{StorageBackend, StorageError};

/// Mirror key holding the full account list.
pub const USERS_KEY: &str = "users";

/// Mirror key holding the signed-in account id, absent when signed out.
pub const SESSION_KEY: &str = "session";

#[derive(Debug)]
pub enum AuthError {
    /// The submitted profile failed a field rule.
    Validation(UserValidationError),
    /// Another account already uses this email.
    EmailTaken(String),
    /// No stored account matches the submitted email and password pair.
    InvalidCredentials,
    /// The mirror refused the read or write.
    Storage(StorageError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(source) => write!(f, "invalid profile: {source}"),
            AuthError::EmailTaken(email) => {
                write!(f, "an account already exists for {email}")
            }
            // Deliberately does not say which half was wrong.
            AuthError::InvalidCredentials => write!(f, "invalid email or password"),
            AuthError::Storage(source) => write!(f, "account storage failed: {source}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AuthError::Validation(source) => Some(source),
            AuthError::Storage(source) => Some(source),
            _ => None,
        }
    }
}

impl From<UserValidationError> for AuthError {
    fn from(source: UserValidationError) -> Self {
        AuthError::Validation(source)
    }
}

impl From<StorageError> for AuthError {
    fn from(source: StorageError) -> Self {
        AuthError::Storage(source)
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Account operations over an injected mirror backend.
///
/// Borrows the backend mutably for its lifetime; create it, run the calls
/// you need, then drop it before handing the same backend to a task store.
pub struct AuthService<'s, S: StorageBackend> {
    storage: &'s mut S,
}

impl<'s, S: StorageBackend> AuthService<'s, S> {
    pub fn new(storage: &'s mut S) -> Self {
        AuthService { storage }
    }

    /// Creates an account and signs it in.
    ///
    /// Name and email are trimmed before validation; the password is taken
    /// verbatim so leading spaces survive if the caller typed them.
    ///
    /// # Errors
    /// - [`AuthError::Validation`] when a field fails the profile rules.
    /// - [`AuthError::EmailTaken`] when the email is already registered.
    /// - [`AuthError::Storage`] when the mirror cannot be read or written.
    ///
    /// # Side effects
    /// Appends to [`USERS_KEY`] and replaces [`SESSION_KEY`].
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> AuthResult<User> {
        let user = User::new(name.trim(), email.trim(), password);
        user.validate()?;

        let mut users = self.load_users()?;
        if users.iter().any(|existing| existing.email == user.email) {
            info!("event=register module=auth status=rejected reason=email_taken");
            return Err(AuthError::EmailTaken(user.email));
        }

        users.push(user.clone());
        self.save_users(&users)?;
        self.write_session(&user.id)?;
        info!("event=register module=auth status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Signs in against the stored account list.
    ///
    /// Matching is exact on the trimmed email and the verbatim password.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`] when no account matches.
    /// - [`AuthError::Storage`] when the mirror cannot be read or written.
    pub fn login(&mut self, email: &str, password: &str) -> AuthResult<User> {
        let email = email.trim();
        let users = self.load_users()?;
        let found = users
            .iter()
            .find(|user| user.email == email && user.password == password);

        match found {
            Some(user) => {
                let user = user.clone();
                self.write_session(&user.id)?;
                info!("event=login module=auth status=ok user_id={}", user.id);
                Ok(user)
            }
            None => {
                info!("event=login module=auth status=rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Drops the session marker. Signing out twice is harmless.
    ///
    /// # Errors
    /// [`AuthError::Storage`] when the mirror refuses the removal.
    pub fn logout(&mut self) -> AuthResult<()> {
        self.storage.remove(SESSION_KEY)?;
        info!("event=logout module=auth status=ok");
        Ok(())
    }

    /// Resolves the session marker to a stored account, if any.
    ///
    /// A marker pointing at a deleted or unparseable account reads as
    /// signed out rather than an error.
    pub fn current_user(&self) -> AuthResult<Option<User>> {
        let Some(raw) = self.storage.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let id: UserId = match serde_json::from_str(&raw) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=session_decode module=auth status=error error={err}");
                return Ok(None);
            }
        };
        let users = self.load_users()?;
        Ok(users.into_iter().find(|user| user.id == id))
    }

    /// Reads the account list, treating a malformed payload as empty.
    fn load_users(&self) -> AuthResult<Vec<User>> {
        let Some(raw) = self.storage.get(USERS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!("event=mirror_decode module=auth status=error key={USERS_KEY} error={err}");
                Ok(Vec::new())
            }
        }
    }

    fn save_users(&mut self, users: &[User]) -> AuthResult<()> {
        let payload = serde_json::to_string(users)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        self.storage.set(USERS_KEY, &payload)?;
        Ok(())
    }

    fn write_session(&mut self, id: &UserId) -> AuthResult<()> {
        let payload = serde_json::to_string(id)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        self.storage.set(SESSION_KEY, &payload)?;
        Ok(())
    }
}
