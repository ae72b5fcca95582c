//! Auth session seam.
//!
//! # Responsibility
//! - Expose the two session calls the application makes: current user and
//!   sign out.
//! - Keep identity lookups out of services and views, which only see
//!   `AuthProvider`.
//!
//! # Invariants
//! - At most one user is signed in per store.
//! - Credential checks are not performed here; the session only records
//!   which identity is active.

mod session_store;

pub use session_store::SqliteSessionStore;

use crate::model::user::User;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug)]
pub enum AuthError {
    /// Email is blank or lacks `@`.
    InvalidEmail(String),
    Store(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidEmail(_) => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.into())
    }
}

/// Session calls used by services and views.
pub trait AuthProvider {
    /// Returns the signed-in user, or `None` when signed out.
    fn current_user(&self) -> AuthResult<Option<User>>;
    /// Ends the current session. Signing out twice is not an error.
    fn sign_out(&self) -> AuthResult<()>;
}
