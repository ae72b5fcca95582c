//! Signed-in user identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of the owning user of every stored record.
pub type UserId = Uuid;

/// User identity as reported by the auth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Normalized (trimmed, lowercase) email.
    pub email: String,
}

/// Normalizes an email for identity lookups.
///
/// Returns `None` for blank input or input without `@`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return None;
    }
    Some(trimmed.to_lowercase())
}
