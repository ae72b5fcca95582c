//! Subject (asignatura) record.
//!
//! # Invariants
//! - `name` is stored trimmed and never blank.
//! - `id` is stable for the subject lifetime; deleting a subject removes
//!   its attendance and grade rows with it.

use super::user::UserId;
use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SubjectId = Uuid;

/// User-defined course tracked for attendance and grades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub user_id: UserId,
    pub name: String,
}

impl Subject {
    /// Creates a subject with a generated id and a trimmed name.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), user_id, name)
    }

    /// Creates a subject with a caller-provided id.
    pub fn with_id(id: SubjectId, user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            name: name.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankSubjectName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Subject;
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn new_trims_name() {
        let subject = Subject::new(Uuid::new_v4(), "  Física  ");
        assert_eq!(subject.name, "Física");
        assert!(subject.validate().is_ok());
    }

    #[test]
    fn blank_name_fails_validation() {
        let subject = Subject::new(Uuid::new_v4(), " \t ");
        assert_eq!(subject.validate(), Err(ValidationError::BlankSubjectName));
    }
}
