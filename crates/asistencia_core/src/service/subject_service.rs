//! Subject use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Blank names are rejected before any store call.

use crate::model::subject::{Subject, SubjectId};
use crate::model::user::UserId;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SubjectServiceError {
    /// Name is empty after trimming.
    EmptyName,
    SubjectNotFound(SubjectId),
    Repo(RepoError),
}

impl Display for SubjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "subject name must not be empty"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SubjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "subject",
                id,
            } => Self::SubjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service for the subject list.
pub struct SubjectService<R: SubjectRepository> {
    repo: R,
}

impl<R: SubjectRepository> SubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the subjects owned by `user` in creation order.
    pub fn list_for(&self, user: UserId) -> Result<Vec<Subject>, SubjectServiceError> {
        Ok(self.repo.list_subjects(user)?)
    }

    /// Creates one subject and returns the stored row.
    pub fn create(&self, user: UserId, name: &str) -> Result<Subject, SubjectServiceError> {
        if name.trim().is_empty() {
            return Err(SubjectServiceError::EmptyName);
        }
        let subject = self.repo.create_subject(&Subject::new(user, name))?;
        info!(
            "event=subject_create module=service status=ok subject_id={}",
            subject.id
        );
        Ok(subject)
    }

    pub fn get(&self, user: UserId, id: SubjectId) -> Result<Option<Subject>, SubjectServiceError> {
        Ok(self.repo.get_subject(user, id)?)
    }

    /// Deletes one subject with all its attendance and grades.
    pub fn delete(&self, user: UserId, id: SubjectId) -> Result<(), SubjectServiceError> {
        self.repo.delete_subject(user, id)?;
        info!("event=subject_delete module=service status=ok subject_id={id}");
        Ok(())
    }
}
