//! Grade use-case service (average calculator).

use crate::model::grade::{GradeAverage, GradeEntry, GradeId};
use crate::model::subject::SubjectId;
use crate::model::user::UserId;
use crate::model::ValidationError;
use crate::repo::grade_repo::GradeRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum GradeServiceError {
    Invalid(ValidationError),
    SubjectNotFound(SubjectId),
    GradeNotFound(GradeId),
    Repo(RepoError),
}

impl Display for GradeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::GradeNotFound(id) => write!(f, "grade not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GradeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GradeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::NotFound {
                entity: "subject",
                id,
            } => Self::SubjectNotFound(id),
            RepoError::NotFound { entity: "grade", id } => Self::GradeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct GradeService<R: GradeRepository> {
    repo: R,
}

impl<R: GradeRepository> GradeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores one grade entry.
    pub fn add(
        &self,
        subject_id: SubjectId,
        user_id: UserId,
        label: &str,
        score: f64,
        weight: f64,
    ) -> Result<GradeEntry, GradeServiceError> {
        let grade = GradeEntry::new(subject_id, user_id, label, score, weight);
        grade.validate().map_err(GradeServiceError::Invalid)?;
        self.repo.create_grade(&grade)?;
        info!(
            "event=grade_add module=service status=ok subject_id={} grade_id={}",
            subject_id, grade.id
        );
        Ok(grade)
    }

    pub fn list(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<GradeEntry>, GradeServiceError> {
        Ok(self.repo.list_grades(owner, subject_id)?)
    }

    pub fn delete(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        id: GradeId,
    ) -> Result<(), GradeServiceError> {
        self.repo.delete_grade(owner, subject_id, id)?;
        Ok(())
    }

    pub fn average(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<GradeAverage, GradeServiceError> {
        let grades = self.repo.list_grades(owner, subject_id)?;
        Ok(GradeAverage::compute(&grades))
    }
}
