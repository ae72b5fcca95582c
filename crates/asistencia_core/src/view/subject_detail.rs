//! Subject detail header state.

use crate::auth::AuthProvider;
use crate::model::subject::{Subject, SubjectId};
use crate::repo::subject_repo::SubjectRepository;
use crate::service::subject_service::SubjectService;
use log::error;

pub const TITLE_NOT_FOUND: &str = "Asignatura no encontrada";

/// Outcome of loading the detail screen of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectDetail {
    Found(Subject),
    NotFound,
}

impl SubjectDetail {
    /// Loads one subject of the signed-in user.
    ///
    /// Store errors are logged and rendered as not found; the detail screen
    /// has no notice area of its own.
    pub fn load<A: AuthProvider, R: SubjectRepository>(
        auth: &A,
        repo: &R,
        subject_id: SubjectId,
    ) -> Self {
        let user = match auth.current_user() {
            Ok(Some(user)) => user,
            Ok(None) => return Self::NotFound,
            Err(err) => {
                error!("event=subject_detail module=view status=error stage=auth error={err}");
                return Self::NotFound;
            }
        };

        match SubjectService::new(repo).get(user.id, subject_id) {
            Ok(Some(subject)) => Self::Found(subject),
            Ok(None) => Self::NotFound,
            Err(err) => {
                error!(
                    "event=subject_detail module=view status=error subject_id={subject_id} error={err}"
                );
                Self::NotFound
            }
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Found(subject) => subject.name.as_str(),
            Self::NotFound => TITLE_NOT_FOUND,
        }
    }

    pub fn subject(&self) -> Option<&Subject> {
        match self {
            Self::Found(subject) => Some(subject),
            Self::NotFound => None,
        }
    }
}
