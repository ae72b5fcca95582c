//! Grade average calculator state for one subject.
//!
//! Every store call runs as the signed-in user, so only the subject owner
//! sees or changes its grades.

use super::notice::{Notice, NoticeQueue};
use crate::auth::AuthProvider;
use crate::model::grade::{GradeAverage, GradeEntry, GradeId, MAX_SCORE, MAX_WEIGHT};
use crate::model::subject::SubjectId;
use crate::model::user::User;
use crate::model::ValidationError;
use crate::repo::grade_repo::GradeRepository;
use crate::service::grade_service::{GradeService, GradeServiceError};
use log::{error, warn};

pub const MSG_LOAD_FAILED: &str = "Error al cargar notas";
pub const MSG_ADDED: &str = "Nota añadida.";
pub const MSG_SAVE_FAILED: &str = "Error al guardar la nota";
pub const MSG_REMOVED: &str = "Nota borrada.";
pub const MSG_REMOVE_FAILED: &str = "Error al borrar la nota.";

#[derive(Debug)]
pub struct GradeCalculatorView {
    subject_id: SubjectId,
    grades: Vec<GradeEntry>,
    notices: NoticeQueue,
}

impl GradeCalculatorView {
    pub fn load<A: AuthProvider, R: GradeRepository>(
        auth: &A,
        repo: &R,
        subject_id: SubjectId,
    ) -> Self {
        let mut view = Self {
            subject_id,
            grades: Vec::new(),
            notices: NoticeQueue::default(),
        };
        let Some(user) = view.signed_in_user(auth, "load", MSG_LOAD_FAILED) else {
            return view;
        };
        match GradeService::new(repo).list(user.id, subject_id) {
            Ok(grades) => view.grades = grades,
            Err(err) => {
                error!(
                    "event=grades_load module=view status=error subject_id={subject_id} error={err}"
                );
                view.notices.error(MSG_LOAD_FAILED);
            }
        }
        view
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn grades(&self) -> &[GradeEntry] {
        &self.grades
    }

    pub fn average(&self) -> GradeAverage {
        GradeAverage::compute(&self.grades)
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Adds one grade. Invalid input becomes a warning, not a store call.
    pub fn add<A: AuthProvider, R: GradeRepository>(
        &mut self,
        auth: &A,
        repo: &R,
        label: &str,
        score: f64,
        weight: f64,
    ) -> Option<GradeEntry> {
        let user = self.signed_in_user(auth, "add", MSG_SAVE_FAILED)?;

        match GradeService::new(repo).add(self.subject_id, user.id, label, score, weight) {
            Ok(grade) => {
                self.grades.push(grade.clone());
                self.notices.success(MSG_ADDED);
                Some(grade)
            }
            Err(GradeServiceError::Invalid(reason)) => {
                self.notices.warning(validation_message(&reason));
                None
            }
            Err(err) => {
                error!(
                    "event=grades_add module=view status=error subject_id={} error={}",
                    self.subject_id, err
                );
                self.notices.error(MSG_SAVE_FAILED);
                None
            }
        }
    }

    pub fn remove<A: AuthProvider, R: GradeRepository>(
        &mut self,
        auth: &A,
        repo: &R,
        grade_id: GradeId,
    ) -> bool {
        let Some(user) = self.signed_in_user(auth, "remove", MSG_REMOVE_FAILED) else {
            return false;
        };
        match GradeService::new(repo).delete(user.id, self.subject_id, grade_id) {
            Ok(()) => {
                self.grades.retain(|grade| grade.id != grade_id);
                self.notices.success(MSG_REMOVED);
                true
            }
            Err(err) => {
                error!(
                    "event=grades_remove module=view status=error grade_id={grade_id} error={err}"
                );
                self.notices.error(MSG_REMOVE_FAILED);
                false
            }
        }
    }

    /// Posts `failure` and returns `None` when nobody is signed in.
    fn signed_in_user<A: AuthProvider>(
        &mut self,
        auth: &A,
        action: &str,
        failure: &'static str,
    ) -> Option<User> {
        match auth.current_user() {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!("event=grades_{action} module=view status=error error_code=not_signed_in");
                self.notices.error(failure);
                None
            }
            Err(err) => {
                error!("event=grades_{action} module=view status=error stage=auth error={err}");
                self.notices.error(failure);
                None
            }
        }
    }
}

/// User-facing text for a rejected grade.
pub fn validation_message(reason: &ValidationError) -> String {
    match reason {
        ValidationError::BlankGradeLabel | ValidationError::BlankSubjectName => {
            "El concepto no puede estar vacío.".to_string()
        }
        ValidationError::ScoreOutOfRange(_) => format!("La nota debe estar entre 0 y {MAX_SCORE}."),
        ValidationError::WeightOutOfRange(_) => {
            format!("El peso debe ser mayor que 0 y como máximo {MAX_WEIGHT}.")
        }
    }
}
