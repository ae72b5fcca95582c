//! "Mis Asignaturas" dashboard state.
//!
//! # Invariants
//! - `subjects` only changes after the store confirmed the change.
//! - Blank names never reach the store.

use super::notice::{Notice, NoticeQueue};
use super::LOGIN_ROUTE;
use crate::auth::AuthProvider;
use crate::model::subject::{Subject, SubjectId};
use crate::model::user::UserId;
use crate::repo::subject_repo::SubjectRepository;
use crate::service::subject_service::{SubjectService, SubjectServiceError};
use log::{error, warn};

pub const MSG_LOAD_FAILED: &str = "Error al cargar asignaturas";
pub const MSG_EMPTY_NAME: &str = "El nombre no puede estar vacío.";
pub const MSG_CREATE_FAILED: &str = "Error al crear la asignatura";
pub const MSG_DELETE_FAILED: &str = "Error al borrar la asignatura.";
pub const MSG_DELETED: &str = "Asignatura borrada.";
pub const MSG_NO_SUBJECTS: &str = "Aún no tienes asignaturas. ¡Añade una para empezar!";

/// Dashboard list of the signed-in user's subjects.
#[derive(Debug, Default)]
pub struct DashboardView {
    subjects: Vec<Subject>,
    notices: NoticeQueue,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a view and immediately loads it.
    pub fn loaded<A: AuthProvider, R: SubjectRepository>(auth: &A, repo: &R) -> Self {
        let mut view = Self::new();
        view.load(auth, repo);
        view
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Placeholder text shown when the list is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.subjects.is_empty().then_some(MSG_NO_SUBJECTS)
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Reloads the list for the signed-in user.
    ///
    /// Signed out: the list is emptied and no notice is posted.
    pub fn load<A: AuthProvider, R: SubjectRepository>(&mut self, auth: &A, repo: &R) {
        let user = match auth.current_user() {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.subjects.clear();
                return;
            }
            Err(err) => {
                error!("event=dashboard_load module=view status=error stage=auth error={err}");
                self.notices.error(MSG_LOAD_FAILED);
                return;
            }
        };

        match SubjectService::new(repo).list_for(user.id) {
            Ok(subjects) => self.subjects = subjects,
            Err(err) => {
                error!("event=dashboard_load module=view status=error stage=list error={err}");
                self.notices.error(MSG_LOAD_FAILED);
            }
        }
    }

    /// Creates one subject and appends it to the list.
    ///
    /// Returns the stored subject on success.
    pub fn add_subject<A: AuthProvider, R: SubjectRepository>(
        &mut self,
        auth: &A,
        repo: &R,
        name: &str,
    ) -> Option<Subject> {
        if name.trim().is_empty() {
            self.notices.warning(MSG_EMPTY_NAME);
            return None;
        }

        let Some(user_id) = self.signed_in_user(auth, "add_subject") else {
            self.notices.error(MSG_CREATE_FAILED);
            return None;
        };

        match SubjectService::new(repo).create(user_id, name) {
            Ok(subject) => {
                self.notices
                    .success(format!("Asignatura \"{}\" creada.", subject.name));
                self.subjects.push(subject.clone());
                Some(subject)
            }
            Err(SubjectServiceError::EmptyName) => {
                self.notices.warning(MSG_EMPTY_NAME);
                None
            }
            Err(err) => {
                error!("event=dashboard_add_subject module=view status=error error={err}");
                self.notices.error(MSG_CREATE_FAILED);
                None
            }
        }
    }

    /// Deletes one subject after the user confirmed the prompt.
    ///
    /// Returns whether the subject was removed. An unconfirmed request is a
    /// no-op without notices.
    pub fn delete_subject<A: AuthProvider, R: SubjectRepository>(
        &mut self,
        auth: &A,
        repo: &R,
        subject_id: SubjectId,
        confirmed: bool,
    ) -> bool {
        if !confirmed {
            return false;
        }

        let Some(user_id) = self.signed_in_user(auth, "delete_subject") else {
            self.notices.error(MSG_DELETE_FAILED);
            return false;
        };

        match SubjectService::new(repo).delete(user_id, subject_id) {
            Ok(()) => {
                self.subjects.retain(|subject| subject.id != subject_id);
                self.notices.success(MSG_DELETED);
                true
            }
            Err(err) => {
                error!(
                    "event=dashboard_delete_subject module=view status=error subject_id={subject_id} error={err}"
                );
                self.notices.error(MSG_DELETE_FAILED);
                false
            }
        }
    }

    /// Signs out and returns the route to navigate to.
    ///
    /// Navigation happens even when the sign-out call fails.
    pub fn logout<A: AuthProvider>(&mut self, auth: &A) -> &'static str {
        if let Err(err) = auth.sign_out() {
            warn!("event=dashboard_logout module=view status=error error={err}");
        }
        self.subjects.clear();
        LOGIN_ROUTE
    }

    fn signed_in_user<A: AuthProvider>(&self, auth: &A, action: &str) -> Option<UserId> {
        match auth.current_user() {
            Ok(Some(user)) => Some(user.id),
            Ok(None) => {
                warn!("event=dashboard_{action} module=view status=error error_code=not_signed_in");
                None
            }
            Err(err) => {
                error!("event=dashboard_{action} module=view status=error stage=auth error={err}");
                None
            }
        }
    }
}

/// Confirmation prompt shown before deleting a subject.
pub fn delete_prompt(subject: &Subject) -> String {
    format!(
        "¿Seguro que quieres borrar la asignatura \"{}\" y todos sus datos?",
        subject.name
    )
}
