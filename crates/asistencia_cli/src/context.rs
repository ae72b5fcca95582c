//! Shared store handles, errors and output helpers.

use asistencia_core::db::DbError;
use asistencia_core::view::subject_detail::TITLE_NOT_FOUND;
use asistencia_core::{
    AuthError, LoggingError, Notice, NoticeLevel, RepoError, SqliteAttendanceRepository,
    SqliteGradeRepository, SqliteSessionStore, SqliteSubjectRepository, Subject, SubjectDetail,
};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum CliError {
    Config(LoggingError),
    Db(DbError),
    Store(String),
    Usage(String),
    /// Failure already printed as notices.
    Reported,
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration: {err}"),
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Store(message) => write!(f, "store: {message}"),
            Self::Usage(message) => write!(f, "{message}"),
            Self::Reported => write!(f, "command failed"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Store(_) | Self::Usage(_) | Self::Reported => None,
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<AuthError> for CliError {
    fn from(value: AuthError) -> Self {
        Self::Store(value.to_string())
    }
}

pub struct Context<'conn> {
    pub session: SqliteSessionStore<'conn>,
    pub subjects: SqliteSubjectRepository<'conn>,
    pub attendance: SqliteAttendanceRepository<'conn>,
    pub grades: SqliteGradeRepository<'conn>,
    pub json: bool,
}

impl<'conn> Context<'conn> {
    pub fn try_new(conn: &'conn Connection, json: bool) -> Result<Self, CliError> {
        Ok(Self {
            session: SqliteSessionStore::try_new(conn)?,
            subjects: SqliteSubjectRepository::try_new(conn)?,
            attendance: SqliteAttendanceRepository::try_new(conn)?,
            grades: SqliteGradeRepository::try_new(conn)?,
            json,
        })
    }

    /// Resolves a subject of the signed-in user.
    pub fn owned_subject(&self, raw_id: &str) -> Result<Subject, CliError> {
        let id = parse_id(raw_id)?;
        match SubjectDetail::load(&self.session, &self.subjects, id) {
            SubjectDetail::Found(subject) => Ok(subject),
            SubjectDetail::NotFound => Err(CliError::Usage(TITLE_NOT_FOUND.to_string())),
        }
    }

    /// Prints `value` as JSON when `--json` is set, otherwise runs `human`.
    pub fn render<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<(), CliError> {
        if self.json {
            let text = serde_json::to_string_pretty(value)
                .map_err(|err| CliError::Usage(format!("failed to encode JSON: {err}")))?;
            println!("{text}");
        } else {
            human();
        }
        Ok(())
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(raw.trim()).map_err(|err| CliError::Usage(format!("invalid id `{raw}`: {err}")))
}

/// Prints notices and fails with `Reported` when any of them is an error.
pub fn finish(notices: Vec<Notice>) -> Result<(), CliError> {
    let mut failed = false;
    for notice in &notices {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Warning => eprintln!("warning: {}", notice.message),
            NoticeLevel::Error => {
                failed = true;
                eprintln!("error: {}", notice.message);
            }
        }
    }
    if failed {
        Err(CliError::Reported)
    } else {
        Ok(())
    }
}
