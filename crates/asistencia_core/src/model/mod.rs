//! Domain model for subjects, attendance and grades.
//!
//! # Responsibility
//! - Define the plain records mirrored from the data store.
//! - Own pure domain rules (status cycle, summaries, weighted averages).
//!
//! # Invariants
//! - Every stored record carries its owning `UserId`.
//! - "Unmarked" attendance is the absence of a record, never a stored value.

pub mod attendance;
pub mod date;
pub mod grade;
pub mod subject;
pub mod user;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Write-path validation failures shared by all records.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Subject name is empty after trimming.
    BlankSubjectName,
    /// Grade label is empty after trimming.
    BlankGradeLabel,
    /// Score is not finite or outside `0..=MAX_SCORE`.
    ScoreOutOfRange(f64),
    /// Weight is not finite or outside `(0, MAX_WEIGHT]`.
    WeightOutOfRange(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankSubjectName => write!(f, "subject name must not be blank"),
            Self::BlankGradeLabel => write!(f, "grade label must not be blank"),
            Self::ScoreOutOfRange(value) => write!(
                f,
                "score {value} is outside 0..={}",
                grade::MAX_SCORE
            ),
            Self::WeightOutOfRange(value) => write!(
                f,
                "weight {value} must be greater than 0 and at most {}",
                grade::MAX_WEIGHT
            ),
        }
    }
}

impl Error for ValidationError {}
