//! Grade entries and the weighted average calculator.
//!
//! # Invariants
//! - Scores lie in `0..=MAX_SCORE`.
//! - Weights lie in `(0, MAX_WEIGHT]`, so the weight sum of a non-empty set
//!   is always positive.

use super::subject::SubjectId;
use super::user::UserId;
use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GradeId = Uuid;

/// Highest score on the grading scale.
pub const MAX_SCORE: f64 = 10.0;
/// Highest weight (percent) a single entry may carry.
pub const MAX_WEIGHT: f64 = 100.0;

/// One weighted grade of a subject (exam, assignment, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub id: GradeId,
    pub subject_id: SubjectId,
    pub user_id: UserId,
    pub label: String,
    pub score: f64,
    pub weight: f64,
}

impl GradeEntry {
    pub fn new(
        subject_id: SubjectId,
        user_id: UserId,
        label: impl Into<String>,
        score: f64,
        weight: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            user_id,
            label: label.into().trim().to_string(),
            score,
            weight,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.label.trim().is_empty() {
            return Err(ValidationError::BlankGradeLabel);
        }
        if !self.score.is_finite() || !(0.0..=MAX_SCORE).contains(&self.score) {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 || self.weight > MAX_WEIGHT {
            return Err(ValidationError::WeightOutOfRange(self.weight));
        }
        Ok(())
    }
}

/// Weighted average over a set of grade entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeAverage {
    pub entries: usize,
    pub total_weight: f64,
    /// `None` when there are no entries.
    pub weighted_average: Option<f64>,
}

impl GradeAverage {
    pub fn compute<'a>(grades: impl IntoIterator<Item = &'a GradeEntry>) -> Self {
        let (entries, total_weight, weighted_sum) = grades.into_iter().fold(
            (0usize, 0.0f64, 0.0f64),
            |(count, weight, sum), grade| {
                (
                    count + 1,
                    weight + grade.weight,
                    sum + grade.score * grade.weight,
                )
            },
        );
        let weighted_average = if entries == 0 || total_weight <= 0.0 {
            None
        } else {
            Some(weighted_sum / total_weight)
        };
        Self {
            entries,
            total_weight,
            weighted_average,
        }
    }
}
