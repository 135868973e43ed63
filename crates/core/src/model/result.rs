use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};
use crate::scoring::{self, ScoreTier};
use crate::time;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("no answers recorded")]
    Empty,

    #[error("correct count ({correct}) does not match reviewed answers ({derived})")]
    CountMismatch { correct: usize, derived: usize },
}

/// How a single question was answered in a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReview {
    pub question_id: QuestionId,
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// Outcome of a completed quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    quiz_id: QuizId,
    correct: usize,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    answers: Vec<AnswerReview>,
}

impl QuizResult {
    /// Build a result from per-question reviews.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::InvalidTimeRange` if `completed_at` is before `started_at`,
    /// `QuizResultError::Empty` if there are no answers, and
    /// `QuizResultError::CountMismatch` if `correct` disagrees with the reviews.
    pub fn new(
        quiz_id: QuizId,
        correct: usize,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        answers: Vec<AnswerReview>,
    ) -> Result<Self, QuizResultError> {
        if completed_at < started_at {
            return Err(QuizResultError::InvalidTimeRange);
        }
        if answers.is_empty() {
            return Err(QuizResultError::Empty);
        }
        let derived = answers.iter().filter(|a| a.is_correct).count();
        if derived != correct {
            return Err(QuizResultError::CountMismatch { correct, derived });
        }

        Ok(Self {
            quiz_id,
            correct,
            started_at,
            completed_at,
            answers,
        })
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerReview] {
        &self.answers
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        scoring::accuracy(self.correct, self.total())
    }

    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        scoring::accuracy_percent(self.correct, self.total())
    }

    #[must_use]
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_counts(self.correct, self.total())
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        time::span_between(self.started_at, self.completed_at)
    }
}
