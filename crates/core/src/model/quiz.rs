use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId, QuizId};
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a quiz definition is malformed and cannot be played.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("estimated time must be > 0 minutes")]
    InvalidEstimatedMinutes,

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(QuizError::UnknownDifficulty(other.to_owned())),
        }
    }
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// Unvalidated quiz contents, as read from a catalog source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub category: CategoryId,
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    pub questions: Vec<Question>,
}

impl QuizDraft {
    /// Validates the draft into a playable definition.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the title is blank, there are no questions, the
    /// estimated time is zero, or two questions share an id.
    pub fn validate(self) -> Result<QuizDefinition, QuizError> {
        if self.title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if self.estimated_minutes == 0 {
            return Err(QuizError::InvalidEstimatedMinutes);
        }

        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !seen.insert(question.id()) {
                return Err(QuizError::DuplicateQuestionId(question.id().clone()));
            }
        }

        Ok(QuizDefinition {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            estimated_minutes: self.estimated_minutes,
            questions: self.questions,
        })
    }
}

/// An immutable, ordered, non-empty set of questions plus metadata.
///
/// Only obtainable through `QuizDraft::validate`, so every definition in
/// circulation has at least one question and in-range correct indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDefinition {
    id: QuizId,
    title: String,
    description: String,
    category: CategoryId,
    difficulty: Difficulty,
    estimated_minutes: u32,
    questions: Vec<Question>,
}

impl QuizDefinition {
    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_minutes
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions; always at least 1.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            question_count: self.questions.len(),
            estimated_time: self.estimated_minutes,
        }
    }
}

/// Listing shape for a quiz, as returned by `list_quizzes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub category: CategoryId,
    pub difficulty: Difficulty,
    pub question_count: usize,
    /// Minutes.
    pub estimated_time: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}"),
            vec!["a".into(), "b".into()],
            0,
            "because",
        )
        .unwrap()
    }

    fn draft(questions: Vec<Question>) -> QuizDraft {
        QuizDraft {
            id: QuizId::new("geometry"),
            title: "Geometry".into(),
            description: "Shapes".into(),
            category: CategoryId::new("math"),
            difficulty: Difficulty::Medium,
            estimated_minutes: 10,
            questions,
        }
    }

    #[test]
    fn validates_and_summarizes() {
        let quiz = draft(vec![question("1"), question("2")]).validate().unwrap();
        let summary = quiz.summary();
        assert_eq!(summary.question_count, 2);
        assert_eq!(summary.estimated_time, 10);
        assert_eq!(summary.difficulty, Difficulty::Medium);
    }

    #[test]
    fn empty_question_list_is_malformed() {
        let err = draft(Vec::new()).validate().unwrap_err();
        assert_eq!(err, QuizError::NoQuestions);
    }

    #[test]
    fn duplicate_question_ids_are_malformed() {
        let err = draft(vec![question("1"), question("1")])
            .validate()
            .unwrap_err();
        assert_eq!(err, QuizError::DuplicateQuestionId(QuestionId::new("1")));
    }

    #[test]
    fn zero_minutes_is_rejected() {
        let mut d = draft(vec![question("1")]);
        d.estimated_minutes = 0;
        assert_eq!(d.validate().unwrap_err(), QuizError::InvalidEstimatedMinutes);
    }

    #[test]
    fn difficulty_parses_lowercase_only() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(matches!(
            "Hard".parse::<Difficulty>(),
            Err(QuizError::UnknownDifficulty(_))
        ));
    }
}
