use chrono::{DateTime, Utc};

/// Mutable record of one attempt at a quiz.
///
/// Invariants maintained by `QuizSession`:
/// - `current_index < question_count`
/// - `recorded_answers[i]` is `Some` for every `i < current_index`, and for
///   `current_index` exactly when `answer_revealed`
/// - `correct_count` only grows, at most once per question
/// - `ended_at` is set once, together with `completed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) current_index: usize,
    pub(crate) selected_option: Option<usize>,
    pub(crate) answer_revealed: bool,
    pub(crate) recorded_answers: Vec<Option<usize>>,
    pub(crate) correct_count: usize,
    pub(crate) completed: bool,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) ended_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub(crate) fn fresh(question_count: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            current_index: 0,
            selected_option: None,
            answer_revealed: false,
            recorded_answers: vec![None; question_count],
            correct_count: 0,
            completed: false,
            started_at,
            ended_at: None,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    #[must_use]
    pub fn answer_revealed(&self) -> bool {
        self.answer_revealed
    }

    #[must_use]
    pub fn recorded_answers(&self) -> &[Option<usize>] {
        &self.recorded_answers
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.recorded_answers.len()
    }
}

/// Coarse state of a session, for deciding which actions to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress {
        index: usize,
        selected: Option<usize>,
        revealed: bool,
    },
    Completed {
        correct: usize,
        total: usize,
    },
}

impl SessionPhase {
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, SessionPhase::Completed { .. })
    }

    /// Select and submit are offered only before reveal.
    #[must_use]
    pub fn accepts_selection(self) -> bool {
        matches!(self, SessionPhase::InProgress { revealed: false, .. })
    }

    #[must_use]
    pub fn can_submit(self) -> bool {
        matches!(
            self,
            SessionPhase::InProgress {
                selected: Some(_),
                revealed: false,
                ..
            }
        )
    }

    #[must_use]
    pub fn can_advance(self) -> bool {
        matches!(self, SessionPhase::InProgress { revealed: true, .. })
    }
}
