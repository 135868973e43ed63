use quiz_core::model::QuizResult;

/// What the user sees after submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved to the question at `index` (0-based).
    NextQuestion { index: usize },
    /// The last question was passed; the session is complete.
    Completed(QuizResult),
}

impl AdvanceOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, AdvanceOutcome::Completed(_))
    }
}
