use chrono::Duration;
use std::sync::Arc;

use quiz_core::model::QuizId;
use storage::repository::{ContentProvider, StorageError};

use super::service::QuizSession;
use super::view::AdvanceOutcome;
use crate::Clock;
use crate::error::SessionError;

/// Starts quiz sessions from a content provider and drives the time-dependent
/// transitions with a shared clock.
#[derive(Clone)]
pub struct QuizSessionService {
    clock: Clock,
    content: Arc<dyn ContentProvider>,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(clock: Clock, content: Arc<dyn ContentProvider>) -> Self {
        Self { clock, content }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Load a quiz and begin a fresh session on it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unavailable` if the quiz does not exist,
    /// `SessionError::Malformed` if its stored definition is invalid, or
    /// `SessionError::Storage` for other provider failures.
    pub async fn start_session(&self, quiz_id: &QuizId) -> Result<QuizSession, SessionError> {
        let quiz = match self.content.get_quiz(quiz_id).await {
            Ok(quiz) => quiz,
            Err(StorageError::NotFound) => {
                tracing::warn!(quiz = %quiz_id, "quiz not found");
                return Err(SessionError::Unavailable {
                    quiz_id: quiz_id.clone(),
                });
            }
            Err(StorageError::Malformed(reason)) => {
                tracing::warn!(quiz = %quiz_id, %reason, "quiz definition is malformed");
                return Err(SessionError::Malformed(reason));
            }
            Err(e) => return Err(e.into()),
        };

        let session = QuizSession::start(quiz, self.clock.now())?;
        tracing::info!(
            quiz = %quiz_id,
            questions = session.quiz().question_count(),
            "quiz session started"
        );
        Ok(session)
    }

    /// Advance `session`, stamping completion with the service clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` if the current answer is not
    /// revealed or the session is already complete.
    pub fn advance(&self, session: &mut QuizSession) -> Result<AdvanceOutcome, SessionError> {
        session.advance(self.clock.now())
    }

    /// Reset `session` to its first question with a new start time.
    pub fn restart(&self, session: &mut QuizSession) {
        session.restart(self.clock.now());
    }

    #[must_use]
    pub fn elapsed(&self, session: &QuizSession) -> Duration {
        session.elapsed(self.clock.now())
    }
}
