use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{AnswerReview, Question, QuizDefinition, QuizError, QuizResult};
use quiz_core::{ScoreTier, scoring, time};

use super::progress::SessionProgress;
use super::state::{SessionPhase, SessionState};
use super::view::{AdvanceOutcome, AnswerFeedback};
use crate::error::{InvalidTransition, SessionError};

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user's attempt at a quiz definition.
///
/// Steps through the questions in order: select an option, submit it (which
/// locks and reveals it), then advance. Every transition either applies fully
/// or is rejected with `InvalidTransition` and leaves the state untouched.
///
/// Timestamps come from the caller so that time stays deterministic under a
/// fixed `Clock`.
pub struct QuizSession {
    quiz: Arc<QuizDefinition>,
    state: SessionState,
}

impl QuizSession {
    /// Start a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Malformed` if the quiz has no questions.
    pub fn start(quiz: Arc<QuizDefinition>, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if quiz.question_count() == 0 {
            return Err(SessionError::Malformed(QuizError::NoQuestions.to_string()));
        }
        let state = SessionState::fresh(quiz.question_count(), started_at);
        Ok(Self { quiz, state })
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.state.completed {
            SessionPhase::Completed {
                correct: self.state.correct_count,
                total: self.quiz.question_count(),
            }
        } else {
            SessionPhase::InProgress {
                index: self.state.current_index,
                selected: self.state.selected_option,
                revealed: self.state.answer_revealed,
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.completed
    }

    /// The question on screen, or `None` once complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.state.completed {
            None
        } else {
            self.quiz.question(self.state.current_index)
        }
    }

    /// True while the last question is on screen.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        !self.state.completed && self.state.current_index + 1 == self.quiz.question_count()
    }

    // ─── transitions ───────────────────────────────────────────────────────────

    /// Choose an option for the current question. May be changed freely until submit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::AnswerLocked` after submit,
    /// `InvalidTransition::OptionOutOfRange` for a bad index and
    /// `InvalidTransition::Completed` once the session is over.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        let question = self.in_progress_question()?;
        if self.state.answer_revealed {
            return Err(self.reject(InvalidTransition::AnswerLocked));
        }
        let len = question.option_count();
        if index >= len {
            return Err(self.reject(InvalidTransition::OptionOutOfRange { index, len }));
        }

        self.state.selected_option = Some(index);
        tracing::debug!(question = self.state.current_index, option = index, "option selected");
        Ok(())
    }

    /// Lock in the selected option, score it and reveal the answer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::AnswerLocked` if already submitted,
    /// `InvalidTransition::NoSelection` if nothing is selected and
    /// `InvalidTransition::Completed` once the session is over.
    pub fn submit_answer(&mut self) -> Result<AnswerFeedback, SessionError> {
        let question = self.in_progress_question()?;
        if self.state.answer_revealed {
            return Err(self.reject(InvalidTransition::AnswerLocked));
        }
        let Some(selected) = self.state.selected_option else {
            return Err(self.reject(InvalidTransition::NoSelection));
        };

        let is_correct = question.is_correct(selected);
        let feedback = AnswerFeedback {
            selected,
            correct_index: question.correct_index(),
            is_correct,
            explanation: question.explanation().to_owned(),
        };

        let index = self.state.current_index;
        self.state.recorded_answers[index] = Some(selected);
        if is_correct {
            self.state.correct_count += 1;
        }
        self.state.answer_revealed = true;
        tracing::debug!(question = index, option = selected, is_correct, "answer submitted");
        Ok(feedback)
    }

    /// Move past a revealed question; completes the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::NotRevealed` before submit and
    /// `InvalidTransition::Completed` once the session is over.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        self.in_progress_question()?;
        if !self.state.answer_revealed {
            return Err(self.reject(InvalidTransition::NotRevealed));
        }

        let next = self.state.current_index + 1;
        if next < self.quiz.question_count() {
            self.state.current_index = next;
            self.state.selected_option = None;
            self.state.answer_revealed = false;
            tracing::debug!(question = next, "advanced to next question");
            return Ok(AdvanceOutcome::NextQuestion { index: next });
        }

        // Clamp so a clock that steps backwards cannot end before the start.
        let ended_at = now.max(self.state.started_at);
        let result = self.build_result(ended_at)?;
        self.state.ended_at = Some(ended_at);
        self.state.completed = true;
        tracing::info!(
            quiz = %self.quiz.id(),
            correct = self.state.correct_count,
            total = self.quiz.question_count(),
            "quiz completed"
        );
        Ok(AdvanceOutcome::Completed(result))
    }

    /// Discard all progress and start over on the same quiz. Allowed in any state.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.state = SessionState::fresh(self.quiz.question_count(), now);
        tracing::info!(quiz = %self.quiz.id(), "quiz restarted");
    }

    // ─── derived queries ───────────────────────────────────────────────────────

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.quiz.question_count();
        let answered = self.state.recorded_answers.iter().flatten().count();
        SessionProgress {
            position: (self.state.current_index + 1).min(total),
            total,
            answered,
            remaining: total - answered,
            is_complete: self.state.completed,
        }
    }

    /// `(current_index + 1) / question_count` while in progress.
    #[must_use]
    pub fn progress_fraction(&self) -> Option<f64> {
        self.progress().fraction()
    }

    /// Time since start; frozen at completion.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        time::span_between(self.state.started_at, self.state.ended_at.unwrap_or(now))
    }

    /// `correct_count / question_count`, defined only once complete.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        self.state
            .completed
            .then(|| scoring::accuracy(self.state.correct_count, self.quiz.question_count()))
    }

    #[must_use]
    pub fn score_tier(&self) -> Option<ScoreTier> {
        self.state
            .completed
            .then(|| ScoreTier::from_counts(self.state.correct_count, self.quiz.question_count()))
    }

    /// Feedback for the current question once its answer is revealed.
    #[must_use]
    pub fn current_feedback(&self) -> Option<AnswerFeedback> {
        if self.state.completed || !self.state.answer_revealed {
            return None;
        }
        let question = self.quiz.question(self.state.current_index)?;
        let selected = self.state.recorded_answers[self.state.current_index]?;
        Some(AnswerFeedback {
            selected,
            correct_index: question.correct_index(),
            is_correct: question.is_correct(selected),
            explanation: question.explanation().to_owned(),
        })
    }

    /// Summary of a completed attempt.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition::NotCompleted` while the session is in progress.
    pub fn result(&self) -> Result<QuizResult, SessionError> {
        let Some(ended_at) = self.state.ended_at else {
            return Err(InvalidTransition::NotCompleted.into());
        };
        self.build_result(ended_at)
    }

    // ─── internals ─────────────────────────────────────────────────────────────

    fn in_progress_question(&self) -> Result<&Question, SessionError> {
        if self.state.completed {
            return Err(self.reject(InvalidTransition::Completed));
        }
        self.quiz
            .question(self.state.current_index)
            .ok_or_else(|| self.reject(InvalidTransition::Completed))
    }

    fn reject(&self, reason: InvalidTransition) -> SessionError {
        tracing::warn!(
            quiz = %self.quiz.id(),
            question = self.state.current_index,
            %reason,
            "rejected session transition"
        );
        SessionError::InvalidTransition(reason)
    }

    fn build_result(&self, ended_at: DateTime<Utc>) -> Result<QuizResult, SessionError> {
        let answers = self
            .quiz
            .questions()
            .iter()
            .zip(&self.state.recorded_answers)
            .filter_map(|(question, recorded)| {
                recorded.map(|selected| AnswerReview {
                    question_id: question.id().clone(),
                    selected,
                    correct_index: question.correct_index(),
                    is_correct: question.is_correct(selected),
                })
            })
            .collect();

        Ok(QuizResult::new(
            self.quiz.id().clone(),
            self.state.correct_count,
            self.state.started_at,
            ended_at,
            answers,
        )?)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", self.quiz.id())
            .field("questions", &self.quiz.question_count())
            .field("state", &self.state)
            .finish()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CategoryId, Difficulty, QuestionId, QuizDraft, QuizId};
    use quiz_core::time::fixed_now;

    /// Quiz with `n` questions of three options each; question `i` has correct index `i % 3`.
    fn build_quiz(n: usize) -> Arc<QuizDefinition> {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    QuestionId::new((i + 1).to_string()),
                    format!("Question {}", i + 1),
                    vec!["a".into(), "b".into(), "c".into()],
                    i % 3,
                    format!("Explanation {}", i + 1),
                )
                .unwrap()
            })
            .collect();
        let quiz = QuizDraft {
            id: QuizId::new("sample"),
            title: "Sample".into(),
            description: String::new(),
            category: CategoryId::new("general"),
            difficulty: Difficulty::Easy,
            estimated_minutes: 5,
            questions,
        }
        .validate()
        .unwrap();
        Arc::new(quiz)
    }

    fn correct_for(i: usize) -> usize {
        i % 3
    }

    fn wrong_for(i: usize) -> usize {
        (i + 1) % 3
    }

    fn answer(session: &mut QuizSession, option: usize) -> AnswerFeedback {
        session.select_option(option).unwrap();
        session.submit_answer().unwrap()
    }

    #[test]
    fn start_initializes_fresh_state() {
        let session = QuizSession::start(build_quiz(3), fixed_now()).unwrap();
        let state = session.state();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.selected_option(), None);
        assert!(!state.answer_revealed());
        assert_eq!(state.recorded_answers(), &[None, None, None]);
        assert_eq!(state.correct_count(), 0);
        assert!(!state.is_completed());
        assert_eq!(state.started_at(), fixed_now());
        assert_eq!(state.ended_at(), None);
    }

    #[test]
    fn selection_can_change_until_submit() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        session.select_option(1).unwrap();
        session.select_option(2).unwrap();
        assert_eq!(session.state().selected_option(), Some(2));
    }

    #[test]
    fn out_of_range_selection_is_rejected_without_change() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        session.select_option(1).unwrap();
        let err = session.select_option(3).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition(InvalidTransition::OptionOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(session.state().selected_option(), Some(1));
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        let before = session.state().clone();
        let err = session.submit_answer().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition(InvalidTransition::NoSelection)
        ));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn submit_records_scores_and_reveals() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        let feedback = answer(&mut session, correct_for(0));
        assert!(feedback.is_correct);
        assert_eq!(feedback.explanation, "Explanation 1");
        assert_eq!(session.state().recorded_answers()[0], Some(0));
        assert_eq!(session.state().correct_count(), 1);
        assert!(session.state().answer_revealed());
        assert_eq!(session.current_feedback(), Some(feedback));
    }

    #[test]
    fn answer_is_locked_after_submit() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        answer(&mut session, wrong_for(0));

        let err = session.select_option(correct_for(0)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition(InvalidTransition::AnswerLocked)
        ));
        assert_eq!(session.state().selected_option(), Some(wrong_for(0)));
    }

    #[test]
    fn second_submit_is_a_rejected_no_op() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        answer(&mut session, correct_for(0));
        let before = session.state().clone();

        let err = session.submit_answer().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition(InvalidTransition::AnswerLocked)
        ));
        assert_eq!(session.state(), &before);
        assert_eq!(session.state().correct_count(), 1);
    }

    #[test]
    fn advance_requires_reveal() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        session.select_option(0).unwrap();
        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition(InvalidTransition::NotRevealed)
        ));
        assert_eq!(session.state().current_index(), 0);
    }

    #[test]
    fn advance_moves_by_one_and_clears_selection() {
        let mut session = QuizSession::start(build_quiz(3), fixed_now()).unwrap();
        answer(&mut session, correct_for(0));

        let outcome = session.advance(fixed_now()).unwrap();
        assert_eq!(outcome, AdvanceOutcome::NextQuestion { index: 1 });
        assert_eq!(session.state().current_index(), 1);
        assert_eq!(session.state().selected_option(), None);
        assert!(!session.state().answer_revealed());
        assert_eq!(session.state().recorded_answers()[1], None);
        assert_eq!(session.current_feedback(), None);
    }

    #[test]
    fn advancing_past_last_question_completes() {
        let mut session = QuizSession::start(build_quiz(1), fixed_now()).unwrap();
        assert!(session.is_last_question());
        answer(&mut session, correct_for(0));

        let end = fixed_now() + Duration::seconds(30);
        let outcome = session.advance(end).unwrap();
        assert!(outcome.is_completed());
        assert!(session.state().is_completed());
        assert_eq!(session.state().ended_at(), Some(end));
        assert!(session.current_question().is_none());
        assert!(!session.is_last_question());
    }

    #[test]
    fn completed_session_rejects_every_transition() {
        let mut session = QuizSession::start(build_quiz(1), fixed_now()).unwrap();
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        let before = session.state().clone();

        for err in [
            session.select_option(0).unwrap_err(),
            session.submit_answer().unwrap_err(),
            session.advance(fixed_now()).unwrap_err(),
        ] {
            assert!(matches!(
                err,
                SessionError::InvalidTransition(InvalidTransition::Completed)
            ));
        }
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn three_of_five_is_good_effort() {
        let mut session = QuizSession::start(build_quiz(5), fixed_now()).unwrap();
        for i in 0..5 {
            let option = if i < 3 { correct_for(i) } else { wrong_for(i) };
            answer(&mut session, option);
            session.advance(fixed_now()).unwrap();
        }

        assert_eq!(session.state().correct_count(), 3);
        assert_eq!(session.accuracy(), Some(0.6));
        assert_eq!(session.score_tier(), Some(ScoreTier::GoodEffort));

        let result = session.result().unwrap();
        assert_eq!(result.correct(), 3);
        assert_eq!(result.total(), 5);
        assert_eq!(result.accuracy_percent(), 60);
        let flags: Vec<bool> = result.answers().iter().map(|a| a.is_correct).collect();
        assert_eq!(flags, vec![true, true, true, false, false]);
    }

    #[test]
    fn correct_count_matches_recorded_answers() {
        let quiz = build_quiz(6);
        let mut session = QuizSession::start(Arc::clone(&quiz), fixed_now()).unwrap();
        let picks = [0, 0, 2, 0, 1, 1];
        for pick in picks {
            answer(&mut session, pick);
            session.advance(fixed_now()).unwrap();
        }

        let expected = quiz
            .questions()
            .iter()
            .zip(session.state().recorded_answers())
            .filter(|(q, a)| **a == Some(q.correct_index()))
            .count();
        assert_eq!(session.state().correct_count(), expected);
        assert!(session.state().correct_count() <= quiz.question_count());
    }

    #[test]
    fn restart_resets_everything_from_any_state() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        answer(&mut session, correct_for(0));
        session.advance(fixed_now()).unwrap();
        answer(&mut session, correct_for(1));
        session.advance(fixed_now() + Duration::seconds(10)).unwrap();
        assert!(session.is_complete());

        let later = fixed_now() + Duration::minutes(5);
        session.restart(later);
        let state = session.state();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.correct_count(), 0);
        assert!(!state.is_completed());
        assert!(state.recorded_answers().iter().all(Option::is_none));
        assert_eq!(state.started_at(), later);
        assert_eq!(state.ended_at(), None);
        assert!(session.accuracy().is_none());
    }

    #[test]
    fn restart_mid_question_drops_selection() {
        let mut session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        session.select_option(2).unwrap();
        session.restart(fixed_now());
        assert_eq!(session.state().selected_option(), None);
        assert!(!session.state().answer_revealed());
    }

    #[test]
    fn progress_is_position_over_total_while_in_progress() {
        let mut session = QuizSession::start(build_quiz(4), fixed_now()).unwrap();
        assert_eq!(session.progress_fraction(), Some(0.25));
        answer(&mut session, 0);
        assert_eq!(session.progress().answered, 1);
        session.advance(fixed_now()).unwrap();
        assert_eq!(session.progress_fraction(), Some(0.5));
    }

    #[test]
    fn progress_fraction_undefined_after_completion() {
        let mut session = QuizSession::start(build_quiz(1), fixed_now()).unwrap();
        assert_eq!(session.progress_fraction(), Some(1.0));
        answer(&mut session, 0);
        session.advance(fixed_now()).unwrap();
        assert_eq!(session.progress_fraction(), None);
        assert_eq!(session.progress().remaining, 0);
    }

    #[test]
    fn elapsed_grows_then_freezes() {
        let start = fixed_now();
        let mut session = QuizSession::start(build_quiz(1), start).unwrap();
        assert_eq!(session.elapsed(start + Duration::seconds(5)), Duration::seconds(5));
        assert_eq!(session.elapsed(start + Duration::seconds(9)), Duration::seconds(9));

        answer(&mut session, 0);
        session.advance(start + Duration::seconds(12)).unwrap();
        assert_eq!(session.elapsed(start + Duration::hours(1)), Duration::seconds(12));
    }

    #[test]
    fn elapsed_query_does_not_mutate() {
        let session = QuizSession::start(build_quiz(2), fixed_now()).unwrap();
        let before = session.state().clone();
        let _ = session.elapsed(fixed_now() + Duration::seconds(3));
        let _ = session.progress();
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn result_before_completion_is_rejected() {
        let session = QuizSession::start(build_quiz(1), fixed_now()).unwrap();
        assert!(matches!(
            session.result(),
            Err(SessionError::InvalidTransition(InvalidTransition::NotCompleted))
        ));
    }

    #[test]
    fn completion_time_never_precedes_start() {
        let start = fixed_now();
        let mut session = QuizSession::start(build_quiz(1), start).unwrap();
        answer(&mut session, 0);
        session.advance(start - Duration::seconds(30)).unwrap();
        assert_eq!(session.state().ended_at(), Some(start));
        assert_eq!(session.elapsed(start), Duration::zero());
    }
}
