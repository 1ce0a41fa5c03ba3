use std::fmt;

use crate::engine::progress::SessionProgress;
use crate::engine::session::{AnswerOutcome, AssessmentSession};
use crate::error::AssessmentError;
use crate::model::{Question, QuestionId, RevealPolicy, Score};
use crate::time::Clock;

type CompletionHook = Box<dyn FnMut(Score) + Send>;

/// Owns a single [`AssessmentSession`] and drives it with a [`Clock`].
///
/// An optional completion hook runs exactly once, when the last unanswered
/// question receives its response.
pub struct AssessmentEngine {
    clock: Clock,
    session: AssessmentSession,
    on_complete: Option<CompletionHook>,
}

impl AssessmentEngine {
    /// Start a new session over `questions`, stamped by `clock`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::InvalidInput` for an empty set or duplicate ids.
    pub fn start(questions: Vec<Question>, clock: Clock) -> Result<Self, AssessmentError> {
        let session = AssessmentSession::start(questions, clock.now())?;
        Ok(Self::from_session(session, clock))
    }

    /// Wrap an already started session.
    #[must_use]
    pub fn from_session(session: AssessmentSession, clock: Clock) -> Self {
        Self {
            clock,
            session,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn with_reveal_policy(mut self, reveal: RevealPolicy) -> Self {
        self.session = self.session.with_reveal_policy(reveal);
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: chrono::Duration) -> Self {
        self.session = self.session.with_time_limit(limit);
        self
    }

    /// Register the completion hook. Replaces any earlier one.
    #[must_use]
    pub fn on_complete(mut self, hook: impl FnMut(Score) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> AssessmentSession {
        self.session
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access to the clock, for driving time in tests and simulations.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Record an answer at the clock's current time.
    ///
    /// # Errors
    ///
    /// See [`AssessmentSession::select_answer`].
    pub fn select_answer(
        &mut self,
        question_id: &QuestionId,
        option: usize,
    ) -> Result<AnswerOutcome, AssessmentError> {
        let outcome = self
            .session
            .select_answer(question_id, option, self.clock.now())?;
        self.fire_if_completed(&outcome);
        Ok(outcome)
    }

    /// Answer the question under the cursor.
    ///
    /// # Errors
    ///
    /// See [`AssessmentSession::select_answer`].
    pub fn answer_current(&mut self, option: usize) -> Result<AnswerOutcome, AssessmentError> {
        let outcome = self.session.answer_current(option, self.clock.now())?;
        self.fire_if_completed(&outcome);
        Ok(outcome)
    }

    fn fire_if_completed(&mut self, outcome: &AnswerOutcome) {
        if !outcome.session_completed {
            return;
        }
        if let Some(mut hook) = self.on_complete.take() {
            hook(self.session.compute_score());
        }
    }

    /// # Errors
    ///
    /// See [`AssessmentSession::reveal_explanation`].
    pub fn reveal_explanation(&self, question_id: &QuestionId) -> Result<&str, AssessmentError> {
        self.session.reveal_explanation(question_id)
    }

    pub fn advance(&mut self) -> bool {
        self.session.advance()
    }

    pub fn back(&mut self) -> bool {
        self.session.back()
    }

    pub fn next_unanswered(&mut self) -> bool {
        self.session.next_unanswered()
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        self.session.current_question()
    }

    #[must_use]
    pub fn compute_score(&self) -> Score {
        self.session.compute_score()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// True when the session has a time limit that has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.session.is_expired(self.clock.now())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }
}

impl fmt::Debug for AssessmentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentEngine")
            .field("clock", &self.clock)
            .field("session", &self.session)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;
    use crate::time::{fixed_clock, fixed_now};
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    fn questions() -> Vec<Question> {
        [(1_u64, 1_usize), (2, 0), (3, 2)]
            .into_iter()
            .map(|(id, correct)| {
                QuestionDraft::new(id, format!("Q{id}"), ["a", "b", "c"], correct, "why")
                    .validate()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn completion_hook_fires_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let mut engine = AssessmentEngine::start(questions(), fixed_clock())
            .unwrap()
            .on_complete(move |score| sink.lock().unwrap().push(score.as_pair()));

        engine.select_answer(&QuestionId::from(1_u64), 1).unwrap();
        engine.select_answer(&QuestionId::from(2_u64), 1).unwrap();
        assert!(calls.lock().unwrap().is_empty());
        engine.select_answer(&QuestionId::from(3_u64), 2).unwrap();
        let _ = engine.select_answer(&QuestionId::from(3_u64), 0);

        assert_eq!(*calls.lock().unwrap(), vec![(2, 3)]);
        assert!(engine.is_complete());
    }

    #[test]
    fn engine_stamps_completion_with_clock() {
        let mut engine = AssessmentEngine::start(questions(), fixed_clock()).unwrap();
        engine.clock_mut().advance(Duration::seconds(45));
        for _ in 0..3 {
            engine.answer_current(0).unwrap();
            engine.advance();
        }
        assert_eq!(
            engine.session().completed_at(),
            Some(fixed_now() + Duration::seconds(45))
        );
        assert_eq!(engine.session().started_at(), fixed_now());
    }

    #[test]
    fn engine_enforces_time_limit() {
        let mut engine = AssessmentEngine::start(questions(), fixed_clock())
            .unwrap()
            .with_time_limit(Duration::minutes(1));
        engine.clock_mut().advance(Duration::minutes(2));
        assert!(engine.is_expired());
        assert_eq!(
            engine.answer_current(1).unwrap_err(),
            AssessmentError::TimeExpired
        );
    }
}
