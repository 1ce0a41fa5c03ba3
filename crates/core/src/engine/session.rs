use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::engine::progress::SessionProgress;
use crate::error::{AssessmentError, InvalidInput};
use crate::model::{Question, QuestionDraft, QuestionId, RevealPolicy, Score, SessionId};

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of recording an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub selected: usize,
    pub is_correct: bool,
    /// True only for the answer that completed the session.
    pub session_completed: bool,
}

/// Per-question state. `Answered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "option", rename_all = "snake_case")]
pub enum QuestionState {
    Unanswered,
    Answered(usize),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A user's progress through a fixed, validated question set.
///
/// The session is a plain value owned by its caller; every transition takes
/// `&mut self`. A recorded answer is never replaced, so repeated submissions
/// (a double click, a resent event) cannot change the outcome.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    questions: Vec<Question>,
    positions: HashMap<QuestionId, usize>,
    responses: Vec<Option<usize>>,
    answered: usize,
    current: usize,
    reveal: RevealPolicy,
    time_limit: Option<Duration>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    /// Start a session over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput::EmptyQuestionSet` for an empty set and
    /// `InvalidInput::DuplicateQuestionId` when two questions share an id.
    pub fn start(
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, AssessmentError> {
        if questions.is_empty() {
            return Err(InvalidInput::EmptyQuestionSet.into());
        }

        let mut positions = HashMap::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            if positions.insert(question.id().clone(), position).is_some() {
                return Err(InvalidInput::DuplicateQuestionId(question.id().clone()).into());
            }
        }

        let session = Self {
            id: SessionId::generate(),
            responses: vec![None; questions.len()],
            questions,
            positions,
            answered: 0,
            current: 0,
            reveal: RevealPolicy::default(),
            time_limit: None,
            started_at,
            completed_at: None,
        };
        info!(session = %session.id, questions = session.questions.len(), "assessment started");
        Ok(session)
    }

    /// Validate raw question literals and start a session over them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput::Question` naming the first invalid draft, plus
    /// every error of [`AssessmentSession::start`].
    pub fn start_from_drafts(
        drafts: impl IntoIterator<Item = QuestionDraft>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, AssessmentError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| {
                draft
                    .validate()
                    .map_err(|source| InvalidInput::Question { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::start(questions, started_at)
    }

    #[must_use]
    pub fn with_reveal_policy(mut self, reveal: RevealPolicy) -> Self {
        self.reveal = reveal;
        self
    }

    /// Answers are refused once `limit` has elapsed since `started_at`.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.positions.get(question_id).map(|&p| &self.questions[p])
    }

    #[must_use]
    pub fn reveal_policy(&self) -> RevealPolicy {
        self.reveal
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered
    }

    /// The option recorded for `question_id`, if any.
    #[must_use]
    pub fn response(&self, question_id: &QuestionId) -> Option<usize> {
        self.positions
            .get(question_id)
            .and_then(|&p| self.responses[p])
    }

    #[must_use]
    pub fn state(&self, question_id: &QuestionId) -> Option<QuestionState> {
        let position = *self.positions.get(question_id)?;
        Some(match self.responses[position] {
            Some(option) => QuestionState::Answered(option),
            None => QuestionState::Unanswered,
        })
    }

    /// Recorded responses in question order.
    pub fn responses(&self) -> impl Iterator<Item = (&QuestionId, usize)> {
        self.questions
            .iter()
            .zip(&self.responses)
            .filter_map(|(q, r)| r.map(|option| (q.id(), option)))
    }

    /// `Some(true|false)` once answered, `None` before or for an unknown id.
    #[must_use]
    pub fn is_correct(&self, question_id: &QuestionId) -> Option<bool> {
        let position = *self.positions.get(question_id)?;
        self.responses[position].map(|option| self.questions[position].is_correct(option))
    }

    /// True iff every question has a recorded response.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered == self.questions.len()
    }

    /// True when a time limit is set and has run out at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_limit
            .is_some_and(|limit| now - self.started_at >= limit)
    }

    /// Time left before the limit runs out, clamped at zero.
    #[must_use]
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.time_limit
            .map(|limit| (limit - (now - self.started_at)).max(Duration::zero()))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answered,
            remaining: self.questions.len() - self.answered,
            current_index: self.current,
            is_complete: self.is_complete(),
        }
    }

    /// Record `option` as the answer to `question_id`.
    ///
    /// `answered_at` should come from the caller's clock.
    ///
    /// # Errors
    ///
    /// - `InvalidInput::UnknownQuestion` for an id outside the session.
    /// - `AlreadyAnswered` when a response exists; the first one is kept.
    /// - `InvalidInput::OptionOutOfRange` when `option` is not a valid index.
    /// - `TimeExpired` once the time limit has run out.
    ///
    /// Responses are unchanged on every error.
    pub fn select_answer(
        &mut self,
        question_id: &QuestionId,
        option: usize,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, AssessmentError> {
        let Some(&position) = self.positions.get(question_id) else {
            return Err(InvalidInput::UnknownQuestion(question_id.clone()).into());
        };
        if self.responses[position].is_some() {
            debug!(session = %self.id, question = %question_id, "duplicate answer ignored");
            return Err(AssessmentError::AlreadyAnswered {
                question_id: question_id.clone(),
            });
        }
        let question = &self.questions[position];
        if option >= question.option_count() {
            return Err(InvalidInput::OptionOutOfRange {
                question_id: question_id.clone(),
                index: option,
                len: question.option_count(),
            }
            .into());
        }
        if self.is_expired(answered_at) {
            return Err(AssessmentError::TimeExpired);
        }

        let is_correct = question.is_correct(option);
        self.responses[position] = Some(option);
        self.answered += 1;
        debug!(session = %self.id, question = %question_id, option, is_correct, "answer recorded");

        let session_completed = self.is_complete();
        if session_completed {
            self.completed_at = Some(answered_at);
            let score = self.compute_score();
            info!(
                session = %self.id,
                correct = score.correct,
                total = score.total,
                "assessment completed"
            );
        }

        Ok(AnswerOutcome {
            question_id: question_id.clone(),
            selected: option,
            is_correct,
            session_completed,
        })
    }

    /// Answer whichever question the cursor is on.
    ///
    /// # Errors
    ///
    /// Same as [`AssessmentSession::select_answer`].
    pub fn answer_current(
        &mut self,
        option: usize,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, AssessmentError> {
        let id = self.current_question().id().clone();
        self.select_answer(&id, option, answered_at)
    }

    /// Explanation text for an answered question.
    ///
    /// # Errors
    ///
    /// - `InvalidInput::UnknownQuestion` for an id outside the session.
    /// - `NotAnswered` before the question has a response.
    /// - `RevealLocked` under [`RevealPolicy::AtEnd`] until the session completes.
    pub fn reveal_explanation(&self, question_id: &QuestionId) -> Result<&str, AssessmentError> {
        let Some(&position) = self.positions.get(question_id) else {
            return Err(InvalidInput::UnknownQuestion(question_id.clone()).into());
        };
        if self.responses[position].is_none() {
            return Err(AssessmentError::NotAnswered {
                question_id: question_id.clone(),
            });
        }
        if self.reveal == RevealPolicy::AtEnd && !self.is_complete() {
            return Err(AssessmentError::RevealLocked);
        }
        Ok(self.questions[position].explanation())
    }

    /// Move to the next question. No-op on the last one.
    pub fn advance(&mut self) -> bool {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous question. No-op on the first one.
    pub fn back(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor to the next unanswered question, wrapping around to
    /// the start. Returns false when every question is answered.
    pub fn next_unanswered(&mut self) -> bool {
        let n = self.questions.len();
        let Some(offset) = (1..=n).find(|o| self.responses[(self.current + o) % n].is_none())
        else {
            return false;
        };
        self.current = (self.current + offset) % n;
        true
    }

    /// Count of questions whose response equals the correct option.
    #[must_use]
    pub fn compute_score(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .zip(&self.responses)
            .filter(|(q, r)| r.is_some_and(|option| q.is_correct(option)))
            .count();
        Score::new(correct, self.questions.len())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
