use tracing::{info, warn};

use assess_core::model::ExamConfig;
use assess_core::{AssessmentEngine, Clock};

use super::report::ExamReport;
use crate::bank::QuestionBank;
use crate::error::ExamError;
use crate::selection::{QuestionSelector, SelectionPlan};

/// Assembles exam sessions from a bank and an [`ExamConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamService {
    clock: Clock,
    seed: Option<u64>,
}

impl ExamService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock, seed: None }
    }

    /// Make question selection reproducible.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pick questions for `config` without starting a session.
    ///
    /// Uses balanced selection when the config names categories, a uniform
    /// random draw otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Selection` for unusable difficulty weights.
    pub fn plan(&self, bank: &QuestionBank, config: &ExamConfig) -> Result<SelectionPlan, ExamError> {
        let selector = match self.seed {
            Some(seed) => QuestionSelector::seeded(seed),
            None => QuestionSelector::from_entropy(),
        };
        let mut selector = selector.with_weights(config.weights())?;
        let count = config.total_questions();
        let plan = if config.categories().is_empty() {
            selector.random(bank, count)
        } else {
            selector.balanced(bank, count, config.categories())
        };
        if plan.total() < count {
            warn!(
                exam = config.exam_id(),
                requested = count,
                available = plan.total(),
                "bank too small for requested exam size"
            );
        }
        Ok(plan)
    }

    /// Select questions and start a session for `config`.
    ///
    /// The session uses the config's reveal policy and time limit, and is
    /// stamped with this service's clock.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Empty` if no questions could be selected.
    /// Returns `ExamError::Selection` or `ExamError::Assessment` for invalid
    /// weights or a question set the engine refuses.
    pub fn start_exam(
        &self,
        bank: &QuestionBank,
        config: &ExamConfig,
    ) -> Result<AssessmentEngine, ExamError> {
        let plan = self.plan(bank, config)?;
        if plan.is_empty() {
            return Err(ExamError::Empty);
        }

        let mut engine =
            AssessmentEngine::start(plan.questions, self.clock)?.with_reveal_policy(config.reveal());
        if let Some(limit) = config.time_limit() {
            engine = engine.with_time_limit(limit);
        }
        info!(
            exam = config.exam_id(),
            session = %engine.session().id(),
            questions = engine.session().total_questions(),
            "exam started"
        );
        Ok(engine)
    }

    /// Report on `engine` as of the engine's own clock.
    #[must_use]
    pub fn report(&self, engine: &AssessmentEngine, config: &ExamConfig) -> ExamReport {
        let report = ExamReport::from_session(engine.session(), config, &engine.clock());
        info!(
            exam = config.exam_id(),
            session = %report.session_id,
            correct = report.score.correct,
            total = report.score.total,
            passed = report.passed,
            "exam reported"
        );
        report
    }
}
