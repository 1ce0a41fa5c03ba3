use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExamConfigError {
    #[error("exam id cannot be empty")]
    EmptyExamId,

    #[error("total questions must be > 0")]
    InvalidTotalQuestions,

    #[error("time limit must be > 0 seconds")]
    InvalidTimeLimit,

    #[error("pass threshold must be between 0 and 100, got {0}")]
    InvalidPassThreshold(u8),

    #[error("difficulty weights must be non-negative with a positive sum")]
    InvalidWeights,

    #[error("category names cannot be empty")]
    EmptyCategory,
}

//
// ─── REVEAL POLICY ─────────────────────────────────────────────────────────────
//

/// When a question's explanation becomes readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPolicy {
    /// As soon as the question has been answered (inline checks, practice quizzes).
    #[default]
    Immediate,
    /// Only after the whole session is complete (mock exams).
    AtEnd,
}

//
// ─── DIFFICULTY WEIGHTS ────────────────────────────────────────────────────────
//

/// Share of each difficulty band inside a category quota.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyWeights {
    pub basic: f64,
    pub intermediate: f64,
    pub advanced: f64,
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        Self {
            basic: 0.3,
            intermediate: 0.5,
            advanced: 0.2,
        }
    }
}

impl DifficultyWeights {
    /// # Errors
    ///
    /// Returns `ExamConfigError::InvalidWeights` for negative or non-finite
    /// weights, or when all weights are zero.
    pub fn validate(&self) -> Result<(), ExamConfigError> {
        let all = [self.basic, self.intermediate, self.advanced];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) || all.iter().sum::<f64>() <= 0.0 {
            return Err(ExamConfigError::InvalidWeights);
        }
        Ok(())
    }
}

//
// ─── EXAM CONFIG ───────────────────────────────────────────────────────────────
//

/// Configuration of a mock exam assembled from a question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExamConfig", into = "RawExamConfig")]
pub struct ExamConfig {
    exam_id: String,
    title: String,
    total_questions: usize,
    time_limit_secs: Option<u32>,
    pass_threshold: u8,
    categories: Vec<String>,
    reveal: RevealPolicy,
    weights: DifficultyWeights,
}

pub const DEFAULT_PASS_THRESHOLD: u8 = 80;

impl ExamConfig {
    /// Creates a config with default threshold, no time limit and no categories.
    ///
    /// # Errors
    ///
    /// Returns `ExamConfigError` when the id is blank or `total_questions` is 0.
    pub fn new(
        exam_id: impl Into<String>,
        title: impl Into<String>,
        total_questions: usize,
    ) -> Result<Self, ExamConfigError> {
        let exam_id = exam_id.into();
        if exam_id.trim().is_empty() {
            return Err(ExamConfigError::EmptyExamId);
        }
        if total_questions == 0 {
            return Err(ExamConfigError::InvalidTotalQuestions);
        }
        Ok(Self {
            exam_id,
            title: title.into(),
            total_questions,
            time_limit_secs: None,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            categories: Vec::new(),
            reveal: RevealPolicy::Immediate,
            weights: DifficultyWeights::default(),
        })
    }

    /// # Errors
    ///
    /// Returns `ExamConfigError::InvalidTimeLimit` for a zero limit.
    pub fn with_time_limit_secs(mut self, secs: u32) -> Result<Self, ExamConfigError> {
        if secs == 0 {
            return Err(ExamConfigError::InvalidTimeLimit);
        }
        self.time_limit_secs = Some(secs);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ExamConfigError::InvalidPassThreshold` above 100.
    pub fn with_pass_threshold(mut self, threshold: u8) -> Result<Self, ExamConfigError> {
        if threshold > 100 {
            return Err(ExamConfigError::InvalidPassThreshold(threshold));
        }
        self.pass_threshold = threshold;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ExamConfigError::EmptyCategory` if any name is blank.
    pub fn with_categories<I, S>(mut self, categories: I) -> Result<Self, ExamConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        if categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ExamConfigError::EmptyCategory);
        }
        self.categories = categories;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ExamConfigError::InvalidWeights` for unusable weights.
    pub fn with_weights(mut self, weights: DifficultyWeights) -> Result<Self, ExamConfigError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    #[must_use]
    pub fn with_reveal(mut self, reveal: RevealPolicy) -> Self {
        self.reveal = reveal;
        self
    }

    #[must_use]
    pub fn with_total_questions(mut self, total: usize) -> Self {
        if total > 0 {
            self.total_questions = total;
        }
        self
    }

    #[must_use]
    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(|s| Duration::seconds(i64::from(s)))
    }

    #[must_use]
    pub fn pass_threshold(&self) -> u8 {
        self.pass_threshold
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn reveal(&self) -> RevealPolicy {
        self.reveal
    }

    #[must_use]
    pub fn weights(&self) -> DifficultyWeights {
        self.weights
    }
}

/// On-disk shape of [`ExamConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawExamConfig {
    exam_id: String,
    #[serde(default)]
    title: String,
    total_questions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_limit_secs: Option<u32>,
    #[serde(default = "default_pass_threshold")]
    pass_threshold: u8,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    reveal: RevealPolicy,
    #[serde(default)]
    weights: DifficultyWeights,
}

fn default_pass_threshold() -> u8 {
    DEFAULT_PASS_THRESHOLD
}

impl TryFrom<RawExamConfig> for ExamConfig {
    type Error = ExamConfigError;

    fn try_from(raw: RawExamConfig) -> Result<Self, Self::Error> {
        let mut config = ExamConfig::new(raw.exam_id, raw.title, raw.total_questions)?
            .with_pass_threshold(raw.pass_threshold)?
            .with_categories(raw.categories)?
            .with_weights(raw.weights)?
            .with_reveal(raw.reveal);
        if let Some(secs) = raw.time_limit_secs {
            config = config.with_time_limit_secs(secs)?;
        }
        Ok(config)
    }
}

impl From<ExamConfig> for RawExamConfig {
    fn from(config: ExamConfig) -> Self {
        Self {
            exam_id: config.exam_id,
            title: config.title,
            total_questions: config.total_questions,
            time_limit_secs: config.time_limit_secs,
            pass_threshold: config.pass_threshold,
            categories: config.categories,
            reveal: config.reveal,
            weights: config.weights,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let cfg = ExamConfig::new("first-aid", "First Aid Mock", 20).unwrap();
        assert_eq!(cfg.pass_threshold(), 80);
        assert_eq!(cfg.time_limit(), None);
        assert_eq!(cfg.reveal(), RevealPolicy::Immediate);
        assert_eq!(cfg.weights(), DifficultyWeights::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            ExamConfig::new(" ", "t", 1).unwrap_err(),
            ExamConfigError::EmptyExamId
        );
        assert_eq!(
            ExamConfig::new("x", "t", 0).unwrap_err(),
            ExamConfigError::InvalidTotalQuestions
        );
        let cfg = ExamConfig::new("x", "t", 5).unwrap();
        assert_eq!(
            cfg.clone().with_pass_threshold(101).unwrap_err(),
            ExamConfigError::InvalidPassThreshold(101)
        );
        assert_eq!(
            cfg.clone().with_time_limit_secs(0).unwrap_err(),
            ExamConfigError::InvalidTimeLimit
        );
        let zero = DifficultyWeights {
            basic: 0.0,
            intermediate: 0.0,
            advanced: 0.0,
        };
        assert_eq!(
            cfg.with_weights(zero).unwrap_err(),
            ExamConfigError::InvalidWeights
        );
    }

    #[test]
    fn time_limit_converts_to_duration() {
        let cfg = ExamConfig::new("x", "t", 5)
            .unwrap()
            .with_time_limit_secs(1800)
            .unwrap();
        assert_eq!(cfg.time_limit(), Some(Duration::minutes(30)));
    }

    #[test]
    fn deserialize_validates() {
        let json = r#"{"exam_id": "x", "total_questions": 3, "pass_threshold": 150}"#;
        assert!(serde_json::from_str::<ExamConfig>(json).is_err());

        let json = r#"{"exam_id": "x", "total_questions": 3, "reveal": "at_end"}"#;
        let cfg: ExamConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.reveal(), RevealPolicy::AtEnd);
        assert_eq!(cfg.pass_threshold(), DEFAULT_PASS_THRESHOLD);
    }
}
