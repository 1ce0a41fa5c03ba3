use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use assess_core::model::{Difficulty, Question, QuestionDraft, QuestionId};

use crate::error::BankError;

/// Validated pool of questions that exams and quizzes draw from.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already validated questions.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateId` when two questions share an id.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, BankError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(BankError::DuplicateId(question.id().clone()));
            }
        }
        Ok(Self { questions })
    }

    /// Parse a JSON array of question literals.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Json` for malformed JSON, `BankError::Question` for
    /// the first invalid question and `BankError::DuplicateId` for repeated ids.
    pub fn from_json_str(json: &str) -> Result<Self, BankError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| {
                draft
                    .validate()
                    .map_err(|source| BankError::Question { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let bank = Self::from_questions(questions)?;
        debug!(questions = bank.len(), "question bank parsed");
        Ok(bank)
    }

    /// Read and parse a JSON question bank from disk.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Io` when the file cannot be read, plus every error
    /// of [`QuestionBank::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&raw)?;
        info!(path = %path.display(), questions = bank.len(), "question bank loaded");
        Ok(bank)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .filter_map(Question::category)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Question> {
        self.questions
            .iter()
            .filter(move |q| q.category() == Some(category))
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.difficulty() == Some(difficulty))
    }
}
