//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use assess_core::AssessmentError;
use assess_core::model::{ExamConfigError, QuestionError, QuestionId};

/// Errors emitted while loading a `QuestionBank`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question at position {position} is invalid: {source}")]
    Question {
        position: usize,
        #[source]
        source: QuestionError,
    },
    #[error("duplicate question id in bank: {0}")]
    DuplicateId(QuestionId),
}

/// Errors emitted by `QuestionSelector`.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error(transparent)]
    Weights(#[from] ExamConfigError),
}

/// Errors emitted while loading exam configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read exam config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed exam config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors emitted by `ExamService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for exam")]
    Empty,
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}
