#![forbid(unsafe_code)]

pub mod bank;
pub mod config;
pub mod error;
pub mod exam;
pub mod selection;

pub use assess_core::Clock;

pub use bank::QuestionBank;
pub use config::{exam_config_from_toml, load_exam_config};
pub use error::{BankError, ConfigError, ExamError, SelectionError};
pub use exam::{CategoryScore, ExamReport, ExamService, QuestionResult};
pub use selection::{QuestionSelector, SelectionPlan};
