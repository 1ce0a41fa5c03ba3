#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod model;
pub mod time;

pub use engine::{AnswerOutcome, AssessmentEngine, AssessmentSession, SessionProgress};
pub use error::{AssessmentError, InvalidInput};
pub use time::Clock;
