mod assessment;
mod progress;
mod session;

pub use assessment::AssessmentEngine;
pub use progress::SessionProgress;
pub use session::{AnswerOutcome, AssessmentSession, QuestionState};
