mod exam;
mod ids;
mod question;
mod score;

pub use exam::{
    DEFAULT_PASS_THRESHOLD, DifficultyWeights, ExamConfig, ExamConfigError, RevealPolicy,
};
pub use ids::{QuestionId, SessionId};
pub use question::{Difficulty, Question, QuestionDraft, QuestionError};
pub use score::Score;
