mod report;
mod service;

pub use report::{CategoryScore, ExamReport, QuestionResult, UNCATEGORISED};
pub use service::ExamService;
