use chrono::{DateTime, Utc};
use serde::Serialize;

use assess_core::{AssessmentSession, Clock};
use assess_core::model::{ExamConfig, QuestionId, Score, SessionId};

/// Bucket for questions without a category.
pub const UNCATEGORISED: &str = "General";

/// Score for one category of an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: Score,
}

/// Outcome of a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionResult {
    pub id: QuestionId,
    pub category: Option<String>,
    pub selected: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
}

/// Presentation-agnostic result of an exam session.
///
/// No pre-formatted strings; callers format times and percentages as they
/// see fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamReport {
    pub session_id: SessionId,
    pub exam_id: String,
    pub title: String,
    pub score: Score,
    pub percentage: u8,
    pub pass_threshold: u8,
    pub passed: bool,
    pub completed: bool,
    pub timed_out: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub elapsed_secs: i64,
    pub categories: Vec<CategoryScore>,
    pub questions: Vec<QuestionResult>,
}

impl ExamReport {
    /// Build a report for `session` as of `clock`'s current time.
    ///
    /// Pass the clock the session runs on. Unanswered questions count as
    /// wrong. Elapsed time stops at completion and never exceeds the
    /// session's time limit.
    #[must_use]
    pub fn from_session(session: &AssessmentSession, config: &ExamConfig, clock: &Clock) -> Self {
        let score = session.compute_score();
        let completed = session.is_complete();
        let started_at = session.started_at();
        let mut elapsed = match session.completed_at() {
            Some(end) => (end - started_at).max(chrono::Duration::zero()),
            None => clock.elapsed_since(started_at),
        };
        if let Some(limit) = session.time_limit() {
            elapsed = elapsed.min(limit);
        }

        let questions: Vec<QuestionResult> = session
            .questions()
            .iter()
            .map(|q| {
                let selected = session.response(q.id());
                QuestionResult {
                    id: q.id().clone(),
                    category: q.category().map(str::to_owned),
                    selected,
                    correct_option: q.correct_option(),
                    is_correct: selected.is_some_and(|s| q.is_correct(s)),
                }
            })
            .collect();

        Self {
            session_id: session.id(),
            exam_id: config.exam_id().to_owned(),
            title: config.title().to_owned(),
            percentage: score.percentage(),
            pass_threshold: config.pass_threshold(),
            passed: score.passes(config.pass_threshold()),
            completed,
            timed_out: !completed && session.is_expired(clock.now()),
            started_at,
            completed_at: session.completed_at(),
            elapsed_secs: elapsed.num_seconds(),
            categories: category_scores(&questions),
            questions,
            score,
        }
    }

    /// Results the user got wrong or skipped, in question order.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionResult> {
        self.questions.iter().filter(|q| !q.is_correct)
    }
}

fn category_scores(results: &[QuestionResult]) -> Vec<CategoryScore> {
    let mut scores: Vec<CategoryScore> = Vec::new();
    for result in results {
        let category = result.category.as_deref().unwrap_or(UNCATEGORISED);
        let index = match scores.iter().position(|s| s.category == category) {
            Some(index) => index,
            None => {
                scores.push(CategoryScore {
                    category: category.to_owned(),
                    score: Score::default(),
                });
                scores.len() - 1
            }
        };
        let entry = &mut scores[index].score;
        entry.total += 1;
        if result.is_correct {
            entry.correct += 1;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{Question, QuestionDraft};
    use assess_core::time::fixed_now;
    use chrono::Duration;

    fn question(id: u64, category: Option<&str>) -> Question {
        let draft = QuestionDraft::new(id, format!("Q{id}"), ["a", "b"], 0, "");
        let draft = match category {
            Some(c) => draft.with_category(c),
            None => draft,
        };
        draft.validate().unwrap()
    }

    fn config() -> ExamConfig {
        ExamConfig::new("fa", "First Aid", 4)
            .unwrap()
            .with_pass_threshold(75)
            .unwrap()
    }

    #[test]
    fn report_scores_and_breaks_down_by_category() {
        let questions = vec![
            question(1, Some("CPR")),
            question(2, Some("Burns")),
            question(3, Some("CPR")),
            question(4, None),
        ];
        let mut session = AssessmentSession::start(questions, fixed_now()).unwrap();
        let at = fixed_now() + Duration::seconds(90);
        for (id, option) in [(1_u64, 0), (2, 1), (3, 0), (4, 0)] {
            session
                .select_answer(&QuestionId::from(id), option, at)
                .unwrap();
        }

        let report = ExamReport::from_session(
            &session,
            &config(),
            &Clock::fixed(at + Duration::hours(1)),
        );
        assert_eq!(report.score.as_pair(), (3, 4));
        assert_eq!(report.percentage, 75);
        assert!(report.passed);
        assert!(report.completed);
        assert!(!report.timed_out);
        assert_eq!(report.elapsed_secs, 90);
        assert_eq!(
            report.categories,
            vec![
                CategoryScore {
                    category: "CPR".into(),
                    score: Score::new(2, 2)
                },
                CategoryScore {
                    category: "Burns".into(),
                    score: Score::new(0, 1)
                },
                CategoryScore {
                    category: UNCATEGORISED.into(),
                    score: Score::new(1, 1)
                },
            ]
        );
        let missed: Vec<_> = report.missed().map(|q| q.id.as_str()).collect();
        assert_eq!(missed, vec!["2"]);
    }

    #[test]
    fn expired_session_is_reported_as_timed_out() {
        let session = AssessmentSession::start(vec![question(1, None), question(2, None)], fixed_now())
            .unwrap()
            .with_time_limit(Duration::minutes(10));
        let report = ExamReport::from_session(
            &session,
            &config(),
            &Clock::fixed(fixed_now() + Duration::minutes(15)),
        );
        assert!(report.timed_out);
        assert!(!report.completed);
        assert!(!report.passed);
        assert_eq!(report.elapsed_secs, 600);
        assert_eq!(report.questions[0].selected, None);
    }
}
