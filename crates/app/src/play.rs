use std::io::{self, BufRead, Write};

use assess_core::model::{Question, RevealPolicy};
use assess_core::{AssessmentEngine, AssessmentError};
use services::ExamReport;

/// Why the interactive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayExit {
    Finished,
    Quit,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Skip,
    Back,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "skip" => Input::Skip,
        "b" | "back" => Input::Back,
        "q" | "quit" => Input::Quit,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Input::Answer(n - 1),
            _ => Input::Unknown,
        },
    }
}

fn render_question(
    out: &mut impl Write,
    question: &Question,
    position: usize,
    total: usize,
) -> io::Result<()> {
    writeln!(out)?;
    match question.category() {
        Some(category) => writeln!(out, "Question {position}/{total} [{category}]")?,
        None => writeln!(out, "Question {position}/{total}")?,
    }
    writeln!(out, "{}", question.prompt())?;
    for (i, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}) {option}", i + 1)?;
    }
    write!(out, "> ")?;
    out.flush()
}

/// Drive `engine` from line-based input until it completes, runs out of
/// time, or the user quits. End of input counts as quitting.
///
/// # Errors
///
/// Returns I/O errors from reading input or writing output.
pub fn play(
    engine: &mut AssessmentEngine,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<PlayExit> {
    let mut lines = input.lines();
    loop {
        if engine.is_complete() {
            return Ok(PlayExit::Finished);
        }
        if engine.is_expired() {
            writeln!(out, "Time is up.")?;
            return Ok(PlayExit::TimedOut);
        }

        let progress = engine.progress();
        let question = engine.current_question();
        let option_count = question.option_count();
        render_question(out, question, progress.current_index + 1, progress.total)?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(PlayExit::Quit);
        };

        match parse_input(&line) {
            Input::Answer(option) => match engine.answer_current(option) {
                Ok(outcome) => {
                    if engine.session().reveal_policy() == RevealPolicy::Immediate {
                        let question = engine.current_question();
                        if outcome.is_correct {
                            writeln!(out, "Correct.")?;
                        } else {
                            let correct = question.correct_option();
                            writeln!(
                                out,
                                "Incorrect. The answer is {}) {}",
                                correct + 1,
                                question.options()[correct]
                            )?;
                        }
                        if let Ok(text) = engine.reveal_explanation(&outcome.question_id) {
                            if !text.is_empty() {
                                writeln!(out, "{text}")?;
                            }
                        }
                    } else {
                        writeln!(out, "Answer recorded.")?;
                    }
                    engine.next_unanswered();
                }
                Err(AssessmentError::TimeExpired) => {
                    writeln!(out, "Time is up.")?;
                    return Ok(PlayExit::TimedOut);
                }
                Err(AssessmentError::AlreadyAnswered { .. }) => {
                    writeln!(out, "Already answered.")?;
                    engine.next_unanswered();
                }
                Err(err) => writeln!(out, "{err}")?,
            },
            Input::Skip => {
                engine.next_unanswered();
            }
            Input::Back => {
                if !engine.back() {
                    writeln!(out, "Already at the first question.")?;
                }
            }
            Input::Quit => return Ok(PlayExit::Quit),
            Input::Unknown => {
                writeln!(out, "Enter 1-{option_count}, (s)kip, (b)ack or (q)uit.")?;
            }
        }
    }
}

/// Print a human-readable report. Explanations for missed questions are
/// shown once the session allows revealing them.
///
/// # Errors
///
/// Returns I/O errors from writing output.
pub fn render_report(
    out: &mut impl Write,
    engine: &AssessmentEngine,
    report: &ExamReport,
) -> io::Result<()> {
    writeln!(out)?;
    if !report.title.is_empty() {
        writeln!(out, "{}", report.title)?;
    }
    writeln!(
        out,
        "Score: {}/{} ({}%) - {}",
        report.score.correct,
        report.score.total,
        report.percentage,
        if report.passed { "PASS" } else { "FAIL" }
    )?;
    writeln!(out, "Pass mark: {}%", report.pass_threshold)?;
    if report.timed_out {
        writeln!(out, "Time limit reached.")?;
    }
    writeln!(out, "Time taken: {}m {:02}s", report.elapsed_secs / 60, report.elapsed_secs % 60)?;

    if report.categories.len() > 1 {
        writeln!(out, "By category:")?;
        for category in &report.categories {
            writeln!(
                out,
                "  {}: {}/{}",
                category.category, category.score.correct, category.score.total
            )?;
        }
    }

    let session = engine.session();
    let mut header = false;
    for missed in report.missed() {
        let Some(question) = session.question(&missed.id) else {
            continue;
        };
        let Ok(explanation) = session.reveal_explanation(&missed.id) else {
            continue;
        };
        if !header {
            writeln!(out, "Review:")?;
            header = true;
        }
        writeln!(out, "  - {}", question.prompt())?;
        writeln!(
            out,
            "    Answer: {}",
            question.options()[question.correct_option()]
        )?;
        if !explanation.is_empty() {
            writeln!(out, "    {explanation}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{ExamConfig, QuestionDraft, QuestionId};
    use assess_core::time::fixed_clock;
    use std::io::Cursor;

    fn engine(reveal: RevealPolicy) -> AssessmentEngine {
        let questions = [(1_u64, 1_usize), (2, 0), (3, 2)]
            .into_iter()
            .map(|(id, correct)| {
                QuestionDraft::new(id, format!("Prompt {id}"), ["a", "b", "c"], correct, format!("Because {id}"))
                    .validate()
                    .unwrap()
            })
            .collect();
        AssessmentEngine::start(questions, fixed_clock())
            .unwrap()
            .with_reveal_policy(reveal)
    }

    fn run(engine: &mut AssessmentEngine, input: &str) -> (PlayExit, String) {
        let mut out = Vec::new();
        let exit = play(engine, Cursor::new(input.to_owned()), &mut out).unwrap();
        (exit, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_inputs() {
        assert_eq!(parse_input(" 2 "), Input::Answer(1));
        assert_eq!(parse_input("0"), Input::Unknown);
        assert_eq!(parse_input("S"), Input::Skip);
        assert_eq!(parse_input("back"), Input::Back);
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input("maybe"), Input::Unknown);
    }

    #[test]
    fn plays_to_completion_with_immediate_feedback() {
        let mut engine = engine(RevealPolicy::Immediate);
        let (exit, out) = run(&mut engine, "2\n2\n3\n");
        assert_eq!(exit, PlayExit::Finished);
        assert_eq!(engine.compute_score().as_pair(), (2, 3));
        assert!(out.contains("Correct."));
        assert!(out.contains("Incorrect. The answer is 1) a"));
        assert!(out.contains("Because 2"));
    }

    #[test]
    fn skip_returns_to_unanswered_questions() {
        let mut engine = engine(RevealPolicy::AtEnd);
        let (exit, out) = run(&mut engine, "s\n1\n3\n2\n");
        assert_eq!(exit, PlayExit::Finished);
        assert_eq!(engine.session().response(&QuestionId::from(1_u64)), Some(1));
        assert!(out.contains("Answer recorded."));
        assert!(!out.contains("Because"));
    }

    #[test]
    fn out_of_range_answer_is_reported() {
        let mut engine = engine(RevealPolicy::Immediate);
        let (exit, out) = run(&mut engine, "7\nq\n");
        assert_eq!(exit, PlayExit::Quit);
        assert!(out.contains("out of range"));
        assert_eq!(engine.progress().answered, 0);
    }

    #[test]
    fn end_of_input_quits() {
        let mut engine = engine(RevealPolicy::Immediate);
        let (exit, _) = run(&mut engine, "1\n");
        assert_eq!(exit, PlayExit::Quit);
        assert_eq!(engine.progress().answered, 1);
    }

    #[test]
    fn report_lists_missed_questions() {
        let mut engine = engine(RevealPolicy::AtEnd);
        run(&mut engine, "1\n1\n3\n");
        let config = ExamConfig::new("quiz", "Sample Quiz", 3).unwrap();
        let report = ExamReport::from_session(engine.session(), &config, &engine.clock());

        let mut out = Vec::new();
        render_report(&mut out, &engine, &report).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Score: 2/3 (67%) - FAIL"));
        assert!(out.contains("Prompt 1"));
        assert!(out.contains("Because 1"));
        assert!(!out.contains("Prompt 2"));
    }
}
