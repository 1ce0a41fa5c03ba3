use std::io::Write;
use std::sync::{Arc, Mutex};

use assess_core::model::{QuestionId, RevealPolicy};
use assess_core::time::fixed_now;
use assess_core::AssessmentError;
use chrono::Duration;
use services::{Clock, ExamService, QuestionBank, load_exam_config};

const SAMPLE_BANK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/first_aid_sample.json");
const SAMPLE_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/first_aid_exam.toml");

#[test]
fn sample_exam_runs_to_a_report() {
    let bank = QuestionBank::from_json_file(SAMPLE_BANK).unwrap();
    let config = load_exam_config(SAMPLE_CONFIG).unwrap();
    assert_eq!(bank.categories().len(), 3);

    let service = ExamService::new(Clock::fixed(fixed_now())).with_rng_seed(2024);
    let finished = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&finished);
    let mut engine = service
        .start_exam(&bank, &config)
        .unwrap()
        .on_complete(move |score| *sink.lock().unwrap() = Some(score));

    assert_eq!(engine.session().total_questions(), 6);
    assert_eq!(engine.session().reveal_policy(), RevealPolicy::AtEnd);

    // Answer everything correctly except the first question.
    let ids: Vec<QuestionId> = engine
        .session()
        .questions()
        .iter()
        .map(|q| q.id().clone())
        .collect();
    for (n, id) in ids.iter().enumerate() {
        let question = engine.session().question(id).unwrap();
        let option = if n == 0 {
            (question.correct_option() + 1) % question.option_count()
        } else {
            question.correct_option()
        };
        engine.select_answer(id, option).unwrap();
        if n + 1 < ids.len() {
            assert_eq!(
                engine.reveal_explanation(id).unwrap_err(),
                AssessmentError::RevealLocked
            );
        }
    }

    assert!(engine.is_complete());
    assert!(!engine.reveal_explanation(&ids[0]).unwrap().is_empty());
    assert_eq!(finished.lock().unwrap().map(|s| s.as_pair()), Some((5, 6)));

    let report = service.report(&engine, &config);
    assert_eq!(report.percentage, 83);
    assert!(report.passed);
    assert_eq!(report.categories.iter().map(|c| c.score.total).sum::<usize>(), 6);
    assert_eq!(report.missed().count(), 1);
}

#[test]
fn bank_and_config_load_from_temp_files() {
    let dir = tempfile::tempdir().unwrap();

    let bank_path = dir.path().join("bank.json");
    let mut file = std::fs::File::create(&bank_path).unwrap();
    write!(
        file,
        r#"[
            {{"id": "ohms-law", "question": "V = ?", "options": ["I*R", "I/R"], "correctIndex": 0,
              "explanation": "Ohm's law."}},
            {{"id": "rcd-trip", "question": "30mA RCD max trip time at 1x?", "options": ["40ms", "300ms"],
              "correctIndex": 1, "explanation": "300 ms at rated residual current."}}
        ]"#
    )
    .unwrap();

    let config_path = dir.path().join("exam.toml");
    std::fs::write(
        &config_path,
        "exam_id = \"quick-check\"\ntotal_questions = 2\ntime_limit_secs = 60\n",
    )
    .unwrap();

    let bank = QuestionBank::from_json_file(&bank_path).unwrap();
    let config = load_exam_config(&config_path).unwrap();
    let service = ExamService::new(Clock::fixed(fixed_now())).with_rng_seed(1);
    let mut engine = service.start_exam(&bank, &config).unwrap();

    engine.answer_current(0).unwrap();
    engine.clock_mut().advance(Duration::minutes(2));
    engine.advance();
    assert_eq!(
        engine.answer_current(0).unwrap_err(),
        AssessmentError::TimeExpired
    );

    let report = service.report(&engine, &config);
    assert!(report.timed_out);
    assert_eq!(report.elapsed_secs, 60);
}
