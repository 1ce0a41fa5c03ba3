use std::path::Path;

use tracing::info;

use assess_core::model::ExamConfig;

use crate::error::ConfigError;

/// Parse an exam configuration from TOML.
///
/// # Errors
///
/// Returns `ConfigError::Toml` for malformed TOML or values that fail
/// exam config validation.
pub fn exam_config_from_toml(raw: &str) -> Result<ExamConfig, ConfigError> {
    Ok(toml::from_str(raw)?)
}

/// Read an exam configuration from a TOML file.
///
/// # Errors
///
/// Returns `ConfigError::Io` when the file cannot be read, plus every
/// error of [`exam_config_from_toml`].
pub fn load_exam_config(path: impl AsRef<Path>) -> Result<ExamConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = exam_config_from_toml(&raw)?;
    info!(path = %path.display(), exam = config.exam_id(), "exam config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::RevealPolicy;

    #[test]
    fn parses_full_config() {
        let raw = r#"
exam_id = "first-aid-at-work"
title = "First Aid at Work Mock Examination"
total_questions = 20
time_limit_secs = 1800
pass_threshold = 80
reveal = "at_end"
categories = ["CPR, AED & Airway", "Bleeding, Burns & Shock"]

[weights]
basic = 0.4
intermediate = 0.4
advanced = 0.2
"#;
        let cfg = exam_config_from_toml(raw).unwrap();
        assert_eq!(cfg.exam_id(), "first-aid-at-work");
        assert_eq!(cfg.total_questions(), 20);
        assert_eq!(cfg.time_limit_secs(), Some(1800));
        assert_eq!(cfg.reveal(), RevealPolicy::AtEnd);
        assert_eq!(cfg.categories().len(), 2);
        assert!((cfg.weights().basic - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = exam_config_from_toml("exam_id = \"quick\"\ntotal_questions = 5\n").unwrap();
        assert_eq!(cfg.pass_threshold(), 80);
        assert_eq!(cfg.reveal(), RevealPolicy::Immediate);
        assert!(cfg.categories().is_empty());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = exam_config_from_toml("exam_id = \"x\"\ntotal_questions = 0\n").unwrap_err();
        assert!(err.to_string().contains("total questions"));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = ExamConfig::new("x", "X", 3)
            .unwrap()
            .with_time_limit_secs(60)
            .unwrap();
        let raw = toml::to_string(&cfg).unwrap();
        assert_eq!(exam_config_from_toml(&raw).unwrap(), cfg);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_exam_config("/nope/exam.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
