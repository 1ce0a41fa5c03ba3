use serde::{Deserialize, Serialize};

/// Correctly answered questions over total questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    #[must_use]
    pub fn new(correct: usize, total: usize) -> Self {
        debug_assert!(correct <= total);
        Self { correct, total }
    }

    /// Whole-number percentage, rounded to nearest. An empty score is 0%.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u8
    }

    /// True when the percentage reaches `threshold`.
    #[must_use]
    pub fn passes(&self, threshold: u8) -> bool {
        self.percentage() >= threshold
    }

    #[must_use]
    pub fn as_pair(&self) -> (usize, usize) {
        (self.correct, self.total)
    }
}

impl From<Score> for (usize, usize) {
    fn from(score: Score) -> Self {
        score.as_pair()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds() {
        assert_eq!(Score::new(2, 3).percentage(), 67);
        assert_eq!(Score::new(16, 20).percentage(), 80);
        assert_eq!(Score::new(0, 0).percentage(), 0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(Score::new(16, 20).passes(80));
        assert!(!Score::new(15, 20).passes(80));
    }
}
