use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

use assess_core::model::{Difficulty, DifficultyWeights, Question, QuestionId};

use crate::bank::QuestionBank;
use crate::error::SelectionError;

/// Questions picked for a session, plus how they were picked.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPlan {
    pub questions: Vec<Question>,
    /// Questions taken per requested category, before fill-up.
    pub per_category: Vec<(String, usize)>,
    /// Questions added from the whole bank to reach the requested count.
    pub filled: usize,
}

impl SelectionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Random question picker for quizzes and mock exams.
pub struct QuestionSelector<R: Rng = StdRng> {
    rng: R,
    weights: DifficultyWeights,
}

impl QuestionSelector<StdRng> {
    /// Selector seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic selector, for tests and reproducible exams.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuestionSelector<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            weights: DifficultyWeights::default(),
        }
    }

    /// Override the per-category difficulty split.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::Weights` for negative or all-zero weights.
    pub fn with_weights(mut self, weights: DifficultyWeights) -> Result<Self, SelectionError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// Up to `count` questions drawn uniformly from the whole bank.
    pub fn random(&mut self, bank: &QuestionBank, count: usize) -> SelectionPlan {
        let mut pool: Vec<&Question> = bank.questions().iter().collect();
        pool.shuffle(&mut self.rng);
        let questions: Vec<Question> = pool.into_iter().take(count).cloned().collect();
        SelectionPlan {
            filled: questions.len(),
            questions,
            per_category: Vec::new(),
        }
    }

    /// Spread `count` questions evenly across `categories`.
    ///
    /// Each category gets `count / n` questions, the first `count % n`
    /// categories one more. Inside a category the quota is split by the
    /// difficulty weights; questions without a difficulty count as
    /// intermediate. Shortfalls are filled from the rest of the bank and the
    /// final list is shuffled.
    pub fn balanced<S: AsRef<str>>(
        &mut self,
        bank: &QuestionBank,
        count: usize,
        categories: &[S],
    ) -> SelectionPlan {
        if categories.is_empty() {
            return self.random(bank, count);
        }

        let n = categories.len();
        let base = count / n;
        let remainder = count % n;
        let mut selected: Vec<&Question> = Vec::with_capacity(count);
        let mut selected_ids: HashSet<&QuestionId> = HashSet::new();
        let mut per_category = Vec::with_capacity(n);

        for (index, category) in categories.iter().enumerate() {
            let category = category.as_ref();
            let target = base + usize::from(index < remainder);
            let pool: Vec<&Question> = bank
                .by_category(category)
                .filter(|q| !selected_ids.contains(q.id()))
                .collect();
            if pool.is_empty() {
                debug!(category, "no questions for category");
                per_category.push((category.to_owned(), 0));
                continue;
            }

            let (basic_n, intermediate_n, advanced_n) = self.split_target(target);
            let mut taken = 0;
            for (band, quota) in [
                (Difficulty::Basic, basic_n),
                (Difficulty::Intermediate, intermediate_n),
                (Difficulty::Advanced, advanced_n),
            ] {
                let mut band_pool: Vec<&Question> = pool
                    .iter()
                    .copied()
                    .filter(|q| q.difficulty().unwrap_or(Difficulty::Intermediate) == band)
                    .collect();
                band_pool.shuffle(&mut self.rng);
                for question in band_pool.into_iter().take(quota) {
                    selected_ids.insert(question.id());
                    selected.push(question);
                    taken += 1;
                }
            }
            per_category.push((category.to_owned(), taken));
        }

        let mut filled = 0;
        if selected.len() < count {
            let mut rest: Vec<&Question> = bank
                .questions()
                .iter()
                .filter(|q| !selected_ids.contains(q.id()))
                .collect();
            rest.shuffle(&mut self.rng);
            let needed = count - selected.len();
            for question in rest.into_iter().take(needed) {
                selected.push(question);
                filled += 1;
            }
        }

        selected.shuffle(&mut self.rng);
        selected.truncate(count);
        debug!(requested = count, selected = selected.len(), filled, "balanced selection");

        SelectionPlan {
            questions: selected.into_iter().cloned().collect(),
            per_category,
            filled,
        }
    }

    /// Take an explicit number of questions from each category, then shuffle.
    ///
    /// A category listed twice draws from whatever the earlier entry left.
    pub fn by_counts<S: AsRef<str>>(
        &mut self,
        bank: &QuestionBank,
        counts: &[(S, usize)],
    ) -> SelectionPlan {
        let mut selected: Vec<&Question> = Vec::new();
        let mut selected_ids: HashSet<&QuestionId> = HashSet::new();
        let mut per_category = Vec::with_capacity(counts.len());

        for (category, count) in counts {
            let category = category.as_ref();
            let mut pool: Vec<&Question> = bank
                .by_category(category)
                .filter(|q| !selected_ids.contains(q.id()))
                .collect();
            pool.shuffle(&mut self.rng);
            let before = selected.len();
            for question in pool.into_iter().take(*count) {
                selected_ids.insert(question.id());
                selected.push(question);
            }
            per_category.push((category.to_owned(), selected.len() - before));
        }

        selected.shuffle(&mut self.rng);
        SelectionPlan {
            questions: selected.into_iter().cloned().collect(),
            per_category,
            filled: 0,
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn split_target(&self, target: usize) -> (usize, usize, usize) {
        let w = self.weights;
        let sum = w.basic + w.intermediate + w.advanced;
        let basic = ((target as f64) * w.basic / sum).round() as usize;
        let intermediate = ((target as f64) * w.intermediate / sum).round() as usize;
        let intermediate = intermediate.min(target.saturating_sub(basic));
        let basic = basic.min(target);
        let advanced = target.saturating_sub(basic + intermediate);
        (basic, intermediate, advanced)
    }
}
