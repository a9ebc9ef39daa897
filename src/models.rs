//! Baseline models for the batch driver.
//!
//! None of these learn anything. They exist to drive [`crate::batch`] from the
//! CLI and from tests: fixed branching strategies, a lookup table that answers
//! with the oracle, and a seeded random proposer.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, warn};

use crate::{oracle, Configuration, GoldTree, Model, Sentence, Transition, TransitionKind};

/// Label used by the baseline models when none is configured.
pub const DEFAULT_LABEL: &str = "deprel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branching {
    /// Right-arc until completion.
    Right,
    /// Left-arc until only ROOT and one word remain, then a final right-arc.
    Left,
    /// Left when the first word is literally `left`, right otherwise.
    Auto,
}

/// Shifts every word, then attaches them in a fixed direction.
#[derive(Debug, Clone)]
pub struct BranchingModel {
    pub branching: Branching,
    pub label: String,
}

impl BranchingModel {
    pub fn new(branching: Branching) -> Self {
        Self {
            branching,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn propose(&self, config: &Configuration) -> Transition {
        if !config.buffer_is_empty() {
            return Transition::Shift;
        }
        let left = match self.branching {
            Branching::Left => true,
            Branching::Right => false,
            Branching::Auto => config
                .sentence()
                .token(1)
                .and_then(|t| t.word.as_deref())
                == Some("left"),
        };
        if left && config.stack().len() != 2 {
            Transition::left_arc(self.label.clone())
        } else {
            Transition::right_arc(self.label.clone())
        }
    }
}

impl Model for BranchingModel {
    fn predict(&self, batch: &[&Configuration]) -> Vec<Transition> {
        batch.iter().map(|c| self.propose(c)).collect()
    }
}

/// A lookup table from sentence to gold tree that answers with the oracle.
///
/// Unknown sentences, and configurations the oracle cannot continue, get a
/// shift; once the buffer is empty that proposal is illegal and the parse is
/// retired by the driver. When a sentence occurs twice with different trees
/// the first tree wins and [`GoldModel::conflicts`] counts the loser.
#[derive(Debug, Default, Clone)]
pub struct GoldModel {
    trees: HashMap<Sentence, GoldTree>,
    conflicts: usize,
}

impl GoldModel {
    pub fn new<I: IntoIterator<Item = GoldTree>>(trees: I) -> Self {
        let mut model = Self::default();
        for tree in trees {
            match model.trees.entry(tree.sentence()) {
                Entry::Vacant(slot) => {
                    slot.insert(tree);
                }
                Entry::Occupied(kept) if *kept.get() != tree => {
                    let words: Vec<&str> = kept.key().words().collect();
                    warn!(sentence = %words.join(" "), "sentence has two different gold trees; keeping the first");
                    model.conflicts += 1;
                }
                Entry::Occupied(_) => {}
            }
        }
        model
    }

    /// Trees dropped because their sentence already had a different tree.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl Model for GoldModel {
    fn predict(&self, batch: &[&Configuration]) -> Vec<Transition> {
        batch
            .iter()
            .map(|config| {
                let Some(gold) = self.trees.get(config.sentence()) else {
                    return Transition::Shift;
                };
                oracle(config, gold).unwrap_or_else(|e| {
                    debug!(error = %e, "oracle has no move; proposing shift");
                    Transition::Shift
                })
            })
            .collect()
    }
}

/// Proposes a uniformly random transition kind and label.
pub struct RandomModel {
    rng: Mutex<Xoshiro256StarStar>,
    labels: Vec<String>,
}

impl RandomModel {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Xoshiro256StarStar::seed_from_u64(seed)),
            labels: vec![DEFAULT_LABEL.to_string()],
        }
    }

    /// Labels to draw from. An empty list keeps the default label.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if !labels.is_empty() {
            self.labels = labels;
        }
        self
    }
}

impl Model for RandomModel {
    fn predict(&self, batch: &[&Configuration]) -> Vec<Transition> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        batch
            .iter()
            .map(|_| {
                let kind = TransitionKind::ALL[rng.gen_range(0..TransitionKind::ALL.len())];
                let label = self
                    .labels
                    .choose(&mut *rng)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_LABEL.to_string());
                match kind {
                    TransitionKind::Shift => Transition::Shift,
                    TransitionKind::LeftArc => Transition::LeftArc(label),
                    TransitionKind::RightArc => Transition::RightArc(label),
                }
            })
            .collect()
    }
}
