//! Attachment scores of predicted arcs against a gold tree.

use std::ops::AddAssign;

use serde::Serialize;

use crate::{DepArc, GoldTree};

/// Counts of correctly attached words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentScore {
    /// Words in the gold tree (ROOT excluded).
    pub total: usize,
    /// Words whose predicted head matches the gold head.
    pub unlabeled: usize,
    /// Words whose predicted head and label both match.
    pub labeled: usize,
}

impl AttachmentScore {
    pub fn uas(&self) -> f64 {
        ratio(self.unlabeled, self.total)
    }

    pub fn las(&self) -> f64 {
        ratio(self.labeled, self.total)
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

impl AddAssign for AttachmentScore {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.unlabeled += rhs.unlabeled;
        self.labeled += rhs.labeled;
    }
}

/// Scores `predicted` against `gold`. Words without a predicted arc count as errors.
pub fn attachment_score(predicted: &[DepArc], gold: &GoldTree) -> AttachmentScore {
    let mut score = AttachmentScore {
        total: gold.len().saturating_sub(1),
        ..AttachmentScore::default()
    };
    for arc in predicted {
        let Some(node) = gold.node(arc.dependent) else {
            continue;
        };
        if arc.dependent == 0 || node.head != Some(arc.head) {
            continue;
        }
        score.unlabeled += 1;
        if node.rel.as_deref() == Some(arc.label.as_str()) {
            score.labeled += 1;
        }
    }
    score
}
