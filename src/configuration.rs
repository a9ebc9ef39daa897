//! The arc-standard state machine.
//!
//! A [`Configuration`] is the full state of one parse: the stack of sentence
//! indices (bottom first, ROOT at the bottom), the buffer frontier, and the
//! arcs created so far. It is owned by exactly one parsing run and mutated in
//! place by [`Configuration::apply`].
//!
//! Each dependent appears in at most one arc. This holds by construction: both
//! arc transitions pop the dependent immediately after attaching it.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{err_msg, ParseError, Sentence, Transition};

/// A labelled dependency `head ->label dependent`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DepArc {
    pub head: usize,
    pub dependent: usize,
    pub label: String,
}

impl DepArc {
    pub fn new(head: usize, dependent: usize, label: impl Into<String>) -> Self {
        Self {
            head,
            dependent,
            label: label.into(),
        }
    }
}

impl std::fmt::Display for DepArc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -{}-> {}", self.head, self.label, self.dependent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    sentence: Sentence,
    stack: Vec<usize>,
    frontier: usize,
    arcs: Vec<DepArc>,
}

impl Configuration {
    /// The initial configuration: `stack = [0]`, `frontier = 1`, no arcs.
    pub fn new(sentence: Sentence) -> Self {
        Self {
            sentence,
            stack: vec![0],
            frontier: 1,
            arcs: Vec::new(),
        }
    }

    /// Builds an arbitrary mid-parse configuration, checking the state invariants.
    pub fn from_parts(
        sentence: Sentence,
        stack: Vec<usize>,
        frontier: usize,
        arcs: Vec<DepArc>,
    ) -> Result<Self, ParseError> {
        let len = sentence.len();
        if stack.first() != Some(&0) {
            return Err(err_msg!(
                InvalidConfiguration,
                "stack must start with ROOT, got {:?}",
                stack
            ));
        }
        if frontier < 1 || frontier > len {
            return Err(err_msg!(
                InvalidConfiguration,
                "frontier {} outside [1, {}]",
                frontier,
                len
            ));
        }
        if let Some(bad) = stack.iter().find(|&&i| i >= len) {
            return Err(err_msg!(
                InvalidConfiguration,
                "stack index {} outside sentence of length {}",
                bad,
                len
            ));
        }
        if let Some(bad) = arcs.iter().find(|a| a.head >= len || a.dependent >= len) {
            return Err(err_msg!(
                InvalidConfiguration,
                "arc {} outside sentence of length {}",
                bad,
                len
            ));
        }
        if let Some(pair) = stack.windows(2).find(|w| w[0] >= w[1]) {
            return Err(err_msg!(
                InvalidConfiguration,
                "stack must be strictly increasing, found {} below {}",
                pair[0],
                pair[1]
            ));
        }
        if let Some(bad) = stack.iter().find(|&&i| i >= frontier) {
            return Err(err_msg!(
                InvalidConfiguration,
                "stack index {} is not below the frontier {}",
                bad,
                frontier
            ));
        }
        let mut attached = vec![false; len];
        for arc in &arcs {
            if arc.dependent == 0 {
                return Err(err_msg!(InvalidConfiguration, "arc {} makes ROOT a dependent", arc));
            }
            if std::mem::replace(&mut attached[arc.dependent], true) {
                return Err(err_msg!(
                    InvalidConfiguration,
                    "token {} has more than one head",
                    arc.dependent
                ));
            }
        }
        Ok(Self {
            sentence,
            stack,
            frontier,
            arcs,
        })
    }

    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// Stack indices, bottom first.
    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    /// Next unconsumed sentence index. The buffer is `[frontier, len)`.
    pub fn frontier(&self) -> usize {
        self.frontier
    }

    /// Arcs in creation order.
    pub fn arcs(&self) -> &[DepArc] {
        &self.arcs
    }

    pub fn into_arcs(self) -> Vec<DepArc> {
        self.arcs
    }

    pub fn buffer_is_empty(&self) -> bool {
        self.frontier == self.sentence.len()
    }

    /// Stack element `depth` positions below the top (0 is the top).
    pub fn peek(&self, depth: usize) -> Option<usize> {
        self.stack.len().checked_sub(depth + 1).map(|i| self.stack[i])
    }

    /// Buffer empty and only ROOT left on the stack.
    pub fn is_complete(&self) -> bool {
        self.buffer_is_empty() && self.stack.len() == 1 && self.stack[0] == 0
    }

    /// Applies one transition in place.
    ///
    /// Fails with `AlreadyComplete` on a finished configuration and with
    /// `IllegalTransition` when the move's precondition does not hold. A failed
    /// call leaves the configuration untouched.
    pub fn apply(&mut self, transition: &Transition) -> Result<(), ParseError> {
        if self.is_complete() {
            return Err(ParseError::already_complete());
        }
        match transition {
            Transition::Shift => {
                if self.buffer_is_empty() {
                    return Err(err_msg!(IllegalTransition, "shift with an empty buffer"));
                }
                self.stack.push(self.frontier);
                self.frontier += 1;
            }
            Transition::LeftArc(label) => {
                // ROOT may never become a dependent, hence three rather than two.
                if self.stack.len() < 3 {
                    return Err(err_msg!(
                        IllegalTransition,
                        "left-arc needs at least 3 stack items, found {}",
                        self.stack.len()
                    ));
                }
                let top = self.stack[self.stack.len() - 1];
                let second = self.stack.remove(self.stack.len() - 2);
                self.arcs.push(DepArc::new(top, second, label.clone()));
            }
            Transition::RightArc(label) => {
                if self.stack.len() < 2 {
                    return Err(err_msg!(
                        IllegalTransition,
                        "right-arc needs at least 2 stack items, found {}",
                        self.stack.len()
                    ));
                }
                let top = self.stack[self.stack.len() - 1];
                let second = self.stack[self.stack.len() - 2];
                self.stack.truncate(self.stack.len() - 1);
                self.arcs.push(DepArc::new(second, top, label.clone()));
            }
        }
        trace!(%transition, stack = ?self.stack, frontier = self.frontier, "applied");
        Ok(())
    }

    /// Applies every transition in order, stopping at the first failure.
    pub fn apply_all<'a, I>(&mut self, transitions: I) -> Result<&[DepArc], ParseError>
    where
        I: IntoIterator<Item = &'a Transition>,
    {
        for transition in transitions {
            self.apply(transition)?;
        }
        Ok(&self.arcs)
    }

    /// The first `n` dependents of `index` in arc creation order (all when `n` is `None`).
    ///
    /// Only direct dependents recorded so far are returned, leftmost first.
    pub fn leftmost_dependents(&self, index: usize, n: Option<usize>) -> Vec<usize> {
        let deps = self
            .arcs
            .iter()
            .filter(|arc| arc.head == index)
            .map(|arc| arc.dependent);
        match n {
            Some(n) => deps.take(n).collect(),
            None => deps.collect(),
        }
    }

    /// The last `n` dependents of `index`, rightmost first.
    pub fn rightmost_dependents(&self, index: usize, n: Option<usize>) -> Vec<usize> {
        let deps = self
            .arcs
            .iter()
            .rev()
            .filter(|arc| arc.head == index)
            .map(|arc| arc.dependent);
        match n {
            Some(n) => deps.take(n).collect(),
            None => deps.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hundred_words() -> Sentence {
        Sentence::new((0..100).map(|x| (format!("word_{x}"), format!("tag_{x}"))))
    }

    fn step(stack: Vec<usize>, frontier: usize, t: Transition) -> Configuration {
        let mut c = Configuration::from_parts(hundred_words(), stack, frontier, vec![]).unwrap();
        c.apply(&t).unwrap();
        c
    }

    #[test]
    fn shift_pushes_frontier() {
        let c = step(vec![0, 1], 2, Transition::Shift);
        assert_eq!(c.stack(), &[0, 1, 2]);
        assert_eq!(c.frontier(), 3);
        assert!(c.arcs().is_empty());
    }

    #[test]
    fn left_arc_removes_second() {
        let c = step(vec![0, 1, 2], 3, Transition::left_arc("tingle"));
        assert_eq!(c.stack(), &[0, 2]);
        assert_eq!(c.frontier(), 3);
        assert_eq!(c.arcs(), &[DepArc::new(2, 1, "tingle")]);
    }

    #[test]
    fn right_arc_removes_top() {
        let c = step(vec![0, 1, 2], 3, Transition::right_arc("koolimpah"));
        assert_eq!(c.stack(), &[0, 1]);
        assert_eq!(c.arcs(), &[DepArc::new(1, 2, "koolimpah")]);
    }

    #[test]
    fn failed_apply_leaves_state_untouched() {
        let mut c = Configuration::from_parts(hundred_words(), vec![0, 5], 6, vec![]).unwrap();
        let before = c.clone();
        assert!(c.apply(&Transition::left_arc("x")).is_err());
        assert_eq!(c, before);
    }

    #[test]
    fn peek_counts_from_top() {
        let c = Configuration::from_parts(hundred_words(), vec![0, 4, 9], 10, vec![]).unwrap();
        assert_eq!(c.peek(0), Some(9));
        assert_eq!(c.peek(2), Some(0));
        assert_eq!(c.peek(3), None);
    }

    #[test]
    fn from_parts_rejects_broken_invariants() {
        assert!(Configuration::from_parts(hundred_words(), vec![], 1, vec![]).is_err());
        assert!(Configuration::from_parts(hundred_words(), vec![3], 4, vec![]).is_err());
        assert!(Configuration::from_parts(hundred_words(), vec![0], 0, vec![]).is_err());
        assert!(Configuration::from_parts(hundred_words(), vec![0], 102, vec![]).is_err());
        assert!(Configuration::from_parts(hundred_words(), vec![0, 200], 5, vec![]).is_err());
        let arcs = vec![DepArc::new(0, 150, "x")];
        assert!(Configuration::from_parts(hundred_words(), vec![0], 5, arcs).is_err());
    }

    #[test]
    fn from_parts_rejects_unreachable_states() {
        let unordered = Configuration::from_parts(hundred_words(), vec![0, 4, 2], 5, vec![]);
        assert!(matches!(unordered, Err(ParseError::InvalidConfiguration { .. })));
        assert!(Configuration::from_parts(hundred_words(), vec![0, 3, 3], 5, vec![]).is_err());
        let unshifted = Configuration::from_parts(hundred_words(), vec![0, 1, 7], 5, vec![]).unwrap_err();
        assert!(unshifted.to_string().contains("not below the frontier"));

        let twice = vec![DepArc::new(0, 1, "a"), DepArc::new(2, 1, "b")];
        let err = Configuration::from_parts(hundred_words(), vec![0, 2], 3, twice).unwrap_err();
        assert!(err.to_string().contains("token 1 has more than one head"));
        let rooted = vec![DepArc::new(1, 0, "a")];
        assert!(Configuration::from_parts(hundred_words(), vec![0, 1], 2, rooted).is_err());
    }
}
