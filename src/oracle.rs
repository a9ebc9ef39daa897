//! Static training oracle for the arc-standard system.
//!
//! Given a configuration and a projective gold tree, [`oracle`] picks the one
//! transition that keeps the parse on course for the gold arcs. Left-arc is
//! preferred over shift whenever both would reach the gold tree. A right-arc is
//! postponed while the top of the stack still has gold dependents in the
//! buffer, because popping it would strand them.
//!
//! On a non-projective tree the oracle eventually runs out of legal moves and
//! reports `UnreachableGoldStructure`. [`audit`] turns that into a verdict and
//! cross-checks it against [`GoldTree::is_projective`].

use serde::Serialize;
use tracing::debug;

use crate::{err_msg, Configuration, DepArc, GoldTree, ParseError, Transition};

/// Next gold-reaching transition for `config`.
pub fn oracle(config: &Configuration, gold: &GoldTree) -> Result<Transition, ParseError> {
    if config.is_complete() {
        return Err(ParseError::already_complete().with_help("no transition follows a complete parse"));
    }
    if gold.len() != config.sentence().len() {
        return Err(err_msg!(
            UnreachableGoldStructure,
            "gold tree covers {} tokens but the sentence has {}",
            gold.len(),
            config.sentence().len()
        ));
    }

    let stack = config.stack();
    match stack.len() {
        // Only ROOT: nothing but a shift is legal.
        1 => Ok(Transition::Shift),
        2 => {
            if !config.buffer_is_empty() {
                return Ok(Transition::Shift);
            }
            // The closing move attaches the last word to ROOT under whatever
            // label the corpus uses for it.
            let word = stack[1];
            right_relation(gold, stack[0], word)
                .map(Transition::right_arc)
                .ok_or_else(|| {
                    err_msg!(
                        UnreachableGoldStructure,
                        "token {} is left alone with ROOT but is not its gold dependent",
                        word
                    )
                })
        }
        _ => {
            let (top, second) = match (config.peek(0), config.peek(1)) {
                (Some(top), Some(second)) => (top, second),
                _ => return Err(err_msg!(UnreachableGoldStructure, "stack too shallow")),
            };
            if let Some(rel) = left_relation(gold, top, second) {
                return Ok(Transition::left_arc(rel));
            }
            if let Some(rel) = right_relation(gold, second, top) {
                let pending = gold
                    .right_dependents(top)
                    .into_iter()
                    .any(|dep| dep >= config.frontier());
                if !pending {
                    return Ok(Transition::right_arc(rel));
                }
            }
            shift_or_stuck(config, top, second)
        }
    }
}

fn shift_or_stuck(config: &Configuration, top: usize, second: usize) -> Result<Transition, ParseError> {
    if config.buffer_is_empty() {
        return Err(err_msg!(
            UnreachableGoldStructure,
            "no gold arc links {} and {} and the buffer is empty",
            second,
            top
        )
        .with_help("the gold tree is most likely non-projective"));
    }
    Ok(Transition::Shift)
}

/// Label of `head -> dependent` when the dependent precedes the head.
fn left_relation(gold: &GoldTree, head: usize, dependent: usize) -> Option<String> {
    if dependent > head {
        return None;
    }
    gold.relation(head, dependent).map(str::to_string)
}

/// Label of `head -> dependent` when the dependent follows the head.
fn right_relation(gold: &GoldTree, head: usize, dependent: usize) -> Option<String> {
    if dependent < head {
        return None;
    }
    gold.relation(head, dependent).map(str::to_string)
}

/// The full oracle transition sequence for one gold tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trajectory {
    pub transitions: Vec<Transition>,
    pub arcs: Vec<DepArc>,
}

/// Outcome of replaying the oracle over one gold tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decodability {
    Decodable(Trajectory),
    /// The oracle got stuck on a tree with crossing arcs.
    NonProjective {
        partial_arcs: Vec<DepArc>,
        reason: String,
    },
}

impl Decodability {
    pub fn is_decodable(&self) -> bool {
        matches!(self, Decodability::Decodable(_))
    }
}

/// State left behind by [`replay`], whether or not the oracle finished.
pub struct Replay {
    pub config: Configuration,
    pub transitions: Vec<Transition>,
    pub failure: Option<ParseError>,
}

/// Drives the oracle from the initial configuration until completion or the first failure.
pub fn replay(gold: &GoldTree) -> Replay {
    let mut config = Configuration::new(gold.sentence());
    let mut transitions = Vec::new();
    while !config.is_complete() {
        let step = oracle(&config, gold).and_then(|t| config.apply(&t).map(|()| t));
        match step {
            Ok(t) => transitions.push(t),
            Err(e) => {
                return Replay {
                    config,
                    transitions,
                    failure: Some(e),
                }
            }
        }
    }
    Replay {
        config,
        transitions,
        failure: None,
    }
}

/// Runs the oracle from the initial configuration to completion.
pub fn trajectory(gold: &GoldTree) -> Result<Trajectory, ParseError> {
    let run = replay(gold);
    match run.failure {
        Some(e) => Err(e),
        None => Ok(Trajectory {
            transitions: run.transitions,
            arcs: run.config.into_arcs(),
        }),
    }
}

/// Replays the oracle and classifies the tree.
///
/// An oracle failure on a projective tree, or a completed parse whose arcs
/// differ from the gold arcs, is an `OracleDefect` rather than a verdict.
pub fn audit(gold: &GoldTree) -> Result<Decodability, ParseError> {
    let run = replay(gold);
    match run.failure {
        None => {
            let mut produced = run.config.arcs().to_vec();
            produced.sort();
            let expected = gold.arcs();
            if produced != expected {
                return Err(err_msg!(
                    OracleDefect,
                    "oracle produced {} arcs that differ from the {} gold arcs",
                    produced.len(),
                    expected.len()
                ));
            }
            Ok(Decodability::Decodable(Trajectory {
                transitions: run.transitions,
                arcs: run.config.into_arcs(),
            }))
        }
        Some(e) if e.is_undecodable() => {
            if gold.is_projective() {
                return Err(ParseError::OracleDefect {
                    message: "oracle failed on a projective tree".to_string(),
                    ctx: crate::ErrorContext::none(),
                    source: Some(Box::new(e)),
                });
            }
            debug!(error = %e, "skipping non-projective tree");
            Ok(Decodability::NonProjective {
                partial_arcs: run.config.into_arcs(),
                reason: e.to_string(),
            })
        }
        Some(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sentence, TransitionKind};

    fn tree(heads: &[(usize, &str)]) -> GoldTree {
        let sentence = Sentence::new((1..=heads.len()).map(|i| (format!("word_{i}"), format!("tag_{i}"))));
        GoldTree::from_heads(&sentence, heads.iter().copied()).unwrap()
    }

    #[test]
    fn initial_move_is_shift() {
        let gold = tree(&[(0, "root")]);
        let config = Configuration::new(gold.sentence());
        assert_eq!(oracle(&config, &gold).unwrap(), Transition::Shift);
    }

    #[test]
    fn root_label_is_read_from_gold() {
        for label in ["root", "ROOT", "pred"] {
            let gold = tree(&[(0, label)]);
            let mut config = Configuration::new(gold.sentence());
            config.apply(&Transition::Shift).unwrap();
            assert_eq!(oracle(&config, &gold).unwrap(), Transition::right_arc(label));
        }
    }

    #[test]
    fn complete_configuration_has_no_move() {
        let gold = tree(&[(0, "root")]);
        let mut config = Configuration::new(gold.sentence());
        config
            .apply_all(&[Transition::Shift, Transition::right_arc("root")])
            .unwrap();
        let err = oracle(&config, &gold).unwrap_err();
        assert!(matches!(err, ParseError::AlreadyComplete { .. }));
    }

    #[test]
    fn right_arc_waits_for_pending_dependents() {
        // 1 -> 2 -> 3, all right-branching
        let gold = tree(&[(0, "root"), (1, "a"), (2, "b")]);
        let config = Configuration::from_parts(gold.sentence(), vec![0, 1, 2], 3, vec![]).unwrap();
        assert_eq!(oracle(&config, &gold).unwrap(), Transition::Shift);
    }

    #[test]
    fn left_arc_preferred_over_shift() {
        let gold = tree(&[(2, "det"), (0, "root"), (2, "obj")]);
        let config = Configuration::from_parts(gold.sentence(), vec![0, 1, 2], 3, vec![]).unwrap();
        assert_eq!(oracle(&config, &gold).unwrap().kind(), TransitionKind::LeftArc);
    }

    #[test]
    fn mismatched_gold_is_unreachable() {
        let gold = tree(&[(0, "root")]);
        let config = Configuration::new(Sentence::new([("a", "A"), ("b", "B")]));
        let err = oracle(&config, &gold).unwrap_err();
        assert!(matches!(err, ParseError::UnreachableGoldStructure { .. }));
    }

    #[test]
    fn audit_flags_non_projective_trees() {
        let gold = tree(&[(0, "root"), (1, "x"), (1, "y"), (2, "z")]);
        match audit(&gold).unwrap() {
            Decodability::NonProjective { partial_arcs, reason } => {
                assert!(partial_arcs.len() < 4);
                assert!(reason.contains("Unreachable gold structure"));
            }
            other => panic!("expected non-projective verdict, got {other:?}"),
        }
    }
}
