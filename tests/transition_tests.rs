// tests/transition_tests.rs

mod common;

use arcstd::{Configuration, DepArc, ParseError, Transition};
use common::{arcs, numbered_sentence, sorted};

fn configuration(stack: Vec<usize>, frontier: usize, arcs: Vec<DepArc>) -> Configuration {
    Configuration::from_parts(numbered_sentence(99), stack, frontier, arcs).unwrap()
}

// ---
// Single steps
// ---

#[test]
fn test_parse_applies_sequence() {
    let mut pp = Configuration::new(numbered_sentence(3));
    assert!(!pp.is_complete());
    let produced = pp
        .apply_all(&[
            Transition::Shift,
            Transition::Shift,
            Transition::Shift,
            Transition::left_arc("a"),
            Transition::right_arc("b"),
            Transition::right_arc("c"),
        ])
        .unwrap()
        .to_vec();
    assert_eq!(sorted(&produced), arcs(&[(0, 1, "c"), (1, 3, "b"), (3, 2, "a")]));
    assert_eq!(pp.stack(), &[0]);
    assert_eq!(pp.frontier(), 4);
    assert!(pp.is_complete());
}

#[test]
fn test_apply_all_stops_at_first_error() {
    let mut pp = Configuration::new(numbered_sentence(2));
    let err = pp
        .apply_all(&[Transition::Shift, Transition::left_arc("x"), Transition::Shift])
        .unwrap_err();
    assert!(matches!(err, ParseError::IllegalTransition { .. }));
    assert_eq!(pp.stack(), &[0, 1]);
    assert_eq!(pp.frontier(), 2);
}

// ---
// Illegal transitions
// ---

#[test]
fn test_left_arc_needs_three_items() {
    for stack in [vec![0], vec![0, 1]] {
        let mut pp = configuration(stack, 5, vec![]);
        let err = pp.apply(&Transition::left_arc("x")).unwrap_err();
        assert!(matches!(err, ParseError::IllegalTransition { .. }), "{err}");
    }
}

#[test]
fn test_root_never_becomes_a_dependent() {
    let mut pp = configuration(vec![0, 7], 8, vec![]);
    assert!(pp.apply(&Transition::left_arc("x")).is_err());
    assert!(pp.arcs().is_empty());
}

#[test]
fn test_right_arc_needs_two_items() {
    let mut pp = configuration(vec![0], 5, vec![]);
    let err = pp.apply(&Transition::right_arc("x")).unwrap_err();
    assert!(err.to_string().contains("right-arc needs at least 2"));
}

#[test]
fn test_shift_needs_a_buffer() {
    let mut pp = Configuration::from_parts(numbered_sentence(2), vec![0, 1, 2], 3, vec![]).unwrap();
    let err = pp.apply(&Transition::Shift).unwrap_err();
    assert!(matches!(err, ParseError::IllegalTransition { .. }));
}

#[test]
fn test_complete_configuration_rejects_moves() {
    let mut pp = Configuration::new(numbered_sentence(1));
    pp.apply_all(&[Transition::Shift, Transition::right_arc("root")])
        .unwrap();
    let err = pp.apply(&Transition::Shift).unwrap_err();
    assert!(matches!(err, ParseError::AlreadyComplete { .. }));
}

#[test]
fn test_unknown_transition_id_is_illegal() {
    let err = Transition::from_id(3, Some("x")).unwrap_err();
    assert!(err.is_undecodable());
}

// ---
// Dependant queries
// ---

fn query_fixture() -> Configuration {
    configuration(
        vec![0, 2, 4, 8],
        10,
        vec![
            DepArc::new(0, 1, "a"),
            DepArc::new(4, 3, "b"),
            DepArc::new(4, 5, "c"),
            DepArc::new(4, 6, "d"),
            DepArc::new(8, 7, "e"),
            DepArc::new(8, 9, "f"),
        ],
    )
}

#[test]
fn test_leftmost_rightmost() {
    let pp = query_fixture();
    assert_eq!(pp.leftmost_dependents(0, None), vec![1]);
    assert_eq!(pp.rightmost_dependents(0, Some(1)), vec![1]);
    assert_eq!(pp.leftmost_dependents(2, Some(10)), Vec::<usize>::new());
    assert_eq!(pp.rightmost_dependents(2, None), Vec::<usize>::new());
    assert_eq!(pp.leftmost_dependents(4, Some(0)), Vec::<usize>::new());
    assert_eq!(pp.leftmost_dependents(4, Some(2)), vec![3, 5]);
    assert_eq!(pp.leftmost_dependents(4, Some(4)), vec![3, 5, 6]);
    assert_eq!(pp.rightmost_dependents(4, Some(2)), vec![6, 5]);
}

#[test]
fn test_zero_dependents_is_always_empty() {
    let pp = query_fixture();
    for i in 0..12 {
        assert!(pp.leftmost_dependents(i, Some(0)).is_empty());
        assert!(pp.rightmost_dependents(i, Some(0)).is_empty());
    }
}

#[test]
fn test_queries_do_not_mutate() {
    let pp = query_fixture();
    let before = pp.clone();
    let _ = pp.leftmost_dependents(4, None);
    let _ = pp.rightmost_dependents(8, Some(1));
    assert_eq!(pp, before);
}

#[test]
fn test_queries_return_direct_children_only() {
    let mut pp = Configuration::new(numbered_sentence(3));
    // 3 -> 2 -> 1
    pp.apply_all(&[
        Transition::Shift,
        Transition::Shift,
        Transition::left_arc("a"),
        Transition::Shift,
        Transition::left_arc("b"),
    ])
    .unwrap();
    assert_eq!(pp.leftmost_dependents(3, None), vec![2]);
    assert_eq!(pp.leftmost_dependents(2, None), vec![1]);
}
