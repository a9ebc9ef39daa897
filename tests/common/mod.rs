//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use arcstd::{DepArc, GoldTree, Sentence};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Every tree of a fixture file.
pub fn load_fixture(name: &str) -> Vec<GoldTree> {
    let path = fixture(name);
    let text = std::fs::read_to_string(&path).unwrap();
    GoldTree::read_corpus(name, &text).unwrap()
}

/// `word_1 .. word_n` tagged `tag_1 .. tag_n`.
pub fn numbered_sentence(n: usize) -> Sentence {
    Sentence::new((1..=n).map(|x| (format!("word_{x}"), format!("tag_{x}"))))
}

pub fn sentence(words: &[(&str, &str)]) -> Sentence {
    Sentence::new(words.iter().copied())
}

pub fn sorted(arcs: &[DepArc]) -> Vec<DepArc> {
    let mut arcs = arcs.to_vec();
    arcs.sort();
    arcs
}

pub fn arcs(triples: &[(usize, usize, &str)]) -> Vec<DepArc> {
    let mut arcs: Vec<DepArc> = triples
        .iter()
        .map(|&(h, d, l)| DepArc::new(h, d, l))
        .collect();
    arcs.sort();
    arcs
}
