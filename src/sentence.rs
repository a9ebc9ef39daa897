//! Sentences as seen by the transition system.
//!
//! A [`Sentence`] is an immutable sequence of tokens where index 0 is always the
//! synthetic ROOT token `(None, ROOT_TAG)`. Index 1 refers to the first word of
//! the input, index 2 to the second, and so on.

use serde::{Deserialize, Serialize};

/// A part-of-speech tag given exclusively to the root.
pub const ROOT_TAG: &str = "TOP";

/// A single (word, tag) pair. The root token has no word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub word: Option<String>,
    pub tag: String,
}

impl Token {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: Some(word.into()),
            tag: tag.into(),
        }
    }

    /// The synthetic ROOT token.
    pub fn root() -> Self {
        Self {
            word: None,
            tag: ROOT_TAG.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.word.is_none()
    }
}

/// An ordered, fixed-length sequence of tokens with ROOT at index 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Builds a sentence from `(word, tag)` pairs, prepending ROOT.
    pub fn new<I, W, T>(words: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        let mut tokens = vec![Token::root()];
        tokens.extend(words.into_iter().map(|(w, t)| Token::new(w, t)));
        Self { tokens }
    }

    /// Number of tokens including ROOT.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the sentence holds no words besides ROOT.
    pub fn is_empty(&self) -> bool {
        self.tokens.len() == 1
    }

    /// Number of real words (ROOT excluded).
    pub fn word_count(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The words of the sentence, ROOT excluded.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens[1..].iter().filter_map(|t| t.word.as_deref())
    }

    /// A short human readable label for `index`, used in logs and diffs.
    pub fn describe(&self, index: usize) -> String {
        match self.tokens.get(index) {
            Some(Token { word: Some(w), .. }) => format!("{index}:{w}"),
            Some(Token { word: None, .. }) => format!("{index}:ROOT"),
            None => format!("{index}:?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_prepended() {
        let s = Sentence::new([("the", "DT"), ("cat", "NN")]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.word_count(), 2);
        assert!(s.token(0).unwrap().is_root());
        assert_eq!(s.token(0).unwrap().tag, ROOT_TAG);
        assert_eq!(s.words().collect::<Vec<_>>(), vec!["the", "cat"]);
    }

    #[test]
    fn empty_sentence_only_has_root() {
        let s = Sentence::new(Vec::<(String, String)>::new());
        assert!(s.is_empty());
        assert_eq!(s.len(), 1);
        assert_eq!(s.describe(0), "0:ROOT");
        assert_eq!(s.describe(4), "4:?");
    }
}
