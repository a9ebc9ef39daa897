//! The three arc-standard moves.
//!
//! Only the arc-producing variants carry a relation label, so a labelled shift
//! cannot be constructed. External models that speak in numeric ids go through
//! [`Transition::from_id`].

use serde::{Deserialize, Serialize};

use crate::{err_msg, ParseError};

/// Kind of a transition without its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    LeftArc,
    RightArc,
    Shift,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 3] = [
        TransitionKind::LeftArc,
        TransitionKind::RightArc,
        TransitionKind::Shift,
    ];

    /// Stable numeric id: left-arc = 0, right-arc = 1, shift = 2.
    pub fn id(self) -> u8 {
        match self {
            TransitionKind::LeftArc => 0,
            TransitionKind::RightArc => 1,
            TransitionKind::Shift => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TransitionKind::LeftArc),
            1 => Some(TransitionKind::RightArc),
            2 => Some(TransitionKind::Shift),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::LeftArc => "left-arc",
            TransitionKind::RightArc => "right-arc",
            TransitionKind::Shift => "shift",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition together with its relation label, when it produces an arc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "kebab-case")]
pub enum Transition {
    /// Pops `stack[-2]` as a dependent of `stack[-1]`.
    LeftArc(String),
    /// Pops `stack[-1]` as a dependent of `stack[-2]`.
    RightArc(String),
    Shift,
}

impl Transition {
    pub fn left_arc(label: impl Into<String>) -> Self {
        Transition::LeftArc(label.into())
    }

    pub fn right_arc(label: impl Into<String>) -> Self {
        Transition::RightArc(label.into())
    }

    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::LeftArc(_) => TransitionKind::LeftArc,
            Transition::RightArc(_) => TransitionKind::RightArc,
            Transition::Shift => TransitionKind::Shift,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Transition::LeftArc(label) | Transition::RightArc(label) => Some(label),
            Transition::Shift => None,
        }
    }

    /// Builds a transition from a numeric id and an optional label.
    ///
    /// The label is ignored for shift. An unknown id, or an arc id without a
    /// label, is an illegal transition.
    pub fn from_id(id: u8, label: Option<&str>) -> Result<Self, ParseError> {
        let kind = TransitionKind::from_id(id)
            .ok_or_else(|| err_msg!(IllegalTransition, "unknown transition id {}", id))?;
        Self::from_kind(kind, label)
    }

    pub fn from_kind(kind: TransitionKind, label: Option<&str>) -> Result<Self, ParseError> {
        match (kind, label) {
            (TransitionKind::Shift, _) => Ok(Transition::Shift),
            (TransitionKind::LeftArc, Some(l)) => Ok(Transition::left_arc(l)),
            (TransitionKind::RightArc, Some(l)) => Ok(Transition::right_arc(l)),
            (kind, None) => Err(err_msg!(
                IllegalTransition,
                "{} requires a relation label",
                kind
            )),
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Shift => f.write_str("shift"),
            Transition::LeftArc(label) => write!(f, "left-arc({label})"),
            Transition::RightArc(label) => write!(f, "right-arc({label})"),
        }
    }
}
