//! Arcstd: an arc-standard transition-based dependency parser.
//!
//! The crate provides the transition system ([`Configuration`]), the static
//! training oracle ([`oracle()`]) and a minibatch driver
//! ([`minibatch_parse`]) that advances many parses against an external
//! [`Model`].

pub use crate::batch::{minibatch_parse, parallel_minibatch_parse, run_minibatches, Model};
pub use crate::configuration::{Configuration, DepArc};
pub use crate::diagnostics::{ErrorContext, ErrorType, ParseError};
pub use crate::gold::{GoldNode, GoldTree};
pub use crate::oracle::{audit, oracle, trajectory, Decodability, Trajectory};
pub use crate::sentence::{Sentence, Token, ROOT_TAG};
pub use crate::transition::{Transition, TransitionKind};

pub mod batch;
pub mod cli;
pub mod config;
pub mod configuration;
pub mod diagnostics;
pub mod gold;
pub mod models;
pub mod oracle;
pub mod score;
pub mod sentence;
pub mod transition;
