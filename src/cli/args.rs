//! Defines the command-line arguments and subcommands for the arcstd CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "arcstd",
    version,
    about = "Arc-standard dependency parsing: oracle audits and batched parsing."
)]
pub struct ArcstdArgs {
    /// YAML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Default log filter, used when RUST_LOG is unset.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay the oracle over every tree and report how many are decodable.
    Oracle {
        /// A CoNLL file, or a directory searched for `*.conll` files.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Print the oracle transition sequence of every sentence.
    Transitions {
        /// The CoNLL file to read.
        #[arg(required = true)]
        file: PathBuf,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Parse every sentence with a baseline model and report attachment scores.
    Parse {
        /// The CoNLL file holding sentences and their gold trees.
        #[arg(required = true)]
        file: PathBuf,
        /// Which baseline model proposes transitions.
        #[arg(long, value_enum, default_value_t = ModelChoice::Gold)]
        model: ModelChoice,
        /// Configurations per model call.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Parallel partitions.
        #[arg(long)]
        workers: Option<usize>,
        /// Seed for the random model.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Emit the predicted arcs as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelChoice {
    /// Answers with the oracle for sentences it has gold trees for.
    Gold,
    /// Left-branching baseline.
    Left,
    /// Right-branching baseline.
    Right,
    /// Left-branching when the first word is `left`.
    Auto,
    /// Seeded random proposals.
    Random,
}
