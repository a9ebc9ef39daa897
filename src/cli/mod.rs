//! The arcstd Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::cli::args::{ArcstdArgs, Command, ModelChoice};
use crate::cli::output::Printer;
use crate::config::ParserConfig;
use crate::models::{Branching, BranchingModel, GoldModel, RandomModel};
use crate::oracle::replay;
use crate::score::{attachment_score, AttachmentScore};
use crate::{
    audit, minibatch_parse, parallel_minibatch_parse, trajectory, Decodability, DepArc,
    GoldTree, Model, ParseError, Transition,
};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = ArcstdArgs::parse();

    let result = load_settings(&args).and_then(|settings| {
        init_tracing(&settings.log_level);
        let mut printer = Printer::new(settings.color);
        match args.command {
            Command::Oracle { ref path } => handle_oracle(path, &mut printer),
            Command::Transitions { ref file, json } => handle_transitions(file, json, &mut printer),
            Command::Parse {
                ref file,
                model,
                batch_size,
                workers,
                seed,
                json,
            } => {
                let settings = ParserConfig {
                    batch_size: batch_size.unwrap_or(settings.batch_size),
                    workers: workers.unwrap_or(settings.workers),
                    ..settings
                };
                handle_parse(file, model, seed, json, &settings, &mut printer)
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

fn load_settings(args: &ArcstdArgs) -> Result<ParserConfig, ParseError> {
    let mut settings = match &args.config {
        Some(path) => ParserConfig::load(path)?,
        None => ParserConfig::default(),
    };
    if let Some(level) = &args.log_level {
        settings.log_level = level.clone();
    }
    if args.no_color {
        settings.color = false;
    }
    Ok(settings)
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Reads one CoNLL file, or every `*.conll` file below a directory in path order.
fn load_corpus(path: &Path) -> Result<Vec<GoldTree>, ParseError> {
    let files: Vec<PathBuf> = if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path().extension().map(|ext| ext == "conll").unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut trees = Vec::new();
    for file in files {
        let text = std::fs::read_to_string(&file).map_err(|e| ParseError::io(&file, e))?;
        let found = GoldTree::read_corpus(&file.display().to_string(), &text)?;
        info!(file = %file.display(), sentences = found.len(), "loaded corpus");
        trees.extend(found);
    }
    Ok(trees)
}

/// Handles the `oracle` subcommand.
fn handle_oracle(path: &Path, printer: &mut Printer) -> Result<(), ParseError> {
    let trees = load_corpus(path)?;
    let mut non_projective = 0;
    for (index, tree) in trees.iter().enumerate() {
        match audit(tree) {
            Ok(Decodability::Decodable(_)) => {}
            Ok(Decodability::NonProjective { .. }) => non_projective += 1,
            Err(e @ ParseError::OracleDefect { .. }) => {
                let mut produced = replay(tree).config.into_arcs();
                produced.sort();
                printer.print_arc_diff(&tree.sentence(), &tree.arcs(), &produced);
                return Err(e.with_help(format!("sentence {} of the corpus", index)));
            }
            Err(e) => return Err(e),
        }
    }
    info!(total = trees.len(), non_projective, "oracle audit finished");
    printer.print_audit_summary(trees.len(), non_projective);
    Ok(())
}

#[derive(Serialize)]
struct TransitionReport<'a> {
    index: usize,
    words: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transitions: Option<Vec<Transition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Handles the `transitions` subcommand.
fn handle_transitions(file: &Path, json: bool, printer: &mut Printer) -> Result<(), ParseError> {
    let trees = load_corpus(file)?;
    let sentences: Vec<_> = trees.iter().map(GoldTree::sentence).collect();
    let mut reports = Vec::with_capacity(trees.len());
    for (index, (tree, sentence)) in trees.iter().zip(&sentences).enumerate() {
        let outcome = trajectory(tree);
        if !json {
            match &outcome {
                Ok(t) => printer.print_transitions(index, sentence, &t.transitions),
                Err(e) => printer.print_skipped(index, &e.to_string()),
            }
        }
        let (transitions, error) = match outcome {
            Ok(t) => (Some(t.transitions), None),
            Err(e) => (None, Some(e.to_string())),
        };
        reports.push(TransitionReport {
            index,
            words: sentence.words().collect(),
            transitions,
            error,
        });
    }
    if json {
        printer.print_json(&to_json(&reports)?);
    }
    Ok(())
}

/// Handles the `parse` subcommand.
fn handle_parse(
    file: &Path,
    choice: ModelChoice,
    seed: u64,
    json: bool,
    settings: &ParserConfig,
    printer: &mut Printer,
) -> Result<(), ParseError> {
    let trees = load_corpus(file)?;
    let label = settings.default_label.clone();
    let model: Box<dyn Model + Sync> = match choice {
        ModelChoice::Gold => Box::new(GoldModel::new(trees.iter().cloned())),
        ModelChoice::Left => Box::new(BranchingModel::new(Branching::Left).with_label(label)),
        ModelChoice::Right => Box::new(BranchingModel::new(Branching::Right).with_label(label)),
        ModelChoice::Auto => Box::new(BranchingModel::new(Branching::Auto).with_label(label)),
        ModelChoice::Random => Box::new(RandomModel::new(seed).with_labels(corpus_labels(&trees))),
    };

    let sentences: Vec<_> = trees.iter().map(GoldTree::sentence).collect();
    let parsed = if settings.workers > 1 {
        parallel_minibatch_parse(sentences, model.as_ref(), settings.batch_size, settings.workers)
    } else {
        minibatch_parse(sentences, model.as_ref(), settings.batch_size)
    };
    let mut total = AttachmentScore::default();
    let mut stuck = 0;
    for (arcs, tree) in parsed.iter().zip(&trees) {
        if arcs.len() + 1 < tree.len() {
            stuck += 1;
        }
        total += attachment_score(arcs, tree);
    }
    info!(sentences = trees.len(), stuck, "parse finished");

    if json {
        let arcs: Vec<&Vec<DepArc>> = parsed.iter().collect();
        printer.print_json(&to_json(&arcs)?);
    }
    printer.print_score(&total, stuck);
    Ok(())
}

fn corpus_labels(trees: &[GoldTree]) -> Vec<String> {
    let mut labels: Vec<String> = trees
        .iter()
        .flat_map(|t| t.arcs().into_iter().map(|a| a.label))
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ParseError> {
    serde_json::to_string_pretty(value).map_err(|e| ParseError::Io {
        message: "failed to serialize JSON output".to_string(),
        ctx: crate::ErrorContext::none(),
        source: Some(Box::new(e)),
    })
}
