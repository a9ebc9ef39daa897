//! Handles all user-facing output for the CLI.
//!
//! Colors go through `termcolor`; whether they are used is decided once from
//! the settings and the `--no-color` flag.

use difference::{Changeset, Difference};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::score::AttachmentScore;
use crate::{DepArc, Sentence, Transition};

pub struct Printer {
    stdout: StandardStream,
}

impl Printer {
    pub fn new(color: bool) -> Self {
        let choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn colored(&mut self, color: Color, bold: bool, text: &str) {
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
        let _ = writeln!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    fn plain(&mut self, text: &str) {
        let _ = writeln!(self.stdout, "{}", text);
    }

    /// Prints the oracle sequence of one sentence.
    pub fn print_transitions(&mut self, index: usize, sentence: &Sentence, transitions: &[Transition]) {
        let words: Vec<&str> = sentence.words().collect();
        self.colored(Color::Yellow, true, &format!("--- Sentence {}: {} ---", index, words.join(" ")));
        let steps: Vec<String> = transitions.iter().map(Transition::to_string).collect();
        self.plain(&steps.join(" "));
    }

    pub fn print_skipped(&mut self, index: usize, reason: &str) {
        self.colored(Color::Red, false, &format!("--- Sentence {}: skipped ({}) ---", index, reason));
    }

    /// Prints the oracle audit totals.
    pub fn print_audit_summary(&mut self, total: usize, non_projective: usize) {
        let pct = if total == 0 {
            0.0
        } else {
            non_projective as f64 * 100.0 / total as f64
        };
        self.colored(Color::Green, true, &format!("decodable: {}", total - non_projective));
        self.plain(&format!(
            "non-projective: {} of {} ({:.2}%)",
            non_projective, total, pct
        ));
    }

    pub fn print_score(&mut self, score: &AttachmentScore, stuck: usize) {
        self.colored(
            Color::Green,
            true,
            &format!("UAS: {:.2}%  LAS: {:.2}%", score.uas() * 100.0, score.las() * 100.0),
        );
        self.plain(&format!("words: {}  stuck parses: {}", score.total, stuck));
    }

    pub fn print_json(&mut self, json: &str) {
        self.plain(json);
    }

    /// Prints a line diff of expected against produced arcs.
    pub fn print_arc_diff(&mut self, sentence: &Sentence, expected: &[DepArc], produced: &[DepArc]) {
        let render = |arcs: &[DepArc]| {
            arcs.iter()
                .map(|a| format!("{} -{}-> {}", sentence.describe(a.head), a.label, sentence.describe(a.dependent)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let changeset = Changeset::new(&render(expected), &render(produced), "\n");
        for diff in &changeset.diffs {
            match diff {
                Difference::Same(x) => self.plain(&prefix_lines(' ', x)),
                Difference::Add(x) => self.colored(Color::Green, false, &prefix_lines('+', x)),
                Difference::Rem(x) => self.colored(Color::Red, false, &prefix_lines('-', x)),
            }
        }
    }
}

fn prefix_lines(mark: char, text: &str) -> String {
    text.lines()
        .map(|l| format!("{mark}{l}"))
        .collect::<Vec<_>>()
        .join("\n")
}
