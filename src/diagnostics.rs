//! Unified, `miette`-based diagnostics for arcstd.
//!
//! Every failure produced by the transition system, the oracle, the corpus
//! reader, or the CLI is a [`ParseError`]. Construction goes through the
//! `err_msg!` and `err_ctx!` macros:
//!
//! - `err_msg!(IllegalTransition, "stack holds {} items", n)` for message-only errors.
//! - `err_ctx!(Corpus, "bad head column", src, span)` when a corpus source and span are known.
//! - `err_ctx!(Corpus, "bad head column", src, span, help)` to attach a help line.
//!
//! Callers that process corpora of unknown projectivity should branch on
//! [`ParseError::is_undecodable`] rather than matching variants by hand.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// Byte range inside a corpus source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Type-safe classification of [`ParseError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A transition whose precondition does not hold
    IllegalTransition,
    /// A transition or oracle request on a finished configuration
    AlreadyComplete,
    /// The gold tree cannot be reached from the configuration (non-projective input)
    UnreachableGoldStructure,
    /// The oracle failed on a tree it should handle
    OracleDefect,
    /// A hand-built configuration breaks the state invariants
    InvalidConfiguration,
    /// Malformed corpus text
    Corpus,
    /// Unreadable or invalid configuration file
    Config,
    /// File system failures
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::IllegalTransition => "IllegalTransition",
            ErrorType::AlreadyComplete => "AlreadyComplete",
            ErrorType::UnreachableGoldStructure => "UnreachableGoldStructure",
            ErrorType::OracleDefect => "OracleDefect",
            ErrorType::InvalidConfiguration => "InvalidConfiguration",
            ErrorType::Corpus => "Corpus",
            ErrorType::Config => "Config",
            ErrorType::Io => "Io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional source, span and help attached to an error.
#[derive(Debug, Default)]
pub struct ErrorContext {
    pub source: Option<SourceArc>,
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_help(help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..Self::default()
        }
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Unified error type for every arcstd failure mode.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Illegal transition: {message}")]
    IllegalTransition {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Configuration is already complete")]
    AlreadyComplete {
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Unreachable gold structure: {message}")]
    UnreachableGoldStructure {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Oracle defect: {message}")]
    OracleDefect {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Corpus error: {message}")]
    Corpus {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Config error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl ParseError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            ParseError::IllegalTransition { ctx, .. } => ctx,
            ParseError::AlreadyComplete { ctx, .. } => ctx,
            ParseError::UnreachableGoldStructure { ctx, .. } => ctx,
            ParseError::OracleDefect { ctx, .. } => ctx,
            ParseError::InvalidConfiguration { ctx, .. } => ctx,
            ParseError::Corpus { ctx, .. } => ctx,
            ParseError::Config { ctx, .. } => ctx,
            ParseError::Io { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            ParseError::IllegalTransition { .. } => ErrorType::IllegalTransition,
            ParseError::AlreadyComplete { .. } => ErrorType::AlreadyComplete,
            ParseError::UnreachableGoldStructure { .. } => ErrorType::UnreachableGoldStructure,
            ParseError::OracleDefect { .. } => ErrorType::OracleDefect,
            ParseError::InvalidConfiguration { .. } => ErrorType::InvalidConfiguration,
            ParseError::Corpus { .. } => ErrorType::Corpus,
            ParseError::Config { .. } => ErrorType::Config,
            ParseError::Io { .. } => ErrorType::Io,
        }
    }

    /// True for the failures that mark a gold instance as undecodable:
    /// an illegal transition or an unreachable gold structure.
    pub fn is_undecodable(&self) -> bool {
        matches!(
            self.error_type(),
            ErrorType::IllegalTransition | ErrorType::UnreachableGoldStructure
        )
    }

    /// Attaches a help line, replacing any existing one.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        let help = Some(help.into());
        match &mut self {
            ParseError::IllegalTransition { ctx, .. }
            | ParseError::AlreadyComplete { ctx, .. }
            | ParseError::UnreachableGoldStructure { ctx, .. }
            | ParseError::OracleDefect { ctx, .. }
            | ParseError::InvalidConfiguration { ctx, .. }
            | ParseError::Corpus { ctx, .. }
            | ParseError::Config { ctx, .. }
            | ParseError::Io { ctx, .. } => ctx.help = help,
        }
        self
    }

    fn message(&self) -> String {
        match self {
            ParseError::IllegalTransition { message, .. }
            | ParseError::UnreachableGoldStructure { message, .. }
            | ParseError::OracleDefect { message, .. }
            | ParseError::InvalidConfiguration { message, .. }
            | ParseError::Corpus { message, .. }
            | ParseError::Config { message, .. }
            | ParseError::Io { message, .. } => message.clone(),
            ParseError::AlreadyComplete { .. } => "already complete".to_string(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        ParseError::Io {
            message: format!("failed to read '{}'", path.display()),
            ctx: ErrorContext::none(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn already_complete() -> Self {
        ParseError::AlreadyComplete {
            ctx: ErrorContext::none(),
            source: None,
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("arcstd::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        let span = ctx.span?;
        ctx.source.as_ref()?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Wraps corpus text into a named source for span-carrying errors.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(
        name.as_ref().to_string(),
        source.as_ref().to_string(),
    ))
}

/// Constructs a `ParseError` variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($fmt:tt)+) => {
        $crate::ParseError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a `ParseError` variant with a source, a span and an optional help line.
#[macro_export]
macro_rules! err_ctx {
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::ParseError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::ParseError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: None,
            },
            source: None,
        }
    };
}
