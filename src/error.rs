//! Error types for confblock.
//!
//! Uses thiserror for derive macros. Lookup and parse failures are typed so
//! callers can decide whether a missing parameter is fatal to their workflow.

use crate::exit_codes;
use std::fmt;
use thiserror::Error;

/// Main error type for confblock operations.
#[derive(Error, Debug)]
pub enum CfgError {
    /// The path (or one of its prefixes) does not resolve to a value or block.
    #[error("no value or block at '{path}'")]
    NotFound {
        /// The full path as passed by the caller.
        path: String,
    },

    /// The path resolved, but to the other kind of entry.
    #[error("'{path}' is not a {expected}")]
    WrongKind {
        /// The full path as passed by the caller.
        path: String,
        /// What the caller needed there ("value" or "block").
        expected: &'static str,
    },

    /// A path that cannot be stored without breaking a write/re-read cycle.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A value that cannot be stored without breaking a write/re-read cycle.
    #[error("invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: &'static str },

    /// Structural failure while parsing block-format text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// File access failed outside of parsing.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// User provided invalid arguments.
    #[error("{0}")]
    UserError(String),

    /// External executable could not be started or did not succeed.
    #[error("Execution failed: {0}")]
    ExecError(String),
}

impl CfgError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CfgError::NotFound { .. } | CfgError::WrongKind { .. } => exit_codes::NOT_FOUND,
            CfgError::InvalidPath { .. }
            | CfgError::InvalidValue { .. }
            | CfgError::Io { .. }
            | CfgError::UserError(_) => exit_codes::USER_ERROR,
            CfgError::Parse(_) => exit_codes::PARSE_FAILURE,
            CfgError::ExecError(_) => exit_codes::EXEC_FAILURE,
        }
    }

    pub(crate) fn not_found(path: &str) -> Self {
        CfgError::NotFound {
            path: path.to_string(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CfgError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias for confblock operations.
pub type Result<T> = std::result::Result<T, CfgError>;

/// What went wrong structurally during a parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// End of input reached with a `block` still open.
    #[error("block not ended")]
    UnterminatedBlock,

    /// An `include` directive named a file that could not be read.
    #[error("cannot include '{path}': {reason}")]
    IncludeFailed { path: String, reason: String },

    /// The underlying reader failed.
    #[error("read failed: {0}")]
    Read(String),
}

/// A fatal parse failure.
///
/// Carries the enclosing block chain (outermost first) and the line number
/// where the offending construct started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Name of the input ("<stream>" when not read from a file).
    pub source_name: String,
    pub line: usize,
    pub blocks: Vec<String>,
}

impl ParseError {
    /// The enclosing block names joined with `:`.
    pub fn block_chain(&self) -> String {
        self.blocks.join(":")
    }

    /// The innermost enclosing block, if any.
    pub fn innermost_block(&self) -> Option<&str> {
        self.blocks.last().map(String::as_str)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.source_name, self.line, self.kind)?;
        if !self.blocks.is_empty() {
            write!(f, " (in block '{}')", self.block_chain())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
