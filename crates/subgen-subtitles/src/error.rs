//! Cue parser error type.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// A rejected cue block, with the 1-based source line number at which the
/// failure was detected (spec.md §4.6: "Rejection returns a parse error
/// with line number").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}
