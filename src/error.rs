//! Error types for parsing, compiling and running programs

use thiserror::Error;

/// Rejection of malformed source text, reported before anything runs.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A body goal calls a relation that has no rules
    #[error("relation {caller:?} calls unknown relation {relation:?}")]
    UnknownRelation { relation: String, caller: String },

    /// A query was opened on a relation the program does not define
    #[error("program defines no relation {relation:?}")]
    MissingEntry { relation: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("failed to write answer: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl ParseError {
    pub fn new(line_col: (usize, usize), message: impl Into<String>) -> Self {
        ParseError {
            line: line_col.0,
            column: line_col.1,
            message: message.into(),
        }
    }
}

impl<R: pest::RuleType> From<pest::error::Error<R>> for ParseError {
    fn from(err: pest::error::Error<R>) -> Self {
        let line_col = match err.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        ParseError::new(line_col, err.variant.message())
    }
}
