use std::fmt;

use regex_fsm_automata::SizeLimitExceeded;

use crate::lexer::{LexError, TerminalKind};

/// The result of compiling a pattern
pub type ParseResult<T> = Result<T, Error>;

/// Errors that can occur while compiling a pattern.
///
/// A parse reports at most one error. A lexical failure stops the parse
/// before the grammar can complain about the missing input, so it is never
/// followed by a syntax error.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The pattern text is malformed.
    Lexical(LexError),
    /// The token sequence does not fit the grammar.
    Syntax { offset: usize, found: TerminalKind },
    /// The automaton would need more states than the configured size limit.
    SizeLimitExceeded { limit: usize },
    /// The parser broke one of its own invariants.
    Internal(String),
}

impl Error {
    /// Byte offset into the pattern, if the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lexical(err) => Some(err.offset()),
            Error::Syntax { offset, .. } => Some(*offset),
            Error::SizeLimitExceeded { .. } | Error::Internal(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexical(err) => err.fmt(f),
            Error::Syntax { offset, found } => {
                write!(f, "syntax error at offset {}: unexpected {}", offset, found)
            }
            Error::SizeLimitExceeded { limit } => {
                write!(f, "compiled automaton would exceed the limit of {} states", limit)
            }
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lexical(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Lexical(err)
    }
}

impl From<SizeLimitExceeded> for Error {
    fn from(err: SizeLimitExceeded) -> Self {
        Error::SizeLimitExceeded { limit: err.limit }
    }
}
