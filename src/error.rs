//! Error hierarchy.
//!
//! Follows the teacher's hand-rolled `Display`-impl-per-error-struct convention
//! (`error.rs` in the teacher implements `Display` for `ImplementationError` and
//! `ParseError` by hand) rather than reaching for `thiserror`, which the teacher does
//! not depend on.

use crate::position::{LineCol, Span};
use std::fmt;

/// Raised by the lexer on a malformed literal or an unrecognized character.
#[derive(Debug, Clone)]
pub struct LexError {
    pub at: usize,
    pub message: String,
}

impl LexError {
    pub fn new(at: usize, message: impl Into<String>) -> Self {
        Self {
            at,
            message: message.into(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LexError at byte {}: {}", self.at, self.message)
    }
}

impl std::error::Error for LexError {}

/// Raised by the parser on an unexpected token or unmatched construct (outside
/// completion mode, where dangling opens are tolerated per the lexer's bracket
/// recovery).
#[derive(Debug, Clone)]
pub struct ParseError {
    pub pointer: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(pointer: usize, message: impl Into<String>) -> Self {
        Self {
            pointer,
            message: message.into(),
        }
    }

    pub fn with_position(&self, source: &crate::position::Source) -> String {
        let pos: LineCol = source.position_at(self.pointer);
        format!("SyntaxError: {} ({})", self.message, pos)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// A hard evaluation error: iteration over a scalar, a pattern/shape mismatch, an
/// unknown function or variable. Hard errors abort the evaluation they occur in,
/// unlike the soft [`crate::value::Value::SoftError`] produced by field access on a
/// non-object.
#[derive(Debug, Clone)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvalError: {}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// Raised at construction time when grammar wiring (built-in registration, punctuation
/// tables) is malformed — the direct analogue of the teacher's `ImplementationError`.
#[derive(Debug, Clone)]
pub struct ImplementationError {
    pub what: String,
    pub message: String,
}

impl ImplementationError {
    pub fn new(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImplementationError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for ImplementationError {}

/// A candidate continuation offered by the completion engine: either a bare keyword
/// token, a field name, a quoted string, or a sampled scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Token(String),
    Field(String),
    Str(String),
    Value(crate::value::Value),
}

/// Raised (as the `Err` arm of [`crate::eval::EvalResult`]) when the cursor token is
/// consumed while evaluating. Not an error — a non-local exit carrying the candidate
/// continuations and the span of source they should replace.
#[derive(Debug, Clone)]
pub struct Completion {
    pub candidates: Vec<Candidate>,
    pub span: Option<Span>,
}

/// The sum type threaded through [`crate::eval::EvalResult`]: either a hard error that
/// aborts the walk, or the completion non-local exit. Rust has no unchecked exceptions
/// to borrow from the Python original's `raise Completion(...)`, so every
/// [`crate::eval::Evaluator::eval`] propagates this with `?` instead — the "checked
/// error propagation with an early-return tag" alternative the distilled spec calls
/// out explicitly.
#[derive(Debug, Clone)]
pub enum Signal {
    Error(EvalError),
    Completion(Completion),
}

impl From<EvalError> for Signal {
    fn from(e: EvalError) -> Self {
        Signal::Error(e)
    }
}

impl From<Completion> for Signal {
    fn from(c: Completion) -> Self {
        Signal::Completion(c)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Error(e) => write!(f, "{}", e),
            Signal::Completion(_) => write!(f, "<completion signal>"),
        }
    }
}
