//! A language core for a subset of the jq filter language: a lexer, a
//! precedence-aware recursive-descent parser, an evaluator over streams of
//! structured JSON-like values, destructuring pattern matching, path-tracked
//! assignment updates, and a cursor-aware completion engine.
//!
//! # Overview
//!
//! A caller hands this crate a source expression and zero or more JSON-like
//! [`Value`]s; the crate lexes and parses the expression into an [`Evaluator`] tree
//! and runs it over the input to produce an output stream of values — matching jq
//! semantics for the supported subset (pipes, commas, field/index access,
//! iteration, array/object construction, arithmetic/comparison/logical operators,
//! variables, `as`-destructuring, and `=` assignment with deep-update).
//!
//! # Design
//!
//! Parsing and semantic-action construction are fused: every grammar production in
//! [`parser`] returns an [`Evaluator`] node directly instead of building an
//! intermediate syntax tree first. Operator precedence is realized through three
//! small generic combinators — `chainl`, `chainr`, `nonassoc` — rather than one big
//! precedence table, matching the grammar's own associativity annotations.
//!
//! When a caller is mid-edit and wants completions, [`lex`] accepts a byte offset
//! at which to splice in a synthetic cursor token; the parser then produces a
//! completion-aware evaluator node that, when run, raises [`error::Signal::Completion`]
//! carrying candidate continuations instead of returning normally. See [`completer`]
//! for the packaged entry point.
//!
//! # Example
//!
//! ```
//! use jqi_core::{make_env, parse};
//! use jqi_core::eval::{splice, unsplice};
//! use jqi_core::Value;
//!
//! let env = make_env();
//! let evaluator = parse(".a.b").unwrap();
//! let stream = splice(&env, vec![Value::Null]);
//! let out = unsplice(evaluator.eval(stream).unwrap());
//! assert_eq!(out, vec![Value::Null]);
//! ```
//!
//! # License
//! This crate is provided under the MIT license.

pub mod builtins;
pub mod completion;
mod environment;
pub mod error;
pub mod eval;
mod field_tree;
mod lexer;
mod parser;
pub mod pattern;
pub mod position;
pub mod token;
pub mod util;
mod value;

pub use completion::{completer, Completer};
pub use environment::Env;
pub use error::{Candidate, EvalError, ImplementationError, LexError, ParseError, Signal};
pub use eval::{splice, unsplice, EvalResult, Evaluator, Stream};
pub use token::{Token, TokenKind};
pub use value::Value;

use std::rc::Rc;

/// Lex `source` into a flat, position-tagged token list (§4.1). When `cursor` is
/// `Some(offset)`, a single synthetic [`token::TokenKind::Cursor`] token is spliced
/// into the stream at the first point lexing reaches or passes that byte offset,
/// and otherwise-fatal lexer conditions (an unterminated string, a dangling open
/// bracket the parser is left to tolerate) are relaxed to support mid-edit source.
pub fn lex(source: &str, cursor: Option<usize>) -> Result<Vec<Token>, LexError> {
    lexer::Lexer::new(source, cursor).lex()
}

/// Lex and parse `source` under the grammar's top-level `exp` production (§4.2),
/// producing an [`Evaluator`] tree ready to run against an input [`Stream`].
pub fn parse(source: &str) -> Result<Rc<dyn Evaluator>, ParseError> {
    let tokens = lex(source, None).map_err(|e| ParseError::new(e.at, e.message))?;
    parser::Parser::new(tokens, source).parse_program()
}

/// Build a fresh root [`Env`], preloaded with the built-in function registry
/// (`true/0`, `false/0`, `null/0`, `not/0`, `empty/0`, `select/1`) per §4.5. Every
/// top-level evaluation starts from a fresh call to this function — the registry
/// itself is stateless and cheap to re-install.
pub fn make_env() -> Env {
    builtins::Registry::seed().install(Env::root())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_lex_parse_eval() {
        let env = make_env();
        let evaluator = parse(".a | .b").unwrap();
        let mut obj = indexmap::IndexMap::new();
        let mut inner = indexmap::IndexMap::new();
        inner.insert("b".to_string(), Value::Int(7));
        obj.insert("a".to_string(), Value::Object(inner));
        let stream = splice(&env, vec![Value::Object(obj)]);
        let out = unsplice(evaluator.eval(stream).unwrap());
        assert_eq!(out, vec![Value::Int(7)]);
    }

    #[test]
    fn completer_surfaces_field_candidates() {
        let completer = completer(".a.", 3).unwrap();
        let mut inner = indexmap::IndexMap::new();
        inner.insert("x".to_string(), Value::Int(1));
        inner.insert("y".to_string(), Value::Int(2));
        let mut outer = indexmap::IndexMap::new();
        outer.insert("a".to_string(), Value::Object(inner));
        let (candidates, _span) = completer.complete(vec![Value::Object(outer)], None).unwrap();
        assert!(candidates.contains(&Candidate::Field("x".to_string())));
        assert!(candidates.contains(&Candidate::Field("y".to_string())));
    }
}
