//! Small ambient helpers shared across the crate, kept separate from the language
//! modules proper (lexer, parser, evaluator) the same way the teacher keeps `Code`,
//! `Position` and `Log` in a `util` module of their own.

pub mod log;
