//! Cursor-aware completion.
//!
//! Grounded on `original_source/jqi/completer.py`: candidates are gathered by actually
//! *running* the filter typed so far against the sample input(s), catching the
//! non-local exit the moment evaluation reaches the cursor, rather than statically
//! inspecting the grammar — the distilled spec's §6 calls this out as the reason
//! `Signal::Completion` has to be able to carry real [`Value`]s, not just token names.
//! `jq_cmp`'s total order (ported onto [`Value::cmp_jq`] in `value.rs`) is reused here
//! to present sampled candidates in a stable, human-friendly order.

use crate::environment::Env;
use crate::error::{Candidate, ParseError, Signal};
use crate::position::Span;
use crate::value::Value;
use std::rc::Rc;

/// What kind of candidate the cursor position calls for, decided by the parser from
/// the surrounding syntax (distilled-spec §6: "a `.` immediately before the cursor
/// expects field names; a bare value position expects a sample of running values").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The cursor follows a `.` — offer the field names of whatever object reached
    /// this point.
    Field,
    /// The cursor sits in a bare filter position — offer a sample of the scalar
    /// values flowing through at this point.
    Value,
}

/// Candidates contributed by a single value reaching the cursor, for the given `mode`.
pub fn candidates_for(mode: Mode, value: &Value) -> Vec<Candidate> {
    match mode {
        Mode::Field => sample_objects(value),
        Mode::Value => sample_values(value),
    }
}

/// Field-name candidates: one per key of an object value. Ported from
/// `original_source/jqi/completer.py::field_name` — a `Field(k)` when `k` can be
/// written as a bareword (non-empty and every character alphanumeric), else a
/// JSON-quoted `Str(k)` (distilled-spec §4.7).
pub fn sample_objects(value: &Value) -> Vec<Candidate> {
    match value {
        Value::Object(map) => map.keys().map(|k| field_name(k.as_str())).collect(),
        _ => Vec::new(),
    }
}

fn field_name(key: &str) -> Candidate {
    if !key.is_empty() && key.chars().all(|c| c.is_alphanumeric()) {
        Candidate::Field(key.to_string())
    } else {
        Candidate::Str(key.to_string())
    }
}

/// Scalar-value candidates: every leaf value reachable from `value` without
/// descending into nested objects/arrays more than one level, capped to a small sample
/// so completion stays snappy on large documents.
const SAMPLE_CAP: usize = 20;

pub fn sample_values(value: &Value) -> Vec<Candidate> {
    let mut out = Vec::new();
    collect_samples(value, &mut out);
    out.truncate(SAMPLE_CAP);
    out
}

fn collect_samples(value: &Value, out: &mut Vec<Candidate>) {
    if out.len() >= SAMPLE_CAP {
        return;
    }
    match value {
        Value::Array(items) => {
            for item in items {
                collect_samples(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_samples(item, out);
            }
        }
        Value::SoftError(_) => {}
        scalar => out.push(Candidate::Value(scalar.clone())),
    }
}

/// Stable-sort `candidates` using [`Value::cmp_jq`] for [`Candidate::Value`] entries
/// and lexical order otherwise, deduplicating as it goes.
pub fn sort_candidates(candidates: &mut Vec<Candidate>) {
    candidates.sort_by(|a, b| match (a, b) {
        (Candidate::Value(x), Candidate::Value(y)) => x.cmp_jq(y),
        (Candidate::Value(_), _) => std::cmp::Ordering::Greater,
        (_, Candidate::Value(_)) => std::cmp::Ordering::Less,
        (Candidate::Field(x), Candidate::Field(y)) => x.cmp(y),
        (Candidate::Token(x), Candidate::Token(y)) => x.cmp(y),
        (Candidate::Str(x), Candidate::Str(y)) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    });
    candidates.dedup();
}

/// A filter parsed with a completion cursor injected into it, ready to be run against
/// however many sample inputs the caller wants to offer.
#[derive(Debug)]
pub struct Completer {
    evaluator: Rc<dyn crate::eval::Evaluator>,
    cursor: usize,
}

impl Completer {
    /// Evaluate the filter against `inputs`, catching the first
    /// [`Signal::Completion`] reached. Hard evaluation errors propagate as `Err`, since
    /// a broken filter has nothing useful to complete. When the filter runs to
    /// completion without ever reaching the cursor (the cursor sits inside a branch no
    /// sample input takes), the candidate list is empty and the span collapses to a
    /// single point at the cursor offset.
    pub fn complete(&self, inputs: Vec<Value>, env: Option<Env>) -> Result<(Vec<Candidate>, Span), Signal> {
        let root = env.unwrap_or_else(crate::make_env);
        let stream = crate::eval::splice(&root, inputs);
        match self.evaluator.eval(stream) {
            Ok(_) => Ok((Vec::new(), Span::point(self.cursor))),
            Err(Signal::Completion(c)) => {
                let span = c.span.unwrap_or_else(|| Span::point(self.cursor));
                Ok((c.candidates, span))
            }
            Err(other) => Err(other),
        }
    }
}

/// Lex and parse `source` with a completion cursor injected at byte offset `cursor`,
/// producing a [`Completer`] ready to be run against sample inputs.
pub fn completer(source: &str, cursor: usize) -> Result<Completer, ParseError> {
    let tokens = crate::lexer::Lexer::new(source, Some(cursor))
        .lex()
        .map_err(|e| ParseError::new(e.at, e.message))?;
    let evaluator = crate::parser::Parser::new(tokens, source).parse_program()?;
    Ok(Completer { evaluator, cursor })
}
