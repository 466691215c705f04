//! The JSON-like value every stream carries.
//!
//! Grounded on distilled-spec §3/§4.6 and on `original_source/jqi/parser.py`'s `Error`
//! class (the distinguished soft-error marker) and `original_source/jqi/completer.py`'s
//! `jq_cmp` (the total order used both for `<`/`>`/`<=`/`>=` and for sorting completion
//! candidates). Object key order is preserved on construction via `indexmap::IndexMap` —
//! the ordered-map crate already in the dependency graph of the sibling example repos
//! (`Luvion1-Fax`, `octofhir-server-rs`) that this crate borrows from for concerns the
//! teacher itself has no opinion on.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// The distinguished soft-error marker produced by field access on a
    /// non-object/non-null value (§7). Any two `SoftError`s compare equal regardless
    /// of message, per `original_source/jqi/parser.py`'s `Error.__eq__`.
    SoftError(Rc<str>),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn soft_error(message: impl Into<Rc<str>>) -> Self {
        Value::SoftError(message.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::SoftError(_) => "error",
        }
    }

    /// Truthy iff not `null` and not `false` — every other value, including `0` and
    /// `""`, is truthy (jq semantics, §4.3).
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Order rank used by [`Value::cmp_jq`]: `null < false < true < numbers < strings <
    /// arrays < objects` (§4.6).
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Int(_) | Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
            Value::SoftError(_) => 7,
        }
    }

    /// Total order over values, grounded on `original_source/jqi/completer.py`'s
    /// `jq_cmp`. Two objects compare as [`Ordering::Equal`] — the distilled spec leaves
    /// object/object ordering unspecified ("raise/skip"); this subset treats it as a
    /// degenerate equal rather than failing comparisons outright, since no caller of
    /// `cmp_jq` in this crate ever sees two objects (sample_values only gathers
    /// scalars; the `<`/`>` evaluator operators reject object operands with a hard
    /// error before consulting `cmp_jq` at all — see [`crate::eval`]).
    pub fn cmp_jq(&self, other: &Value) -> Ordering {
        let (ra, rb) = (self.rank(), other.rank());
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let c = x.cmp_jq(y);
                    if c != Ordering::Equal {
                        return c;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => Ordering::Equal,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::SoftError(_), Value::SoftError(_)) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{:?}:{}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::SoftError(msg) => write!(f, "<error: {}>", msg),
        }
    }
}
