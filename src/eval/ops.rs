//! Concrete evaluator nodes.
//!
//! Each struct here is a leaf or combinator in the evaluator tree the parser builds,
//! the same role the teacher's `non_terminals`/`terminals`/`wrappers` types play in its
//! combinator trees — a small, focused type per grammar construct, composed by holding
//! `Rc<dyn Evaluator>` children rather than an enum with every variant (the teacher
//! prefers trait objects over one `IProduction` enum for exactly this extensibility
//! reason).

use super::path::deep_update;
use super::{EvalResult, Evaluator, Stream};
use crate::environment::PathStep;
use crate::error::{Candidate, Completion, EvalError, Signal};
use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

/// `.` — identity, resetting path accumulation (distilled-spec §4.1).
#[derive(Debug)]
pub struct Dot;

impl Evaluator for Dot {
    fn eval(&self, stream: Stream) -> EvalResult {
        Ok(stream
            .into_iter()
            .map(|(env, value)| (env.child_path(PathStep::Reset), value))
            .collect())
    }
}

/// A literal constant: numbers, strings, `true`/`false`/`null` parsed directly into a
/// `Value` rather than re-evaluated each time.
#[derive(Debug)]
pub struct Literal(pub Value);

impl Evaluator for Literal {
    fn eval(&self, stream: Stream) -> EvalResult {
        Ok(stream
            .into_iter()
            .map(|(env, _)| (env, self.0.clone()))
            .collect())
    }
}

/// `.name` — field access, recording the key on the environment's path chain and
/// producing a soft error (not a hard one) when the input isn't an object or `null`
/// (distilled-spec §4.2, §7).
#[derive(Debug)]
pub struct Field(pub String);

impl Evaluator for Field {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let next_env = env.child_path(PathStep::Key(self.0.clone()));
            let next_value = match &value {
                Value::Object(map) => map.get(&self.0).cloned().unwrap_or(Value::Null),
                Value::Null => Value::Null,
                other => Value::soft_error(format!(
                    "Cannot index {} with \"{}\"",
                    other.type_name(),
                    self.0
                )),
            };
            out.push((next_env, next_value));
        }
        Ok(out)
    }
}

/// `lhs | rhs` — thread every output of `lhs` through `rhs` in turn.
#[derive(Debug)]
pub struct Pipe(pub Rc<dyn Evaluator>, pub Rc<dyn Evaluator>);

impl Evaluator for Pipe {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mid = self.0.eval(stream)?;
        self.1.eval(mid)
    }
}

/// `lhs, rhs` — run both against the same input stream and concatenate outputs,
/// preserving `lhs`'s outputs before `rhs`'s for every input, left to right.
#[derive(Debug)]
pub struct Comma(pub Rc<dyn Evaluator>, pub Rc<dyn Evaluator>);

impl Evaluator for Comma {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Vec::new();
        for pair in stream {
            let left = self.0.eval(vec![pair.clone()])?;
            out.extend(left);
            let right = self.1.eval(vec![pair])?;
            out.extend(right);
        }
        Ok(out)
    }
}

/// `.[]` — iterate: stream every element of an array or every value of an object,
/// hard-erroring on scalars and `null` (distilled-spec §4.2's iteration edge case).
#[derive(Debug)]
pub struct Iterate;

impl Evaluator for Iterate {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            match value {
                Value::Array(items) => {
                    for (i, item) in items.into_iter().enumerate() {
                        let next_env = env.child_path(PathStep::Key(i.to_string()));
                        out.push((next_env, item));
                    }
                }
                Value::Object(map) => {
                    for (key, item) in map {
                        let next_env = env.child_path(PathStep::Key(key));
                        out.push((next_env, item));
                    }
                }
                other => {
                    return Err(Signal::Error(EvalError::new(format!(
                        "Cannot iterate over {}",
                        other.type_name()
                    ))))
                }
            }
        }
        Ok(out)
    }
}

/// `[f]` — collect every output of `f` (run once per input) into a single array.
#[derive(Debug)]
pub struct Collect(pub Rc<dyn Evaluator>);

impl Evaluator for Collect {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let inner = self.0.eval(vec![(env.clone(), value)])?;
            let items = inner.into_iter().map(|(_, v)| v).collect();
            out.push((env, Value::Array(items)));
        }
        Ok(out)
    }
}

/// One `{key: value}` entry awaiting evaluation; `key` and `value` are each arbitrary
/// filters, since jq allows `{(expr): expr}`.
#[derive(Debug)]
pub struct DictEntry {
    pub key: Rc<dyn Evaluator>,
    pub value: Rc<dyn Evaluator>,
}

/// `{k1: v1, k2: v2, ...}` — object construction. Streams the cross product of every
/// entry's key/value outputs, matching jq's `{}` semantics when any component streams
/// more than one value.
#[derive(Debug)]
pub struct MakeDict(pub Vec<DictEntry>);

impl Evaluator for MakeDict {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let mut combos: Vec<(crate::environment::Env, Vec<(String, Value)>)> =
                vec![(env.clone(), Vec::new())];
            for entry in &self.0 {
                let mut next_combos = Vec::new();
                for (combo_env, pairs) in &combos {
                    let keys = entry.key.eval(vec![(combo_env.clone(), value.clone())])?;
                    for (key_env, key_value) in keys {
                        let key_str = match key_value {
                            Value::Str(s) => s.to_string(),
                            other => {
                                return Err(Signal::Error(EvalError::new(format!(
                                    "Object keys must be strings, got {}",
                                    other.type_name()
                                ))))
                            }
                        };
                        let values = entry.value.eval(vec![(key_env.clone(), value.clone())])?;
                        for (value_env, field_value) in values {
                            let mut pairs = pairs.clone();
                            pairs.push((key_str.clone(), field_value));
                            next_combos.push((value_env, pairs));
                        }
                    }
                }
                combos = next_combos;
            }
            for (_, pairs) in combos {
                out.push((env.clone(), crate::pattern::build_object(pairs)));
            }
        }
        Ok(out)
    }
}

/// `$name` — variable lookup, a hard error if unbound.
#[derive(Debug)]
pub struct Variable(pub String);

impl Evaluator for Variable {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, _) in stream {
            let value = env.lookup_var(&self.0).ok_or_else(|| {
                Signal::Error(EvalError::new(format!("{} is not defined", self.0)))
            })?;
            out.push((env, value));
        }
        Ok(out)
    }
}

/// `name(arg1; arg2; ...)` — resolves `name/arity` against the environment's function
/// table at eval time (so a `def` introduced upstream can shadow a built-in), then
/// hands the unevaluated argument filters to the built-in.
#[derive(Debug)]
pub struct Call {
    pub name: String,
    pub args: Vec<Rc<dyn Evaluator>>,
}

impl Evaluator for Call {
    fn eval(&self, stream: Stream) -> EvalResult {
        let key = format!("{}/{}", self.name, self.args.len());
        let mut out = Stream::new();
        for (env, value) in stream {
            let func = env
                .lookup_func(&key)
                .ok_or_else(|| Signal::Error(EvalError::new(format!("{} is not defined", key))))?;
            let result = func.call(vec![(env, value)], &self.args)?;
            out.extend(result);
        }
        Ok(out)
    }
}

/// Arithmetic and string/array/object operators: `+ - * / %`. Each input pairs the
/// left operand's output with the right operand's output evaluated against the same
/// original value (not against the left's result), exactly like jq's binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug)]
pub struct Arith {
    pub op: ArithOp,
    pub lhs: Rc<dyn Evaluator>,
    pub rhs: Rc<dyn Evaluator>,
}

impl Evaluator for Arith {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let lefts = self.lhs.eval(vec![(env.clone(), value.clone())])?;
            let rights = self.rhs.eval(vec![(env, value)])?;
            // Outer over rhs, inner over lhs — leftmost varies fastest (§4.3, scenario 2).
            for (right_env, right) in rights {
                for (_, left) in &lefts {
                    let result = apply_arith(self.op, left, &right)?;
                    out.push((right_env.clone(), result));
                }
            }
        }
        Ok(out)
    }
}

fn apply_arith(op: ArithOp, left: &Value, right: &Value) -> Result<Value, Signal> {
    use ArithOp::*;
    match (op, left, right) {
        (Add, Value::Null, v) => Ok(v.clone()),
        (Add, v, Value::Null) => Ok(v.clone()),
        (Add, Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{}{}", a, b))),
        (Add, Value::Array(a), Value::Array(b)) => {
            let mut items = a.clone();
            items.extend(b.clone());
            Ok(Value::Array(items))
        }
        (Add, Value::Object(a), Value::Object(b)) => {
            let mut map = a.clone();
            for (k, v) in b {
                map.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(map))
        }
        (Sub, Value::Array(a), Value::Array(b)) => {
            let items = a.iter().filter(|v| !b.contains(v)).cloned().collect();
            Ok(Value::Array(items))
        }
        (Mul, Value::Object(a), Value::Object(b)) => {
            let mut map = a.clone();
            for (k, v) in b {
                map.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(map))
        }
        (op, a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(numeric(op, x, y, a, b)?),
            _ => Err(Signal::Error(EvalError::new(format!(
                "{} and {} cannot be {}",
                a.type_name(),
                b.type_name(),
                op_name(op)
            )))),
        },
    }
}

fn numeric(op: ArithOp, x: f64, y: f64, a: &Value, b: &Value) -> Result<Value, Signal> {
    use ArithOp::*;
    let result = match op {
        Add => x + y,
        Sub => x - y,
        Mul => x * y,
        Div => {
            if y == 0.0 {
                return Err(Signal::Error(EvalError::new(format!(
                    "{} and {} cannot be divided because the divisor is zero",
                    a.type_name(),
                    b.type_name()
                ))));
            }
            x / y
        }
        Mod => {
            if y == 0.0 {
                return Err(Signal::Error(EvalError::new(format!(
                    "{} and {} cannot be divided because the divisor is zero",
                    a.type_name(),
                    b.type_name()
                ))));
            }
            (x as i64 % y as i64) as f64
        }
    };
    if matches!((a, b), (Value::Int(_), Value::Int(_))) && matches!(op, Add | Sub | Mul | Mod) {
        Ok(Value::Int(result as i64))
    } else {
        Ok(Value::Float(result))
    }
}

fn op_name(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "added",
        ArithOp::Sub => "subtracted",
        ArithOp::Mul => "multiplied",
        ArithOp::Div => "divided",
        ArithOp::Mod => "divided (remainder)",
    }
}

/// `== != < <= > >=` — total-order comparisons via [`Value::cmp_jq`], except `==`/`!=`
/// which use [`Value`]'s own `PartialEq` so that two `SoftError`s still compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug)]
pub struct Compare {
    pub op: CompareOp,
    pub lhs: Rc<dyn Evaluator>,
    pub rhs: Rc<dyn Evaluator>,
}

impl Evaluator for Compare {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let lefts = self.lhs.eval(vec![(env.clone(), value.clone())])?;
            let rights = self.rhs.eval(vec![(env, value)])?;
            for (right_env, right) in rights {
                for (_, left) in &lefts {
                    let result = match self.op {
                        CompareOp::Eq => Value::Bool(left == &right),
                        CompareOp::Ne => Value::Bool(left != &right),
                        CompareOp::Lt => Value::Bool(left.cmp_jq(&right) == Ordering::Less),
                        CompareOp::Le => Value::Bool(left.cmp_jq(&right) != Ordering::Greater),
                        CompareOp::Gt => Value::Bool(left.cmp_jq(&right) == Ordering::Greater),
                        CompareOp::Ge => Value::Bool(left.cmp_jq(&right) != Ordering::Less),
                    };
                    out.push((right_env.clone(), result));
                }
            }
        }
        Ok(out)
    }
}

/// `lhs and rhs` — short-circuits to `false` without evaluating `rhs` once `lhs` is
/// falsy for a given input (distilled-spec §4.3).
#[derive(Debug)]
pub struct LogAnd(pub Rc<dyn Evaluator>, pub Rc<dyn Evaluator>);

impl Evaluator for LogAnd {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let lefts = self.lhs.eval(vec![(env.clone(), value.clone())])?;
            for (left_env, left) in lefts {
                if !left.truthy() {
                    out.push((left_env, Value::Bool(false)));
                    continue;
                }
                let rights = self.rhs.eval(vec![(left_env, value.clone())])?;
                for (right_env, right) in rights {
                    out.push((right_env, Value::Bool(right.truthy())));
                }
            }
        }
        Ok(out)
    }
}

/// `lhs or rhs` — short-circuits to `true` without evaluating `rhs` once `lhs` is
/// truthy.
#[derive(Debug)]
pub struct LogOr(pub Rc<dyn Evaluator>, pub Rc<dyn Evaluator>);

impl Evaluator for LogOr {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let lefts = self.lhs.eval(vec![(env.clone(), value.clone())])?;
            for (left_env, left) in lefts {
                if left.truthy() {
                    out.push((left_env, Value::Bool(true)));
                    continue;
                }
                let rights = self.rhs.eval(vec![(left_env, value.clone())])?;
                for (right_env, right) in rights {
                    out.push((right_env, Value::Bool(right.truthy())));
                }
            }
        }
        Ok(out)
    }
}

/// Unary `-f` — numeric negation; hard errors on non-numbers.
#[derive(Debug)]
pub struct Negate(pub Rc<dyn Evaluator>);

impl Evaluator for Negate {
    fn eval(&self, stream: Stream) -> EvalResult {
        let inner = self.0.eval(stream)?;
        inner
            .into_iter()
            .map(|(env, value)| {
                let negated = match value {
                    Value::Int(i) => Value::Int(-i),
                    Value::Float(f) => Value::Float(-f),
                    other => {
                        return Err(Signal::Error(EvalError::new(format!(
                            "{} cannot be negated",
                            other.type_name()
                        ))))
                    }
                };
                Ok((env, negated))
            })
            .collect()
    }
}

/// `source as pattern | body` — bind every cross-combination of `pattern`'s match
/// against each of `source`'s outputs, run `body` once per combination (distilled-spec
/// §4.4).
#[derive(Debug)]
pub struct Binding {
    pub source: Rc<dyn Evaluator>,
    pub pattern: crate::pattern::Pattern,
    pub body: Rc<dyn Evaluator>,
}

impl Evaluator for Binding {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let bound_values = self.source.eval(vec![(env.clone(), value.clone())])?;
            for (bound_env, bound_value) in bound_values {
                let combos = self.pattern.bind(&bound_env, &bound_value)?;
                for combo in combos {
                    let child = bound_env.child_vars(combo);
                    let results = self.body.eval(vec![(child, value.clone())])?;
                    out.extend(results);
                }
            }
        }
        Ok(out)
    }
}

/// `lhs = rhs` — evaluate `rhs` against the original input, then replay `lhs`'s
/// recorded path against it to splice the new value in (distilled-spec §4.7). `lhs`
/// itself is evaluated only to discover its path, via [`crate::environment::Env::path`]
/// on each of its output environments; its *value* output is discarded.
#[derive(Debug)]
pub struct SetPath {
    pub lhs: Rc<dyn Evaluator>,
    pub rhs: Rc<dyn Evaluator>,
}

impl Evaluator for SetPath {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut out = Stream::new();
        for (env, value) in stream {
            let rights = self.rhs.eval(vec![(env.clone(), value.clone())])?;
            for (_, new_value) in rights {
                let lefts = self.lhs.eval(vec![(env.clone(), value.clone())])?;
                let mut updated = value.clone();
                for (left_env, _) in &lefts {
                    let path = left_env.path();
                    updated = deep_update(&updated, &path, new_value.clone());
                }
                out.push((env.clone(), updated));
            }
        }
        Ok(out)
    }
}

/// `lhs // rhs` — parsed per the grammar's `exp7` production but not evaluated: the
/// alternative operator's "use rhs only if lhs raises or produces nothing truthy"
/// semantics are out of scope for this subset.
#[derive(Debug)]
pub struct Alternative {
    pub lhs: Rc<dyn Evaluator>,
    pub rhs: Rc<dyn Evaluator>,
}

impl Evaluator for Alternative {
    fn eval(&self, _stream: Stream) -> EvalResult {
        Err(Signal::Error(EvalError::new(
            "the `//` alternative operator is not supported in this subset",
        )))
    }
}

/// Non-`=` assignment operators (`|=`, `+=`, `-=`, `*=`, `/=`, `%=`, `//=`) — parsed per
/// the grammar's `exp6` production but not evaluated, matching `=`'s sibling slots
/// without implementing their update-in-place semantics.
#[derive(Debug)]
pub struct CompoundAssign {
    pub op: &'static str,
    pub lhs: Rc<dyn Evaluator>,
    pub rhs: Rc<dyn Evaluator>,
}

impl Evaluator for CompoundAssign {
    fn eval(&self, _stream: Stream) -> EvalResult {
        Err(Signal::Error(EvalError::new(format!(
            "the `{}` assignment operator is not supported in this subset",
            self.op
        ))))
    }
}

/// The lexer's cursor marker, surfaced as an evaluator node: when evaluation reaches
/// this position, sample the stream of values that reached it (via
/// [`crate::completion::candidates_for`]) and abort with a
/// [`crate::error::Signal::Completion`] carrying the merged candidate list — used by
/// the parser to splice cursor-awareness into whichever suffix position the cursor fell
/// in (distilled-spec §6). `mode` picks whether the sampled candidates are field names
/// (cursor sits right after a `.`) or sampled scalar values (cursor sits in a bare
/// value position). `prefix`, when set, narrows field candidates to those starting
/// with the text already typed (a bareword field or unterminated string before the
/// cursor) and is otherwise `None` for a bare `.` right before the cursor. `bare_head`
/// marks the cursor sitting right after a lone head `.` (e.g. `.` or `.<cursor>`),
/// which additionally offers `Token("")` to keep the dot itself as a valid completion
/// (distilled-spec §4.7); a chain dot like `t.<cursor>` does not offer that token.
#[derive(Debug)]
pub struct CursorMarker {
    pub mode: crate::completion::Mode,
    pub prefix: Option<String>,
    pub span: crate::position::Span,
    pub bare_head: bool,
}

impl Evaluator for CursorMarker {
    fn eval(&self, stream: Stream) -> EvalResult {
        let mut candidates: Vec<Candidate> = Vec::new();
        if self.bare_head && self.mode == crate::completion::Mode::Field && self.prefix.is_none() {
            candidates.push(Candidate::Token(String::new()));
        }
        for (_, value) in &stream {
            for c in crate::completion::candidates_for(self.mode, value) {
                if let Some(prefix) = &self.prefix {
                    let matches = match &c {
                        Candidate::Field(name) | Candidate::Str(name) => {
                            name.starts_with(prefix.as_str())
                        }
                        _ => true,
                    };
                    if !matches {
                        continue;
                    }
                }
                if !candidates.contains(&c) {
                    candidates.push(c);
                }
            }
        }
        crate::completion::sort_candidates(&mut candidates);
        crate::util::log::trace(crate::util::log::Level::Result, || {
            format!("completion raised with {} candidates", candidates.len())
        });
        Err(Signal::Completion(Completion {
            candidates,
            span: Some(self.span),
        }))
    }
}
