//! Built-in function registry.
//!
//! Grounded on distilled-spec §4.5 ("a small seed set of built-ins resolved by
//! `name/arity`") and on the teacher's own registration pattern: `production/builder.rs`
//! assembles a fixed table of named, arity-tagged constructs once at grammar-build time,
//! looked up by name during parsing. Here the lookup happens at *eval* time instead
//! (`Env::lookup_func`), since jq lets a `def` shadow a built-in in an inner scope.

use crate::environment::Env;
use crate::eval::{EvalResult, Stream};
use std::fmt;
use std::rc::Rc;

/// A callable built-in: `filter/arity` resolved by [`Env::lookup_func`]. `args` holds
/// one not-yet-evaluated argument filter per declared parameter, each still needing to
/// be run (with the *caller's* environment, not the callee's) to produce the values the
/// built-in operates over — mirrors how `select/1`, `map/1` etc. all need to evaluate
/// their own filter argument against each input value.
pub trait Builtin {
    fn name(&self) -> &str;
    fn arity(&self) -> usize;
    fn call(&self, stream: Stream, args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult;
}

impl fmt::Debug for dyn Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({}/{})", self.name(), self.arity())
    }
}

/// `true` — the literal `true` value, callable as a 0-arity built-in so `Call` can
/// resolve bareword keywords the same way it resolves any other function name.
struct True;
impl Builtin for True {
    fn name(&self) -> &str {
        "true"
    }
    fn arity(&self) -> usize {
        0
    }
    fn call(&self, stream: Stream, _args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult {
        Ok(stream
            .into_iter()
            .map(|(env, _)| (env, crate::value::Value::Bool(true)))
            .collect())
    }
}

struct False;
impl Builtin for False {
    fn name(&self) -> &str {
        "false"
    }
    fn arity(&self) -> usize {
        0
    }
    fn call(&self, stream: Stream, _args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult {
        Ok(stream
            .into_iter()
            .map(|(env, _)| (env, crate::value::Value::Bool(false)))
            .collect())
    }
}

struct Null;
impl Builtin for Null {
    fn name(&self) -> &str {
        "null"
    }
    fn arity(&self) -> usize {
        0
    }
    fn call(&self, stream: Stream, _args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult {
        Ok(stream
            .into_iter()
            .map(|(env, _)| (env, crate::value::Value::Null))
            .collect())
    }
}

/// `not/0` — negate each input's truthiness (§4.3).
struct Not;
impl Builtin for Not {
    fn name(&self) -> &str {
        "not"
    }
    fn arity(&self) -> usize {
        0
    }
    fn call(&self, stream: Stream, _args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult {
        Ok(stream
            .into_iter()
            .map(|(env, v)| {
                let negated = crate::value::Value::Bool(!v.truthy());
                (env, negated)
            })
            .collect())
    }
}

/// `empty/0` — produce no outputs for any input.
struct Empty;
impl Builtin for Empty {
    fn name(&self) -> &str {
        "empty"
    }
    fn arity(&self) -> usize {
        0
    }
    fn call(&self, _stream: Stream, _args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult {
        Ok(Vec::new())
    }
}

/// `select(f)/1` — keep an input iff its filter argument produces at least one truthy
/// value, re-emitting the *original* input (not the filter's output) once per truthy
/// result, matching jq's `def select(f): if f then . else empty end;`.
struct Select;
impl Builtin for Select {
    fn name(&self) -> &str {
        "select"
    }
    fn arity(&self) -> usize {
        1
    }
    fn call(&self, stream: Stream, args: &[Rc<dyn crate::eval::Evaluator>]) -> EvalResult {
        let filter = &args[0];
        let mut out = Stream::new();
        for (env, value) in stream {
            let probe = filter.eval(vec![(env.clone(), value.clone())])?;
            for (_, cond) in probe {
                if cond.truthy() {
                    out.push((env.clone(), value.clone()));
                }
            }
        }
        Ok(out)
    }
}

/// A name/arity-keyed table of the seed built-ins, installed into the root
/// [`Env`] by [`crate::make_env`].
pub struct Registry {
    entries: Vec<Rc<dyn Builtin>>,
}

impl Registry {
    pub fn seed() -> Self {
        Self {
            entries: vec![
                Rc::new(True),
                Rc::new(False),
                Rc::new(Null),
                Rc::new(Not),
                Rc::new(Empty),
                Rc::new(Select),
            ],
        }
    }

    /// Fold every seeded built-in into `root` as a `name/arity`-keyed child frame.
    pub fn install(&self, root: Env) -> Env {
        let mut env = root;
        for entry in &self.entries {
            let key = format!("{}/{}", entry.name(), entry.arity());
            env = env.child_func(key, entry.clone());
        }
        env
    }
}
