//! The evaluator tree: the parser builds these nodes directly rather than an
//! intermediate AST, matching the teacher's fused parse-and-construct style (its
//! `production/builder.rs` assembles `Rc<dyn IProduction>` combinator trees during
//! grammar construction, not as a later pass over a syntax tree).

mod ops;
mod path;

pub use ops::*;

use crate::environment::Env;
use crate::error::Signal;
use crate::value::Value;

/// A single `(environment, value)` pair flowing through the pipeline. The environment
/// travels alongside its value so that variable bindings and path bookkeeping
/// introduced upstream (`... as $x | ...`, field/index steps) stay in scope for
/// everything downstream of them in the same branch, even after a `,` or iteration
/// split the stream into several branches with diverging environments.
pub type Stream = Vec<(Env, Value)>;

/// Lift a batch of input values into a [`Stream`] by pairing each one with a fresh
/// child of `env` (distilled-spec §3/§6's "splice the inputs into the evaluator's
/// stream model to run a filter against them").
pub fn splice(env: &Env, values: Vec<Value>) -> Stream {
    values
        .into_iter()
        .map(|v| (env.child_path(crate::environment::PathStep::Reset), v))
        .collect()
}

/// Drop the environments back off a [`Stream`], keeping only the values in order — the
/// inverse of [`splice`], used wherever a caller only wants the output values (the CLI
/// surface, integration tests).
pub fn unsplice(stream: Stream) -> Vec<Value> {
    stream.into_iter().map(|(_, v)| v).collect()
}

/// The result of running an [`Evaluator`] over a [`Stream`]: either the stream it
/// produced, or a [`Signal`] — a hard error or a completion non-local exit.
pub type EvalResult = Result<Stream, Signal>;

/// A node in the evaluator tree. Every jq construct this crate supports — literals,
/// field access, pipes, comma, iteration, binding, arithmetic, comparisons, assignment —
/// implements this trait and is composed into a tree directly during parsing.
pub trait Evaluator: std::fmt::Debug {
    fn eval(&self, stream: Stream) -> EvalResult;
}
