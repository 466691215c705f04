//! Destructuring pattern matching.
//!
//! Grounded on distilled-spec §4.4 ("binding patterns") and on
//! `original_source/jqi/evaluator.py`'s pattern-walk, which cross-combines bindings
//! produced by sibling sub-patterns rather than merging them eagerly — a single `as`
//! clause like `. as {a: $x, b: [$y]} | ...` can, in general, bind `$x`/`$y` to more
//! than one combination when `a`/`b` themselves stream multiple values (e.g. `b: [$y]`
//! against an array iterates). The teacher's own combinator trees compose this way too:
//! `production/non_terminals` nodes return every successful parse rather than collapsing
//! to one, and downstream consumers flatten the cross product themselves.

use crate::environment::Env;
use crate::error::{EvalError, Signal};
use crate::eval::Evaluator;
use crate::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

/// One fully-resolved set of `$name -> value` bindings produced by a single successful
/// match of a [`Pattern`] against a [`Value`].
pub type Bindings = Vec<(String, Value)>;

/// A destructuring pattern appearing on the left of `as` or inside a `reduce`/`foreach`
/// binder.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// `$x` — bind the whole matched value under this name.
    Var(String),
    /// `[p1, p2, ...]` — positional array destructuring; missing trailing elements
    /// bind their sub-pattern against `null` rather than failing, matching jq.
    Array(Vec<Pattern>),
    /// `{k1: p1, k2: p2, ...}` — object destructuring. Each key is itself a
    /// [`KeyPattern`], since jq allows `{(expr): pattern}` as well as bare/`$`-shorthand
    /// keys.
    Object(Vec<(KeyPattern, Pattern)>),
}

/// The key half of a single `{key: pattern}` entry.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// A literal identifier or quoted string key: `{name: $x}`.
    Literal(String),
    /// `{$x}` shorthand — binds `$x` to `.x` and uses `"x"` as the literal key. Stores
    /// the bare identifier (`"x"`, no `$`), since it does double duty as both the
    /// object key looked up and (with a `$` prefixed back on) the bound variable name.
    VarShorthand(String),
    /// `{(expr): pattern}` — a computed key. `expr` is evaluated against the
    /// surrounding stream to produce zero or more string keys; the sub-pattern binds
    /// against `item.get(key)` for each, and the resulting combinations concatenate
    /// (distilled-spec §4.5, `original_source/jqi/pattern.py`'s `ExpMatch`).
    Expr(Rc<dyn Evaluator>),
}

impl Pattern {
    /// Match `value` against this pattern, returning every consistent cross-combination
    /// of bindings it can produce. A plain `Var`/`Array`/`Object` whose sub-patterns are
    /// all themselves `Var`s always yields exactly one combination; richer patterns
    /// whose components stream (via expression-valued object keys, say) can yield more.
    pub fn bind(&self, env: &Env, value: &Value) -> Result<Vec<Bindings>, Signal> {
        match self {
            Pattern::Var(name) => Ok(vec![vec![(name.clone(), value.clone())]]),
            Pattern::Array(items) => {
                let elems = match value {
                    Value::Array(a) => a.clone(),
                    Value::Null => Vec::new(),
                    other => {
                        return Err(Signal::Error(EvalError::new(format!(
                            "Cannot index {} with number",
                            other.type_name()
                        ))))
                    }
                };
                let mut combos: Vec<Bindings> = vec![Vec::new()];
                for (i, sub) in items.iter().enumerate() {
                    let at = elems.get(i).cloned().unwrap_or(Value::Null);
                    let sub_combos = sub.bind(env, &at)?;
                    combos = cross_combine(combos, sub_combos);
                }
                Ok(combos)
            }
            Pattern::Object(entries) => {
                let mut combos: Vec<Bindings> = vec![Vec::new()];
                for (key_pat, sub) in entries {
                    let entry_combos = match key_pat {
                        KeyPattern::Literal(key) => {
                            let at = field_at(value, key)?;
                            sub.bind(env, &at)?
                        }
                        KeyPattern::VarShorthand(name) => {
                            let at = field_at(value, name)?;
                            let var_name = format!("${}", name);
                            let mut sub_combos = sub.bind(env, &at)?;
                            for combo in sub_combos.iter_mut() {
                                combo.push((var_name.clone(), at.clone()));
                            }
                            sub_combos
                        }
                        KeyPattern::Expr(expr) => {
                            let keys = expr.eval(vec![(env.clone(), value.clone())])?;
                            let mut all = Vec::new();
                            for (_, key_value) in keys {
                                let key_str = match key_value {
                                    Value::Str(s) => s.to_string(),
                                    other => {
                                        return Err(Signal::Error(EvalError::new(format!(
                                            "Cannot use {} as object key",
                                            other.type_name()
                                        ))))
                                    }
                                };
                                let at = field_at(value, &key_str)?;
                                all.extend(sub.bind(env, &at)?);
                            }
                            all
                        }
                    };
                    combos = cross_combine(combos, entry_combos);
                }
                Ok(combos)
            }
        }
    }

    /// Every variable name this pattern binds, in binding order — used to pre-seed
    /// `null` for alternative patterns (`p1 ?// p2`) the way jq requires all
    /// alternatives to bind the same set of names.
    pub fn bound_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Pattern::Var(name) => out.push(name.clone()),
            Pattern::Array(items) => {
                for item in items {
                    item.collect_names(out);
                }
            }
            Pattern::Object(entries) => {
                for (key_pat, sub) in entries {
                    if let KeyPattern::VarShorthand(name) = key_pat {
                        out.push(format!("${}", name));
                    }
                    sub.collect_names(out);
                }
            }
        }
    }
}

/// Read `key` out of `value` the same way field access does: `null` on a missing key
/// or a `null` base, a hard error on any other non-object.
fn field_at(value: &Value, key: &str) -> Result<Value, Signal> {
    match value {
        Value::Object(map) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
        Value::Null => Ok(Value::Null),
        other => Err(Signal::Error(EvalError::new(format!(
            "Cannot index {} with \"{}\"",
            other.type_name(),
            key
        )))),
    }
}

/// Build the cross product of two binding-combination lists, concatenating each left
/// combination with each right combination in turn.
fn cross_combine(lhs: Vec<Bindings>, rhs: Vec<Bindings>) -> Vec<Bindings> {
    let mut out = Vec::with_capacity(lhs.len() * rhs.len().max(1));
    for l in &lhs {
        for r in &rhs {
            let mut combined = l.clone();
            combined.extend(r.clone());
            out.push(combined);
        }
    }
    out
}

/// Helper used by the object literal evaluator (`{a, b}` shorthand, `{(k): v}`) to turn
/// a finished set of key/value pairs into an [`IndexMap`], preserving first-write order
/// and last-write-wins on duplicate keys, matching jq's own object construction.
pub fn build_object(pairs: impl IntoIterator<Item = (String, Value)>) -> Value {
    let mut map = IndexMap::new();
    for (k, v) in pairs {
        map.insert(k, v);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_pattern_binds_whole_value() {
        let env = Env::root();
        let pat = Pattern::Var("$x".to_string());
        let combos = pat.bind(&env, &Value::Int(5)).unwrap();
        assert_eq!(combos, vec![vec![("$x".to_string(), Value::Int(5))]]);
    }

    #[test]
    fn array_pattern_pads_missing_with_null() {
        let env = Env::root();
        let pat = Pattern::Array(vec![
            Pattern::Var("$a".to_string()),
            Pattern::Var("$b".to_string()),
        ]);
        let combos = pat.bind(&env, &Value::Array(vec![Value::Int(1)])).unwrap();
        assert_eq!(
            combos,
            vec![vec![
                ("$a".to_string(), Value::Int(1)),
                ("$b".to_string(), Value::Null),
            ]]
        );
    }

    #[test]
    fn object_shorthand_binds_field_name() {
        let env = Env::root();
        let pat = Pattern::Object(vec![(
            KeyPattern::VarShorthand("a".to_string()),
            Pattern::Var("$a".to_string()),
        )]);
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Bool(true));
        let combos = pat.bind(&env, &Value::Object(map)).unwrap();
        assert_eq!(
            combos,
            vec![vec![
                ("$a".to_string(), Value::Bool(true)),
                ("$a".to_string(), Value::Bool(true)),
            ]]
        );
    }

    #[test]
    fn computed_key_pattern_cross_combines_across_keys() {
        use crate::eval::{Comma, Literal};

        let env = Env::root();
        let keys = Rc::new(Comma(
            Rc::new(Literal(Value::str("a"))),
            Rc::new(Literal(Value::str("b"))),
        )) as Rc<dyn Evaluator>;
        let pat = Pattern::Object(vec![(
            KeyPattern::Expr(keys),
            Pattern::Var("$a".to_string()),
        )]);
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Int(1));
        map.insert("b".to_string(), Value::Int(2));
        let combos = pat.bind(&env, &Value::Object(map)).unwrap();
        assert_eq!(
            combos,
            vec![
                vec![("$a".to_string(), Value::Int(1))],
                vec![("$a".to_string(), Value::Int(2))],
            ]
        );
    }
}
