//! Path-tracked assignment support.
//!
//! Grounded on distilled-spec §4.7 ("`=` assigns by replaying the left-hand side's
//! recorded path against the right-hand side's value") and on
//! `original_source/jqi/evaluator.py`'s `set_path`/`get_path` pair. This crate only
//! needs the write side of that pair — `set_path` never reads the target location
//! before overwriting it — so only [`deep_update`] is implemented.

use crate::environment::PathKey;
use crate::value::Value;
use indexmap::IndexMap;

/// Write `new_value` at the location addressed by `path` within `root`, rebuilding
/// every object from the root down to (but not including) the target, and return the
/// updated whole. A bare `[Dot]` path replaces `root` outright.
pub fn deep_update(root: &Value, path: &[PathKey], new_value: Value) -> Value {
    let keys: Vec<&str> = path
        .iter()
        .filter_map(|step| match step {
            PathKey::Dot => None,
            PathKey::Key(k) => Some(k.as_str()),
        })
        .collect();
    splice_keys(root, &keys, new_value)
}

fn splice_keys(root: &Value, keys: &[&str], new_value: Value) -> Value {
    match keys.split_first() {
        None => new_value,
        Some((head, rest)) => {
            let mut map = match root {
                Value::Object(map) => map.clone(),
                _ => IndexMap::new(),
            };
            let existing = map.get(*head).cloned().unwrap_or(Value::Null);
            let updated = splice_keys(&existing, rest, new_value);
            map.insert((*head).to_string(), updated);
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: &[(&str, Value)]) -> Value {
        let mut map = IndexMap::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        Value::Object(map)
    }

    #[test]
    fn splice_creates_missing_intermediate_objects() {
        let root = Value::Null;
        let path = vec![PathKey::Dot, PathKey::Key("a".into()), PathKey::Key("b".into())];
        let updated = deep_update(&root, &path, Value::Int(1));
        assert_eq!(updated, obj(&[("a", obj(&[("b", Value::Int(1))]))]));
    }

    #[test]
    fn splice_preserves_sibling_fields() {
        let root = obj(&[("a", Value::Int(1)), ("b", Value::Int(2))]);
        let path = vec![PathKey::Dot, PathKey::Key("a".into())];
        let updated = deep_update(&root, &path, Value::Int(99));
        assert_eq!(updated, obj(&[("a", Value::Int(99)), ("b", Value::Int(2))]));
    }
}
