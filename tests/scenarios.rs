//! End-to-end scenarios lexing, parsing and evaluating real jq source strings
//! against JSON fixtures, grounded directly on the six literal scenarios this
//! crate's specification calls out and on the teacher's own top-level `tests/`
//! integration layout (`examples/H1ghBre4k3r-y-lang/tests/*.rs`: one fixture, one
//! expectation, one `#[test]` per file-level scenario). `serde_json` (already a
//! dev-dependency, mirroring the teacher's own use of it in
//! `src/examples/__tests__/benchmark`) supplies convenient JSON literals that this
//! file converts into the crate's own [`Value`].

use indexmap::IndexMap;
use jqi_core::eval::{splice, unsplice};
use jqi_core::{completer, make_env, parse, Value};

fn from_serde(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap())
            }
        }
        serde_json::Value::String(s) => Value::str(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_serde).collect()),
        serde_json::Value::Object(map) => {
            let mut out = IndexMap::new();
            for (k, v) in map {
                out.insert(k, from_serde(v));
            }
            Value::Object(out)
        }
    }
}

fn run(source: &str, inputs: Vec<serde_json::Value>) -> Vec<Value> {
    let env = make_env();
    let evaluator = parse(source).expect("parse should succeed");
    let stream = splice(&env, inputs.into_iter().map(from_serde).collect());
    unsplice(evaluator.eval(stream).expect("eval should succeed"))
}

#[test]
fn scenario_1_destructuring_with_computed_keys() {
    let out = run(
        r#". as {("a","b"):$A,("b","c"):$C} | [$A,$C]"#,
        vec![serde_json::json!({"a": 1, "b": 2, "c": 3})],
    );
    assert_eq!(
        out,
        vec![
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
            Value::Array(vec![Value::Int(1), Value::Int(3)]),
            Value::Array(vec![Value::Int(2), Value::Int(2)]),
            Value::Array(vec![Value::Int(2), Value::Int(3)]),
        ]
    );
}

#[test]
fn scenario_2_arithmetic_cross_product_leftmost_varies_fastest() {
    let out = run("(1,3) * (4,7)", vec![serde_json::Value::Null]);
    assert_eq!(
        out,
        vec![Value::Int(4), Value::Int(12), Value::Int(7), Value::Int(21)]
    );
}

#[test]
fn scenario_3_nested_assignment_creates_missing_objects() {
    let out = run(".a.b.c = 2", vec![serde_json::json!({})]);
    assert_eq!(out, vec![from_serde(serde_json::json!({"a": {"b": {"c": 2}}}))]);
}

#[test]
fn scenario_4_comma_lhs_assignment_applies_same_rhs_to_each_path() {
    let out = run(". | (.a,.b) = (1,2)", vec![serde_json::Value::Null]);
    assert_eq!(
        out,
        vec![
            from_serde(serde_json::json!({"a": 1, "b": 1})),
            from_serde(serde_json::json!({"a": 2, "b": 2})),
        ]
    );
}

#[test]
fn scenario_5_dot_cursor_offers_object_field_completions() {
    let c = completer(".bb.", 4).unwrap();
    let (candidates, span) = c
        .complete(
            vec![from_serde(serde_json::json!({
                "a": "b",
                "aa": "bb",
                "b": "c",
                "bb": {"d": "dd", "e": "ee"},
            }))],
            None,
        )
        .unwrap();
    assert_eq!(
        candidates,
        vec![
            jqi_core::Candidate::Field("d".to_string()),
            jqi_core::Candidate::Field("e".to_string()),
        ]
    );
    assert_eq!(span.start, 4);
    assert_eq!(span.end, 4);
}

#[test]
fn scenario_6_select_with_comma_argument_tests_every_condition() {
    let out = run(
        "1, 2, 3 | select(. < 3, . % 2 != 0)",
        vec![serde_json::Value::Null],
    );
    assert_eq!(
        out,
        vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn pipe_and_comma_identity_laws() {
    let fixture = serde_json::json!([1, "two", {"three": 3}, null, true]);
    let expected = from_serde(fixture.clone());
    assert_eq!(run(".", vec![fixture.clone()]), vec![expected.clone()]);
    assert_eq!(run(". | .", vec![fixture]), vec![expected]);
}

#[test]
fn unknown_variable_is_a_hard_error() {
    let env = make_env();
    let evaluator = parse("$nope").unwrap();
    let stream = splice(&env, vec![Value::Null]);
    assert!(evaluator.eval(stream).is_err());
}
