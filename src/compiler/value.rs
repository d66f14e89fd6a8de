//! Conversions and operators over JSON values as seen by templates.

use crate::error::{Error, Result};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Truthiness used by conditions and the logical operators.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text appended to the output for `value`; `None` for null.
pub fn to_output(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(to_display(other)),
    }
}

/// String form of a value: strings verbatim, whole numbers without a
/// fraction, arrays comma-joined, objects as JSON.
pub fn to_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(to_display).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Builds a JSON number, preferring an integer representation.
pub fn number(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

pub fn as_number(value: &Value, op: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::Evaluation(format!("number out of range for '{op}'"))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(0.0),
        other => Err(Error::Evaluation(format!(
            "operator '{op}' expects numbers, got: {other}"
        ))),
    }
}

/// `+`: numeric addition for numbers, concatenation otherwise.
pub fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Number(_) | Value::Bool(_) | Value::Null, Value::Number(_) | Value::Bool(_) | Value::Null) => {
            Ok(number(as_number(left, "+")? + as_number(right, "+")?))
        }
        _ => Ok(Value::String(format!("{}{}", to_display(left), to_display(right)))),
    }
}

pub fn arithmetic(op: &str, left: &Value, right: &Value) -> Result<Value> {
    let l = as_number(left, op)?;
    let r = as_number(right, op)?;
    let result = match op {
        "-" => l - r,
        "*" => l * r,
        "/" => l / r,
        "%" => l % r,
        _ => return Err(Error::Evaluation(format!("unknown operator '{op}'"))),
    };
    Ok(number(result))
}

/// Equality with numbers compared by value, so `1 == 1.0`.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

pub fn compare(op: &str, left: &Value, right: &Value) -> Result<bool> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => as_number(left, op)?.partial_cmp(&as_number(right, op)?),
    };
    Ok(match (op, ordering) {
        (_, None) => false,
        ("<", Some(o)) => o == Ordering::Less,
        ("<=", Some(o)) => o != Ordering::Greater,
        (">", Some(o)) => o == Ordering::Greater,
        (">=", Some(o)) => o != Ordering::Less,
        _ => return Err(Error::Evaluation(format!("unknown operator '{op}'"))),
    })
}

/// Reads `.property` (or `[property]`) off a value; missing members are null.
pub fn member(object: &Value, property: &Value) -> Value {
    match (object, property) {
        (Value::Object(map), key) => map.get(&to_display(key)).cloned().unwrap_or(Value::Null),
        (Value::Array(items), Value::String(key)) if key == "length" => Value::from(items.len()),
        (Value::Array(items), Value::Number(index)) => index
            .as_u64()
            .and_then(|i| items.get(i as usize))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::String(s), Value::String(key)) if key == "length" => {
            Value::from(s.chars().count())
        }
        _ => Value::Null,
    }
}

/// HTML-escapes text for the escape delimiter.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
