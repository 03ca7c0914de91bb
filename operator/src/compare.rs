//! Semantically tolerant equality over canonical specs.
//!
//! Values are compared in their JSON form. At every depth, two zero values
//! (null, `false`, `0`, `""`, empty list, empty map, or a map of zero values)
//! are equal, and two strings that parse as the same resource quantity are
//! equal.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

pub fn equivalent<T: Serialize>(a: &T, b: &T) -> Result<bool, Error> {
    Ok(equal(&serde_json::to_value(a)?, &serde_json::to_value(b)?))
}

pub fn diff<T: Serialize>(a: &T, b: &T) -> Result<Vec<String>, Error> {
    Ok(differences(
        &serde_json::to_value(a)?,
        &serde_json::to_value(b)?,
    ))
}

pub fn is_zero(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.values().all(is_zero),
    }
}

pub fn equal(a: &Value, b: &Value) -> bool {
    if is_zero(a) && is_zero(b) {
        return true;
    }

    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            union_keys(x, y).all(|k| equal(field(x, k), field(y, k)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| equal(l, r))
        }
        (Value::String(x), Value::String(y)) => x == y || quantities_equal(x, y),
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

pub fn differences(a: &Value, b: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_differences(a, b, "$", &mut out);
    out
}

fn collect_differences(a: &Value, b: &Value, path: &str, out: &mut Vec<String>) {
    if equal(a, b) {
        return;
    }

    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            for k in union_keys(x, y) {
                collect_differences(field(x, k), field(y, k), &format!("{path}.{k}"), out);
            }
        }
        (Value::Array(x), Value::Array(y)) if x.len() == y.len() => {
            for (i, (l, r)) in x.iter().zip(y).enumerate() {
                collect_differences(l, r, &format!("{path}[{i}]"), out);
            }
        }
        _ => out.push(path.to_string()),
    }
}

fn union_keys<'a>(
    x: &'a Map<String, Value>,
    y: &'a Map<String, Value>,
) -> impl Iterator<Item = &'a String> {
    x.keys().chain(y.keys().filter(|k| !x.contains_key(*k)))
}

fn field<'a>(m: &'a Map<String, Value>, k: &str) -> &'a Value {
    m.get(k).unwrap_or(&Value::Null)
}

fn quantities_equal(x: &str, y: &str) -> bool {
    match (parse_quantity(x), parse_quantity(y)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Parses a Kubernetes resource quantity into nano units, rounding up any
/// finer precision. `None` when the text is not a quantity or overflows.
pub fn parse_quantity(s: &str) -> Option<i128> {
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let number_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (number, suffix) = rest.split_at(number_len);

    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, f),
        None => (number, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.contains('.') {
        return None;
    }

    let mut mantissa: i128 = 0;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = i128::from(c.to_digit(10)?);
        mantissa = mantissa.checked_mul(10)?.checked_add(digit)?;
    }
    let (pow10, pow2) = suffix_scale(suffix)?;
    let pow10 = pow10.checked_sub(i32::try_from(frac_part.len()).ok()?)?;

    let mut value = mantissa.checked_mul(1i128.checked_shl(pow2)?)?;
    // Nano units.
    let nano_pow = pow10.checked_add(9)?;
    if nano_pow >= 0 {
        value = value.checked_mul(10i128.checked_pow(u32::try_from(nano_pow).ok()?)?)?;
    } else {
        let divisor = 10i128.checked_pow(u32::try_from(-nano_pow).ok()?)?;
        value = (value + divisor - 1) / divisor;
    }

    Some(if negative { -value } else { value })
}

/// Decimal exponent and binary shift denoted by a quantity suffix.
fn suffix_scale(suffix: &str) -> Option<(i32, u32)> {
    let scale = match suffix {
        "" => (0, 0),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        _ => {
            let exp = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            if exp.is_empty() {
                return None;
            }
            (exp.parse::<i32>().ok()?, 0)
        }
    };
    Some(scale)
}
