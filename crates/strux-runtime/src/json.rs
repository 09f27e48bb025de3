//! JSON encoding and decoding
//!
//! The encoder follows the rules of the host runtime's JSON serializer:
//! - numbers print in the runtime's shortest form (`10`, `0.5`, `1e+21`)
//! - non-finite numbers encode as `null`
//! - undefined and functions are dropped from records, `null` in arrays
//! - instances encode through their `to_plain` hook, otherwise as their own fields
//! - a top-level value with no encoding produces the empty string
//!
//! Decoding goes through serde_json with field order preserved.

use crate::class::Instance;
use crate::error::{StruxError, StruxResult};
use crate::value::{Value, ValueRecord};
use std::fmt::Write;

/// Encode a value. Undefined (and other unencodable top-level values) give `""`.
pub fn encode(value: &Value) -> StruxResult<String> {
    let mut out = String::new();
    let mut stack = Vec::new();
    write_value(&mut out, value, &mut stack)?;
    Ok(out)
}

/// Decode JSON text. The empty string decodes to undefined.
pub fn decode(text: &str) -> StruxResult<Value> {
    if text.is_empty() {
        return Ok(Value::Undefined);
    }
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|e| StruxError::Decode {
            input: text.to_string(),
            reason: e.to_string(),
        })?;
    Ok(from_serde(parsed))
}

fn from_serde(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => {
            Value::array(items.into_iter().map(from_serde).collect())
        }
        serde_json::Value::Object(fields) => Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k, from_serde(v)))
                .collect::<ValueRecord>(),
        ),
    }
}

/// Format a number the way the host runtime prints it
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let sign = if n < 0.0 { "-" } else { "" };
    // Shortest round-trip digits plus a decimal exponent
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let k = digits.len() as i32;
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, e_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, e_sign, e.abs())
        }
    };

    format!("{}{}", sign, body)
}

/// Write `value` to `out`. Returns false when the value has no encoding
/// (undefined, functions) and nothing was written.
fn write_value(out: &mut String, value: &Value, stack: &mut Vec<Instance>) -> StruxResult<bool> {
    match value {
        Value::Undefined | Value::Function(_) => Ok(false),
        Value::Null => {
            out.push_str("null");
            Ok(true)
        }
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
            Ok(true)
        }
        Value::Number(n) => {
            if n.is_finite() {
                out.push_str(&format_number(*n));
            } else {
                out.push_str("null");
            }
            Ok(true)
        }
        Value::String(s) => {
            write_string(out, s);
            Ok(true)
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if !write_value(out, item, stack)? {
                    out.push_str("null");
                }
            }
            out.push(']');
            Ok(true)
        }
        Value::Record(fields) => {
            write_fields(out, fields.iter().map(|(k, v)| (k.clone(), v.clone())), stack)?;
            Ok(true)
        }
        Value::Instance(inst) => {
            if stack.iter().any(|seen| seen.ptr_eq(inst)) {
                return Err(StruxError::Circular {
                    value: value.to_string(),
                });
            }
            stack.push(inst.clone());
            let written = match inst.class().plain_hook() {
                Some(hook) => {
                    let plain = hook(inst);
                    // A hook returning the instance itself falls back to fields
                    if plain.same(value) {
                        write_fields(out, inst.snapshot().into_iter(), stack).map(|_| true)
                    } else {
                        write_value(out, &plain, stack)
                    }
                }
                None => write_fields(out, inst.snapshot().into_iter(), stack).map(|_| true),
            };
            stack.pop();
            written
        }
    }
}

fn write_fields(
    out: &mut String,
    fields: impl Iterator<Item = (String, Value)>,
    stack: &mut Vec<Instance>,
) -> StruxResult<()> {
    out.push('{');
    let mut first = true;
    for (name, value) in fields {
        let mark = out.len();
        if !first {
            out.push(',');
        }
        write_string(out, &name);
        out.push(':');
        if write_value(out, &value, stack)? {
            first = false;
        } else {
            out.truncate(mark);
        }
    }
    out.push('}');
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    // serde_json escapes exactly like the runtime serializer
    let _ = write!(out, "{}", serde_json::Value::String(s.to_string()));
}
