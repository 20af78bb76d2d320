//! Conversion of environment literals into snapshot values.

use envlayer_rs_schema::{FieldKind, duration};
use serde_json::{Map, Number, Value};

/// Parse `raw` as `kind`. The error is a human readable reason.
pub(super) fn parse_literal(kind: &FieldKind, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::Bool => parse_bool(raw).map(Value::Bool),
        FieldKind::Integer => parse_signed(raw).map(Value::from),
        FieldKind::Unsigned => parse_unsigned(raw).map(Value::from),
        FieldKind::Float => parse_float(raw),
        FieldKind::String => Ok(Value::String(raw.to_string())),
        FieldKind::Duration => duration::parse(raw)
            .map(|parsed| Value::String(duration::format(parsed)))
            .map_err(|err| err.to_string()),
        FieldKind::List(inner) => {
            if raw.is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            raw.split(',')
                .map(|item| parse_literal(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::Map(inner) => {
            let mut map = Map::new();
            if raw.is_empty() {
                return Ok(Value::Object(map));
            }
            for pair in raw.split(',') {
                let (key, value) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("invalid map item {pair:?}, expected key:value"))?;
                map.insert(key.to_string(), parse_literal(inner, value)?);
            }
            Ok(Value::Object(map))
        }
        FieldKind::Record(_) => Err("records are populated field by field".to_string()),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("invalid syntax".to_string()),
    }
}

fn parse_signed(raw: &str) -> Result<i64, String> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let magnitude = parse_magnitude(digits)?;
    if negative {
        0i128
            .checked_sub(i128::from(magnitude))
            .and_then(|value| i64::try_from(value).ok())
            .ok_or_else(|| "value out of range".to_string())
    } else {
        i64::try_from(magnitude).map_err(|_| "value out of range".to_string())
    }
}

fn parse_unsigned(raw: &str) -> Result<u64, String> {
    parse_magnitude(raw.strip_prefix('+').unwrap_or(raw))
}

/// Digits with an optional `0x`, `0o`, or `0b` radix prefix.
fn parse_magnitude(digits: &str) -> Result<u64, String> {
    let lower = digits.get(..2).map(str::to_ascii_lowercase);
    let (radix, body) = match lower.as_deref() {
        Some("0x") => (16, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0b") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if body.is_empty() || body.starts_with(&['+', '-'][..]) {
        return Err("invalid syntax".to_string());
    }
    u64::from_str_radix(body, radix).map_err(|err| err.to_string())
}

fn parse_float(raw: &str) -> Result<Value, String> {
    let value: f64 = raw.parse().map_err(|_| "invalid syntax".to_string())?;
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| "value is not finite".to_string())
}
