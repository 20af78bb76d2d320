//! Duration literals in the `1h30m`, `250ms`, `1.5s` form.
//!
//! Use as a serde `with` module on `std::time::Duration` fields:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Timeouts {
//!     #[serde(with = "envlayer_rs_schema::duration")]
//!     read: Duration,
//! }
//! ```

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;
/// Fraction digits beyond this cannot change a nanosecond count.
const MAX_FRACTION_DIGITS: usize = 18;

/// Errors returned when a duration literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    /// Empty input or a malformed number.
    #[error("invalid duration {0:?}")]
    Invalid(String),
    /// A number without a unit suffix.
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    /// An unknown unit suffix.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { input: String, unit: String },
    /// `std::time::Duration` cannot be negative.
    #[error("negative duration {0:?}")]
    Negative(String),
    /// The value does not fit in a `Duration`.
    #[error("duration {0:?} overflows")]
    Overflow(String),
}

/// Parse a literal such as `72h3m0.5s` into a `Duration`.
pub fn parse(input: &str) -> Result<Duration, DurationError> {
    let literal = input.strip_prefix('+').unwrap_or(input);
    if literal.starts_with('-') {
        return Err(DurationError::Negative(input.to_string()));
    }
    if literal == "0" {
        return Ok(Duration::ZERO);
    }
    if literal.is_empty() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let overflow = || DurationError::Overflow(input.to_string());
    let mut rest = literal;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DurationError::MissingUnit(input.to_string()))?;
        let number = &rest[..number_end];
        rest = &rest[number_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let scale = unit_scale(unit).ok_or_else(|| DurationError::UnknownUnit {
            input: input.to_string(),
            unit: unit.to_string(),
        })?;
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(DurationError::Invalid(input.to_string()));
        }
        if fraction.contains('.') {
            return Err(DurationError::Invalid(input.to_string()));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let digits: u128 = fraction
                .parse()
                .map_err(|_| DurationError::Invalid(input.to_string()))?;
            let denominator = 10u128.pow(fraction.len() as u32);
            let part = digits.checked_mul(scale).ok_or_else(overflow)? / denominator;
            nanos = nanos.checked_add(part).ok_or_else(overflow)?;
        }
        total = total.checked_add(nanos).ok_or_else(overflow)?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| overflow())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Render a `Duration` in the form accepted by [`parse`].
pub fn format(duration: Duration) -> String {
    let total = duration.as_nanos();
    if total == 0 {
        return "0s".to_string();
    }
    if total < 1_000 {
        return format!("{total}ns");
    }
    if total < 1_000_000 {
        return format!("{}us", decimal(total, 1_000));
    }
    if total < NANOS_PER_SEC {
        return format!("{}ms", decimal(total, 1_000_000));
    }

    let secs = duration.as_secs();
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = u128::from(secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{}s", decimal(seconds, NANOS_PER_SEC)));
    out
}

/// `value / unit` as a decimal string without trailing zeros.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let remainder = value % unit;
    if remainder == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let fraction = format!("{remainder:0width$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

/// Serialize a `Duration` as a literal string.
pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(*duration))
}

/// Deserialize a `Duration` from a literal string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(DurationVisitor)
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration literal such as \"1m30s\"")
    }

    fn visit_str<E>(self, value: &str) -> Result<Duration, E>
    where
        E: de::Error,
    {
        parse(value).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[test]
    fn parses_compound_literals() {
        assert_eq!(parse("1h30m").unwrap(), Duration::from_secs(5_400));
        assert_eq!(parse("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse("1.5s").unwrap(), Duration::from_millis(1_500));
        assert_eq!(parse("2us").unwrap(), Duration::from_micros(2));
        assert_eq!(parse("10ns").unwrap(), Duration::from_nanos(10));
        assert_eq!(parse(".5m").unwrap(), Duration::from_secs(30));
        assert_eq!(parse("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_bad_literals() {
        assert_eq!(parse("30"), Err(DurationError::MissingUnit("30".into())));
        assert!(matches!(
            parse("5d"),
            Err(DurationError::UnknownUnit { unit, .. }) if unit == "d"
        ));
        assert_eq!(parse("-1s"), Err(DurationError::Negative("-1s".into())));
        assert_eq!(parse(""), Err(DurationError::Invalid(String::new())));
        assert_eq!(parse("1.2.3s"), Err(DurationError::Invalid("1.2.3s".into())));
        assert!(matches!(parse("s"), Err(DurationError::Invalid(_))));
    }

    #[test]
    fn formats_like_it_parses() {
        assert_eq!(format(Duration::ZERO), "0s");
        assert_eq!(format(Duration::from_nanos(10)), "10ns");
        assert_eq!(format(Duration::from_nanos(1_500)), "1.5us");
        assert_eq!(format(Duration::from_millis(250)), "250ms");
        assert_eq!(format(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(format(Duration::from_secs(5_400)), "1h30m0s");
        assert_eq!(format(Duration::from_secs(61)), "1m1s");
        for literal in ["1h30m0s", "1.5us", "2m0.25s"] {
            assert_eq!(format(parse(literal).unwrap()), literal);
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Timeouts {
        #[serde(with = "crate::duration")]
        read: Duration,
    }

    #[test]
    fn serde_with_module_uses_literals() {
        let value = serde_json::to_value(Timeouts {
            read: Duration::from_secs(90),
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({ "read": "1m30s" }));

        let decoded: Timeouts = serde_json::from_value(serde_json::json!({ "read": "2s" })).unwrap();
        assert_eq!(decoded.read, Duration::from_secs(2));
        assert!(serde_json::from_value::<Timeouts>(serde_json::json!({ "read": "2" })).is_err());
    }
}
