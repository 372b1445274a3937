//! Best-effort conversion of dynamic values into concrete types.
//!
//! Every function here reports failure through [`CoerceError`]. The typed
//! accessors on [`Config`](crate::Config) throw that error away and hand back
//! the caller's default instead, so a read never has to deal with an error.

use std::fmt::Write;
use std::time::Duration;

use thiserror::Error;

use crate::value::Value;

const NANOS_PER_SEC: u128 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CoerceError {
    #[error("cannot convert {from} to {to}")]
    Incompatible {
        from: &'static str,
        to: &'static str,
    },

    #[error("cannot parse {input:?} as {to}")]
    Parse { input: String, to: &'static str },

    #[error("{value} is out of range for {to}")]
    OutOfRange { value: String, to: &'static str },

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<CoerceError>,
    },
}

fn incompatible(value: &Value, to: &'static str) -> CoerceError {
    CoerceError::Incompatible {
        from: value.type_name(),
        to,
    }
}

/// Converts to a 64-bit integer.
///
/// Floats are truncated toward zero, booleans map to `0`/`1`, strings are
/// parsed as base-10 and durations yield their nanosecond count.
pub fn to_i64(value: &Value) -> Result<i64, CoerceError> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) => float_to_i64(*f),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s.trim().parse().map_err(|_| CoerceError::Parse {
            input: s.clone(),
            to: "integer",
        }),
        Value::Duration(d) => i64::try_from(d.as_nanos()).map_err(|_| CoerceError::OutOfRange {
            value: format!("{d:?}"),
            to: "integer",
        }),
        other => Err(incompatible(other, "integer")),
    }
}

fn float_to_i64(f: f64) -> Result<i64, CoerceError> {
    // `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f.trunc() as i64)
    } else {
        Err(CoerceError::OutOfRange {
            value: f.to_string(),
            to: "integer",
        })
    }
}

/// Converts to a 64-bit float.
pub fn to_f64(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().map_err(|_| CoerceError::Parse {
            input: s.clone(),
            to: "float",
        }),
        Value::Duration(d) => Ok(d.as_nanos() as f64),
        other => Err(incompatible(other, "float")),
    }
}

/// Converts to a boolean.
///
/// Numbers are `true` when non-zero. Strings must be one of the spellings
/// `1 t T TRUE true True` or `0 f F FALSE false False`.
pub fn to_bool(value: &Value) -> Result<bool, CoerceError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(CoerceError::Parse {
                input: s.clone(),
                to: "boolean",
            }),
        },
        other => Err(incompatible(other, "boolean")),
    }
}

/// Renders a scalar as a string.
pub fn to_string(value: &Value) -> Result<String, CoerceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Duration(d) => Ok(format_duration(*d)),
        other => Err(incompatible(other, "string")),
    }
}

/// Converts to a [`Duration`].
///
/// Tried in order: a stored duration is returned as is, a string is parsed
/// with [`parse_duration`], and anything else (including a string that failed
/// to parse) is read as an integer count of nanoseconds.
pub fn to_duration(value: &Value) -> Result<Duration, CoerceError> {
    match value {
        Value::Duration(d) => Ok(*d),
        Value::String(s) => parse_duration(s).or_else(|err| nanos(value).map_err(|_| err)),
        other => nanos(other),
    }
}

fn nanos(value: &Value) -> Result<Duration, CoerceError> {
    let count = to_i64(value)?;
    u64::try_from(count)
        .map(Duration::from_nanos)
        .map_err(|_| CoerceError::OutOfRange {
            value: count.to_string(),
            to: "duration",
        })
}

pub fn to_string_vec(value: &Value) -> Result<Vec<String>, CoerceError> {
    to_vec(value, to_string)
}

pub fn to_i64_vec(value: &Value) -> Result<Vec<i64>, CoerceError> {
    to_vec(value, to_i64)
}

pub fn to_f64_vec(value: &Value) -> Result<Vec<f64>, CoerceError> {
    to_vec(value, to_f64)
}

/// Coerces every element of a sequence. One bad element fails the whole call.
fn to_vec<T>(
    value: &Value,
    convert: fn(&Value) -> Result<T, CoerceError>,
) -> Result<Vec<T>, CoerceError> {
    let Value::Sequence(items) = value else {
        return Err(incompatible(value, "sequence"));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            convert(item).map_err(|source| CoerceError::Element {
                index,
                source: Box::new(source),
            })
        })
        .collect()
}

/// Guesses the type of bare scalar text, such as an environment variable.
///
/// `true`/`false` in any case become booleans, plain base-10 integers that fit
/// an `i64` become integers, and text with a decimal point that parses as a
/// float becomes a float. Everything else stays a string.
pub fn infer_scalar(text: &str) -> Value {
    for (spelling, flag) in [("true", true), ("false", false)] {
        if text.eq_ignore_ascii_case(spelling) {
            return Value::Bool(flag);
        }
    }

    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let integral = !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit());
    let parsed = if integral {
        text.parse().ok().map(Value::Integer)
    } else if text.contains('.') {
        text.parse().ok().map(Value::Float)
    } else {
        None
    };

    parsed.unwrap_or_else(|| Value::String(text.to_string()))
}

/// Parses a human-readable duration such as `1h2m3s`, `1.5h` or `300ms`.
///
/// The input is an optional sign followed by one or more `<decimal><unit>`
/// groups. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
/// A bare `0` is accepted. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, CoerceError> {
    let invalid = || CoerceError::InvalidDuration(input.to_string());

    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            _ => return Err(invalid()),
        };

        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut group = whole.checked_mul(scale).ok_or_else(invalid)?;

        // Digits past nanosecond precision cannot change the result.
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in frac.bytes().take(18) {
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }
        group = group
            .checked_add(numerator * scale / denominator)
            .ok_or_else(invalid)?;

        total = total.checked_add(group).ok_or_else(invalid)?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(invalid());
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Renders a duration in the grammar accepted by [`parse_duration`].
///
/// Durations under a second use the largest fitting sub-second unit
/// (`1.5µs`, `300ms`); longer ones are split into hours, minutes and
/// fractional seconds (`1h2m3.5s`).
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_SEC {
        let (scale, unit) = match nanos {
            n if n < 1_000 => (1, "ns"),
            n if n < 1_000_000 => (1_000, "µs"),
            _ => (1_000_000, "ms"),
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}s", decimal(seconds, NANOS_PER_SEC));
    out
}

/// Formats `value / scale` with trailing fractional zeros removed.
/// `scale` must be a power of ten.
fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let rem = value % scale;
    if rem == 0 {
        return whole.to_string();
    }
    let width = scale.to_string().len() - 1;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
