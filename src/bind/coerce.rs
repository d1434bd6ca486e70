//! Type-directed coercion of dynamic values into statically typed targets.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::binder::Binder;
use super::error::BindError;
use super::tag::{parse_bool_token, FieldSpec};
use crate::value::{Value, ValueKind};

/// Conversion of one dynamic value into one statically typed target.
///
/// Implementations exist for the primitive leaves, [`Duration`],
/// sequences, string-keyed maps, `Option`/`Box` indirection, and every
/// structure defined through [`bindable!`](crate::bindable). A field whose
/// type has no implementation simply does not compile.
pub trait FromValue: Sized {
    /// Structure-shaped targets bind from an empty scope when their key is
    /// absent, so defaults declared on their fields still apply.
    const NESTED: bool = false;

    fn from_value(binder: &Binder, value: &Value, spec: &FieldSpec) -> Result<Self, BindError>;
}

impl FromValue for String {
    fn from_value(_binder: &Binder, value: &Value, spec: &FieldSpec) -> Result<Self, BindError> {
        let text =
            coerce_string(value).ok_or_else(|| BindError::coercion(value.kind(), "string"))?;
        if let Some(allowed) = &spec.options {
            if !allowed.iter().any(|option| option == &text) {
                return Err(BindError::InvalidOption {
                    value: text,
                    allowed: allowed.join(", "),
                });
            }
        }
        Ok(text)
    }
}

macro_rules! integer_from_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl FromValue for $ty {
            fn from_value(
                _binder: &Binder,
                value: &Value,
                spec: &FieldSpec,
            ) -> Result<Self, BindError> {
                let n = coerce_integer(value)
                    .ok_or_else(|| BindError::coercion(value.kind(), stringify!($ty)))?;
                if let Some((min, max)) = spec.range {
                    if n < min || n > max {
                        return Err(BindError::OutOfRange { value: n, min, max });
                    }
                }
                <$ty>::try_from(n).map_err(|_| BindError::coercion(value.kind(), stringify!($ty)))
            }
        }
    )+};
}

integer_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(_binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        coerce_float(value).ok_or_else(|| BindError::coercion(value.kind(), "f64"))
    }
}

impl FromValue for f32 {
    fn from_value(_binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        coerce_float(value)
            .map(|f| f as f32)
            .ok_or_else(|| BindError::coercion(value.kind(), "f32"))
    }
}

impl FromValue for bool {
    fn from_value(_binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        coerce_bool(value).ok_or_else(|| BindError::coercion(value.kind(), "bool"))
    }
}

/// Numeric input is nanoseconds; strings take duration literals such as
/// `"250ms"` or `"1h30m"`. Negative durations do not coerce.
impl FromValue for Duration {
    fn from_value(_binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        match value {
            Value::Integer(n) if *n >= 0 => Ok(Duration::from_nanos(*n as u64)),
            Value::Float(f) if *f >= 0.0 => Ok(Duration::from_nanos(*f as u64)),
            Value::String(s) => parse_duration(s)
                .ok_or_else(|| BindError::coercion(ValueKind::String, "duration")),
            other => Err(BindError::coercion(other.kind(), "duration")),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        let Value::Sequence(items) = value else {
            return Err(BindError::coercion(value.kind(), "sequence"));
        };
        // constraints on the field do not propagate into element coercion
        let element_spec = FieldSpec::default();
        items
            .iter()
            .map(|item| T::from_value(binder, item, &element_spec))
            .collect()
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        let Value::Mapping(mapping) = value else {
            return Err(BindError::coercion(value.kind(), "mapping"));
        };
        let value_spec = FieldSpec::default();
        mapping
            .iter()
            .map(|(key, val)| Ok((key.clone(), T::from_value(binder, val, &value_spec)?)))
            .collect()
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(binder: &Binder, value: &Value, _spec: &FieldSpec) -> Result<Self, BindError> {
        let Value::Mapping(mapping) = value else {
            return Err(BindError::coercion(value.kind(), "mapping"));
        };
        let value_spec = FieldSpec::default();
        mapping
            .iter()
            .map(|(key, val)| Ok((key.clone(), T::from_value(binder, val, &value_spec)?)))
            .collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const NESTED: bool = T::NESTED;

    fn from_value(binder: &Binder, value: &Value, spec: &FieldSpec) -> Result<Self, BindError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(binder, other, spec).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    const NESTED: bool = T::NESTED;

    fn from_value(binder: &Binder, value: &Value, spec: &FieldSpec) -> Result<Self, BindError> {
        T::from_value(binder, value, spec).map(Box::new)
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        Value::Float(f) => Some(*f as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => trim_zero_decimal(s.trim()).parse().ok(),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Integer(n) => Some(*n as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Integer(n) => Some(*n != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::String(s) => parse_bool_token(s.trim()),
        _ => None,
    }
}

/// Strips an all-zero fractional part so `"8.0"` parses as the integer 8
/// while `"8.5"` stays a coercion error.
fn trim_zero_decimal(s: &str) -> &str {
    match s.split_once('.') {
        Some((int, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => int,
        _ => s,
    }
}

/// Parses duration literals: concatenated `<number><unit>` segments with
/// units `ns`, `us`/`µs`, `ms`, `s`, `m`, `h` and optional fractions
/// (`"1.5h"`, `"2h45m"`). A bare numeric string is nanoseconds.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.is_empty() || s.starts_with('-') {
        return None;
    }

    if !s.chars().any(|c| c.is_alphabetic()) {
        let nanos = s.parse::<f64>().ok()?;
        return Some(Duration::from_nanos(nanos as u64));
    }

    let mut total_nanos = 0.0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit() && c != '.')?;
        let number = rest[..digits].parse::<f64>().ok()?;
        rest = &rest[digits..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let multiplier = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return None,
        };
        rest = &rest[unit_end..];

        total_nanos += number * multiplier;
    }

    Some(Duration::from_nanos(total_nanos as u64))
}
