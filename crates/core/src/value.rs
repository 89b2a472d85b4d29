//! Inspection helpers for loosely-typed JSON request fields.
//!
//! Form submissions deliver every field as a string and JSON clients send
//! whatever they like, so the validators look at raw [`Value`]s through these
//! helpers instead of deserializing into strict types.

use serde_json::Value;

/// Truthiness of an optional JSON field.
///
/// Absent, `null`, `false`, `0` and `""` are falsy. Arrays and objects are
/// truthy even when empty.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Outcome of coercing a field to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// The field is missing or `null`.
    Absent,
    /// The field is present but does not denote a finite number.
    Unparsable,
    Value(f64),
}

impl Numeric {
    /// Coerce a JSON field to a number.
    ///
    /// Numbers pass through. Strings are trimmed and parsed as decimal
    /// floats; a blank string counts as zero. Hex, octal and binary spellings,
    /// booleans, arrays, objects and non-finite results are unparsable.
    pub fn coerce(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Numeric::Absent,
            Some(Value::Number(n)) => n.as_f64().map_or(Numeric::Unparsable, Numeric::Value),
            Some(Value::String(s)) => parse_numeric_str(s),
            Some(_) => Numeric::Unparsable,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The coerced value as JSON, if it can be represented.
    pub fn to_json(self) -> Option<Value> {
        self.value()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    }
}

fn parse_numeric_str(s: &str) -> Numeric {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Numeric::Value(0.0);
    }
    // `f64::from_str` also accepts "inf"/"NaN"; those are not prices.
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Numeric::Value(v),
        _ => Numeric::Unparsable,
    }
}
