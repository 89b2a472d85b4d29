//! Rejection model for validation stages.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use thiserror::Error;

/// Per-field validation messages, keyed by body field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. A later message for the same field replaces the earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise the accumulated errors.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// A structured rejection of a request body.
///
/// Both variants are client input errors; the HTTP layer maps them to 400.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A single fail-fast message, rendered as `{"error": "<message>"}`.
    #[error("{0}")]
    Message(String),

    /// Every violated field at once, rendered as `{"<field>": "<message>", ..}`.
    #[error("{0}")]
    Fields(FieldErrors),
}

impl Rejection {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    /// JSON response body for this rejection.
    pub fn to_json(&self) -> Value {
        match self {
            Rejection::Message(msg) => json!({ "error": msg }),
            Rejection::Fields(errors) => errors.to_json(),
        }
    }
}

impl From<FieldErrors> for Rejection {
    fn from(value: FieldErrors) -> Self {
        Self::Fields(value)
    }
}
