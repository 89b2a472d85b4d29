//! Record identifiers as seen by the document store.

use serde_json::Value;

/// Identifier of a stored record.
///
/// Records in a hand-edited JSON document may carry numeric or string ids, so
/// the identifier is kept in its textual form and compared against either.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a JSON `id` value denotes this identifier.
    pub fn matches(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => *s == self.0,
            Value::Number(n) => n.to_string() == self.0,
            _ => false,
        }
    }

    /// The next numeric id for a collection: one past the largest numeric id present.
    pub fn next_numeric<'a>(existing: impl IntoIterator<Item = &'a Value>) -> u64 {
        existing
            .into_iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse::<u64>().ok(),
                _ => None,
            })
            .max()
            .map_or(1, |max| max + 1)
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
