use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of an authenticated caller: the `id` of its `users` record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a record's owner field refers to this principal.
    ///
    /// Owner fields may be stored as numbers or strings.
    pub fn is_owner(&self, owner: Option<&Value>) -> bool {
        match owner {
            Some(Value::String(s)) => *s == self.0,
            Some(Value::Number(n)) => n.to_string() == self.0,
            _ => false,
        }
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for PrincipalId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}
