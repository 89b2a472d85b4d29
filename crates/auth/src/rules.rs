//! Resource → access mode table.

use std::collections::BTreeMap;

use core::str::FromStr;
use thiserror::Error;

use crate::AccessMode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessRuleError {
    #[error("invalid access mode '{0}' (expected three digits 0-7, e.g. 664)")]
    InvalidMode(String),

    #[error("invalid access rule '{0}' (expected resource:mode)")]
    InvalidRule(String),
}

/// Per-resource access modes. Resources without an entry are unguarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRules(BTreeMap<String, AccessMode>);

impl AccessRules {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_rule(mut self, resource: impl Into<String>, mode: AccessMode) -> Self {
        self.0.insert(resource.into(), mode);
        self
    }

    pub fn mode_for(&self, resource: &str) -> AccessMode {
        self.0
            .get(resource)
            .copied()
            .unwrap_or(AccessMode::UNGUARDED)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AccessMode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for AccessRules {
    /// users: 660, products: 664, orders: 660.
    fn default() -> Self {
        Self::new()
            .with_rule("users", AccessMode::LOGGED_IN)
            .with_rule("products", AccessMode::PUBLIC_READ)
            .with_rule("orders", AccessMode::LOGGED_IN)
    }
}

/// Parses `resource:mode` pairs separated by commas, e.g. `users:660,products:664`.
impl FromStr for AccessRules {
    type Err = AccessRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rules = Self::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (resource, mode) = entry
                .split_once(':')
                .ok_or_else(|| AccessRuleError::InvalidRule(entry.to_string()))?;
            let resource = resource.trim();
            if resource.is_empty() {
                return Err(AccessRuleError::InvalidRule(entry.to_string()));
            }
            rules = rules.with_rule(resource, mode.parse()?);
        }
        Ok(rules)
    }
}

impl core::fmt::Display for AccessRules {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries: Vec<String> = self.iter().map(|(r, m)| format!("{r}:{m}")).collect();
        f.write_str(&entries.join(","))
    }
}
