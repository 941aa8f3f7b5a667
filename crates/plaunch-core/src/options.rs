// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named, loosely typed launcher options.

use crate::error::OptionError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Option key for the child's working directory (string).
pub const WORKDIR_KEY: &str = "workdir";

/// Option key for the prefix command (list of strings).
pub const COMMANDS_KEY: &str = "commands";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OptionValue {
    /// A single string.
    Str(String),
    /// An ordered list of strings.
    List(Vec<String>),
}

impl OptionValue {
    /// Human-readable name of the value's type, used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::List(_) => "string list",
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

/// A set of named options exchanged with an external configuration system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LaunchOptions {
    values: BTreeMap<String, OptionValue>,
}

impl LaunchOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Look up a string option. `Ok(None)` when absent.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, OptionError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(OptionError::TypeMismatch {
                key: key.to_string(),
                expected: "string",
                found: other.type_name(),
            }),
        }
    }

    /// Look up a string-list option. `Ok(None)` when absent.
    pub fn get_list(&self, key: &str) -> Result<Option<&[String]>, OptionError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(OptionValue::List(v)) => Ok(Some(v)),
            Some(other) => Err(OptionError::TypeMismatch {
                key: key.to_string(),
                expected: "string list",
                found: other.type_name(),
            }),
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.values.remove(key)
    }

    /// Option names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no options are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(&mut self, other: &LaunchOptions) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }
}
