//! Local UI preferences
//!
//! A flat key/value store persisted as a JSON object: the log-wrap toggle,
//! per-list sort configuration and similar flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConsoleError;
use crate::result::ConsoleResult;

/// Wrap long lines in the build log viewer
pub const LOG_WRAP: &str = "log_wrap";

/// Key holding the sort expression of a list view
pub fn sort_key(list: &str) -> String {
    format!("sort.{}", list)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, PreferenceValue>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read preferences from disk; a missing file yields an empty store
    pub fn load(path: &Path) -> ConsoleResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConsoleError::Config(format!(
                "cannot read preferences {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn save(&self, path: &Path) -> ConsoleResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConsoleError::Config(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| {
            ConsoleError::Config(format!("cannot write preferences {}: {}", path.display(), e))
        })
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(PreferenceValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(PreferenceValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PreferenceValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: PreferenceValue) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<PreferenceValue> {
        self.values.remove(key)
    }

    /// Flip a boolean flag (absent counts as false) and return the new value
    pub fn toggle(&mut self, key: &str) -> bool {
        let next = !self.get_bool(key).unwrap_or(false);
        self.set(key, PreferenceValue::Boolean(next));
        next
    }
}
