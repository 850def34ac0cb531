//! Configuration collaborator interface
//!
//! The shell reads and mutates host configuration through [`ConfigStore`],
//! injected at construction. The host application owns persistence; the
//! shell only sees sections of typed key/value pairs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A configuration value.
///
/// The `config set` command coerces raw argument strings with
/// [`ConfigValue::coerce`]; hosts may store any variant directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    /// Best-effort coercion of a raw string: `true`/`false`
    /// (case-insensitive) become booleans, unambiguous integers become
    /// `Int`, everything else stays a string. Never fails.
    pub fn coerce(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Int(n);
        }
        Self::Str(raw.to_string())
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// Host configuration seen through section/key addressing.
///
/// `set` takes `&self`; implementations use interior mutability so the
/// shell can hold the store behind an `Arc`.
pub trait ConfigStore: Send + Sync {
    /// Look up `section.key`. `None` when the section or key is absent;
    /// callers supply their own defaults.
    fn get(&self, section: &str, key: &str) -> Option<ConfigValue>;

    /// Create or overwrite `section.key`.
    fn set(&self, section: &str, key: &str, value: ConfigValue);

    /// All section names, sorted.
    fn sections(&self) -> Vec<String>;

    /// All key names within a section, sorted. Empty when the section is
    /// absent.
    fn keys(&self, section: &str) -> Vec<String>;
}

/// In-memory [`ConfigStore`], the default for embeds and tests.
#[derive(Default)]
pub struct MemoryConfig {
    sections: Mutex<BTreeMap<String, BTreeMap<String, ConfigValue>>>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, section: &str, key: &str) -> Option<ConfigValue> {
        let sections = self.sections.lock().expect("config lock poisoned");
        sections.get(section)?.get(key).cloned()
    }

    fn set(&self, section: &str, key: &str, value: ConfigValue) {
        let mut sections = self.sections.lock().expect("config lock poisoned");
        sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn sections(&self) -> Vec<String> {
        let sections = self.sections.lock().expect("config lock poisoned");
        sections.keys().cloned().collect()
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let sections = self.sections.lock().expect("config lock poisoned");
        sections
            .get(section)
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }
}
