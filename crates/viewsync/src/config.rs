//! Immutable key-value configuration fixed at startup.

use std::collections::BTreeMap;
use std::env;

use crate::error::ConfigError;

/// Read-only configuration handed to controls during `init`. Holds flat
/// string values (default templates, labels, tuning knobs) and is never
/// mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a flat TOML table of scalar values. Nested tables and arrays are
    /// rejected rather than flattened.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = raw.parse()?;
        let mut values = BTreeMap::new();
        for (key, item) in table {
            let rendered = match item {
                toml::Value::String(s) => s,
                toml::Value::Integer(n) => n.to_string(),
                toml::Value::Float(x) => x.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Datetime(dt) => dt.to_string(),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(ConfigError::NonScalar { key });
                }
            };
            values.insert(key, rendered);
        }
        Ok(Self { values })
    }

    /// Apply `PREFIX__KEY=value` environment overrides. The stripped key is
    /// lowercased, so `BOARD__ERROR_PREFIX` overrides `error_prefix`.
    pub fn with_env_overrides(mut self, prefix: &str) -> Self {
        let marker = format!("{prefix}__");
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(&marker) {
                self.values.insert(stripped.to_ascii_lowercase(), value);
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
