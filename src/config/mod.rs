use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported log level `{0}` (expected trace|debug|info|warn|error|off)")]
    InvalidLogLevel(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Namespace for storage keys. Empty keeps the plain `notes` / `tags` keys.
    pub storage_prefix: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_prefix: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read `window.ENV`, falling back to defaults for anything missing.
    pub fn new() -> Self {
        Self::from_lookup(window_env)
    }

    /// Build from a key lookup. Both `UPPER_CASE` and `lower_case` keys are
    /// accepted, upper case first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |upper: &str, lower: &str| lookup(upper).or_else(|| lookup(lower));
        let defaults = Self::default();

        Self {
            storage_prefix: get("STORAGE_PREFIX", "storage_prefix")
                .map(|p| p.trim().to_string())
                .unwrap_or(defaults.storage_prefix),
            log_level: get("LOG_LEVEL", "log_level").unwrap_or(defaults.log_level),
        }
    }

    pub fn storage_key(&self, name: &str) -> String {
        if self.storage_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}::{name}", self.storage_prefix)
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn window_env(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    js_sys::Reflect::get(&env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn window_env(_key: &str) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage_key("notes"), "notes");
    }

    #[test]
    fn test_upper_case_keys_win() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORAGE_PREFIX", "work"),
            ("storage_prefix", "ignored"),
            ("log_level", "debug"),
        ]));
        assert_eq!(config.storage_prefix, "work");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.storage_key("tags"), "work::tags");
    }

    #[test]
    fn test_blank_prefix_is_no_prefix() {
        let config = AppConfig::from_lookup(lookup_from(&[("STORAGE_PREFIX", "  ")]));
        assert_eq!(config.storage_key("notes"), "notes");
    }
}
