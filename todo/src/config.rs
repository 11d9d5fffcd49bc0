//! Configuration management for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::reducer::DEFAULT_STORAGE_KEY;
use std::env;
use std::path::PathBuf;

/// Default file backing the task list
pub const DEFAULT_STORAGE_PATH: &str = "todos.json";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,
    /// Tracing filter directive
    pub log_level: String,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// JSON file holding the stored values (`TODO_STORAGE_PATH`)
    pub path: PathBuf,
    /// Key the task list is stored under (`TODO_STORAGE_KEY`)
    pub key: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or blank variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            storage: StorageConfig {
                path: var("TODO_STORAGE_PATH")
                    .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from),
                key: var("TODO_STORAGE_KEY")
                    .map_or_else(|| DEFAULT_STORAGE_KEY.to_string(), |key| key.trim().to_string()),
            },
            log_level: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.storage.path, PathBuf::from("todos.json"));
        assert_eq!(config.storage.key, "todos");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_with(&[
            ("TODO_STORAGE_PATH", "/tmp/work.json"),
            ("TODO_STORAGE_KEY", " work "),
            ("RUST_LOG", "debug"),
        ]);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/work.json"));
        assert_eq!(config.storage.key, "work");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn blank_key_falls_back() {
        let config = config_with(&[("TODO_STORAGE_KEY", "   ")]);
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
    }
}
