//! Host configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use generic_tabs::{IndexPolicy, DEFAULT_LABEL};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Accessible label for tab lists whose host has no `label` attribute
    pub tablist_label: String,
    /// What to do with a selected index past the last tab
    pub index_policy: IndexPolicy,
    /// Default `tracing` filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&contents)?;

        tracing::debug!(path = %path.as_ref().display(), "Loaded configuration");

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tablist_label.trim().is_empty() {
            return Err(CoreError::Config(
                "tablist_label cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tablist_label: DEFAULT_LABEL.to_string(),
            index_policy: IndexPolicy::Strict,
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tablist_label, "tablist");
        assert_eq!(config.index_policy, IndexPolicy::Strict);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{ "index_policy": "clamp" }"#).unwrap();
        assert_eq!(config.index_policy, IndexPolicy::Clamp);
        assert_eq!(config.tablist_label, "tablist");
    }

    #[test]
    fn test_invalid_json() {
        let result = Config::from_json(r#"{ "index_policy": "wrap" }"#);
        assert!(matches!(result, Err(CoreError::Serialization(_))));
    }

    #[test]
    fn test_empty_label_rejected() {
        let result = Config::from_json(r#"{ "tablist_label": "  " }"#);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "generic-core-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "tablist_label": "Sections", "log_filter": "debug" }"#)
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.tablist_label, "Sections");
        assert_eq!(config.log_filter, "debug");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("/nonexistent/generic-core.json");
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
