//! Engine configuration
//!
//! Settings are plain serde structs so they can be embedded in a larger
//! application config or loaded on their own from TOML:
//!
//! ```toml
//! start_handler = "main_menu"
//! max_forwards = 10
//! failure_message = "Service temporarily unavailable."
//! session_ttl_secs = 180
//! retain_completed = false
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{DialogError, DialogResult};

fn default_max_forwards() -> usize {
    10
}

fn default_failure_message() -> String {
    "Service temporarily unavailable.".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_retain_completed() -> bool {
    true
}

/// Dispatcher and session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Handler that receives the first turn of every new session
    pub start_handler: String,

    /// Upper bound on chained forwards within one turn
    #[serde(default = "default_max_forwards")]
    pub max_forwards: usize,

    /// Reply text used when a turn fails for a non-recoverable reason
    #[serde(default = "default_failure_message")]
    pub failure_message: String,

    /// Locale assumed when the gateway does not send one
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Idle time after which the in-memory store forgets a session
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// Keep finished sessions (and their audit trail) in the store.
    /// When false they are removed as soon as the final screen is sent.
    #[serde(default = "default_retain_completed")]
    pub retain_completed: bool,
}

impl EngineConfig {
    /// Configuration with defaults for everything but the start handler
    pub fn new(start_handler: impl Into<String>) -> Self {
        Self {
            start_handler: start_handler.into(),
            max_forwards: default_max_forwards(),
            failure_message: default_failure_message(),
            default_locale: default_locale(),
            session_ttl_secs: None,
            retain_completed: default_retain_completed(),
        }
    }

    pub fn with_max_forwards(mut self, max_forwards: usize) -> Self {
        self.max_forwards = max_forwards;
        self
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl_secs = Some(ttl.as_secs());
        self
    }

    pub fn with_retain_completed(mut self, retain: bool) -> Self {
        self.retain_completed = retain;
        self
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_secs.map(Duration::from_secs)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> DialogResult<Self> {
        let config: EngineConfig = toml::from_str(toml_str)
            .map_err(|e| DialogError::config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file from disk
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse engine config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> DialogResult<()> {
        if self.start_handler.trim().is_empty() {
            return Err(DialogError::config("start_handler must not be empty"));
        }
        if self.max_forwards == 0 {
            return Err(DialogError::config("max_forwards must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config = EngineConfig::from_toml_str(r#"start_handler = "enter_name""#).unwrap();
        assert_eq!(config, EngineConfig::new("enter_name"));
        assert_eq!(config.max_forwards, 10);
        assert_eq!(config.default_locale, "en");
        assert!(config.session_ttl().is_none());
        assert!(config.retain_completed);
    }

    #[test]
    fn test_full_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            start_handler = "main_menu"
            max_forwards = 4
            failure_message = "Try again later"
            default_locale = "sw"
            session_ttl_secs = 120
            retain_completed = false
            "#,
        )
        .unwrap();

        assert_eq!(config.max_forwards, 4);
        assert_eq!(config.failure_message, "Try again later");
        assert_eq!(config.default_locale, "sw");
        assert_eq!(config.session_ttl(), Some(Duration::from_secs(120)));
        assert!(!config.retain_completed);
    }

    #[test]
    fn test_rejects_zero_forward_cap() {
        let err = EngineConfig::from_toml_str(
            r#"
            start_handler = "main_menu"
            max_forwards = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DialogError::Config(_)));
    }

    #[test]
    fn test_rejects_missing_start_handler() {
        assert!(EngineConfig::from_toml_str("max_forwards = 3").is_err());
        assert!(EngineConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = EngineConfig::load("/nonexistent/engine.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read engine config"));
    }
}
