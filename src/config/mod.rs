//! # Hook Configuration
//!
//! Settings needed to build a [`ReaderCheckpointHook`](crate::hook::ReaderCheckpointHook):
//! its identity, the reader group it checkpoints, the trigger timeout and the client
//! connection. Loaded from YAML with environment overrides by [`loader`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reader_checkpoint_hook::config::HookConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HookConfig::from_yaml_str(
//!     r#"
//! hook_uid: orders-source
//! scope: orders
//! trigger_timeout_ms: 2000
//! "#,
//! )?;
//! assert_eq!(config.trigger_timeout().as_millis(), 2000);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::constants::DEFAULT_TRIGGER_TIMEOUT;
use crate::error::{HookError, HookResult};
use crate::group::{ClientConfig, ReaderGroupConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loader::HookConfigLoader;

fn default_trigger_timeout_ms() -> u64 {
    DEFAULT_TRIGGER_TIMEOUT.as_millis() as u64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Identity of the hook's state across job restarts
    pub hook_uid: String,

    /// Reader group to checkpoint; generated when absent
    #[serde(default)]
    pub reader_group_name: Option<String>,

    pub scope: String,

    #[serde(default = "default_trigger_timeout_ms")]
    pub trigger_timeout_ms: u64,

    #[serde(default)]
    pub client: ClientConfig,

    /// Baseline reader group configuration
    #[serde(default)]
    pub reader_group: ReaderGroupConfig,
}

impl HookConfig {
    pub fn new(hook_uid: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            hook_uid: hook_uid.into(),
            reader_group_name: None,
            scope: scope.into(),
            trigger_timeout_ms: default_trigger_timeout_ms(),
            client: ClientConfig::default(),
            reader_group: ReaderGroupConfig::default(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> HookResult<Self> {
        HookConfigLoader::new().load_yaml_str(yaml)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> HookResult<Self> {
        HookConfigLoader::new().load_file(path.as_ref())
    }

    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_millis(self.trigger_timeout_ms)
    }

    pub fn validate(&self) -> HookResult<()> {
        if self.hook_uid.trim().is_empty() {
            return Err(HookError::Configuration(
                "hook_uid must not be empty".to_string(),
            ));
        }

        if self.scope.trim().is_empty() {
            return Err(HookError::Configuration("scope must not be empty".to_string()));
        }

        if matches!(&self.reader_group_name, Some(name) if name.trim().is_empty()) {
            return Err(HookError::Configuration(
                "reader_group_name must not be empty when set".to_string(),
            ));
        }

        if self.trigger_timeout_ms == 0 {
            return Err(HookError::Configuration(
                "trigger_timeout_ms must be greater than 0".to_string(),
            ));
        }

        self.reader_group
            .validate()
            .map_err(HookError::Configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = HookConfig::new("hook", "scope");
        assert_eq!(config.trigger_timeout(), Duration::from_secs(5));
        assert_eq!(config.reader_group, ReaderGroupConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = HookConfig::new("", "scope");
        assert!(config.validate().is_err());

        config = HookConfig::new("hook", " ");
        assert!(config.validate().is_err());

        config = HookConfig::new("hook", "scope");
        config.trigger_timeout_ms = 0;
        assert!(config.validate().is_err());

        config = HookConfig::new("hook", "scope");
        config.reader_group_name = Some(String::new());
        assert!(config.validate().is_err());

        config = HookConfig::new("hook", "scope");
        config.reader_group.max_outstanding_checkpoint_request = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, HookError::Configuration(msg) if msg.contains("max_outstanding")));
    }
}
