//! Configuration Loader
//!
//! Layers a YAML document with `CHECKPOINT_HOOK__*` environment overrides, then
//! validates the result. Nested keys use `__` as separator, for example
//! `CHECKPOINT_HOOK__READER_GROUP__GROUP_REFRESH_TIME_MILLIS=500`.

use super::HookConfig;
use crate::constants::env::{CONFIG_PREFIX, CONFIG_SEPARATOR};
use crate::error::HookResult;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Builds [`HookConfig`] values from YAML plus environment overrides
#[derive(Debug, Default, Clone)]
pub struct HookConfigLoader {
    /// Replaces the process environment; used to keep tests hermetic
    environment: Option<config::Map<String, String>>,
}

impl HookConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `vars` instead of the process environment
    pub fn with_environment(mut self, vars: config::Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    pub fn load_yaml_str(&self, yaml: &str) -> HookResult<HookConfig> {
        self.load(File::from_str(yaml, FileFormat::Yaml))
    }

    pub fn load_file(&self, path: &Path) -> HookResult<HookConfig> {
        debug!(path = %path.display(), "Loading checkpoint hook configuration");
        self.load(File::from(path).format(FileFormat::Yaml))
    }

    fn load<S>(&self, source: S) -> HookResult<HookConfig>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: HookConfig = Config::builder()
            .add_source(source)
            .add_source(self.environment_source())
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            hook_uid = %config.hook_uid,
            scope = %config.scope,
            trigger_timeout_ms = config.trigger_timeout_ms,
            "Checkpoint hook configuration loaded"
        );

        Ok(config)
    }

    fn environment_source(&self) -> Environment {
        Environment::with_prefix(CONFIG_PREFIX)
            .prefix_separator(CONFIG_SEPARATOR)
            .separator(CONFIG_SEPARATOR)
            .try_parsing(true)
            .source(self.environment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use std::io::Write;

    const YAML: &str = r#"
hook_uid: orders-source
reader_group_name: orders-readers
scope: orders
trigger_timeout_ms: 750
client:
  controller_uri: tcp://controller:9090
reader_group:
  max_outstanding_checkpoint_request: 5
  group_refresh_time_millis: 1000
"#;

    fn hermetic() -> HookConfigLoader {
        HookConfigLoader::new().with_environment(config::Map::new())
    }

    #[test]
    fn test_load_yaml() {
        let config = hermetic().load_yaml_str(YAML).unwrap();

        assert_eq!(config.hook_uid, "orders-source");
        assert_eq!(config.reader_group_name.as_deref(), Some("orders-readers"));
        assert_eq!(config.scope, "orders");
        assert_eq!(config.trigger_timeout_ms, 750);
        assert_eq!(config.client.controller_uri, "tcp://controller:9090");
        assert!(config.client.validate_hostname);
        assert_eq!(config.reader_group.max_outstanding_checkpoint_request, 5);
        assert_eq!(config.reader_group.group_refresh_time_millis, 1000);
        // Unspecified fields keep their defaults
        assert!(config.reader_group.automatic_checkpoints_enabled());
    }

    #[test]
    fn test_environment_overrides() {
        let mut vars = config::Map::new();
        vars.insert(
            "CHECKPOINT_HOOK__TRIGGER_TIMEOUT_MS".to_string(),
            "200".to_string(),
        );
        vars.insert(
            "CHECKPOINT_HOOK__READER_GROUP__MAX_OUTSTANDING_CHECKPOINT_REQUEST".to_string(),
            "9".to_string(),
        );

        let config = HookConfigLoader::new()
            .with_environment(vars)
            .load_yaml_str(YAML)
            .unwrap();

        assert_eq!(config.trigger_timeout_ms, 200);
        assert_eq!(config.reader_group.max_outstanding_checkpoint_request, 9);
    }

    #[test]
    fn test_missing_required_field() {
        let err = hermetic().load_yaml_str("scope: orders\n").unwrap_err();
        assert!(matches!(err, HookError::Configuration(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = hermetic()
            .load_yaml_str("hook_uid: h\nscope: s\ntrigger_timeout_ms: 0\n")
            .unwrap_err();
        assert!(matches!(err, HookError::Configuration(msg) if msg.contains("trigger_timeout_ms")));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = hermetic().load_file(file.path()).unwrap();
        assert_eq!(config.hook_uid, "orders-source");
    }

    #[test]
    fn test_missing_file() {
        let err = hermetic()
            .load_file(Path::new("/nonexistent/checkpoint-hook.yaml"))
            .unwrap_err();
        assert!(matches!(err, HookError::Configuration(_)));
    }
}
