//! # Reader Group Configuration
//!
//! Configuration records handed to the reader group manager when a group is created
//! and to the reader group when it is reset.

use crate::checkpoint::Checkpoint;
use crate::constants::reader_group::{
    DEFAULT_AUTOMATIC_CHECKPOINT_INTERVAL, DEFAULT_GROUP_REFRESH_TIME,
    DEFAULT_MAX_OUTSTANDING_CHECKPOINT_REQUEST,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reader group settings
///
/// Serves as the hook's baseline for a full reset and as the template for the
/// narrower configuration applied on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderGroupConfig {
    /// Upper bound on checkpoint requests outstanding at once
    pub max_outstanding_checkpoint_request: u32,

    /// How often readers refresh shared group state
    pub group_refresh_time_millis: u64,

    /// Interval of checkpoints generated by the group itself; `None` disables them
    pub automatic_checkpoint_interval_millis: Option<u64>,

    /// Position the readers start from
    pub start_from_checkpoint: Option<Checkpoint>,
}

impl ReaderGroupConfig {
    pub fn builder() -> ReaderGroupConfigBuilder {
        ReaderGroupConfigBuilder::default()
    }

    pub fn group_refresh_time(&self) -> Duration {
        Duration::from_millis(self.group_refresh_time_millis)
    }

    pub fn automatic_checkpoints_enabled(&self) -> bool {
        self.automatic_checkpoint_interval_millis.is_some()
    }

    /// Configuration that restarts the group from `checkpoint`
    ///
    /// Keeps this config's outstanding request limit and refresh interval and turns
    /// automatic checkpoints off, since checkpoint timing is driven by the coordinator.
    pub fn restore_from(&self, checkpoint: Checkpoint) -> ReaderGroupConfig {
        ReaderGroupConfig::builder()
            .max_outstanding_checkpoint_request(self.max_outstanding_checkpoint_request)
            .group_refresh_time_millis(self.group_refresh_time_millis)
            .disable_automatic_checkpoints()
            .start_from_checkpoint(checkpoint)
            .build()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_outstanding_checkpoint_request == 0 {
            return Err("max_outstanding_checkpoint_request must be at least 1".to_string());
        }

        if self.group_refresh_time_millis == 0 {
            return Err("group_refresh_time_millis must be greater than 0".to_string());
        }

        if self.automatic_checkpoint_interval_millis == Some(0) {
            return Err("automatic_checkpoint_interval_millis must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for ReaderGroupConfig {
    fn default() -> Self {
        Self {
            max_outstanding_checkpoint_request: DEFAULT_MAX_OUTSTANDING_CHECKPOINT_REQUEST,
            group_refresh_time_millis: DEFAULT_GROUP_REFRESH_TIME.as_millis() as u64,
            automatic_checkpoint_interval_millis: Some(
                DEFAULT_AUTOMATIC_CHECKPOINT_INTERVAL.as_millis() as u64,
            ),
            start_from_checkpoint: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReaderGroupConfigBuilder {
    config: ReaderGroupConfig,
}

impl ReaderGroupConfigBuilder {
    pub fn max_outstanding_checkpoint_request(mut self, max: u32) -> Self {
        self.config.max_outstanding_checkpoint_request = max;
        self
    }

    pub fn group_refresh_time_millis(mut self, millis: u64) -> Self {
        self.config.group_refresh_time_millis = millis;
        self
    }

    pub fn automatic_checkpoint_interval_millis(mut self, millis: u64) -> Self {
        self.config.automatic_checkpoint_interval_millis = Some(millis);
        self
    }

    pub fn disable_automatic_checkpoints(mut self) -> Self {
        self.config.automatic_checkpoint_interval_millis = None;
        self
    }

    pub fn start_from_checkpoint(mut self, checkpoint: Checkpoint) -> Self {
        self.config.start_from_checkpoint = Some(checkpoint);
        self
    }

    pub fn build(self) -> ReaderGroupConfig {
        self.config
    }
}

/// Connection settings for the stream controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub controller_uri: String,
    pub validate_hostname: bool,
    pub trust_store: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            controller_uri: "tcp://localhost:9090".to_string(),
            validate_hostname: true,
            trust_store: None,
        }
    }
}
