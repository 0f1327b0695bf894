//! Error types for the checkpoint hook.
//!

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Invalid checkpoint name '{name}': {reason}")]
    InvalidCheckpointName { name: String, reason: String },
    #[error("Reader group error: {0}")]
    Group(#[from] GroupError),
    #[error("Scheduler error: {0}")]
    Scheduler(String),
    #[error("Checkpoint scheduler has been shut down")]
    SchedulerShutDown,
    #[error("Checkpoint hook {hook_uid} is closed")]
    HookClosed { hook_uid: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unsupported checkpoint serializer version: {version}")]
    UnsupportedVersion { version: i32 },
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HookError {
    /// True for the invalid-format failures raised by the checkpoint name codec
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, HookError::InvalidCheckpointName { .. })
    }
}

impl From<serde_json::Error> for HookError {
    fn from(error: serde_json::Error) -> Self {
        HookError::Serialization(format!("JSON serialization error: {error}"))
    }
}

impl From<config::ConfigError> for HookError {
    fn from(error: config::ConfigError) -> Self {
        HookError::Configuration(error.to_string())
    }
}

pub type HookResult<T> = std::result::Result<T, HookError>;

/// Failures reported by reader group collaborators
#[derive(Debug, Error)]
pub enum GroupError {
    /// The reader group does not exist in the scope
    #[error("Reader group {name} not found")]
    NotFound { name: String },
    #[error("Reader group {name} already exists")]
    AlreadyExists { name: String },
    /// The group or its manager was already closed
    #[error("Reader group resource closed")]
    Closed,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type GroupResult<T> = std::result::Result<T, GroupError>;
