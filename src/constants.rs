//! # Hook Constants
//!
//! Fixed values shared between the checkpoint hook, its scheduler and the
//! reader group collaborators.

use std::time::Duration;

/// Prefix of every checkpoint name handed to the reader group
pub const CHECKPOINT_NAME_PREFIX: &str = "PVG-CHK-";

/// Worker threads of the checkpoint scheduler, enough for several concurrent timeout timers
pub const DEFAULT_CHECKPOINT_THREAD_POOL_SIZE: usize = 3;

/// Thread name used by the checkpoint scheduler workers
pub const CHECKPOINT_SCHEDULER_THREAD_NAME: &str = "checkpoint-scheduler";

/// Trigger timeout used when none is configured
pub const DEFAULT_TRIGGER_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader group configuration defaults, matching the stream client
pub mod reader_group {
    use std::time::Duration;

    pub const DEFAULT_MAX_OUTSTANDING_CHECKPOINT_REQUEST: u32 = 3;
    pub const DEFAULT_GROUP_REFRESH_TIME: Duration = Duration::from_secs(3);
    pub const DEFAULT_AUTOMATIC_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(30);

    /// Prefix of generated reader group names
    pub const GENERATED_NAME_PREFIX: &str = "flink";
}

/// Environment variables read by configuration and logging
pub mod env {
    pub const ENVIRONMENT: &str = "CHECKPOINT_HOOK_ENV";
    pub const LOG_FORMAT: &str = "CHECKPOINT_HOOK_LOG_FORMAT";
    pub const CONFIG_PREFIX: &str = "CHECKPOINT_HOOK";
    pub const CONFIG_SEPARATOR: &str = "__";
}
