//! # Reader Groups
//!
//! Configuration and collaborator contracts for the reader group whose positions the
//! hook checkpoints, plus an in-memory backend.

pub mod config;
pub mod in_memory;
pub mod traits;

use crate::constants::reader_group::GENERATED_NAME_PREFIX;

pub use self::config::{ClientConfig, ReaderGroupConfig, ReaderGroupConfigBuilder};
pub use in_memory::{
    CaptureBehavior, InMemoryReaderGroup, InMemoryReaderGroupManager, InMemoryReaderGroupState,
    InMemoryReaderGroupStore,
};
pub use traits::{ReaderGroup, ReaderGroupManager, ReaderGroupManagerFactory};

/// Random reader group name for jobs that do not configure one
pub fn generate_reader_group_name() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{GENERATED_NAME_PREFIX}{}", &suffix[..20])
}
