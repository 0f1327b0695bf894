#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Reader Checkpoint Hook
//!
//! Checkpoint coordination hook connecting a checkpoint coordinator with the
//! checkpoint capability of a stream reader group.
//!
//! ## Overview
//!
//! A checkpoint coordinator periodically snapshots many parallel operators. For stream
//! sources the interesting state lives in the reader group: the read positions of every
//! reader. The hook turns each coordinator checkpoint into a named reader group
//! checkpoint, bounds how long the coordinator waits for it, and puts the group back at
//! the captured positions (or its initial configuration) during recovery.
//!
//! ## Module Organization
//!
//! - [`checkpoint`] - Checkpoint names, captured checkpoints, pending triggers, serialization
//! - [`group`] - Reader group configuration, collaborator traits, in-memory backend
//! - [`scheduler`] - Lazily created timer runtime enforcing trigger timeouts
//! - [`hook`] - Coordinator lifecycle trait and the reader group hook
//! - [`config`] - YAML/environment configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reader_checkpoint_hook::config::HookConfig;
//! use reader_checkpoint_hook::group::InMemoryReaderGroupStore;
//! use reader_checkpoint_hook::hook::{MasterTriggerRestoreHook, ReaderCheckpointHook};
//! use reader_checkpoint_hook::checkpoint::TriggerState;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryReaderGroupStore::new();
//! let mut config = HookConfig::new("orders-source", "orders");
//! config.reader_group_name = Some("orders-readers".to_string());
//!
//! let hook = ReaderCheckpointHook::from_config(&config, &store).await?;
//!
//! match hook.trigger_checkpoint(1, 1_700_000_000_000)?.await {
//!     TriggerState::Completed(checkpoint) => println!("captured {}", checkpoint.name()),
//!     TriggerState::Cancelled => println!("no checkpoint this round"),
//!     other => println!("checkpoint failed: {other:?}"),
//! }
//!
//! hook.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod error;
pub mod group;
pub mod hook;
pub mod logging;
pub mod scheduler;

pub use checkpoint::{
    create_checkpoint_name, parse_checkpoint_id, try_create_checkpoint_name, Checkpoint,
    CheckpointSerializer, JsonCheckpointSerializer, PendingTrigger, TriggerState,
};
pub use crate::config::{HookConfig, HookConfigLoader};
pub use error::{GroupError, GroupResult, HookError, HookResult};
pub use group::{
    ClientConfig, ReaderGroup, ReaderGroupConfig, ReaderGroupManager, ReaderGroupManagerFactory,
};
pub use hook::{HookState, MasterTriggerRestoreHook, ReaderCheckpointHook};
pub use scheduler::{CheckpointScheduler, SchedulerStatus};
