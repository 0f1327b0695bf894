//! # Checkpoint Hooks
//!
//! A checkpoint coordinator drives its master hooks through a small lifecycle: trigger
//! a checkpoint, restore one on recovery, reset when nothing can be restored, and close
//! once at shutdown. [`MasterTriggerRestoreHook`] captures that lifecycle so any
//! coordinator can drive a hook without knowing what it checkpoints.
//!
//! [`ReaderCheckpointHook`] is the implementation backed by a reader group.

pub mod reader_checkpoint_hook;

use crate::checkpoint::{Checkpoint, CheckpointSerializer, PendingTrigger};
use crate::error::HookResult;
use async_trait::async_trait;
use std::sync::Arc;

pub use reader_checkpoint_hook::ReaderCheckpointHook;

/// Lifecycle callbacks a checkpoint coordinator invokes on its master hooks
#[async_trait]
pub trait MasterTriggerRestoreHook: Send + Sync {
    /// Stable identity used to match restored state to this hook
    fn identifier(&self) -> &str;

    /// Start a checkpoint without blocking; the returned trigger resolves with its outcome
    fn trigger_checkpoint(
        &self,
        checkpoint_id: i64,
        checkpoint_timestamp: i64,
    ) -> HookResult<PendingTrigger>;

    /// Restore state captured by an earlier trigger; `None` means no state was captured
    async fn restore_checkpoint(
        &self,
        checkpoint_id: i64,
        checkpoint: Option<Checkpoint>,
    ) -> HookResult<()>;

    /// Return to the initial state when recovering without a checkpoint
    async fn reset(&self) -> HookResult<()>;

    async fn close(&self) -> HookResult<()>;

    /// Serializer the coordinator uses to persist captured checkpoints
    fn create_checkpoint_data_serializer(&self) -> Arc<dyn CheckpointSerializer>;
}

/// Hook lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookState {
    /// Reader group resolved, no checkpoint triggered yet
    Created = 0,
    /// Scheduler running, checkpoints have been triggered
    Active = 1,
    /// Terminal
    Closed = 2,
}

impl From<u8> for HookState {
    fn from(value: u8) -> Self {
        match value {
            0 => HookState::Created,
            1 => HookState::Active,
            _ => HookState::Closed,
        }
    }
}
