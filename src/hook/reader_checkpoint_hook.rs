//! # Reader Checkpoint Hook
//!
//! Bridges a checkpoint coordinator with reader group checkpoints. Each coordinator
//! checkpoint becomes a named reader group checkpoint, bounded by a trigger timeout
//! enforced on the hook's own [`CheckpointScheduler`]. On recovery the group is
//! restarted from the captured positions, or reset to its initial configuration when
//! nothing was captured.
//!
//! ## Lifecycle
//!
//! `Created -> Active -> Closed`. The scheduler is created by the first trigger and shut
//! down by `close`. After `close`, every operation except another `close` fails with
//! [`HookError::HookClosed`].
//!
//! A `close` racing an in-flight trigger may tear down the reader group and scheduler
//! under it; the final state of that trigger is then up to the reader group.

use super::{HookState, MasterTriggerRestoreHook};
use crate::checkpoint::{
    parse_checkpoint_id, try_create_checkpoint_name, Checkpoint, CheckpointSerializer,
    JsonCheckpointSerializer, PendingTrigger,
};
use crate::config::HookConfig;
use crate::error::{GroupError, HookError, HookResult};
use crate::group::{
    generate_reader_group_name, ClientConfig, ReaderGroup, ReaderGroupConfig, ReaderGroupManager,
    ReaderGroupManagerFactory,
};
use crate::scheduler::CheckpointScheduler;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Master hook triggering and restoring checkpoints on a reader group
pub struct ReaderCheckpointHook {
    /// Logical operator name; identifies the hook's state when resuming from another job
    hook_uid: String,

    /// Closed together with the manager when the hook closes
    reader_group: Arc<dyn ReaderGroup>,
    reader_group_manager: Arc<dyn ReaderGroupManager>,

    checkpoint_serializer: Arc<dyn CheckpointSerializer>,

    /// Bound on how long a triggered checkpoint may stay pending
    trigger_timeout: Duration,

    /// Baseline used to create the group and to reset it
    reader_group_config: ReaderGroupConfig,

    scheduler: CheckpointScheduler,

    state: AtomicU8,
}

impl ReaderCheckpointHook {
    /// Connect to `reader_group_scope` and resolve the reader group, creating it from
    /// `reader_group_config` if it does not exist yet
    pub async fn new(
        hook_uid: impl Into<String>,
        reader_group_name: &str,
        reader_group_scope: &str,
        trigger_timeout: Duration,
        client_config: &ClientConfig,
        reader_group_config: ReaderGroupConfig,
        manager_factory: &dyn ReaderGroupManagerFactory,
    ) -> HookResult<Self> {
        let hook_uid = hook_uid.into();
        let reader_group_manager = manager_factory.with_scope(reader_group_scope, client_config)?;

        let reader_group = match Self::initialize_reader_group(
            reader_group_manager.as_ref(),
            reader_group_name,
            &reader_group_config,
        )
        .await
        {
            Ok(group) => group,
            Err(e) => {
                if let Err(close_err) = reader_group_manager.close().await {
                    warn!(
                        hook_uid = %hook_uid,
                        error = %close_err,
                        "Failed to close reader group manager after bootstrap failure"
                    );
                }
                return Err(e);
            }
        };

        info!(
            hook_uid = %hook_uid,
            reader_group = reader_group_name,
            scope = reader_group_scope,
            trigger_timeout_ms = trigger_timeout.as_millis() as u64,
            "🪝 Reader checkpoint hook initialized"
        );

        Ok(Self {
            scheduler: CheckpointScheduler::new(hook_uid.clone()),
            hook_uid,
            reader_group,
            reader_group_manager,
            checkpoint_serializer: Arc::new(JsonCheckpointSerializer),
            trigger_timeout,
            reader_group_config,
            state: AtomicU8::new(HookState::Created as u8),
        })
    }

    /// Build a hook from loaded configuration
    pub async fn from_config(
        config: &HookConfig,
        manager_factory: &dyn ReaderGroupManagerFactory,
    ) -> HookResult<Self> {
        config.validate()?;
        let reader_group_name = config
            .reader_group_name
            .clone()
            .unwrap_or_else(generate_reader_group_name);

        Self::new(
            config.hook_uid.clone(),
            &reader_group_name,
            &config.scope,
            config.trigger_timeout(),
            &config.client,
            config.reader_group.clone(),
            manager_factory,
        )
        .await
    }

    /// Use a different serializer for persisting captured checkpoints
    pub fn with_checkpoint_serializer(mut self, serializer: Arc<dyn CheckpointSerializer>) -> Self {
        self.checkpoint_serializer = serializer;
        self
    }

    async fn initialize_reader_group(
        manager: &dyn ReaderGroupManager,
        reader_group_name: &str,
        reader_group_config: &ReaderGroupConfig,
    ) -> HookResult<Arc<dyn ReaderGroup>> {
        match manager.get_reader_group(reader_group_name).await {
            Ok(group) => return Ok(group),
            Err(GroupError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        info!(
            reader_group = reader_group_name,
            "Reader group not found, creating it"
        );
        match manager
            .create_reader_group(reader_group_name, reader_group_config)
            .await
        {
            // Another job may have created it between our lookup and create
            Ok(()) | Err(GroupError::AlreadyExists { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        Ok(manager.get_reader_group(reader_group_name).await?)
    }

    pub fn state(&self) -> HookState {
        HookState::from(self.state.load(Ordering::Acquire))
    }

    pub fn trigger_timeout(&self) -> Duration {
        self.trigger_timeout
    }

    pub fn reader_group_config(&self) -> &ReaderGroupConfig {
        &self.reader_group_config
    }

    pub fn reader_group_name(&self) -> &str {
        self.reader_group.group_name()
    }

    pub fn scheduler(&self) -> &CheckpointScheduler {
        &self.scheduler
    }

    fn ensure_open(&self) -> HookResult<()> {
        if self.state() == HookState::Closed {
            return Err(HookError::HookClosed {
                hook_uid: self.hook_uid.clone(),
            });
        }
        Ok(())
    }

    /// Cancel `trigger` once the timeout elapses unless it resolved first
    fn schedule_trigger_timeout(&self, executor: &Handle, trigger: PendingTrigger) {
        let timeout = self.trigger_timeout;
        let hook_uid = self.hook_uid.clone();

        executor.spawn(async move {
            tokio::select! {
                _ = trigger.wait() => {}
                _ = tokio::time::sleep(timeout) => {
                    if trigger.cancel() {
                        warn!(
                            hook_uid = %hook_uid,
                            checkpoint_name = trigger.checkpoint_name(),
                            timeout_ms = timeout.as_millis() as u64,
                            "⏰ Checkpoint trigger timed out"
                        );
                    }
                }
            }
        });
    }
}

#[async_trait]
impl MasterTriggerRestoreHook for ReaderCheckpointHook {
    fn identifier(&self) -> &str {
        &self.hook_uid
    }

    fn trigger_checkpoint(
        &self,
        checkpoint_id: i64,
        checkpoint_timestamp: i64,
    ) -> HookResult<PendingTrigger> {
        self.ensure_open()?;
        let checkpoint_name = try_create_checkpoint_name(checkpoint_id)?;

        let executor = self.scheduler.ensure()?;
        let _ = self.state.compare_exchange(
            HookState::Created as u8,
            HookState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        debug!(
            hook_uid = %self.hook_uid,
            checkpoint_id = checkpoint_id,
            checkpoint_name = %checkpoint_name,
            checkpoint_time = ?DateTime::<Utc>::from_timestamp_millis(checkpoint_timestamp),
            "📸 Triggering reader group checkpoint"
        );

        let trigger = self
            .reader_group
            .initiate_checkpoint(&checkpoint_name, &executor);

        // Scheduled after the capture is issued so it can never be cancelled before it starts
        self.schedule_trigger_timeout(&executor, trigger.clone());

        Ok(trigger)
    }

    async fn restore_checkpoint(
        &self,
        checkpoint_id: i64,
        checkpoint: Option<Checkpoint>,
    ) -> HookResult<()> {
        self.ensure_open()?;

        // A savepoint may hold no state for this particular reader group
        let Some(checkpoint) = checkpoint else {
            debug!(
                hook_uid = %self.hook_uid,
                checkpoint_id = checkpoint_id,
                "No reader group checkpoint to restore"
            );
            return Ok(());
        };

        let captured_id = parse_checkpoint_id(checkpoint.name())?;
        if captured_id != checkpoint_id {
            warn!(
                hook_uid = %self.hook_uid,
                checkpoint_id = checkpoint_id,
                captured_checkpoint_id = captured_id,
                "Restoring reader group checkpoint captured under a different checkpoint id"
            );
        }

        info!(
            hook_uid = %self.hook_uid,
            checkpoint_id = checkpoint_id,
            checkpoint_name = checkpoint.name(),
            "♻️ Restoring reader group from checkpoint"
        );

        let restore_config = self.reader_group_config.restore_from(checkpoint);
        self.reader_group
            .reset_reader_group(&restore_config)
            .await?;
        Ok(())
    }

    async fn reset(&self) -> HookResult<()> {
        self.ensure_open()?;

        // The full baseline, not a narrower config, so no unread data is skipped
        info!(
            hook_uid = %self.hook_uid,
            reader_group_config = ?self.reader_group_config,
            "🔄 Resetting the reader group to initial state"
        );
        self.reader_group
            .reset_reader_group(&self.reader_group_config)
            .await?;
        Ok(())
    }

    async fn close(&self) -> HookResult<()> {
        let previous = HookState::from(self.state.swap(HookState::Closed as u8, Ordering::AcqRel));
        if previous == HookState::Closed {
            debug!(hook_uid = %self.hook_uid, "Hook already closed");
            return Ok(());
        }

        info!(hook_uid = %self.hook_uid, "Closing reader group manager");
        let manager_result = self.reader_group_manager.close().await;
        if let Err(e) = &manager_result {
            error!(hook_uid = %self.hook_uid, error = %e, "Failed to close reader group manager");
        }

        info!(hook_uid = %self.hook_uid, "Closing the reader group");
        let group_result = self.reader_group.close().await;
        if let Err(e) = &group_result {
            error!(hook_uid = %self.hook_uid, error = %e, "Failed to close reader group");
        }

        self.scheduler.shutdown();

        manager_result?;
        group_result?;
        Ok(())
    }

    fn create_checkpoint_data_serializer(&self) -> Arc<dyn CheckpointSerializer> {
        Arc::clone(&self.checkpoint_serializer)
    }
}

impl std::fmt::Debug for ReaderCheckpointHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderCheckpointHook")
            .field("hook_uid", &self.hook_uid)
            .field("reader_group", &self.reader_group.group_name())
            .field("trigger_timeout", &self.trigger_timeout)
            .field("state", &self.state())
            .finish()
    }
}
