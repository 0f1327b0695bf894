//! # In-Memory Reader Groups
//!
//! Process-local reader group backend. Groups live in an [`InMemoryReaderGroupStore`]
//! shared by every manager it hands out, so a second hook built against the same store
//! resolves the group created by the first one, the way a restarted job would.
//!
//! Every reset and capture request is recorded for inspection.

use super::{
    ClientConfig, ReaderGroup, ReaderGroupConfig, ReaderGroupManager, ReaderGroupManagerFactory,
};
use crate::checkpoint::{Checkpoint, PendingTrigger};
use crate::error::{GroupError, GroupResult};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

/// How captures requested from an in-memory group resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureBehavior {
    /// Complete with the group's current positions after the delay
    Complete { delay: Duration },
    /// Never resolve
    Stall,
    /// Fail with the given reason
    Fail(String),
}

impl Default for CaptureBehavior {
    fn default() -> Self {
        CaptureBehavior::Complete {
            delay: Duration::ZERO,
        }
    }
}

/// Shared state of one reader group
#[derive(Debug)]
pub struct InMemoryReaderGroupState {
    name: String,
    config: Mutex<ReaderGroupConfig>,
    positions: Mutex<BTreeMap<String, i64>>,
    reset_history: Mutex<Vec<ReaderGroupConfig>>,
    capture_requests: Mutex<Vec<PendingTrigger>>,
    capture_behavior: Mutex<CaptureBehavior>,
}

impl InMemoryReaderGroupState {
    fn new(name: &str, config: &ReaderGroupConfig) -> Self {
        let positions = config
            .start_from_checkpoint
            .as_ref()
            .map(|checkpoint| checkpoint.positions().clone())
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            config: Mutex::new(config.clone()),
            positions: Mutex::new(positions),
            reset_history: Mutex::new(Vec::new()),
            capture_requests: Mutex::new(Vec::new()),
            capture_behavior: Mutex::new(CaptureBehavior::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> ReaderGroupConfig {
        self.config.lock().clone()
    }

    pub fn positions(&self) -> BTreeMap<String, i64> {
        self.positions.lock().clone()
    }

    /// Move readers forward, as consumption would
    pub fn set_position(&self, segment: &str, offset: i64) {
        self.positions.lock().insert(segment.to_string(), offset);
    }

    /// Every configuration passed to `reset_reader_group`, oldest first
    pub fn reset_history(&self) -> Vec<ReaderGroupConfig> {
        self.reset_history.lock().clone()
    }

    /// Triggers handed out by `initiate_checkpoint`, oldest first
    pub fn capture_requests(&self) -> Vec<PendingTrigger> {
        self.capture_requests.lock().clone()
    }

    pub fn set_capture_behavior(&self, behavior: CaptureBehavior) {
        *self.capture_behavior.lock() = behavior;
    }

    fn apply(&self, config: &ReaderGroupConfig) {
        if let Some(checkpoint) = &config.start_from_checkpoint {
            *self.positions.lock() = checkpoint.positions().clone();
        }
        *self.config.lock() = config.clone();
        self.reset_history.lock().push(config.clone());
    }
}

/// Client handle over an [`InMemoryReaderGroupState`]
#[derive(Debug)]
pub struct InMemoryReaderGroup {
    state: Arc<InMemoryReaderGroupState>,
    closed: AtomicBool,
}

impl InMemoryReaderGroup {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> GroupResult<()> {
        if self.is_closed() {
            return Err(GroupError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl ReaderGroup for InMemoryReaderGroup {
    fn group_name(&self) -> &str {
        self.state.name()
    }

    fn initiate_checkpoint(&self, checkpoint_name: &str, executor: &Handle) -> PendingTrigger {
        let trigger = PendingTrigger::new(checkpoint_name);
        self.state.capture_requests.lock().push(trigger.clone());

        if self.is_closed() {
            trigger.fail("reader group closed");
            return trigger;
        }

        let behavior = self.state.capture_behavior.lock().clone();
        match behavior {
            CaptureBehavior::Complete { delay } => {
                let completer = trigger.clone();
                let state = Arc::clone(&self.state);
                let name = checkpoint_name.to_string();
                executor.spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let checkpoint = Checkpoint::new(name, state.positions());
                    if !completer.complete(checkpoint) {
                        debug!(
                            checkpoint_name = completer.checkpoint_name(),
                            "Capture finished after trigger was already resolved"
                        );
                    }
                });
            }
            CaptureBehavior::Stall => {}
            CaptureBehavior::Fail(reason) => {
                trigger.fail(reason);
            }
        }

        trigger
    }

    async fn reset_reader_group(&self, config: &ReaderGroupConfig) -> GroupResult<()> {
        self.ensure_open()?;
        self.state.apply(config);
        Ok(())
    }

    async fn close(&self) -> GroupResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Reader groups of every scope, shared between managers
#[derive(Debug, Clone, Default)]
pub struct InMemoryReaderGroupStore {
    groups: Arc<DashMap<(String, String), Arc<InMemoryReaderGroupState>>>,
    managers_opened: Arc<AtomicUsize>,
}

impl InMemoryReaderGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, scope: &str, group_name: &str) -> Option<Arc<InMemoryReaderGroupState>> {
        self.groups
            .get(&(scope.to_string(), group_name.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn managers_opened(&self) -> usize {
        self.managers_opened.load(Ordering::Acquire)
    }

    pub fn manager(&self, scope: &str) -> InMemoryReaderGroupManager {
        self.managers_opened.fetch_add(1, Ordering::AcqRel);
        InMemoryReaderGroupManager {
            scope: scope.to_string(),
            store: self.clone(),
            closed: AtomicBool::new(false),
        }
    }
}

impl ReaderGroupManagerFactory for InMemoryReaderGroupStore {
    fn with_scope(
        &self,
        scope: &str,
        _client_config: &ClientConfig,
    ) -> GroupResult<Arc<dyn ReaderGroupManager>> {
        Ok(Arc::new(self.manager(scope)))
    }
}

/// Manager for one scope of an [`InMemoryReaderGroupStore`]
#[derive(Debug)]
pub struct InMemoryReaderGroupManager {
    scope: String,
    store: InMemoryReaderGroupStore,
    closed: AtomicBool,
}

impl InMemoryReaderGroupManager {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn key(&self, group_name: &str) -> (String, String) {
        (self.scope.clone(), group_name.to_string())
    }

    fn ensure_open(&self) -> GroupResult<()> {
        if self.is_closed() {
            return Err(GroupError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl ReaderGroupManager for InMemoryReaderGroupManager {
    async fn get_reader_group(&self, group_name: &str) -> GroupResult<Arc<dyn ReaderGroup>> {
        self.ensure_open()?;
        let state = self
            .store
            .groups
            .get(&self.key(group_name))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GroupError::NotFound {
                name: group_name.to_string(),
            })?;

        Ok(Arc::new(InMemoryReaderGroup {
            state,
            closed: AtomicBool::new(false),
        }))
    }

    async fn create_reader_group(
        &self,
        group_name: &str,
        config: &ReaderGroupConfig,
    ) -> GroupResult<()> {
        self.ensure_open()?;
        match self.store.groups.entry(self.key(group_name)) {
            Entry::Occupied(_) => Err(GroupError::AlreadyExists {
                name: group_name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(InMemoryReaderGroupState::new(group_name, config)));
                Ok(())
            }
        }
    }

    async fn close(&self) -> GroupResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_resolve() {
        let store = InMemoryReaderGroupStore::new();
        let manager = store.manager("scope");

        let err = manager.get_reader_group("readers").await.unwrap_err();
        assert!(matches!(err, GroupError::NotFound { .. }));

        manager
            .create_reader_group("readers", &ReaderGroupConfig::default())
            .await
            .unwrap();
        let group = manager.get_reader_group("readers").await.unwrap();
        assert_eq!(group.group_name(), "readers");
        assert_eq!(store.group_count(), 1);

        let err = manager
            .create_reader_group("readers", &ReaderGroupConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_groups_are_scoped() {
        let store = InMemoryReaderGroupStore::new();
        store
            .manager("a")
            .create_reader_group("readers", &ReaderGroupConfig::default())
            .await
            .unwrap();

        assert!(store.manager("b").get_reader_group("readers").await.is_err());
        assert!(store.group("a", "readers").is_some());
        assert!(store.group("b", "readers").is_none());
    }

    #[tokio::test]
    async fn test_capture_completes_with_current_positions() {
        let store = InMemoryReaderGroupStore::new();
        let manager = store.manager("scope");
        manager
            .create_reader_group("readers", &ReaderGroupConfig::default())
            .await
            .unwrap();
        let state = store.group("scope", "readers").unwrap();
        state.set_position("scope/stream/0", 55);

        let group = manager.get_reader_group("readers").await.unwrap();
        let trigger = group.initiate_checkpoint("PVG-CHK-3", &Handle::current());

        match trigger.wait().await {
            crate::checkpoint::TriggerState::Completed(checkpoint) => {
                assert_eq!(checkpoint.name(), "PVG-CHK-3");
                assert_eq!(checkpoint.positions()["scope/stream/0"], 55);
            }
            other => panic!("unexpected trigger state {other:?}"),
        }
        assert_eq!(state.capture_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_replaces_positions() {
        let store = InMemoryReaderGroupStore::new();
        let manager = store.manager("scope");
        manager
            .create_reader_group("readers", &ReaderGroupConfig::default())
            .await
            .unwrap();
        let group = manager.get_reader_group("readers").await.unwrap();
        let state = store.group("scope", "readers").unwrap();
        state.set_position("scope/stream/0", 900);

        let checkpoint = Checkpoint::new(
            "PVG-CHK-1",
            BTreeMap::from([("scope/stream/0".to_string(), 100)]),
        );
        let config = ReaderGroupConfig::default().restore_from(checkpoint);
        group.reset_reader_group(&config).await.unwrap();

        assert_eq!(state.positions()["scope/stream/0"], 100);
        assert_eq!(state.reset_history(), vec![config]);
    }

    #[tokio::test]
    async fn test_closed_handles_reject_calls() {
        let store = InMemoryReaderGroupStore::new();
        let manager = store.manager("scope");
        manager
            .create_reader_group("readers", &ReaderGroupConfig::default())
            .await
            .unwrap();
        let group = manager.get_reader_group("readers").await.unwrap();

        group.close().await.unwrap();
        let err = group
            .reset_reader_group(&ReaderGroupConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Closed));

        manager.close().await.unwrap();
        assert!(manager.is_closed());
        assert!(manager.get_reader_group("readers").await.is_err());
    }
}
