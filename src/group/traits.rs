//! Reader group collaborator contracts.
//!
//! The hook never talks to the stream controller itself. It resolves a
//! [`ReaderGroupManager`] through a [`ReaderGroupManagerFactory`] and drives the
//! [`ReaderGroup`] the manager hands out.

use super::{ClientConfig, ReaderGroupConfig};
use crate::checkpoint::PendingTrigger;
use crate::error::GroupResult;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Handle to a reader group
#[async_trait]
pub trait ReaderGroup: Send + Sync + Debug {
    fn group_name(&self) -> &str;

    /// Start capturing a named checkpoint of every reader's position
    ///
    /// Returns immediately. Any background work belonging to the capture runs on
    /// `executor`, and the returned trigger is resolved once the capture finishes.
    fn initiate_checkpoint(&self, checkpoint_name: &str, executor: &Handle) -> PendingTrigger;

    /// Replace the group's configuration and reader positions
    async fn reset_reader_group(&self, config: &ReaderGroupConfig) -> GroupResult<()>;

    async fn close(&self) -> GroupResult<()>;
}

/// Creates and resolves reader groups within one scope
#[async_trait]
pub trait ReaderGroupManager: Send + Sync + Debug {
    /// Resolve an existing group, failing with `GroupError::NotFound` if absent
    async fn get_reader_group(&self, group_name: &str) -> GroupResult<Arc<dyn ReaderGroup>>;

    async fn create_reader_group(
        &self,
        group_name: &str,
        config: &ReaderGroupConfig,
    ) -> GroupResult<()>;

    async fn close(&self) -> GroupResult<()>;
}

/// Connects a [`ReaderGroupManager`] to a scope
pub trait ReaderGroupManagerFactory: Send + Sync {
    fn with_scope(
        &self,
        scope: &str,
        client_config: &ClientConfig,
    ) -> GroupResult<Arc<dyn ReaderGroupManager>>;
}
