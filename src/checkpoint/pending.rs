//! # Pending Checkpoint Triggers
//!
//! Handle for an in-flight reader group checkpoint capture. The reader group resolves it
//! with the captured [`Checkpoint`] (or a failure) and the hook's scheduler may cancel it
//! when the trigger timeout elapses. The first resolution wins; later attempts are no-ops.
//!
//! Cancelling never touches the remote capture. It only resolves this handle so callers
//! waiting on it stop waiting.

use super::Checkpoint;
use futures::future::{BoxFuture, FutureExt};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable state of a checkpoint trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerState {
    /// Capture issued, no outcome yet
    Pending,
    /// Reader group captured the checkpoint
    Completed(Checkpoint),
    /// Trigger timeout elapsed before the capture finished
    Cancelled,
    /// Reader group reported a capture failure
    Failed(String),
}

impl TriggerState {
    pub fn is_done(&self) -> bool {
        !matches!(self, TriggerState::Pending)
    }
}

/// Shared, cloneable handle to one checkpoint capture
#[derive(Debug, Clone)]
pub struct PendingTrigger {
    checkpoint_name: Arc<str>,
    state: Arc<watch::Sender<TriggerState>>,
}

impl PendingTrigger {
    pub fn new(checkpoint_name: &str) -> Self {
        let (state, _) = watch::channel(TriggerState::Pending);
        Self {
            checkpoint_name: Arc::from(checkpoint_name),
            state: Arc::new(state),
        }
    }

    pub fn checkpoint_name(&self) -> &str {
        &self.checkpoint_name
    }

    /// Resolve with the captured checkpoint. Returns false if already resolved.
    pub fn complete(&self, checkpoint: Checkpoint) -> bool {
        self.resolve(TriggerState::Completed(checkpoint))
    }

    /// Resolve as failed. Returns false if already resolved.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.resolve(TriggerState::Failed(reason.into()))
    }

    /// Resolve as cancelled without interrupting the capture. Returns false if already resolved.
    pub fn cancel(&self) -> bool {
        self.resolve(TriggerState::Cancelled)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TriggerState {
        self.state.borrow().clone()
    }

    pub fn is_done(&self) -> bool {
        self.state.borrow().is_done()
    }

    /// Wait until the trigger is resolved and return its final state
    pub async fn wait(&self) -> TriggerState {
        let mut receiver = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let state = match receiver.wait_for(TriggerState::is_done).await {
            Ok(state) => state.clone(),
            Err(_) => TriggerState::Failed("checkpoint trigger channel closed".to_string()),
        };
        state
    }

    fn resolve(&self, outcome: TriggerState) -> bool {
        self.state.send_if_modified(move |state| {
            if state.is_done() {
                return false;
            }
            *state = outcome;
            true
        })
    }
}

impl IntoFuture for PendingTrigger {
    type Output = TriggerState;
    type IntoFuture = BoxFuture<'static, TriggerState>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.wait().await }.boxed()
    }
}
