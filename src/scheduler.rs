//! # Checkpoint Scheduler
//!
//! Small dedicated runtime the hook uses to enforce trigger timeouts. It is created on
//! the first trigger, shared by every trigger issued through the same hook, and shut
//! down exactly once when the hook closes.
//!
//! The lock guards only the `Absent -> Active -> ShutDown` transitions. Nothing outside
//! this module runs while it is held.

use crate::constants::{CHECKPOINT_SCHEDULER_THREAD_NAME, DEFAULT_CHECKPOINT_THREAD_POOL_SIZE};
use crate::error::{HookError, HookResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info};

/// Lifecycle of the scheduler resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    /// Not created yet
    Absent,
    /// Running and accepting timers
    Active,
    /// Shut down; never recreated
    ShutDown,
}

enum SchedulerState {
    Absent,
    Active(Runtime),
    ShutDown,
}

impl SchedulerState {
    fn status(&self) -> SchedulerStatus {
        match self {
            SchedulerState::Absent => SchedulerStatus::Absent,
            SchedulerState::Active(_) => SchedulerStatus::Active,
            SchedulerState::ShutDown => SchedulerStatus::ShutDown,
        }
    }
}

/// Lazily created, lock-guarded timer runtime owned by one hook
pub struct CheckpointScheduler {
    hook_uid: String,
    pool_size: usize,
    state: Mutex<SchedulerState>,
    creations: AtomicUsize,
}

impl CheckpointScheduler {
    pub fn new(hook_uid: impl Into<String>) -> Self {
        Self::with_pool_size(hook_uid, DEFAULT_CHECKPOINT_THREAD_POOL_SIZE)
    }

    pub fn with_pool_size(hook_uid: impl Into<String>, pool_size: usize) -> Self {
        Self {
            hook_uid: hook_uid.into(),
            pool_size: pool_size.max(1),
            state: Mutex::new(SchedulerState::Absent),
            creations: AtomicUsize::new(0),
        }
    }

    /// Return the scheduler handle, creating the runtime on first use
    ///
    /// Fails with [`HookError::SchedulerShutDown`] once [`shutdown`](Self::shutdown) ran.
    pub fn ensure(&self) -> HookResult<Handle> {
        let mut state = self.state.lock();
        match &*state {
            SchedulerState::Active(runtime) => return Ok(runtime.handle().clone()),
            SchedulerState::ShutDown => return Err(HookError::SchedulerShutDown),
            SchedulerState::Absent => {}
        }

        info!(
            hook_uid = %self.hook_uid,
            pool_size = self.pool_size,
            "⏱️ Creating checkpoint scheduler"
        );
        let runtime = self.build_runtime()?;
        let handle = runtime.handle().clone();
        *state = SchedulerState::Active(runtime);
        self.creations.fetch_add(1, Ordering::AcqRel);
        Ok(handle)
    }

    /// Drop every pending timer and stop the workers. Repeated calls are no-ops.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, SchedulerState::ShutDown) {
            SchedulerState::Active(runtime) => {
                info!(hook_uid = %self.hook_uid, "⏱️ Closing checkpoint scheduler");
                // Does not wait for workers, so it is safe from async contexts.
                runtime.shutdown_background();
            }
            SchedulerState::Absent => {
                debug!(hook_uid = %self.hook_uid, "Checkpoint scheduler never created");
            }
            SchedulerState::ShutDown => {}
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        self.state.lock().status()
    }

    /// Number of runtimes created over this scheduler's lifetime (0 or 1)
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::Acquire)
    }

    fn build_runtime(&self) -> HookResult<Runtime> {
        Builder::new_multi_thread()
            .worker_threads(self.pool_size)
            .thread_name(CHECKPOINT_SCHEDULER_THREAD_NAME)
            .enable_all()
            .build()
            .map_err(|e| {
                HookError::Scheduler(format!(
                    "failed to start checkpoint scheduler for hook {}: {e}",
                    self.hook_uid
                ))
            })
    }
}

impl std::fmt::Debug for CheckpointScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointScheduler")
            .field("hook_uid", &self.hook_uid)
            .field("pool_size", &self.pool_size)
            .field("status", &self.status())
            .finish()
    }
}

impl Drop for CheckpointScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn test_starts_absent() {
        let scheduler = CheckpointScheduler::new("hook");
        assert_eq!(scheduler.status(), SchedulerStatus::Absent);
        assert_eq!(scheduler.creations(), 0);
    }

    #[test]
    fn test_ensure_creates_once() {
        let scheduler = CheckpointScheduler::new("hook");
        scheduler.ensure().unwrap();
        scheduler.ensure().unwrap();

        assert_eq!(scheduler.status(), SchedulerStatus::Active);
        assert_eq!(scheduler.creations(), 1);
    }

    #[test]
    fn test_concurrent_ensure_creates_single_runtime() {
        let scheduler = Arc::new(CheckpointScheduler::new("hook"));
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let scheduler = Arc::clone(&scheduler);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    scheduler.ensure().is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(scheduler.creations(), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent_and_terminal() {
        let scheduler = CheckpointScheduler::new("hook");
        scheduler.ensure().unwrap();

        scheduler.shutdown();
        scheduler.shutdown();

        assert_eq!(scheduler.status(), SchedulerStatus::ShutDown);
        assert!(matches!(
            scheduler.ensure().unwrap_err(),
            HookError::SchedulerShutDown
        ));
        assert_eq!(scheduler.creations(), 1);
    }

    #[test]
    fn test_shutdown_without_creation() {
        let scheduler = CheckpointScheduler::new("hook");
        scheduler.shutdown();

        assert_eq!(scheduler.status(), SchedulerStatus::ShutDown);
        assert_eq!(scheduler.creations(), 0);
        assert!(scheduler.ensure().is_err());
    }

    #[test]
    fn test_shutdown_discards_pending_timers() {
        let scheduler = CheckpointScheduler::new("hook");
        let handle = scheduler.ensure().unwrap();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            flag.store(true, Ordering::SeqCst);
        });

        scheduler.shutdown();
        std::thread::sleep(Duration::from_millis(300));
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_timers_fire_while_active() {
        let scheduler = CheckpointScheduler::new("hook");
        let handle = scheduler.ensure().unwrap();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(200));
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_drop_inside_async_context_does_not_panic() {
        let scheduler = CheckpointScheduler::new("hook");
        scheduler.ensure().unwrap();
        drop(scheduler);
    }
}
