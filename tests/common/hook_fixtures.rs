//! Shared setup for checkpoint hook integration tests.

use reader_checkpoint_hook::group::{InMemoryReaderGroupState, InMemoryReaderGroupStore};
use reader_checkpoint_hook::{ClientConfig, ReaderCheckpointHook, ReaderGroupConfig};
use std::sync::Arc;
use std::time::Duration;

pub const SCOPE: &str = "orders";
pub const GROUP: &str = "orders-readers";
pub const SEGMENT: &str = "orders/events/0";

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Baseline configuration distinct from the defaults in every field
pub fn baseline_config() -> ReaderGroupConfig {
    ReaderGroupConfig::builder()
        .max_outstanding_checkpoint_request(6)
        .group_refresh_time_millis(750)
        .automatic_checkpoint_interval_millis(20_000)
        .build()
}

pub async fn build_hook(
    store: &InMemoryReaderGroupStore,
    trigger_timeout: Duration,
) -> ReaderCheckpointHook {
    ReaderCheckpointHook::new(
        "orders-source",
        GROUP,
        SCOPE,
        trigger_timeout,
        &ClientConfig::default(),
        baseline_config(),
        store,
    )
    .await
    .expect("hook bootstrap")
}

pub fn group_state(store: &InMemoryReaderGroupStore) -> Arc<InMemoryReaderGroupState> {
    store.group(SCOPE, GROUP).expect("reader group exists")
}
