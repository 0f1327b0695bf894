//! Captured reader group checkpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read positions captured by the reader group for one named checkpoint
///
/// The hook treats the positions as opaque: they are produced by the reader group,
/// persisted by the coordinator through a [`CheckpointSerializer`](super::CheckpointSerializer)
/// and handed back unchanged on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    name: String,
    positions: BTreeMap<String, i64>,
}

impl Checkpoint {
    pub fn new(name: impl Into<String>, positions: BTreeMap<String, i64>) -> Self {
        Self {
            name: name.into(),
            positions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Segment offsets keyed by qualified segment name
    pub fn positions(&self) -> &BTreeMap<String, i64> {
        &self.positions
    }
}
