//! # Checkpoint Serialization
//!
//! The coordinator stores captured checkpoints inside its own snapshots and asks the
//! hook for the serializer to use. Serialized payloads carry a version so older
//! snapshots stay readable after the payload format changes.

use super::Checkpoint;
use crate::error::{HookError, HookResult};
use std::fmt::Debug;

/// Versioned bytes ⇄ [`Checkpoint`] conversion used by the coordinator
pub trait CheckpointSerializer: Send + Sync + Debug {
    /// Version written alongside every serialized payload
    fn version(&self) -> i32;

    fn serialize(&self, checkpoint: &Checkpoint) -> HookResult<Vec<u8>>;

    fn deserialize(&self, version: i32, bytes: &[u8]) -> HookResult<Checkpoint>;
}

/// Default serializer writing checkpoints as JSON documents
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCheckpointSerializer;

impl JsonCheckpointSerializer {
    pub const VERSION: i32 = 1;
}

impl CheckpointSerializer for JsonCheckpointSerializer {
    fn version(&self) -> i32 {
        Self::VERSION
    }

    fn serialize(&self, checkpoint: &Checkpoint) -> HookResult<Vec<u8>> {
        Ok(serde_json::to_vec(checkpoint)?)
    }

    fn deserialize(&self, version: i32, bytes: &[u8]) -> HookResult<Checkpoint> {
        if version != Self::VERSION {
            return Err(HookError::UnsupportedVersion { version });
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_checkpoint() -> Checkpoint {
        let mut positions = BTreeMap::new();
        positions.insert("scope/stream/0".to_string(), 128);
        positions.insert("scope/stream/1".to_string(), 4096);
        Checkpoint::new("PVG-CHK-7", positions)
    }

    #[test]
    fn test_json_serializer_preserves_checkpoint() {
        let serializer = JsonCheckpointSerializer;
        let checkpoint = sample_checkpoint();

        let bytes = serializer.serialize(&checkpoint).unwrap();
        let restored = serializer
            .deserialize(serializer.version(), &bytes)
            .unwrap();

        assert_eq!(restored, checkpoint);
        assert_eq!(restored.positions()["scope/stream/1"], 4096);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let serializer = JsonCheckpointSerializer;
        let bytes = serializer.serialize(&sample_checkpoint()).unwrap();

        let err = serializer.deserialize(2, &bytes).unwrap_err();
        assert!(matches!(err, HookError::UnsupportedVersion { version: 2 }));
    }

    #[test]
    fn test_corrupt_payload_is_serialization_error() {
        let serializer = JsonCheckpointSerializer;
        let err = serializer
            .deserialize(JsonCheckpointSerializer::VERSION, b"not json")
            .unwrap_err();
        assert!(matches!(err, HookError::Serialization(_)));
    }
}
