//! # Checkpoints
//!
//! Naming, representation and serialization of reader group checkpoints, plus the
//! handle returned for an in-flight capture.

pub mod name;
pub mod pending;
pub mod serializer;
pub mod token;

pub use name::{create_checkpoint_name, parse_checkpoint_id, try_create_checkpoint_name};
pub use pending::{PendingTrigger, TriggerState};
pub use serializer::{CheckpointSerializer, JsonCheckpointSerializer};
pub use token::Checkpoint;
