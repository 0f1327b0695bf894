//! # Checkpoint Names
//!
//! Reader group checkpoints are addressed by name. The hook derives the name from the
//! coordinator's numeric checkpoint id as `PVG-CHK-<id>` and parses it back when the
//! coordinator hands a captured checkpoint in during recovery.

use crate::constants::CHECKPOINT_NAME_PREFIX;
use crate::error::{HookError, HookResult};

/// Build the reader group checkpoint name for a coordinator checkpoint id
pub fn create_checkpoint_name(checkpoint_id: i64) -> String {
    format!("{CHECKPOINT_NAME_PREFIX}{checkpoint_id}")
}

/// Build the checkpoint name, rejecting ids whose name could not be parsed back
pub fn try_create_checkpoint_name(checkpoint_id: i64) -> HookResult<String> {
    let checkpoint_name = create_checkpoint_name(checkpoint_id);
    if checkpoint_id < 0 {
        return Err(invalid(&checkpoint_name, "checkpoint id is negative"));
    }
    Ok(checkpoint_name)
}

/// Recover the coordinator checkpoint id from a checkpoint name
///
/// The suffix must be the canonical decimal form produced by [`create_checkpoint_name`]:
/// ASCII digits only, no sign, no leading zeros, within `i64` range.
pub fn parse_checkpoint_id(checkpoint_name: &str) -> HookResult<i64> {
    let digits = checkpoint_name
        .strip_prefix(CHECKPOINT_NAME_PREFIX)
        .ok_or_else(|| invalid(checkpoint_name, "missing checkpoint name prefix"))?;

    if digits.is_empty() {
        return Err(invalid(checkpoint_name, "missing checkpoint id"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(checkpoint_name, "checkpoint id is not a decimal number"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(invalid(checkpoint_name, "checkpoint id has leading zeros"));
    }

    digits
        .parse::<i64>()
        .map_err(|e| invalid(checkpoint_name, &e.to_string()))
}

fn invalid(name: &str, reason: &str) -> HookError {
    HookError::InvalidCheckpointName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
