//! Error types for the action engine.

use bellhop_core::error::BellhopError;
use uuid::Uuid;

/// Errors from the action ledger and detection engine.
///
/// Confirming or cancelling an unknown id is NOT an error; those are
/// structured negative results (`Option` / `bool`). `DuplicateId` signals a
/// broken id-generation invariant and is the only fault class here.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Duplicate action id: {0}")]
    DuplicateId(Uuid),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ActionError> for BellhopError {
    fn from(err: ActionError) -> Self {
        BellhopError::Storage(err.to_string())
    }
}
