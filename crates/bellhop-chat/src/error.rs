//! Error types for the conversational layer.

use bellhop_action::ActionError;
use bellhop_core::error::BellhopError;

/// Errors from session memory and orchestration.
///
/// Oracle failures are recovered inside the orchestrator (fallback message,
/// degraded turn) and never surface through this type; what remains are
/// caller mistakes and storage faults.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Empty message")]
    EmptyMessage,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
}

impl From<ChatError> for BellhopError {
    fn from(err: ChatError) -> Self {
        BellhopError::Storage(err.to_string())
    }
}
