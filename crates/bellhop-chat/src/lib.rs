//! Conversational layer for Bellhop.
//!
//! Owns per-session message history with a bounded context window, and the
//! orchestrator that sequences a guest turn: append, consult the reasoning
//! oracle, collect pending actions, respond. The oracle itself is an opaque
//! external collaborator behind the [`ReasoningOracle`] trait.

pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod summary;

pub use error::ChatError;
pub use memory::{SessionMemoryStore, SessionSummary};
pub use orchestrator::{
    ConfirmOutcome, ConversationOrchestrator, ReasoningOracle, TurnOutcome, TurnStatus,
};
pub use summary::ConversationSummary;
