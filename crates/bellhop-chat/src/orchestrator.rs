//! Conversation orchestrator: thin sequencing layer over memory, ledger,
//! and the reasoning oracle.
//!
//! One guest turn is append, consult the oracle under a timeout, append the
//! reply, and report every action currently awaiting confirmation. The
//! oracle is an opaque collaborator; it may store actions in the ledger as
//! a side effect of reasoning, and the orchestrator only observes the
//! resulting pending set.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use bellhop_action::{ActionLedger, BackendAction, FrontendAction};
use bellhop_core::config::BellhopConfig;
use bellhop_core::types::Role;

use crate::error::ChatError;
use crate::memory::SessionMemoryStore;
use crate::summary::ConversationSummary;

/// Opaque reasoning collaborator.
///
/// `respond` receives the raw guest message and a rendered cut of recent
/// conversation turns. Implementations are free to call detection rules or
/// consult external services; the orchestrator makes no assumption beyond
/// the returned text.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    async fn respond(&self, message: &str, session_context: &str) -> bellhop_core::Result<String>;
}

/// How a turn resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The oracle answered within the timeout.
    Success,
    /// The oracle failed or timed out; the response is the fallback message.
    Degraded,
}

/// Result of one processed guest message.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub response: String,
    pub session_id: String,
    pub message_count: usize,
    /// Frontend descriptors of every action currently pending confirmation.
    pub actions: Vec<FrontendAction>,
    pub intentions_detected: bool,
    pub first_interaction: bool,
    pub status: TurnStatus,
}

/// Result of a confirmation request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// The action moved to the completed table; `directive` is the textual
    /// envelope handed to the execution backend.
    Confirmed {
        action: BackendAction,
        directive: String,
    },
    /// Unknown id, already confirmed, or cancelled. A normal outcome under
    /// concurrent confirmation attempts, not an error.
    NotFound,
}

/// Sequences guest turns over explicitly injected, process-lifetime shared
/// components.
pub struct ConversationOrchestrator {
    oracle: Arc<dyn ReasoningOracle>,
    memory: Arc<SessionMemoryStore>,
    ledger: Arc<ActionLedger>,
    oracle_timeout: Duration,
    fallback_message: String,
    recent_context_turns: usize,
}

impl ConversationOrchestrator {
    pub fn new(
        config: &BellhopConfig,
        oracle: Arc<dyn ReasoningOracle>,
        memory: Arc<SessionMemoryStore>,
        ledger: Arc<ActionLedger>,
    ) -> Self {
        Self {
            oracle,
            memory,
            ledger,
            oracle_timeout: Duration::from_secs(config.oracle.timeout_seconds),
            fallback_message: config.oracle.fallback_message.clone(),
            recent_context_turns: config.memory.recent_context_turns,
        }
    }

    /// Process one guest message for a session.
    ///
    /// The whole sequence runs under the session's exclusive turn guard, so
    /// two concurrent messages to the same session are totally ordered and
    /// exactly one of them observes an empty history. Other sessions are
    /// never blocked.
    pub async fn process_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<TurnOutcome, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let guard = self.memory.session_guard(session_id);
        let _turn = guard.lock().await;

        let first_interaction = self.memory.message_count(session_id) == 0;
        self.memory.ensure_session(session_id)?;
        self.memory.append(session_id, Role::User, message, None)?;

        let context = self
            .memory
            .recent_context(session_id, self.recent_context_turns);

        let (response, status) = match tokio::time::timeout(
            self.oracle_timeout,
            self.oracle.respond(message, &context),
        )
        .await
        {
            Ok(Ok(text)) => {
                self.memory.append(session_id, Role::Assistant, &text, None)?;
                (text, TurnStatus::Success)
            }
            Ok(Err(e)) => {
                tracing::warn!(session_id = %session_id, error = %e, "Oracle call failed");
                self.append_fallback(session_id, &e.to_string())?;
                (self.fallback_message.clone(), TurnStatus::Degraded)
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %session_id,
                    timeout_seconds = self.oracle_timeout.as_secs(),
                    "Oracle call timed out"
                );
                let reason = format!(
                    "Oracle timed out after {}s",
                    self.oracle_timeout.as_secs()
                );
                self.append_fallback(session_id, &reason)?;
                (self.fallback_message.clone(), TurnStatus::Degraded)
            }
        };

        let actions = self.ledger.frontend_actions();
        let outcome = TurnOutcome {
            response,
            session_id: session_id.to_string(),
            message_count: self.memory.message_count(session_id),
            intentions_detected: !actions.is_empty(),
            actions,
            first_interaction,
            status,
        };

        tracing::info!(
            session_id = %session_id,
            message_count = outcome.message_count,
            pending_actions = outcome.actions.len(),
            status = ?outcome.status,
            "Turn processed"
        );
        Ok(outcome)
    }

    /// Confirm a pending action and record the confirmation in the session
    /// history.
    pub fn confirm_action(
        &self,
        session_id: &str,
        action_id: Uuid,
    ) -> Result<ConfirmOutcome, ChatError> {
        let Some(action) = self.ledger.confirm(action_id) else {
            return Ok(ConfirmOutcome::NotFound);
        };

        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "action_id".to_string(),
            serde_json::Value::String(action.id.to_string()),
        );
        metadata.insert(
            "action_data".to_string(),
            serde_json::Value::Object(action.payload.clone()),
        );
        self.memory.append(
            session_id,
            Role::System,
            &format!("Action confirmée: {}", action.kind),
            Some(metadata),
        )?;

        let directive = action.to_directive();
        tracing::info!(action_id = %action.id, kind = %action.kind, "Action confirmed");
        Ok(ConfirmOutcome::Confirmed { action, directive })
    }

    /// Cancel a pending action. Returns false when the id is unknown or
    /// already resolved.
    pub fn cancel_action(&self, action_id: Uuid) -> bool {
        self.ledger.cancel(action_id)
    }

    /// Frontend descriptors of every action awaiting confirmation.
    pub fn pending_actions(&self) -> Vec<FrontendAction> {
        self.ledger.frontend_actions()
    }

    /// Summarize a session's conversation so far.
    pub fn conversation_summary(&self, session_id: &str) -> ConversationSummary {
        ConversationSummary::from_history(session_id, &self.memory.history(session_id))
    }

    fn append_fallback(&self, session_id: &str, reason: &str) -> Result<(), ChatError> {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "error".to_string(),
            serde_json::Value::String(reason.to_string()),
        );
        self.memory.append(
            session_id,
            Role::Assistant,
            &self.fallback_message,
            Some(metadata),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
