//! Action lifecycle ledger.
//!
//! Single source of truth for every action's state and the only component
//! permitted to transition one. Pending and completed tables are two
//! partitions: an action lives in exactly one of them, or in neither after
//! cancellation, never in both.

use crate::error::ActionError;
use crate::types::{ActionState, BackendAction, FrontendAction};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    pending: HashMap<Uuid, BackendAction>,
    completed: HashMap<Uuid, BackendAction>,
}

/// In-memory pending/completed action tables shared across all sessions.
///
/// A single mutual-exclusion domain suffices: action ids are globally
/// unique, so there is no cross-session interference to partition around.
pub struct ActionLedger {
    tables: Mutex<Tables>,
}

impl ActionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Insert a freshly detected action into the pending table.
    ///
    /// An id already present in either table means id generation is broken
    /// upstream; this is logged and reported as `DuplicateId`.
    pub fn store(&self, action: BackendAction) -> Result<(), ActionError> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|e| ActionError::Storage(format!("Lock poisoned: {}", e)))?;

        if tables.pending.contains_key(&action.id) || tables.completed.contains_key(&action.id) {
            tracing::error!(action_id = %action.id, "Duplicate action id on store");
            return Err(ActionError::DuplicateId(action.id));
        }

        tracing::info!(
            action_id = %action.id,
            kind = %action.kind,
            confirmation_required = action.confirmation_required,
            "Action stored as pending"
        );
        tables.pending.insert(action.id, action);
        Ok(())
    }

    /// Snapshot of all pending actions. Callers must not rely on ordering.
    pub fn pending(&self) -> Vec<BackendAction> {
        match self.tables.lock() {
            Ok(tables) => tables.pending.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    /// Snapshot of all confirmed actions (audit view).
    pub fn completed(&self) -> Vec<BackendAction> {
        match self.tables.lock() {
            Ok(tables) => tables.completed.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    /// Confirm a pending action, moving it atomically to the completed table.
    ///
    /// Returns `None` for an unknown or already-resolved id; that is a
    /// normal reportable outcome, not a fault.
    pub fn confirm(&self, id: Uuid) -> Option<BackendAction> {
        let mut tables = self.tables.lock().ok()?;
        let mut action = tables.pending.remove(&id)?;
        action.state = ActionState::Confirmed;
        tables.completed.insert(id, action.clone());
        tracing::info!(action_id = %id, kind = %action.kind, "Action confirmed");
        Some(action)
    }

    /// Cancel a pending action, discarding it outright.
    ///
    /// Returns `false` when the id is not pending.
    pub fn cancel(&self, id: Uuid) -> bool {
        let mut tables = match self.tables.lock() {
            Ok(t) => t,
            Err(_) => return false,
        };
        match tables.pending.remove(&id) {
            Some(action) => {
                tracing::info!(action_id = %id, kind = %action.kind, "Action cancelled");
                true
            }
            None => false,
        }
    }

    /// Descriptors for every pending action, for UI confirmation prompts.
    pub fn frontend_actions(&self) -> Vec<FrontendAction> {
        match self.tables.lock() {
            Ok(tables) => tables.pending.values().map(|a| a.to_frontend()).collect(),
            Err(_) => vec![],
        }
    }
}

impl Default for ActionLedger {
    fn default() -> Self {
        Self::new()
    }
}
