//! Per-session conversation memory.
//!
//! Each session owns two cuts of the same stream: the full append-only
//! history (kept for the process lifetime) and a rolling window bounded at
//! K messages that feeds the reasoning oracle. Sessions are created lazily
//! and isolated from one another; the only way to lose history is an
//! explicit `clear`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use bellhop_core::types::{ChatMessage, Role, Timestamp};
use chrono::Utc;

use crate::error::ChatError;

struct SessionEntry {
    history: Vec<ChatMessage>,
    window: VecDeque<ChatMessage>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            history: Vec::new(),
            window: VecDeque::new(),
        }
    }
}

/// Summary row returned by [`SessionMemoryStore::list_sessions`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    pub created_at: Option<Timestamp>,
    pub last_activity: Option<Timestamp>,
}

/// In-memory store of all session histories, shared across the process.
///
/// The inner mutex guards the maps for fast, non-blocking operations; the
/// per-session guards returned by [`session_guard`](Self::session_guard) are
/// what serialize a whole conversational turn, including the suspension on
/// the oracle call, for one session at a time.
pub struct SessionMemoryStore {
    window_turns: usize,
    sessions: Mutex<HashMap<String, SessionEntry>>,
    guards: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionMemoryStore {
    /// Create a store whose windowed view keeps at most `window_turns`
    /// messages per session.
    pub fn new(window_turns: usize) -> Self {
        Self {
            window_turns,
            sessions: Mutex::new(HashMap::new()),
            guards: Mutex::new(HashMap::new()),
        }
    }

    /// Derive a fresh session id from a user identifier.
    pub fn session_id_for(user_id: &str) -> String {
        format!("{}_{}", user_id, Utc::now().format("%Y%m%d_%H%M%S"))
    }

    /// Idempotent session creation: referencing an existing id is a no-op.
    pub fn ensure_session(&self, session_id: &str) -> Result<(), ChatError> {
        let mut sessions = self.lock_sessions()?;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);
        Ok(())
    }

    /// Append a message with a server-assigned timestamp.
    ///
    /// The message lands in both the full history and the bounded window;
    /// the window silently drops its oldest entry beyond the configured K.
    pub fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<(), ChatError> {
        let message = match metadata {
            Some(meta) => ChatMessage::with_metadata(role, content, meta),
            None => ChatMessage::new(role, content),
        };

        let mut sessions = self.lock_sessions()?;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);

        entry.history.push(message.clone());
        entry.window.push_back(message);
        while entry.window.len() > self.window_turns {
            entry.window.pop_front();
        }
        Ok(())
    }

    /// Full ordered history of a session; empty for unknown ids.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.sessions.lock() {
            Ok(sessions) => sessions
                .get(session_id)
                .map(|e| e.history.clone())
                .unwrap_or_default(),
            Err(_) => vec![],
        }
    }

    /// The bounded recent cut used as oracle context.
    pub fn window(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.sessions.lock() {
            Ok(sessions) => sessions
                .get(session_id)
                .map(|e| e.window.iter().cloned().collect())
                .unwrap_or_default(),
            Err(_) => vec![],
        }
    }

    /// Number of messages ever appended to a session.
    pub fn message_count(&self, session_id: &str) -> usize {
        match self.sessions.lock() {
            Ok(sessions) => sessions.get(session_id).map_or(0, |e| e.history.len()),
            Err(_) => 0,
        }
    }

    /// Render the last `n` history entries as alternating labelled turns.
    pub fn recent_context(&self, session_id: &str, n: usize) -> String {
        let history = self.history(session_id);
        let start = history.len().saturating_sub(n);
        history[start..]
            .iter()
            .map(|msg| {
                let speaker = match msg.role {
                    Role::User => "Client",
                    Role::Assistant | Role::System => "Bellhop",
                };
                format!("{}: {}", speaker, msg.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Irreversibly delete a session's history and window.
    ///
    /// The turn guard is retained: a turn in flight must keep excluding the
    /// next one even when the session data is cleared underneath it.
    pub fn clear(&self, session_id: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(session_id);
        }
    }

    /// Summaries of known sessions, newest first, optionally filtered by a
    /// user-id prefix.
    pub fn list_sessions(&self, user_prefix: Option<&str>) -> Vec<SessionSummary> {
        let sessions = match self.sessions.lock() {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let mut result: Vec<SessionSummary> = sessions
            .iter()
            .filter(|(id, _)| user_prefix.map_or(true, |p| id.starts_with(p)))
            .map(|(id, entry)| SessionSummary {
                session_id: id.clone(),
                message_count: entry.history.len(),
                created_at: entry.history.first().map(|m| m.timestamp),
                last_activity: entry.history.last().map(|m| m.timestamp),
            })
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Exclusive-turn guard for one session.
    ///
    /// Holding the returned mutex serializes the first-message check with
    /// the subsequent appends; guards for different sessions are unrelated,
    /// so cross-session traffic never blocks.
    pub fn session_guard(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut guards = match self.guards.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        Arc::clone(
            guards
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn lock_sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionEntry>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Storage(format!("Session lock poisoned: {}", e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
