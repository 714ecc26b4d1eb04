//! Conversation summaries derived from session history.

use serde::Serialize;

use bellhop_core::types::{ChatMessage, Role, Timestamp};

/// Topic tags scanned over message content, case-insensitive substring
/// matches like the detection rules.
const TOPIC_TABLE: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "manger", "table", "repas"]),
    ("spa", &["spa", "massage", "détente", "relaxation"]),
    ("room service", &["chambre", "room service", "livrer"]),
    ("tarifs", &["prix", "tarif", "coût", "facture"]),
    ("horaires", &["horaire", "heure", "ouvert", "fermé"]),
    ("réservations", &["réservation", "booking", "réserver"]),
    ("réclamations", &["problème", "plainte", "insatisfait"]),
];

/// Aggregate view of one session's conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub session_id: String,
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub duration_minutes: i64,
    /// Topic tags in alphabetical order.
    pub topics: Vec<String>,
    pub last_activity: Option<Timestamp>,
    /// Confirmation records in the history (system messages carrying an
    /// action id).
    pub confirmed_actions: usize,
}

impl ConversationSummary {
    /// Build a summary from a session's full ordered history.
    ///
    /// An empty history yields the zero summary rather than an error.
    pub fn from_history(session_id: &str, history: &[ChatMessage]) -> Self {
        let mut topics = Vec::new();
        let mut confirmed_actions = 0;

        for msg in history {
            let content = msg.content.to_lowercase();
            for (topic, keywords) in TOPIC_TABLE {
                if keywords.iter().any(|k| content.contains(k)) {
                    let tag = topic.to_string();
                    if !topics.contains(&tag) {
                        topics.push(tag);
                    }
                }
            }
            if msg.role == Role::System && msg.metadata.contains_key("action_id") {
                confirmed_actions += 1;
            }
        }
        topics.sort();

        let duration_minutes = match (history.first(), history.last()) {
            (Some(first), Some(last)) => (last.timestamp.0 - first.timestamp.0) / 60,
            _ => 0,
        };

        Self {
            session_id: session_id.to_string(),
            total_messages: history.len(),
            user_messages: history.iter().filter(|m| m.role == Role::User).count(),
            assistant_messages: history
                .iter()
                .filter(|m| m.role == Role::Assistant)
                .count(),
            duration_minutes,
            topics,
            last_activity: history.last().map(|m| m.timestamp),
            confirmed_actions,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: Role, content: &str) -> ChatMessage {
        ChatMessage::new(role, content)
    }

    // ---- empty history ----

    #[test]
    fn test_empty_history_zero_summary() {
        let summary = ConversationSummary::from_history("s1", &[]);
        assert_eq!(summary.total_messages, 0);
        assert_eq!(summary.user_messages, 0);
        assert_eq!(summary.duration_minutes, 0);
        assert!(summary.topics.is_empty());
        assert!(summary.last_activity.is_none());
        assert_eq!(summary.confirmed_actions, 0);
    }

    // ---- counters ----

    #[test]
    fn test_role_counts() {
        let history = vec![
            msg(Role::User, "Bonjour"),
            msg(Role::Assistant, "Bonsoir"),
            msg(Role::User, "Merci"),
        ];
        let summary = ConversationSummary::from_history("s1", &history);
        assert_eq!(summary.total_messages, 3);
        assert_eq!(summary.user_messages, 2);
        assert_eq!(summary.assistant_messages, 1);
        assert!(summary.last_activity.is_some());
    }

    // ---- topics ----

    #[test]
    fn test_topics_detected_and_sorted() {
        let history = vec![
            msg(Role::User, "Je veux manger au restaurant"),
            msg(Role::Assistant, "Quel est votre budget ?"),
            msg(Role::User, "Quel est le prix du spa ?"),
        ];
        let summary = ConversationSummary::from_history("s1", &history);
        assert_eq!(summary.topics, vec!["restaurant", "spa", "tarifs"]);
    }

    #[test]
    fn test_topics_case_insensitive_no_duplicates() {
        let history = vec![
            msg(Role::User, "RESTAURANT ce soir"),
            msg(Role::User, "le restaurant encore"),
        ];
        let summary = ConversationSummary::from_history("s1", &history);
        assert_eq!(summary.topics, vec!["restaurant"]);
    }

    #[test]
    fn test_off_topic_history_has_no_tags() {
        let history = vec![msg(Role::User, "Quelle est la capitale de la France ?")];
        let summary = ConversationSummary::from_history("s1", &history);
        assert!(summary.topics.is_empty());
    }

    // ---- duration ----

    #[test]
    fn test_duration_from_first_and_last_timestamps() {
        let mut first = msg(Role::User, "Bonjour");
        first.timestamp = Timestamp(1_000_000);
        let mut last = msg(Role::Assistant, "Au revoir");
        last.timestamp = Timestamp(1_000_000 + 5 * 60);

        let summary = ConversationSummary::from_history("s1", &[first, last]);
        assert_eq!(summary.duration_minutes, 5);
    }

    #[test]
    fn test_sub_minute_duration_rounds_to_zero() {
        let mut first = msg(Role::User, "Bonjour");
        first.timestamp = Timestamp(1_000_000);
        let mut last = msg(Role::Assistant, "Oui");
        last.timestamp = Timestamp(1_000_000 + 30);

        let summary = ConversationSummary::from_history("s1", &[first, last]);
        assert_eq!(summary.duration_minutes, 0);
    }

    // ---- confirmation records ----

    #[test]
    fn test_confirmed_actions_counted_from_system_records() {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            "action_id".to_string(),
            serde_json::Value::String("abc".to_string()),
        );
        let confirmation = ChatMessage::with_metadata(
            Role::System,
            "Action confirmée: create_booking_spa",
            metadata,
        );
        let plain_system = msg(Role::System, "Session initialisée");

        let history = vec![msg(Role::User, "massage"), confirmation, plain_system];
        let summary = ConversationSummary::from_history("s1", &history);
        assert_eq!(summary.confirmed_actions, 1);
    }
}
