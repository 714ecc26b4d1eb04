//! Keyword-rule intention detection.
//!
//! Each rule is a case-insensitive substring membership test of the message
//! against a declarative keyword table from the configuration. Rules are
//! independent; on a match exactly one pending action is stored in the
//! ledger, and no-match is a first-class negative result, not an error.

use bellhop_core::config::{DetectionConfig, KeywordCategory};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ActionError;
use crate::ledger::ActionLedger;
use crate::types::{ActionKind, BackendAction, Priority};

/// Machine-readable result of one rule invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Detection {
    Detected { category: String, action_id: Uuid },
    NoMatch,
}

impl Detection {
    pub fn is_match(&self) -> bool {
        matches!(self, Detection::Detected { .. })
    }

    pub fn action_id(&self) -> Option<Uuid> {
        match self {
            Detection::Detected { action_id, .. } => Some(*action_id),
            Detection::NoMatch => None,
        }
    }
}

/// Stateless rule evaluators over the startup keyword tables.
///
/// Rules are deliberately not deduplicated: re-running a rule on the same
/// message stores a fresh action with a fresh id. Deduplication, when
/// needed, is a caller responsibility.
pub struct DetectionEngine {
    rules: DetectionConfig,
}

impl DetectionEngine {
    pub fn new(rules: DetectionConfig) -> Self {
        Self { rules }
    }

    /// Detect a booking intention (restaurant, spa, room service).
    ///
    /// A recognized `hint` bypasses auto-classification; otherwise the
    /// configured categories are tried in table order and the first keyword
    /// hit wins, regardless of how many keywords matched.
    pub fn detect_booking(
        &self,
        ledger: &ActionLedger,
        message: &str,
        hint: Option<&str>,
    ) -> Result<Detection, ActionError> {
        let lowered = message.to_lowercase();

        let category = match hint.and_then(|h| self.booking_category(h)) {
            Some(cat) => Some(cat),
            None => self
                .rules
                .booking
                .iter()
                .find(|cat| contains_any(&lowered, &cat.keywords)),
        };

        let Some(category) = category else {
            return Ok(Detection::NoMatch);
        };
        let Some(kind) = ActionKind::for_booking_service(&category.name) else {
            // Category names outside the closed booking set cannot be
            // materialized as actions; treat as no match.
            tracing::warn!(category = %category.name, "Unmapped booking category");
            return Ok(Detection::NoMatch);
        };

        let matched: Vec<&str> = matched_keywords(&lowered, &category.keywords);
        let mut payload = serde_json::Map::new();
        payload.insert("service".to_string(), serde_json::json!(category.name));
        payload.insert("user_message".to_string(), serde_json::json!(message));
        payload.insert("detected_keywords".to_string(), serde_json::json!(matched));
        payload.insert(
            "timestamp".to_string(),
            serde_json::json!(bellhop_core::types::Timestamp::now().to_iso8601()),
        );

        let action = BackendAction::new(kind, payload);
        let action_id = action.id;
        ledger.store(action)?;

        tracing::info!(category = %category.name, action_id = %action_id, "Booking intention detected");
        Ok(Detection::Detected {
            category: category.name.clone(),
            action_id,
        })
    }

    /// Detect whether the message (or side-channel context) requires
    /// escalation to a human.
    ///
    /// Priority is high when any matched trigger belongs to the configured
    /// high-severity subset; escalations never wait for confirmation.
    pub fn detect_escalation(
        &self,
        ledger: &ActionLedger,
        message: &str,
        context: &str,
    ) -> Result<Detection, ActionError> {
        let message_lower = message.to_lowercase();
        let context_lower = context.to_lowercase();

        let triggered: Vec<&str> = self
            .rules
            .escalation_triggers
            .iter()
            .filter(|t| {
                let t = t.to_lowercase();
                message_lower.contains(&t) || context_lower.contains(&t)
            })
            .map(|t| t.as_str())
            .collect();

        if triggered.is_empty() {
            return Ok(Detection::NoMatch);
        }

        let priority = if triggered
            .iter()
            .any(|t| self.rules.high_severity.iter().any(|h| h == t))
        {
            Priority::High
        } else {
            Priority::Normal
        };

        let mut payload = serde_json::Map::new();
        payload.insert(
            "reason".to_string(),
            serde_json::json!("escalation_requested"),
        );
        payload.insert("triggered_words".to_string(), serde_json::json!(triggered));
        payload.insert("user_message".to_string(), serde_json::json!(message));
        payload.insert("context".to_string(), serde_json::json!(context));
        payload.insert(
            "priority".to_string(),
            serde_json::json!(priority.to_string()),
        );

        let action = BackendAction::new(ActionKind::EscalateHuman, payload);
        let action_id = action.id;
        ledger.store(action)?;

        tracing::info!(action_id = %action_id, priority = %priority, "Escalation detected");
        Ok(Detection::Detected {
            category: "escalation".to_string(),
            action_id,
        })
    }

    /// Detect the need to notify hotel staff.
    pub fn detect_notification(
        &self,
        ledger: &ActionLedger,
        message: &str,
        hint: Option<&str>,
    ) -> Result<Detection, ActionError> {
        let lowered = message.to_lowercase();

        let category = match hint.and_then(|h| self.notification_category(h)) {
            Some(cat) => Some(cat),
            None => self
                .rules
                .notification
                .iter()
                .find(|cat| contains_any(&lowered, &cat.keywords)),
        };

        let Some(category) = category else {
            return Ok(Detection::NoMatch);
        };

        let mut payload = serde_json::Map::new();
        payload.insert(
            "notification_type".to_string(),
            serde_json::json!(category.name),
        );
        payload.insert("message".to_string(), serde_json::json!(message));
        payload.insert("recipient".to_string(), serde_json::json!("hotel_staff"));
        payload.insert("urgency".to_string(), serde_json::json!("normal"));

        let action = BackendAction::new(ActionKind::SendNotification, payload);
        let action_id = action.id;
        ledger.store(action)?;

        tracing::info!(notification_type = %category.name, action_id = %action_id, "Notification need detected");
        Ok(Detection::Detected {
            category: category.name.clone(),
            action_id,
        })
    }

    /// Detect a request for the concierge desk.
    pub fn detect_concierge(
        &self,
        ledger: &ActionLedger,
        message: &str,
    ) -> Result<Detection, ActionError> {
        let lowered = message.to_lowercase();
        let matched: Vec<&str> = matched_keywords(&lowered, &self.rules.concierge_keywords);

        if matched.is_empty() {
            return Ok(Detection::NoMatch);
        }

        let mut payload = serde_json::Map::new();
        payload.insert(
            "request_type".to_string(),
            serde_json::json!("general_assistance"),
        );
        payload.insert("keywords".to_string(), serde_json::json!(matched));
        payload.insert("message".to_string(), serde_json::json!(message));
        payload.insert("service_level".to_string(), serde_json::json!("standard"));

        let action = BackendAction::new(ActionKind::ConciergeRequest, payload);
        let action_id = action.id;
        ledger.store(action)?;

        tracing::info!(action_id = %action_id, "Concierge request detected");
        Ok(Detection::Detected {
            category: "concierge".to_string(),
            action_id,
        })
    }

    fn booking_category(&self, name: &str) -> Option<&KeywordCategory> {
        self.rules.booking.iter().find(|c| c.name == name)
    }

    fn notification_category(&self, name: &str) -> Option<&KeywordCategory> {
        self.rules.notification.iter().find(|c| c.name == name)
    }
}

fn contains_any(lowered: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lowered.contains(&k.to_lowercase()))
}

fn matched_keywords<'a>(lowered: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|k| lowered.contains(&k.to_lowercase()))
        .map(|k| k.as_str())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionState;

    fn engine() -> DetectionEngine {
        DetectionEngine::new(DetectionConfig::default())
    }

    // ---- booking ----

    #[test]
    fn test_booking_restaurant_deterministic() {
        let eng = engine();
        let ledger = ActionLedger::new();

        for _ in 0..5 {
            let detection = eng
                .detect_booking(&ledger, "J'ai faim, je veux manger", None)
                .unwrap();
            match detection {
                Detection::Detected { category, .. } => assert_eq!(category, "restaurant"),
                Detection::NoMatch => panic!("expected restaurant detection"),
            }
        }

        let pending = ledger.pending();
        assert_eq!(pending.len(), 5);
        for action in &pending {
            assert_eq!(action.kind, ActionKind::BookingRestaurant);
            assert!(action.confirmation_required);
            assert_eq!(action.state, ActionState::Pending);
        }
    }

    #[test]
    fn test_booking_payload_shape() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_booking(&ledger, "Je voudrais un massage au spa", None)
            .unwrap();
        let id = detection.action_id().unwrap();

        let pending = ledger.pending();
        let action = pending.iter().find(|a| a.id == id).unwrap();
        assert_eq!(action.kind, ActionKind::BookingSpa);
        assert_eq!(action.payload["service"], "spa");
        assert_eq!(
            action.payload["user_message"],
            "Je voudrais un massage au spa"
        );
        let keywords = action.payload["detected_keywords"].as_array().unwrap();
        assert!(keywords.contains(&serde_json::json!("massage")));
        assert!(keywords.contains(&serde_json::json!("spa")));
        assert!(action.payload.contains_key("timestamp"));
    }

    #[test]
    fn test_booking_priority_order_breaks_ties() {
        let eng = engine();
        let ledger = ActionLedger::new();
        // "chambre" (room_service) and "faim" (restaurant) both match;
        // restaurant wins because it comes first in the table.
        let detection = eng
            .detect_booking(&ledger, "J'ai faim dans ma chambre", None)
            .unwrap();
        match detection {
            Detection::Detected { category, .. } => assert_eq!(category, "restaurant"),
            Detection::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn test_booking_hint_overrides_classification() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_booking(&ledger, "J'ai faim", Some("spa"))
            .unwrap();
        match detection {
            Detection::Detected { category, .. } => assert_eq!(category, "spa"),
            Detection::NoMatch => panic!("expected a match"),
        }
        assert_eq!(ledger.pending()[0].kind, ActionKind::BookingSpa);
    }

    #[test]
    fn test_booking_unrecognized_hint_falls_back() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_booking(&ledger, "J'ai faim", Some("casino"))
            .unwrap();
        match detection {
            Detection::Detected { category, .. } => assert_eq!(category, "restaurant"),
            Detection::NoMatch => panic!("expected fallback to auto-classification"),
        }
    }

    #[test]
    fn test_booking_case_insensitive() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng.detect_booking(&ledger, "JE VEUX MANGER", None).unwrap();
        assert!(detection.is_match());
    }

    #[test]
    fn test_booking_rerun_produces_new_id() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let first = eng.detect_booking(&ledger, "j'ai faim", None).unwrap();
        let second = eng.detect_booking(&ledger, "j'ai faim", None).unwrap();
        assert_ne!(first.action_id(), second.action_id());
        assert_eq!(ledger.pending().len(), 2);
    }

    // ---- escalation ----

    #[test]
    fn test_escalation_high_priority_no_confirmation() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_escalation(&ledger, "urgence, je veux parler au responsable", "")
            .unwrap();
        assert!(detection.is_match());

        let pending = ledger.pending();
        assert_eq!(pending.len(), 1);
        let action = &pending[0];
        assert_eq!(action.kind, ActionKind::EscalateHuman);
        assert!(!action.confirmation_required);
        assert_eq!(action.payload["priority"], "high");
        let triggered = action.payload["triggered_words"].as_array().unwrap();
        assert!(triggered.contains(&serde_json::json!("urgence")));
        assert!(triggered.contains(&serde_json::json!("responsable")));
    }

    #[test]
    fn test_escalation_normal_priority() {
        let eng = engine();
        let ledger = ActionLedger::new();
        eng.detect_escalation(&ledger, "je veux parler au responsable", "")
            .unwrap();
        assert_eq!(ledger.pending()[0].payload["priority"], "normal");
    }

    #[test]
    fn test_escalation_trigger_in_context_only() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_escalation(&ledger, "d'accord", "le client demande un remboursement")
            .unwrap();
        assert!(detection.is_match());
        let triggered = ledger.pending()[0].payload["triggered_words"]
            .as_array()
            .unwrap()
            .clone();
        assert!(triggered.contains(&serde_json::json!("remboursement")));
    }

    #[test]
    fn test_escalation_payload_records_context() {
        let eng = engine();
        let ledger = ActionLedger::new();
        eng.detect_escalation(&ledger, "j'ai une plainte", "chambre 412")
            .unwrap();
        let action = &ledger.pending()[0];
        assert_eq!(action.payload["reason"], "escalation_requested");
        assert_eq!(action.payload["user_message"], "j'ai une plainte");
        assert_eq!(action.payload["context"], "chambre 412");
        assert_eq!(action.payload["priority"], "high");
    }

    // ---- notification ----

    #[test]
    fn test_notification_special_request() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_notification(&ledger, "J'ai une allergie aux arachides", None)
            .unwrap();
        match detection {
            Detection::Detected { category, .. } => assert_eq!(category, "special_request"),
            Detection::NoMatch => panic!("expected special_request"),
        }

        let action = &ledger.pending()[0];
        assert_eq!(action.kind, ActionKind::SendNotification);
        assert!(!action.confirmation_required);
        assert_eq!(action.payload["notification_type"], "special_request");
        assert_eq!(action.payload["recipient"], "hotel_staff");
        assert_eq!(action.payload["urgency"], "normal");
    }

    #[test]
    fn test_notification_hint_selects_type() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_notification(&ledger, "rien de particulier", Some("vip_alert"))
            .unwrap();
        match detection {
            Detection::Detected { category, .. } => assert_eq!(category, "vip_alert"),
            Detection::NoMatch => panic!("expected vip_alert via hint"),
        }
    }

    // ---- concierge ----

    #[test]
    fn test_concierge_request_detected() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let detection = eng
            .detect_concierge(&ledger, "Pouvez-vous m'appeler un taxi pour le théâtre ?")
            .unwrap();
        assert!(detection.is_match());

        let action = &ledger.pending()[0];
        assert_eq!(action.kind, ActionKind::ConciergeRequest);
        assert!(action.confirmation_required);
        assert_eq!(action.payload["request_type"], "general_assistance");
        assert_eq!(action.payload["service_level"], "standard");
        let keywords = action.payload["keywords"].as_array().unwrap();
        assert!(keywords.contains(&serde_json::json!("taxi")));
        assert!(keywords.contains(&serde_json::json!("théâtre")));
    }

    // ---- no-match passthrough ----

    #[test]
    fn test_no_match_across_all_rules_stores_nothing() {
        let eng = engine();
        let ledger = ActionLedger::new();
        let message = "Quelle est la capitale de la France ?";

        assert_eq!(
            eng.detect_booking(&ledger, message, None).unwrap(),
            Detection::NoMatch
        );
        assert_eq!(
            eng.detect_escalation(&ledger, message, "").unwrap(),
            Detection::NoMatch
        );
        assert_eq!(
            eng.detect_notification(&ledger, message, None).unwrap(),
            Detection::NoMatch
        );
        assert_eq!(
            eng.detect_concierge(&ledger, message).unwrap(),
            Detection::NoMatch
        );

        assert!(ledger.pending().is_empty());
        assert!(ledger.completed().is_empty());
    }

    // ---- Detection descriptor ----

    #[test]
    fn test_detection_serde_shape() {
        let detection = Detection::Detected {
            category: "restaurant".to_string(),
            action_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&detection).unwrap();
        assert_eq!(json["result"], "detected");
        assert_eq!(json["category"], "restaurant");

        let no_match = serde_json::to_value(Detection::NoMatch).unwrap();
        assert_eq!(no_match["result"], "no_match");
    }

    #[test]
    fn test_detection_accessors() {
        assert!(!Detection::NoMatch.is_match());
        assert!(Detection::NoMatch.action_id().is_none());
        let id = Uuid::new_v4();
        let d = Detection::Detected {
            category: "spa".to_string(),
            action_id: id,
        };
        assert!(d.is_match());
        assert_eq!(d.action_id(), Some(id));
    }
}
