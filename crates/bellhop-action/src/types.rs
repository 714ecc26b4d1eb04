//! Core types and value objects for the action engine.
//!
//! Defines action kinds, lifecycle states, and the backend action itself
//! together with its two wire formats: the execution directive handed to
//! the backend and the descriptor rendered for the frontend.

use bellhop_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The closed set of backend action kinds.
///
/// `Display` produces the wire string the backend execution system parses;
/// booking kinds carry their service subtype as a suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "create_booking_restaurant")]
    BookingRestaurant,
    #[serde(rename = "create_booking_spa")]
    BookingSpa,
    #[serde(rename = "create_booking_room_service")]
    BookingRoomService,
    #[serde(rename = "escalate_to_human")]
    EscalateHuman,
    #[serde(rename = "send_notification")]
    SendNotification,
    #[serde(rename = "concierge_request")]
    ConciergeRequest,
}

impl ActionKind {
    /// Map a booking service name to its action kind.
    pub fn for_booking_service(service: &str) -> Option<Self> {
        match service {
            "restaurant" => Some(ActionKind::BookingRestaurant),
            "spa" => Some(ActionKind::BookingSpa),
            "room_service" => Some(ActionKind::BookingRoomService),
            _ => None,
        }
    }

    /// Whether actions of this kind have customer-facing consequences and
    /// therefore require explicit confirmation before execution.
    pub fn requires_confirmation(&self) -> bool {
        match self {
            ActionKind::BookingRestaurant
            | ActionKind::BookingSpa
            | ActionKind::BookingRoomService
            | ActionKind::ConciergeRequest => true,
            ActionKind::EscalateHuman | ActionKind::SendNotification => false,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::BookingRestaurant => write!(f, "create_booking_restaurant"),
            ActionKind::BookingSpa => write!(f, "create_booking_spa"),
            ActionKind::BookingRoomService => write!(f, "create_booking_room_service"),
            ActionKind::EscalateHuman => write!(f, "escalate_to_human"),
            ActionKind::SendNotification => write!(f, "send_notification"),
            ActionKind::ConciergeRequest => write!(f, "concierge_request"),
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_booking_restaurant" => Ok(ActionKind::BookingRestaurant),
            "create_booking_spa" => Ok(ActionKind::BookingSpa),
            "create_booking_room_service" => Ok(ActionKind::BookingRoomService),
            "escalate_to_human" => Ok(ActionKind::EscalateHuman),
            "send_notification" => Ok(ActionKind::SendNotification),
            "concierge_request" => Ok(ActionKind::ConciergeRequest),
            _ => Err(format!("Unknown action kind: {}", s)),
        }
    }
}

/// Lifecycle states of a backend action.
///
/// Pending -> Confirmed and Pending -> Cancelled are the only transitions;
/// both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionState::Pending => write!(f, "pending"),
            ActionState::Confirmed => write!(f, "confirmed"),
            ActionState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Urgency attached to an escalation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

// =============================================================================
// BackendAction
// =============================================================================

/// A deferred unit of backend work awaiting or having received confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendAction {
    pub id: Uuid,
    pub kind: ActionKind,
    pub payload: serde_json::Map<String, serde_json::Value>,
    pub confirmation_required: bool,
    pub state: ActionState,
    pub created_at: Timestamp,
}

impl BackendAction {
    /// Create a pending action with a fresh random id.
    ///
    /// `confirmation_required` is fixed here from the kind and never changes
    /// afterwards.
    pub fn new(kind: ActionKind, payload: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            confirmation_required: kind.requires_confirmation(),
            state: ActionState::Pending,
            created_at: Timestamp::now(),
        }
    }

    /// Render the execution directive the backend execution system parses.
    ///
    /// The envelope wraps a JSON object with exactly three keys: `name`,
    /// `arguments`, and `id`. Pure: the same action always produces the same
    /// string.
    pub fn to_directive(&self) -> String {
        let body = serde_json::json!({
            "name": self.kind.to_string(),
            "arguments": self.payload,
            "id": self.id.to_string(),
        });
        format!("<tool_call>\n{}\n</tool_call>", body)
    }

    /// Render the descriptor a UI layer uses for confirmation prompts.
    pub fn to_frontend(&self) -> FrontendAction {
        FrontendAction {
            action_type: self.kind.to_string(),
            data: self.payload.clone(),
            confirmation_needed: self.confirmation_required,
            id: self.id.to_string(),
        }
    }
}

/// Descriptor of a pending action as exposed to frontend layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendAction {
    pub action_type: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub confirmation_needed: bool,
    pub id: String,
}

// =============================================================================
// Tests
// =============================================================================
