//! Action engine for Bellhop.
//!
//! Detects guest intentions from free text through declarative keyword
//! rules, and manages the confirmation lifecycle of the resulting backend
//! actions: nothing with customer-facing consequences executes before an
//! explicit confirmation.

pub mod error;
pub mod intent;
pub mod ledger;
pub mod types;

pub use error::ActionError;
pub use intent::{Detection, DetectionEngine};
pub use ledger::ActionLedger;
pub use types::{ActionKind, ActionState, BackendAction, FrontendAction, Priority};
