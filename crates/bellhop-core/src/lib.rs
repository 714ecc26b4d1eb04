//! Shared foundation for the Bellhop guest-assistant core.
//!
//! Provides the configuration surface, the top-level error type, message and
//! timestamp primitives, and tracing initialization used by the action and
//! chat crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::BellhopConfig;
pub use error::{BellhopError, Result};
pub use types::{ChatMessage, Role, Timestamp};
