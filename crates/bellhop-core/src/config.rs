use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BellhopError, Result};

/// Top-level configuration for the Bellhop assistant core.
///
/// Loaded from a TOML file at startup. Each section corresponds to one
/// component; the detection keyword tables are static data once loaded and
/// are never mutated at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BellhopConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
}

impl BellhopConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BellhopConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| BellhopError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Session memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of messages retained in the rolling context window.
    pub window_turns: usize,
    /// Number of recent messages rendered as oracle context per turn.
    pub recent_context_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_turns: 20,
            recent_context_turns: 5,
        }
    }
}

/// Reasoning-oracle boundary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Upper bound on a single oracle call, in seconds.
    pub timeout_seconds: u64,
    /// Assistant message appended when the oracle fails or times out.
    pub fallback_message: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            fallback_message:
                "Désolé, je rencontre un problème technique. Contactez la réception au +33 1 23 45 67 89"
                    .to_string(),
        }
    }
}

/// Keyword tables driving intention detection.
///
/// Category order is significant: auto-classification tries categories in
/// the order they appear here and the first keyword hit wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Booking categories in priority order, each with its keyword set.
    pub booking: Vec<KeywordCategory>,
    /// Words that trigger escalation to a human.
    pub escalation_triggers: Vec<String>,
    /// Escalation triggers that raise priority to high.
    pub high_severity: Vec<String>,
    /// Staff-notification categories in priority order.
    pub notification: Vec<KeywordCategory>,
    /// Words that indicate a concierge request.
    pub concierge_keywords: Vec<String>,
}

/// A named category with its keyword set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordCategory {
    fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            booking: vec![
                KeywordCategory::new(
                    "restaurant",
                    &["manger", "faim", "dîner", "déjeuner", "table", "restaurant", "repas"],
                ),
                KeywordCategory::new(
                    "spa",
                    &["massage", "détente", "relaxer", "spa", "soin", "bien-être"],
                ),
                KeywordCategory::new(
                    "room_service",
                    &["chambre", "livrer", "apporter", "room service", "service chambre"],
                ),
            ],
            escalation_triggers: vec![
                "parler à quelqu'un".to_string(),
                "responsable".to_string(),
                "manager".to_string(),
                "plainte".to_string(),
                "problème grave".to_string(),
                "insatisfait".to_string(),
                "remboursement".to_string(),
                "annulation".to_string(),
                "urgence".to_string(),
                "aide humaine".to_string(),
            ],
            high_severity: vec![
                "urgence".to_string(),
                "grave".to_string(),
                "plainte".to_string(),
            ],
            notification: vec![
                KeywordCategory::new(
                    "reservation_confirmation",
                    &["confirmé", "réservé", "booking confirmé"],
                ),
                KeywordCategory::new(
                    "service_update",
                    &["changement", "modification", "update", "mise à jour"],
                ),
                KeywordCategory::new(
                    "special_request",
                    &["allergie", "handicap", "demande spéciale", "besoin particulier"],
                ),
                KeywordCategory::new(
                    "vip_alert",
                    &["vip", "célèbre", "important", "personnalité"],
                ),
            ],
            concierge_keywords: vec![
                "transport".to_string(),
                "taxi".to_string(),
                "réservation externe".to_string(),
                "théâtre".to_string(),
                "spectacle".to_string(),
                "restaurant ville".to_string(),
                "activité".to_string(),
                "visite".to_string(),
                "tour".to_string(),
                "excursion".to_string(),
                "shopping".to_string(),
                "recommandation".to_string(),
                "billet".to_string(),
                "ticket".to_string(),
            ],
        }
    }
}
