//! Session configuration: survival tuning plus the narrative script.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use survival_rules::{Inventory, SurvivalConfig};

use crate::error::{Result, SessionError};
use crate::timeline::NarrativeEvent;

/// Narrative script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Events in ascending trigger order.
    pub events: Vec<NarrativeEvent>,
    /// Id of the event that reveals the experiment and unlocks the choice.
    pub final_event_id: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            events: vec![
                NarrativeEvent::new("first_anomaly", 300.0)
                    .with_title("Strange Observations")
                    .with_description(
                        "The trees... they seem too perfect. Too symmetrical. And the wildlife moves in patterns that feel almost... programmed.",
                    ),
                NarrativeEvent::new("electronic_interference", 900.0)
                    .with_title("Electronic Disturbance")
                    .with_description(
                        "A strange humming fills the air. Looking up, you notice what looks like a bird, but its movement is too mechanical, too precise.",
                    ),
                NarrativeEvent::new("barrier_discovery", 1800.0)
                    .with_title("The Truth Revealed")
                    .with_description(
                        "Walking toward the forest edge, your hand touches something invisible but solid. A shimmer in the air reveals a dome-like barrier. This isn't a forest. This is a cage.",
                    ),
            ],
            final_event_id: "barrier_discovery".to_string(),
        }
    }
}

/// Ending evaluation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceConfig {
    /// Simulated seconds the player must stay out of critical range after
    /// choosing to keep surviving.
    pub survival_window_secs: f64,
}

impl ChoiceConfig {
    /// Window length. Values too large for a `Duration` saturate.
    pub fn survival_window(&self) -> Duration {
        Duration::try_from_secs_f64(self.survival_window_secs).unwrap_or(Duration::MAX)
    }
}

impl Default for ChoiceConfig {
    fn default() -> Self {
        Self {
            survival_window_secs: 300.0,
        }
    }
}

/// Full session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub survival: SurvivalConfig,
    pub narrative: NarrativeConfig,
    pub choice: ChoiceConfig,
    pub inventory_slots: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            survival: SurvivalConfig::default(),
            narrative: NarrativeConfig::default(),
            choice: ChoiceConfig::default(),
            inventory_slots: Inventory::DEFAULT_SLOTS,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check survival tuning and window length. The narrative script is
    /// checked when the timeline is built.
    pub fn validate(&self) -> Result<()> {
        self.survival.validate()?;

        let window = self.choice.survival_window_secs;
        if Duration::try_from_secs_f64(window).is_err() {
            return Err(SessionError::InvalidConfig(format!(
                "survival window must be a non-negative representable duration, got {window}"
            )));
        }
        if self.inventory_slots == 0 {
            return Err(SessionError::InvalidConfig(
                "inventory needs at least one slot".to_string(),
            ));
        }
        Ok(())
    }
}
