//! Game events and the session event bus.
//!
//! Every component publishes typed [`GameEvent`]s through a shared
//! [`EventBus`]. External collaborators (UI, audio) subscribe; the simulation
//! never depends on whether anyone is listening.

mod bus;

pub use bus::*;

use serde::{Deserialize, Serialize};

use crate::mechanics::{EndingType, PlayerChoice, SurvivalStat};

/// Everything the core can announce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A resource changed; `percentage` is in [0, 1].
    StatChanged { stat: SurvivalStat, percentage: f32 },

    /// A resource is at or below the critical threshold.
    /// Level-triggered: sent on every mutation while the condition holds.
    StatCritical { stat: SurvivalStat },

    /// A resource hit zero. Sent once per session.
    PlayerDied,

    /// The narrative stage counter advanced.
    NarrativeStageChanged { stage: u32 },

    /// Narrative content to display for a fired timeline event.
    NarrativeDisplayed {
        event_id: String,
        title: String,
        description: String,
    },

    /// A note was read for the first time.
    NoteDiscovered { note_id: String, content: String },

    /// The final timeline event fired. Sent once per session.
    ExperimentRevealed,

    /// The choice system became available.
    ChoiceSystemEnabled,

    /// The player committed to a branch.
    ChoiceMade { choice: PlayerChoice },

    /// Fraction of rebellion objectives completed, in [0, 1].
    RebellionProgressChanged { progress: f32 },

    /// The session reached its terminal ending.
    GameEnding { ending: EndingType },

    /// Day/night boundary crossed.
    DayNightChanged { is_day: bool },

    /// Inventory contents changed.
    InventoryChanged { slots_used: usize },

    GamePaused,
    GameResumed,
}

impl GameEvent {
    /// Stable kebab-case name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::StatChanged { .. } => "stat-changed",
            GameEvent::StatCritical { .. } => "stat-critical",
            GameEvent::PlayerDied => "player-died",
            GameEvent::NarrativeStageChanged { .. } => "stage-changed",
            GameEvent::NarrativeDisplayed { .. } => "narrative-displayed",
            GameEvent::NoteDiscovered { .. } => "note-discovered",
            GameEvent::ExperimentRevealed => "experiment-revealed",
            GameEvent::ChoiceSystemEnabled => "choice-system-enabled",
            GameEvent::ChoiceMade { .. } => "choice-made",
            GameEvent::RebellionProgressChanged { .. } => "rebellion-progress-changed",
            GameEvent::GameEnding { .. } => "game-ending",
            GameEvent::DayNightChanged { .. } => "day-night-changed",
            GameEvent::InventoryChanged { .. } => "inventory-changed",
            GameEvent::GamePaused => "game-paused",
            GameEvent::GameResumed => "game-resumed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(GameEvent::PlayerDied.name(), "player-died");
        assert_eq!(
            GameEvent::StatCritical {
                stat: SurvivalStat::Thirst
            }
            .name(),
            "stat-critical"
        );
        assert_eq!(
            GameEvent::GameEnding {
                ending: EndingType::SurvivalSuccess
            }
            .name(),
            "game-ending"
        );
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(GameEvent::NarrativeStageChanged { stage: 2 }).unwrap();
        assert_eq!(json["type"], "narrative_stage_changed");
        assert_eq!(json["stage"], 2);
    }
}
