//! Game mechanics vocabulary: survival stats, player choices, endings, objectives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four survival resources tracked for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurvivalStat {
    Hunger,
    Thirst,
    Temperature,
    Energy,
}

impl SurvivalStat {
    /// All stats in canonical order.
    pub const ALL: [SurvivalStat; 4] = [
        SurvivalStat::Hunger,
        SurvivalStat::Thirst,
        SurvivalStat::Temperature,
        SurvivalStat::Energy,
    ];

    /// Position of this stat in [`SurvivalStat::ALL`].
    pub fn index(self) -> usize {
        match self {
            SurvivalStat::Hunger => 0,
            SurvivalStat::Thirst => 1,
            SurvivalStat::Temperature => 2,
            SurvivalStat::Energy => 3,
        }
    }
}

impl fmt::Display for SurvivalStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurvivalStat::Hunger => "hunger",
            SurvivalStat::Thirst => "thirst",
            SurvivalStat::Temperature => "temperature",
            SurvivalStat::Energy => "energy",
        };
        f.write_str(name)
    }
}

/// The binary fork offered once the experiment is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayerChoice {
    #[default]
    None,
    /// Keep surviving inside the experiment.
    ContinueSurvival,
    /// Wake the other subjects and sabotage the experiment.
    StartRebellion,
}

/// Terminal outcomes. Exactly one is reached per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndingType {
    /// Sustained health through the graduation window.
    SurvivalSuccess,
    /// Went critical during the window, or died.
    SurvivalFailure,
    /// Every rebellion objective completed.
    RebellionSuccess,
    /// Died while the rebellion was under way.
    RebellionFailure,
}

impl EndingType {
    /// Short line shown when the ending is reached.
    pub fn summary(&self) -> &'static str {
        match self {
            EndingType::SurvivalSuccess => "You've graduated from the experiment!",
            EndingType::SurvivalFailure => "The experiment claims another failure...",
            EndingType::RebellionSuccess => "You've freed yourself and the other subjects!",
            EndingType::RebellionFailure => {
                "The simulation resets, but you retain fragments of memory..."
            }
        }
    }

    /// Whether this ending belongs to the rebellion branch.
    pub fn is_rebellion(&self) -> bool {
        matches!(self, EndingType::RebellionSuccess | EndingType::RebellionFailure)
    }
}

/// Categories of rebellion objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectiveCategory {
    /// A stasis pod holding another test subject; completed when awakened.
    StasisPod,
    /// An experiment control terminal; completed when sabotaged.
    ControlTerminal,
}

impl ObjectiveCategory {
    pub const ALL: [ObjectiveCategory; 2] =
        [ObjectiveCategory::StasisPod, ObjectiveCategory::ControlTerminal];

    /// Interaction prompt for a pending or completed instance.
    pub fn interaction_text(&self, completed: bool) -> &'static str {
        match (self, completed) {
            (ObjectiveCategory::StasisPod, false) => "Wake Test Subject",
            (ObjectiveCategory::StasisPod, true) => "Subject Awakened",
            (ObjectiveCategory::ControlTerminal, false) => "Sabotage Terminal",
            (ObjectiveCategory::ControlTerminal, true) => "Terminal Sabotaged",
        }
    }
}

/// Item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Food,
    Water,
    Tool,
    Material,
    Clothing,
    Fuel,
    Medicine,
    AlienArtifact,
}
