//! Scripted narrative events and the clues they leave behind.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a spawned clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClueId(pub Uuid);

impl ClueId {
    /// Create a new random clue ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scripted story beat, fired once when simulated time reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub id: String,

    /// Simulated seconds since session start.
    pub trigger_secs: f64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Set once the event has fired. Never reset within a session.
    #[serde(skip)]
    pub triggered: bool,
}

impl NarrativeEvent {
    pub fn new(id: impl Into<String>, trigger_secs: f64) -> Self {
        Self {
            id: id.into(),
            trigger_secs,
            title: String::new(),
            description: String::new(),
            triggered: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Trigger time as a `Duration`. Values too large saturate, so such an
    /// event never comes due.
    pub fn trigger_time(&self) -> Duration {
        Duration::try_from_secs_f64(self.trigger_secs).unwrap_or(Duration::MAX)
    }

    /// Whether this event should fire at `elapsed`.
    pub fn is_due(&self, elapsed: Duration) -> bool {
        !self.triggered && elapsed >= self.trigger_time()
    }

    /// Build the clue the world places when this event fires.
    pub fn clue(&self) -> Clue {
        Clue {
            id: ClueId::new(),
            note_id: self.id.clone(),
            title: self.title.clone(),
            content: self.description.clone(),
        }
    }
}

/// A readable note placed in the world when a narrative event fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: ClueId,
    /// Note id reported back through `discover_note` when the player reads it.
    pub note_id: String,
    pub title: String,
    pub content: String,
}

/// A note the player has read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredNote {
    pub note_id: String,
    pub content: String,
}
