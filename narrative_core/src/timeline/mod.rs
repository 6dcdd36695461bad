//! Time-gated narrative events.
//!
//! The timeline holds the scripted story beats in trigger order. Each tick
//! the session hands it the simulated survival time; every event whose time
//! has come fires once, in order, advancing the narrative stage and
//! escalating the environment. The designated final event reveals the
//! experiment, which unlocks the player's choice.

mod event;

pub use event::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use survival_rules::{EventBus, GameEvent};
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::world::{Escalation, World};

/// What one [`NarrativeTimeline::update`] fired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineReport {
    /// Ids of the events fired, in firing order.
    pub fired: Vec<String>,
    /// The experiment was revealed during this update.
    pub revealed: bool,
}

impl TimelineReport {
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

/// Read-only view of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub stage: u32,
    pub experiment_revealed: bool,
    pub fired: Vec<String>,
    pub next_event: Option<String>,
    pub discovered_notes: Vec<DiscoveredNote>,
}

#[derive(Debug)]
pub struct NarrativeTimeline {
    events: Vec<NarrativeEvent>,
    final_event_id: String,
    stage: u32,
    experiment_revealed: bool,
    notes: Vec<DiscoveredNote>,
    note_ids: HashSet<String>,
    bus: EventBus,
}

impl NarrativeTimeline {
    /// Build a timeline from a script.
    ///
    /// Trigger times must be finite, non-negative and strictly increasing,
    /// ids unique, and `final_event_id` one of the events.
    pub fn new(
        events: Vec<NarrativeEvent>,
        final_event_id: impl Into<String>,
        bus: EventBus,
    ) -> Result<Self> {
        let final_event_id = final_event_id.into();

        let mut ids = HashSet::new();
        let mut previous: Option<&NarrativeEvent> = None;
        for event in &events {
            if Duration::try_from_secs_f64(event.trigger_secs).is_err() {
                return Err(SessionError::InvalidConfig(format!(
                    "event '{}' has invalid trigger time {}",
                    event.id, event.trigger_secs
                )));
            }
            if !ids.insert(event.id.as_str()) {
                return Err(SessionError::InvalidConfig(format!(
                    "duplicate narrative event '{}'",
                    event.id
                )));
            }
            if let Some(prev) = previous {
                if event.trigger_secs <= prev.trigger_secs {
                    return Err(SessionError::InvalidConfig(format!(
                        "event '{}' at {}s must come after '{}' at {}s",
                        event.id, event.trigger_secs, prev.id, prev.trigger_secs
                    )));
                }
            }
            previous = Some(event);
        }
        if !ids.contains(final_event_id.as_str()) {
            return Err(SessionError::InvalidConfig(format!(
                "final event '{final_event_id}' is not in the script"
            )));
        }

        let events = events
            .into_iter()
            .map(|mut e| {
                e.triggered = false;
                e
            })
            .collect();

        Ok(Self {
            events,
            final_event_id,
            stage: 0,
            experiment_revealed: false,
            notes: Vec::new(),
            note_ids: HashSet::new(),
            bus,
        })
    }

    /// Fire every event due at `elapsed`.
    ///
    /// Events fire individually and in order even when a single update
    /// crosses several trigger times.
    pub fn update(&mut self, elapsed: Duration, world: &mut dyn World) -> TimelineReport {
        let mut report = TimelineReport::default();

        for i in 0..self.events.len() {
            if !self.events[i].is_due(elapsed) {
                continue;
            }
            self.events[i].triggered = true;
            self.stage += 1;

            let event = &self.events[i];
            info!(event = %event.id, stage = self.stage, "narrative event");
            self.bus.publish(GameEvent::NarrativeStageChanged { stage: self.stage });
            self.bus.publish(GameEvent::NarrativeDisplayed {
                event_id: event.id.clone(),
                title: event.title.clone(),
                description: event.description.clone(),
            });

            if let Some(escalation) = Escalation::for_stage(self.stage) {
                world.escalate_environment(escalation);
            }
            world.spawn_clue(&event.clue());
            report.fired.push(event.id.clone());

            if event.id == self.final_event_id && !self.experiment_revealed {
                self.experiment_revealed = true;
                report.revealed = true;
                info!("experiment revealed");
                self.bus.publish(GameEvent::ExperimentRevealed);
            }
        }

        report
    }

    /// Record a note the player read. Returns `false` for a note already
    /// discovered.
    pub fn discover_note(&mut self, note_id: impl Into<String>, content: impl Into<String>) -> bool {
        let note_id = note_id.into();
        if self.note_ids.contains(&note_id) {
            debug!(note = %note_id, "note already discovered");
            return false;
        }

        let note = DiscoveredNote {
            note_id: note_id.clone(),
            content: content.into(),
        };
        self.note_ids.insert(note_id.clone());
        self.bus.publish(GameEvent::NoteDiscovered {
            note_id,
            content: note.content.clone(),
        });
        self.notes.push(note);
        true
    }

    pub fn current_stage(&self) -> u32 {
        self.stage
    }

    pub fn experiment_revealed(&self) -> bool {
        self.experiment_revealed
    }

    pub fn final_event_id(&self) -> &str {
        &self.final_event_id
    }

    pub fn events(&self) -> &[NarrativeEvent] {
        &self.events
    }

    /// Next event that has not fired yet.
    pub fn next_event(&self) -> Option<&NarrativeEvent> {
        self.events.iter().find(|e| !e.triggered)
    }

    /// Notes in discovery order.
    pub fn discovered_notes(&self) -> &[DiscoveredNote] {
        &self.notes
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            stage: self.stage,
            experiment_revealed: self.experiment_revealed,
            fired: self
                .events
                .iter()
                .filter(|e| e.triggered)
                .map(|e| e.id.clone())
                .collect(),
            next_event: self.next_event().map(|e| e.id.clone()),
            discovered_notes: self.notes.clone(),
        }
    }
}
