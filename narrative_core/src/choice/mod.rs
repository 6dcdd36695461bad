//! The fork after the reveal, and the endings it leads to.
//!
//! ```text
//! Locked --unlock--> Unlocked --ContinueSurvival--> Survival --+
//!                        |                                     +--> Ended
//!                        +--StartRebellion-------> Rebellion --+
//! ```
//!
//! The player's choice is write-once. Each branch evaluates its own win and
//! loss conditions, and whichever resolves first produces the session's only
//! ending.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use survival_rules::{EndingType, EventBus, GameEvent, PlayerChoice, ResourcePool};
use tracing::{debug, info, warn};

/// Resolver phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoicePhase {
    /// The experiment has not been revealed yet.
    Locked,
    /// Waiting for the player's choice.
    Unlocked,
    /// Surviving out the graduation window.
    Survival,
    /// Objectives are active.
    Rebellion,
    /// An ending was reached.
    Ended,
}

/// Read-only view of the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSnapshot {
    pub phase: ChoicePhase,
    pub current_choice: PlayerChoice,
    pub choice_made: bool,
    pub ending: Option<EndingType>,
    /// Seconds left in the survival window, while on that branch.
    pub survival_remaining_secs: Option<f64>,
}

#[derive(Debug)]
pub struct ChoiceResolver {
    window: Duration,
    bus: EventBus,
    phase: ChoicePhase,
    current_choice: PlayerChoice,
    choice_made: bool,
    survival_started: Option<Duration>,
    ending: Option<EndingType>,
}

impl ChoiceResolver {
    /// `window` is how long the player must stay out of critical range on the
    /// survival branch.
    pub fn new(window: Duration, bus: EventBus) -> Self {
        Self {
            window,
            bus,
            phase: ChoicePhase::Locked,
            current_choice: PlayerChoice::None,
            choice_made: false,
            survival_started: None,
            ending: None,
        }
    }

    /// Offer the choice. Returns `true` if this call unlocked it.
    pub fn unlock(&mut self) -> bool {
        if self.phase != ChoicePhase::Locked {
            return false;
        }
        self.phase = ChoicePhase::Unlocked;
        info!("choice system enabled");
        self.bus.publish(GameEvent::ChoiceSystemEnabled);
        true
    }

    /// Bind the player's choice at simulated time `now`.
    ///
    /// Only the first real choice after unlocking counts. Returns whether
    /// this call bound it.
    pub fn make_choice(&mut self, choice: PlayerChoice, now: Duration) -> bool {
        let next = match choice {
            PlayerChoice::None => {
                debug!("ignoring empty choice");
                return false;
            }
            PlayerChoice::ContinueSurvival => ChoicePhase::Survival,
            PlayerChoice::StartRebellion => ChoicePhase::Rebellion,
        };
        match self.phase {
            ChoicePhase::Unlocked => {}
            ChoicePhase::Locked => {
                warn!(?choice, "choice made before the choice system was enabled");
                return false;
            }
            _ => {
                debug!(?choice, current = ?self.current_choice, "choice already made");
                return false;
            }
        }

        self.current_choice = choice;
        self.choice_made = true;
        self.phase = next;
        if next == ChoicePhase::Survival {
            self.survival_started = Some(now);
        }

        info!(?choice, at_secs = now.as_secs_f64(), "player choice made");
        self.bus.publish(GameEvent::ChoiceMade { choice });
        true
    }

    /// Evaluate the survival window at simulated time `now`.
    ///
    /// A critical stat fails the branch at once, even on the tick the window
    /// would close.
    pub fn poll(&mut self, now: Duration, pool: &ResourcePool) -> Option<EndingType> {
        if self.phase != ChoicePhase::Survival {
            return None;
        }

        let critical = pool.critical_stats();
        if !critical.is_empty() {
            debug!(?critical, "critical during survival window");
            return self.finish(EndingType::SurvivalFailure);
        }

        let started = self.survival_started.unwrap_or(now);
        if now.saturating_sub(started) >= self.window {
            return self.finish(EndingType::SurvivalSuccess);
        }
        None
    }

    /// The tracker reported every objective complete.
    pub fn on_objectives_complete(&mut self) -> Option<EndingType> {
        if self.phase != ChoicePhase::Rebellion {
            return None;
        }
        self.finish(EndingType::RebellionSuccess)
    }

    /// The player died. Ends the session on whichever branch it is on.
    pub fn on_player_died(&mut self) -> Option<EndingType> {
        match self.phase {
            ChoicePhase::Ended => None,
            ChoicePhase::Rebellion => self.finish(EndingType::RebellionFailure),
            _ => self.finish(EndingType::SurvivalFailure),
        }
    }

    fn finish(&mut self, ending: EndingType) -> Option<EndingType> {
        if self.ending.is_some() {
            return None;
        }
        self.ending = Some(ending);
        self.phase = ChoicePhase::Ended;
        info!(?ending, summary = ending.summary(), "game ending");
        self.bus.publish(GameEvent::GameEnding { ending });
        Some(ending)
    }

    pub fn phase(&self) -> ChoicePhase {
        self.phase
    }

    pub fn current_choice(&self) -> PlayerChoice {
        self.current_choice
    }

    pub fn choice_made(&self) -> bool {
        self.choice_made
    }

    pub fn is_unlocked(&self) -> bool {
        self.phase != ChoicePhase::Locked
    }

    pub fn ending(&self) -> Option<EndingType> {
        self.ending
    }

    pub fn is_ended(&self) -> bool {
        self.phase == ChoicePhase::Ended
    }

    /// Time left in the survival window at `now`.
    pub fn survival_remaining(&self, now: Duration) -> Option<Duration> {
        if self.phase != ChoicePhase::Survival {
            return None;
        }
        let started = self.survival_started?;
        Some(self.window.saturating_sub(now.saturating_sub(started)))
    }

    pub fn snapshot(&self, now: Duration) -> ChoiceSnapshot {
        ChoiceSnapshot {
            phase: self.phase,
            current_choice: self.current_choice,
            choice_made: self.choice_made,
            ending: self.ending,
            survival_remaining_secs: self.survival_remaining(now).map(|d| d.as_secs_f64()),
        }
    }
}
