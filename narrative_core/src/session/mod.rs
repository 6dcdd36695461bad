//! One play-through.
//!
//! The session owns every component, the clock, and the world, and is the
//! only place they meet. Each [`GameSession::tick`] reads the clock once and
//! runs the simulation in a fixed order:
//!
//! 1. day/night and decay mutate the resource pool;
//! 2. a death ends the session;
//! 3. the timeline fires due events and, on the reveal, unlocks the choice;
//! 4. the resolver evaluates the survival window.
//!
//! Player input arrives between ticks through the session's methods.

mod builder;

pub use builder::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use survival_rules::{
    ClockSource, DayNightCycle, DayNightSnapshot, DecayClock, EndingType, EventBus, GameEvent,
    Inventory, ItemCatalog, ItemStack, ObjectiveCategory, PlayerChoice, PoolSnapshot,
    ResourcePool, SurvivalStat,
};
use tracing::{debug, info, warn};

use crate::choice::{ChoiceResolver, ChoiceSnapshot};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::objectives::{ObjectiveId, ObjectiveSnapshot, ObjectiveTracker, ObjectiveUpdate};
use crate::timeline::{NarrativeTimeline, TimelineSnapshot};
use crate::world::World;

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Simulated time added by this tick.
    pub delta: Duration,
    /// Decay ticks applied.
    pub decay_ticks: u32,
    /// Narrative events fired.
    pub fired: Vec<String>,
    /// Ending reached during this tick.
    pub ending: Option<EndingType>,
}

/// Everything a UI or save inspector might want to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub elapsed_secs: f64,
    pub ticks: u64,
    pub paused: bool,
    pub ended: bool,
    pub resources: PoolSnapshot,
    pub day_night: DayNightSnapshot,
    pub narrative: TimelineSnapshot,
    pub choice: ChoiceSnapshot,
    pub objectives: ObjectiveSnapshot,
    pub inventory: Vec<ItemStack>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct GameSession {
    config: SessionConfig,
    bus: EventBus,
    clock: Box<dyn ClockSource>,
    world: Box<dyn World>,
    pool: Arc<ResourcePool>,
    decay: DecayClock,
    day_night: DayNightCycle,
    timeline: NarrativeTimeline,
    resolver: ChoiceResolver,
    objectives: ObjectiveTracker,
    inventory: Inventory,
    catalog: ItemCatalog,
    last_reading: Duration,
    elapsed: Duration,
    paused: bool,
    ended: bool,
    ticks: u64,
}

impl GameSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Sample the clock and advance the simulation.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.ended {
            return report;
        }

        let reading = self.clock.now();
        let delta = match reading.checked_sub(self.last_reading) {
            Some(delta) => delta,
            None => {
                warn!(
                    reading_secs = reading.as_secs_f64(),
                    last_secs = self.last_reading.as_secs_f64(),
                    "clock went backwards, treating as zero"
                );
                Duration::ZERO
            }
        };
        self.last_reading = self.last_reading.max(reading);

        if self.paused {
            return report;
        }

        self.ticks += 1;
        self.elapsed += delta;
        report.delta = delta;

        self.day_night.advance(delta);
        let decay = self.decay.advance(delta);
        report.decay_ticks = decay.ticks;

        if (decay.died || self.decay.check_death()) && self.handle_death(&mut report) {
            return report;
        }

        let timeline = self.timeline.update(self.elapsed, self.world.as_mut());
        if timeline.revealed {
            self.resolver.unlock();
        }
        report.fired = timeline.fired;

        if let Some(ending) = self.resolver.poll(self.elapsed, &self.pool) {
            self.finish(ending);
            report.ending = Some(ending);
        }

        report
    }

    /// Route a death to the resolver. Returns `true` if the session ended.
    fn handle_death(&mut self, report: &mut TickReport) -> bool {
        match self.resolver.on_player_died() {
            Some(ending) => {
                self.finish(ending);
                report.ending = Some(ending);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, ending: EndingType) {
        self.ended = true;
        self.decay.stop();
        info!(
            ?ending,
            elapsed_secs = self.elapsed.as_secs_f64(),
            ticks = self.ticks,
            "session ended"
        );
    }

    /// The player picks a branch. Starting the rebellion activates every
    /// objective in the scene.
    pub fn make_choice(&mut self, choice: PlayerChoice) -> bool {
        if self.ended {
            return false;
        }
        if !self.resolver.make_choice(choice, self.elapsed) {
            return false;
        }
        if choice == PlayerChoice::StartRebellion {
            self.objectives.activate_all(self.world.as_mut());
        }
        true
    }

    /// The player completed a stasis pod or control terminal.
    pub fn complete_objective(
        &mut self,
        category: ObjectiveCategory,
        id: ObjectiveId,
    ) -> ObjectiveUpdate {
        if self.ended {
            return ObjectiveUpdate::Ignored;
        }
        let update = self.objectives.complete_objective(category, id);
        if update == ObjectiveUpdate::AllComplete {
            if let Some(ending) = self.resolver.on_objectives_complete() {
                self.finish(ending);
            }
        }
        update
    }

    /// The player read a note.
    pub fn discover_note(&mut self, note_id: impl Into<String>, content: impl Into<String>) -> bool {
        if self.ended {
            return false;
        }
        self.timeline.discover_note(note_id, content)
    }

    /// Pick up items from the scene.
    pub fn collect_item(&mut self, item_id: &str, quantity: u32) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        let item = self.catalog.require(item_id)?;
        self.inventory.add_item(item, quantity)?;
        Ok(())
    }

    /// Consume one unit of an item. Does nothing once the player is dead,
    /// even before the next tick records the death.
    pub fn use_item(&mut self, item_id: &str) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        if self.pool.is_dead() {
            debug!(item = item_id, "player is dead, item kept");
            return Ok(());
        }
        self.inventory.use_item(&self.catalog, item_id, &self.pool)?;
        Ok(())
    }

    pub fn craft(&mut self, recipe_name: &str) -> Result<()> {
        if self.ended {
            return Ok(());
        }
        let recipe = self
            .catalog
            .recipe(recipe_name)
            .ok_or_else(|| SessionError::UnknownRecipe(recipe_name.to_string()))?;
        self.inventory.craft(&self.catalog, recipe)?;
        Ok(())
    }

    /// Sprinting for `duration` drains energy.
    pub fn exert(&mut self, duration: Duration) {
        if self.ended || self.paused {
            return;
        }
        let cost = self.config.survival.exertion_energy_per_sec * duration.as_secs_f32();
        if cost > 0.0 {
            self.pool.modify(SurvivalStat::Energy, -cost);
        }
    }

    pub fn pause(&mut self) {
        if self.ended || self.paused {
            return;
        }
        self.paused = true;
        debug!("session paused");
        self.bus.publish(GameEvent::GamePaused);
    }

    pub fn resume(&mut self) {
        if self.ended || !self.paused {
            return;
        }
        self.paused = false;
        debug!("session resumed");
        self.bus.publish(GameEvent::GameResumed);
    }

    /// End the session without an ending, e.g. when the player quits.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.decay.stop();
        info!(elapsed_secs = self.elapsed.as_secs_f64(), "session abandoned");
    }

    /// Debug: offer the choice without waiting for the reveal.
    pub fn enable_choice_system(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.resolver.unlock()
    }

    /// Debug: top up every stat.
    pub fn restore_all(&self, amount: f32) {
        if self.ended {
            return;
        }
        self.pool.restore_all(amount);
    }

    /// Debug: jump the day/night cycle.
    pub fn set_time_of_day(&mut self, time_of_day: f32) {
        if self.ended {
            return;
        }
        self.day_night.set_time_of_day(time_of_day);
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Shared handle to the pool.
    pub fn pool_handle(&self) -> Arc<ResourcePool> {
        self.pool.clone()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn timeline(&self) -> &NarrativeTimeline {
        &self.timeline
    }

    pub fn resolver(&self) -> &ChoiceResolver {
        &self.resolver
    }

    pub fn objectives(&self) -> &ObjectiveTracker {
        &self.objectives
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn day_night(&self) -> &DayNightCycle {
        &self.day_night
    }

    /// Simulated survival time, excluding pauses.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn ending(&self) -> Option<EndingType> {
        self.resolver.ending()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            elapsed_secs: self.elapsed.as_secs_f64(),
            ticks: self.ticks,
            paused: self.paused,
            ended: self.ended,
            resources: self.pool.snapshot(),
            day_night: self.day_night.snapshot(),
            narrative: self.timeline.snapshot(),
            choice: self.resolver.snapshot(self.elapsed),
            objectives: self.objectives.snapshot(),
            inventory: self.inventory.slots().to_vec(),
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("elapsed", &self.elapsed)
            .field("ticks", &self.ticks)
            .field("paused", &self.paused)
            .field("ended", &self.ended)
            .field("stage", &self.timeline.current_stage())
            .field("phase", &self.resolver.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::InMemoryWorld;
    use survival_rules::{EventLog, ManualClock};

    fn quiet_config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.survival.day_night.enabled = false;
        config
    }

    fn session(config: SessionConfig) -> (GameSession, ManualClock, EventLog) {
        let clock = ManualClock::new();
        let bus = EventBus::new();
        let log = EventLog::attach(&bus);
        let session = SessionBuilder::new()
            .config(config)
            .clock(clock.clone())
            .world(InMemoryWorld::new())
            .bus(bus)
            .build()
            .unwrap();
        (session, clock, log)
    }

    #[test]
    fn test_tick_advances_elapsed() {
        let (mut session, clock, _log) = session(quiet_config());

        clock.advance_secs(1.5);
        let report = session.tick();

        assert_eq!(report.delta, Duration::from_millis(1500));
        assert_eq!(session.elapsed(), Duration::from_millis(1500));
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut session, clock, log) = session(quiet_config());

        clock.advance_secs(10.0);
        session.tick();
        session.pause();
        session.pause();

        clock.advance_secs(500.0);
        session.tick();
        assert_eq!(session.elapsed(), Duration::from_secs(10));
        let hunger_while_paused = session.pool().value(SurvivalStat::Hunger);

        session.resume();
        clock.advance_secs(5.0);
        session.tick();

        assert_eq!(session.elapsed(), Duration::from_secs(15));
        assert!(session.pool().value(SurvivalStat::Hunger) < hunger_while_paused);
        assert_eq!(log.count_named("game-paused"), 1);
        assert_eq!(log.count_named("game-resumed"), 1);
    }

    #[test]
    fn test_exert_drains_energy() {
        let (mut session, _clock, _log) = session(quiet_config());
        session.exert(Duration::from_secs(10));
        assert_eq!(session.pool().value(SurvivalStat::Energy), 80.0);

        session.pause();
        session.exert(Duration::from_secs(10));
        assert_eq!(session.pool().value(SurvivalStat::Energy), 80.0);
    }

    #[test]
    fn test_items_through_session() {
        let (mut session, _clock, log) = session(quiet_config());
        session.pool().modify(SurvivalStat::Thirst, -50.0);

        session.collect_item("fresh_water", 2).unwrap();
        session.use_item("fresh_water").unwrap();

        assert_eq!(session.pool().value(SurvivalStat::Thirst), 80.0);
        assert_eq!(session.inventory().item_count("fresh_water"), 1);
        assert_eq!(log.count_named("inventory-changed"), 2);

        assert!(matches!(
            session.collect_item("nectar", 1),
            Err(SessionError::Rules(_))
        ));
        assert!(matches!(
            session.craft("spear"),
            Err(SessionError::UnknownRecipe(_))
        ));
    }

    #[test]
    fn test_items_are_kept_once_the_player_is_dead() {
        let (mut session, _clock, _log) = session(quiet_config());
        session.collect_item("fresh_water", 1).unwrap();

        session.exert(Duration::from_secs(60));
        assert!(session.pool().is_dead());
        assert!(!session.is_ended());

        session.use_item("fresh_water").unwrap();
        assert_eq!(session.inventory().item_count("fresh_water"), 1);
        assert_eq!(session.pool().value(SurvivalStat::Thirst), 100.0);
    }

    #[test]
    fn test_enable_choice_system_hook() {
        let (mut session, _clock, log) = session(quiet_config());

        assert!(!session.make_choice(PlayerChoice::ContinueSurvival));
        assert!(session.enable_choice_system());
        assert!(!session.enable_choice_system());
        assert!(session.make_choice(PlayerChoice::ContinueSurvival));
        assert_eq!(log.count_named("choice-system-enabled"), 1);
    }

    #[test]
    fn test_end_stops_ticks() {
        let (mut session, clock, log) = session(quiet_config());
        session.end();
        log.clear();

        clock.advance_secs(100.0);
        let report = session.tick();

        assert_eq!(report, TickReport::default());
        assert!(log.is_empty());
        assert_eq!(session.ending(), None);
        assert!(session.is_ended());
    }

    #[test]
    fn test_inputs_after_end_are_ignored() {
        let (mut session, _clock, log) = session(SessionConfig::default());
        session.pool().modify(SurvivalStat::Hunger, -50.0);
        session.end();
        log.clear();

        session.restore_all(100.0);
        session.collect_item("fresh_water", 1).unwrap();
        session.craft("spear").unwrap();
        session.set_time_of_day(0.9);

        assert!(log.is_empty());
        assert_eq!(session.pool().value(SurvivalStat::Hunger), 50.0);
        assert_eq!(session.inventory().item_count("fresh_water"), 0);
        assert_eq!(session.day_night().time_of_day(), 0.5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (mut session, clock, _log) = session(quiet_config());
        clock.advance_secs(301.0);
        session.tick();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.narrative.stage, 1);
        assert_eq!(snapshot.resources.stats.len(), 4);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"first_anomaly\""));
        assert!(json.contains("\"Locked\""));
    }
}
