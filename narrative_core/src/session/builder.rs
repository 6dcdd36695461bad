//! Session construction.

use std::sync::Arc;
use std::time::Duration;
use survival_rules::{
    ClockSource, DayNightCycle, DecayClock, EventBus, Inventory, ItemCatalog, ResourcePool,
};
use tracing::{error, info};

use super::GameSession;
use crate::choice::ChoiceResolver;
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::objectives::ObjectiveTracker;
use crate::timeline::NarrativeTimeline;
use crate::world::World;

/// Assembles a [`GameSession`] from its collaborators.
///
/// A clock source and a world are required. Configuration defaults to the
/// standard tuning, the catalog to the built-in items, and the bus to a
/// fresh one.
#[derive(Default)]
pub struct SessionBuilder {
    config: Option<SessionConfig>,
    clock: Option<Box<dyn ClockSource>>,
    world: Option<Box<dyn World>>,
    catalog: Option<ItemCatalog>,
    bus: Option<EventBus>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: impl ClockSource + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn world(mut self, world: impl World + 'static) -> Self {
        self.world = Some(Box::new(world));
        self
    }

    pub fn catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use an existing bus, so listeners attached beforehand see the
    /// session's first events.
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn build(self) -> Result<GameSession> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let mut clock = self.clock.ok_or_else(|| missing("clock source"))?;
        let world = self.world.ok_or_else(|| missing("world"))?;
        let bus = self.bus.unwrap_or_default();
        let catalog = self.catalog.unwrap_or_else(ItemCatalog::builtin);

        let timeline = NarrativeTimeline::new(
            config.narrative.events.clone(),
            config.narrative.final_event_id.clone(),
            bus.clone(),
        )?;

        let pool = Arc::new(ResourcePool::new(&config.survival.resources, bus.clone()));
        let decay = DecayClock::new(config.survival.decay.clone(), pool.clone(), bus.clone());
        let day_night = DayNightCycle::new(config.survival.day_night.clone(), pool.clone(), bus.clone());
        let resolver = ChoiceResolver::new(config.choice.survival_window(), bus.clone());
        let objectives = ObjectiveTracker::from_world(world.as_ref(), bus.clone());
        let inventory = Inventory::new(config.inventory_slots, bus.clone());

        clock.reset();
        let last_reading = clock.now();
        pool.announce();

        info!(
            events = timeline.events().len(),
            objectives = objectives.total(),
            "session started"
        );

        Ok(GameSession {
            config,
            bus,
            clock,
            world,
            pool,
            decay,
            day_night,
            timeline,
            resolver,
            objectives,
            inventory,
            catalog,
            last_reading,
            elapsed: Duration::ZERO,
            paused: false,
            ended: false,
            ticks: 0,
        })
    }
}

fn missing(what: &'static str) -> SessionError {
    error!(collaborator = what, "cannot start session");
    SessionError::MissingCollaborator(what)
}
