//! Fixed-rate resource decay, decoupled from frame rate.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::ResourcePool;
use crate::config::DecayConfig;
use crate::events::{EventBus, GameEvent};
use crate::mechanics::SurvivalStat;

/// Decay clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayState {
    Running,
    Stopped,
}

/// What a call to [`DecayClock::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecayReport {
    /// Decay ticks applied.
    pub ticks: u32,
    /// The player died during this call.
    pub died: bool,
}

/// Applies per-hour decay rates to the pool on a fixed simulated period.
///
/// Frame deltas accumulate and every whole period yields one tick, so the
/// outcome does not depend on how time is sliced. The clock stops for good
/// once the player is dead and announces the death once.
#[derive(Debug)]
pub struct DecayClock {
    config: DecayConfig,
    pool: Arc<ResourcePool>,
    bus: EventBus,
    state: DecayState,
    accumulated: Duration,
    ticks: u64,
}

impl DecayClock {
    pub fn new(config: DecayConfig, pool: Arc<ResourcePool>, bus: EventBus) -> Self {
        Self {
            config,
            pool,
            bus,
            state: DecayState::Running,
            accumulated: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Feed elapsed simulated time.
    pub fn advance(&mut self, dt: Duration) -> DecayReport {
        let mut report = DecayReport::default();
        if self.state == DecayState::Stopped {
            return report;
        }

        let period = self.config.tick_period();
        self.accumulated += dt;

        while self.accumulated >= period && self.state == DecayState::Running {
            self.accumulated -= period;
            self.apply_tick();
            report.ticks += 1;
            if self.check_death() {
                report.died = true;
            }
        }

        report
    }

    fn apply_tick(&mut self) {
        self.ticks += 1;
        for stat in SurvivalStat::ALL {
            let amount = self.config.amount_per_tick(stat);
            self.pool.modify(stat, -amount);
        }
        debug!(tick = self.ticks, "decay tick");
    }

    /// Stop and announce death if the pool is dead.
    ///
    /// Returns `true` only on the call that performs the transition, so the
    /// `PlayerDied` event goes out exactly once whichever writer killed the
    /// player.
    pub fn check_death(&mut self) -> bool {
        if self.state == DecayState::Running && self.pool.is_dead() {
            self.state = DecayState::Stopped;
            info!(tick = self.ticks, "player died");
            self.bus.publish(GameEvent::PlayerDied);
            return true;
        }
        false
    }

    /// Stop without a death, e.g. when the session ends.
    pub fn stop(&mut self) {
        self.state = DecayState::Stopped;
    }

    pub fn state(&self) -> DecayState {
        self.state
    }

    /// Total decay ticks applied.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResourceConfig, StatTable};
    use crate::events::EventLog;
    use proptest::prelude::*;

    /// One point of hunger per one-second tick, nothing else decays.
    fn hunger_only() -> DecayConfig {
        DecayConfig {
            tick_period_secs: 1.0,
            rates_per_hour: StatTable {
                hunger: 3600.0,
                ..StatTable::splat(0.0)
            },
        }
    }

    fn setup(config: DecayConfig) -> (DecayClock, Arc<ResourcePool>, EventLog) {
        let bus = EventBus::new();
        let log = EventLog::attach(&bus);
        let pool = Arc::new(ResourcePool::new(&ResourceConfig::default(), bus.clone()));
        (DecayClock::new(config, Arc::clone(&pool), bus), pool, log)
    }

    #[test]
    fn test_partial_period_does_not_tick() {
        let (mut clock, pool, _log) = setup(hunger_only());
        let report = clock.advance(Duration::from_millis(999));

        assert_eq!(report.ticks, 0);
        assert_eq!(pool.value(SurvivalStat::Hunger), 100.0);
    }

    #[test]
    fn test_accumulates_across_frames() {
        let (mut clock, pool, _log) = setup(hunger_only());
        for _ in 0..4 {
            clock.advance(Duration::from_millis(250));
        }

        assert_eq!(clock.ticks(), 1);
        assert_eq!(pool.value(SurvivalStat::Hunger), 99.0);
    }

    #[test]
    fn test_default_rates_scale_to_period() {
        let (mut clock, pool, _log) = setup(DecayConfig::default());
        clock.advance(Duration::from_secs_f64(3.6 * 10.0));

        assert_eq!(clock.ticks(), 10);
        assert!((pool.value(SurvivalStat::Thirst) - 99.92).abs() < 1e-3);
        assert!((pool.value(SurvivalStat::Temperature) - 99.97).abs() < 1e-3);
    }

    #[test]
    fn test_hunger_runs_out_and_dies_once() {
        let (mut clock, pool, log) = setup(hunger_only());

        let mut died_at = None;
        for second in 1..=150u32 {
            let report = clock.advance(Duration::from_secs(1));
            if report.died {
                assert!(died_at.is_none());
                died_at = Some(second);
            }
        }

        assert_eq!(died_at, Some(100));
        assert_eq!(clock.state(), DecayState::Stopped);
        assert_eq!(clock.ticks(), 100);
        assert_eq!(pool.value(SurvivalStat::Hunger), 0.0);
        assert_eq!(log.count_named("player-died"), 1);
    }

    #[test]
    fn test_large_step_stops_at_death() {
        let (mut clock, _pool, log) = setup(hunger_only());
        let report = clock.advance(Duration::from_secs(500));

        assert_eq!(report.ticks, 100);
        assert!(report.died);
        assert_eq!(log.count_named("player-died"), 1);
    }

    #[test]
    fn test_death_from_other_writer() {
        let (mut clock, pool, log) = setup(hunger_only());
        pool.modify(SurvivalStat::Energy, -100.0);

        assert!(clock.check_death());
        assert!(!clock.check_death());
        assert_eq!(clock.advance(Duration::from_secs(10)).ticks, 0);
        assert_eq!(log.count_named("player-died"), 1);
    }

    #[test]
    fn test_stop_suppresses_ticks() {
        let (mut clock, pool, log) = setup(hunger_only());
        clock.stop();
        clock.advance(Duration::from_secs(10));

        assert_eq!(pool.value(SurvivalStat::Hunger), 100.0);
        assert!(log.is_empty());
    }

    proptest! {
        /// Tick count depends only on total time, not on frame slicing.
        #[test]
        fn ticks_independent_of_slicing(frames in prop::collection::vec(1u64..3000, 1..40)) {
            let (mut clock, _pool, _log) = setup(hunger_only());
            let total: u64 = frames.iter().sum();
            for ms in &frames {
                clock.advance(Duration::from_millis(*ms));
            }
            let expected = (total / 1000).min(100);
            prop_assert_eq!(clock.ticks(), expected);
        }
    }
}
