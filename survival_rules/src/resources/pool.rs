//! The shared pool of survival resources.

use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ResourceConfig;
use crate::events::{EventBus, GameEvent};
use crate::mechanics::SurvivalStat;

/// A bounded scalar in `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub value: f32,
    pub max: f32,
}

impl Resource {
    fn full(max: f32) -> Self {
        Self { value: max, max }
    }

    /// Fraction of max, in [0, 1].
    pub fn percentage(&self) -> f32 {
        self.value / self.max
    }
}

#[derive(Debug)]
struct PoolState {
    resources: [Resource; 4],
    dead: bool,
}

/// Read-only view of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub stat: SurvivalStat,
    pub value: f32,
    pub max: f32,
    pub percentage: f32,
    pub critical: bool,
    pub dangerous: bool,
}

/// Read-only view of the whole pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub stats: Vec<StatSnapshot>,
    pub dead: bool,
}

impl PoolSnapshot {
    pub fn get(&self, stat: SurvivalStat) -> Option<&StatSnapshot> {
        self.stats.iter().find(|s| s.stat == stat)
    }
}

/// Hunger, thirst, temperature and energy for one session.
///
/// Every writer (decay, environment, items, exertion, debug hooks) goes
/// through [`ResourcePool::modify`], which performs read, clamp and write
/// under the state lock. Events are published after that lock is released,
/// under a separate emission lock, so handlers may read the pool and events
/// from concurrent writers still arrive in the order the writes happened.
///
/// Reaching zero on any stat kills the player. The pool then freezes: later
/// calls to `modify` change nothing, so `is_dead` always agrees with the
/// stored values.
#[derive(Debug)]
pub struct ResourcePool {
    state: Mutex<PoolState>,
    emit: ReentrantMutex<()>,
    critical_threshold: f32,
    danger_threshold: f32,
    bus: EventBus,
}

impl ResourcePool {
    /// Create a pool with every stat at its maximum.
    pub fn new(config: &ResourceConfig, bus: EventBus) -> Self {
        let resources = SurvivalStat::ALL.map(|stat| Resource::full(config.max.get(stat)));
        Self {
            state: Mutex::new(PoolState {
                resources,
                dead: false,
            }),
            emit: ReentrantMutex::new(()),
            critical_threshold: config.critical_threshold,
            danger_threshold: config.danger_threshold,
            bus,
        }
    }

    /// Publish the current percentage of every stat, so listeners can show
    /// initial values.
    pub fn announce(&self) {
        let _emit = self.emit.lock();
        let percentages = {
            let state = self.state.lock();
            SurvivalStat::ALL.map(|stat| (stat, state.resources[stat.index()].percentage()))
        };
        for (stat, percentage) in percentages {
            self.bus.publish(GameEvent::StatChanged { stat, percentage });
        }
    }

    /// Apply `delta` to `stat`, clamp to `[0, max]`, and return the new
    /// percentage.
    ///
    /// Emits `StatChanged`, and `StatCritical` whenever the result is in the
    /// critical range.
    pub fn modify(&self, stat: SurvivalStat, delta: f32) -> f32 {
        let _emit = self.emit.lock();
        let percentage = {
            let mut state = self.state.lock();
            let idx = stat.index();

            if state.dead {
                return state.resources[idx].percentage();
            }
            if delta.is_nan() {
                warn!(%stat, "ignoring NaN delta");
                return state.resources[idx].percentage();
            }

            let resource = &mut state.resources[idx];
            resource.value = (resource.value + delta).clamp(0.0, resource.max);
            let percentage = resource.percentage();

            if resource.value <= 0.0 {
                state.dead = true;
                warn!(%stat, "resource depleted");
            }
            percentage
        };

        self.bus.publish(GameEvent::StatChanged { stat, percentage });
        if self.is_critical_percentage(percentage) {
            debug!(%stat, percentage, "resource critical");
            self.bus.publish(GameEvent::StatCritical { stat });
        }

        percentage
    }

    /// Add `amount` to every stat.
    pub fn restore_all(&self, amount: f32) {
        for stat in SurvivalStat::ALL {
            self.modify(stat, amount);
        }
    }

    pub fn value(&self, stat: SurvivalStat) -> f32 {
        self.state.lock().resources[stat.index()].value
    }

    pub fn max(&self, stat: SurvivalStat) -> f32 {
        self.state.lock().resources[stat.index()].max
    }

    pub fn percentage(&self, stat: SurvivalStat) -> f32 {
        self.state.lock().resources[stat.index()].percentage()
    }

    pub fn is_critical(&self, stat: SurvivalStat) -> bool {
        self.is_critical_percentage(self.percentage(stat))
    }

    pub fn is_dangerous(&self, stat: SurvivalStat) -> bool {
        self.percentage(stat) * 100.0 <= self.danger_threshold
    }

    /// Stats currently in the critical range, read under one lock.
    pub fn critical_stats(&self) -> Vec<SurvivalStat> {
        let state = self.state.lock();
        SurvivalStat::ALL
            .into_iter()
            .filter(|stat| self.is_critical_percentage(state.resources[stat.index()].percentage()))
            .collect()
    }

    pub fn any_critical(&self) -> bool {
        !self.critical_stats().is_empty()
    }

    /// True once any stat has reached zero.
    pub fn is_dead(&self) -> bool {
        self.state.lock().dead
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state.lock();
        let stats = SurvivalStat::ALL
            .into_iter()
            .map(|stat| {
                let r = state.resources[stat.index()];
                let percentage = r.percentage();
                StatSnapshot {
                    stat,
                    value: r.value,
                    max: r.max,
                    percentage,
                    critical: self.is_critical_percentage(percentage),
                    dangerous: percentage * 100.0 <= self.danger_threshold,
                }
            })
            .collect();
        PoolSnapshot {
            stats,
            dead: state.dead,
        }
    }

    fn is_critical_percentage(&self, percentage: f32) -> bool {
        percentage * 100.0 <= self.critical_threshold
    }
}
