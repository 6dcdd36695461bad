//! Day/night cycle and its effect on body temperature.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DayNightConfig;
use crate::events::{EventBus, GameEvent};
use crate::mechanics::SurvivalStat;
use crate::resources::ResourcePool;

/// Read-only view of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayNightSnapshot {
    pub day: u32,
    pub time_of_day: f32,
    pub is_day: bool,
    pub clock: String,
}

/// Tracks time of day and warms or cools the player accordingly.
///
/// Time of day is a fraction: 0 is midnight, 0.5 is noon. Daytime is the
/// open interval (0.25, 0.75).
#[derive(Debug)]
pub struct DayNightCycle {
    config: DayNightConfig,
    pool: Arc<ResourcePool>,
    bus: EventBus,
    time_of_day: f32,
    day: u32,
}

impl DayNightCycle {
    pub fn new(config: DayNightConfig, pool: Arc<ResourcePool>, bus: EventBus) -> Self {
        let time_of_day = config.start_time_of_day;
        Self {
            config,
            pool,
            bus,
            time_of_day,
            day: 1,
        }
    }

    fn is_day_at(time_of_day: f32) -> bool {
        time_of_day > 0.25 && time_of_day < 0.75
    }

    pub fn is_day(&self) -> bool {
        Self::is_day_at(self.time_of_day)
    }

    pub fn is_night(&self) -> bool {
        !self.is_day()
    }

    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    /// Day counter, starting at 1.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Move the cycle forward and apply the temperature modifier.
    pub fn advance(&mut self, dt: Duration) {
        if !self.config.enabled || dt.is_zero() {
            return;
        }

        let secs = dt.as_secs_f32();
        let was_day = self.is_day();

        let day_speed = 1.0 / (self.config.day_duration_minutes * 60.0);
        let total = self.time_of_day + day_speed * secs;
        let wraps = total.floor();
        self.time_of_day = total - wraps;
        if wraps >= 1.0 {
            self.day += wraps as u32;
            info!(day = self.day, "new day");
        }

        let is_day = self.is_day();
        if was_day != is_day {
            debug!(is_day, time = %self.time_string(), "day/night transition");
            self.bus.publish(GameEvent::DayNightChanged { is_day });
        }

        let per_minute = if is_day {
            self.config.day_temperature_bonus
        } else {
            self.config.night_temperature_penalty
        };
        self.pool
            .modify(SurvivalStat::Temperature, per_minute * secs / 60.0);
    }

    /// Jump to a time of day, e.g. from a debug console.
    pub fn set_time_of_day(&mut self, time_of_day: f32) {
        self.time_of_day = time_of_day.clamp(0.0, 1.0) % 1.0;
    }

    /// "Day N - HH:MM".
    pub fn time_string(&self) -> String {
        let hours_f = self.time_of_day * 24.0;
        let hours = hours_f.floor() as u32;
        let minutes = ((hours_f - hours as f32) * 60.0).floor() as u32;
        format!("Day {} - {:02}:{:02}", self.day, hours, minutes)
    }

    pub fn snapshot(&self) -> DayNightSnapshot {
        DayNightSnapshot {
            day: self.day,
            time_of_day: self.time_of_day,
            is_day: self.is_day(),
            clock: self.time_string(),
        }
    }
}
