//! Survival configuration.
//!
//! Defaults carry the game's standard tuning. Every value can be
//! overridden from TOML, which is how tests accelerate the simulation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, RulesError};
use crate::mechanics::SurvivalStat;

/// One `f32` per survival stat. Missing fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatTable {
    pub hunger: f32,
    pub thirst: f32,
    pub temperature: f32,
    pub energy: f32,
}

impl StatTable {
    /// Same value for every stat.
    pub fn splat(value: f32) -> Self {
        Self {
            hunger: value,
            thirst: value,
            temperature: value,
            energy: value,
        }
    }

    pub fn get(&self, stat: SurvivalStat) -> f32 {
        match stat {
            SurvivalStat::Hunger => self.hunger,
            SurvivalStat::Thirst => self.thirst,
            SurvivalStat::Temperature => self.temperature,
            SurvivalStat::Energy => self.energy,
        }
    }

    pub fn set(&mut self, stat: SurvivalStat, value: f32) {
        match stat {
            SurvivalStat::Hunger => self.hunger = value,
            SurvivalStat::Thirst => self.thirst = value,
            SurvivalStat::Temperature => self.temperature = value,
            SurvivalStat::Energy => self.energy = value,
        }
    }

    /// Iterate `(stat, value)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SurvivalStat, f32)> + '_ {
        SurvivalStat::ALL.into_iter().map(move |stat| (stat, self.get(stat)))
    }
}

impl Default for StatTable {
    fn default() -> Self {
        Self::splat(0.0)
    }
}

/// Resource bounds and classification thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Maximum value per stat. Stats start here.
    pub max: StatTable,
    /// Percentage (0-100) at or below which a stat is critical.
    pub critical_threshold: f32,
    /// Percentage (0-100) at or below which a stat is dangerous.
    pub danger_threshold: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max: StatTable::splat(100.0),
            critical_threshold: 20.0,
            danger_threshold: 40.0,
        }
    }
}

/// Periodic decay tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Simulated seconds between decay ticks.
    pub tick_period_secs: f64,
    /// Amount lost per simulated hour, per stat.
    pub rates_per_hour: StatTable,
}

impl DecayConfig {
    /// Tick period. Values too large for a `Duration` saturate.
    pub fn tick_period(&self) -> Duration {
        Duration::try_from_secs_f64(self.tick_period_secs).unwrap_or(Duration::MAX)
    }

    /// Amount removed from `stat` on one tick.
    pub fn amount_per_tick(&self, stat: SurvivalStat) -> f32 {
        (self.rates_per_hour.get(stat) as f64 * self.tick_period_secs / 3600.0) as f32
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            // 1/1000th of an hour.
            tick_period_secs: 3.6,
            rates_per_hour: StatTable {
                hunger: 5.0,
                thirst: 8.0,
                temperature: 3.0,
                energy: 6.0,
            },
        }
    }
}

/// Day/night cycle tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightConfig {
    pub enabled: bool,
    /// Simulated minutes in one full day.
    pub day_duration_minutes: f32,
    /// Time of day at session start (0 = midnight, 0.5 = noon).
    pub start_time_of_day: f32,
    /// Temperature gained per simulated minute during the day.
    pub day_temperature_bonus: f32,
    /// Temperature change per simulated minute at night (negative).
    pub night_temperature_penalty: f32,
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            day_duration_minutes: 10.0,
            start_time_of_day: 0.5,
            day_temperature_bonus: 10.0,
            night_temperature_penalty: -15.0,
        }
    }
}

/// Everything the survival simulation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    pub resources: ResourceConfig,
    pub decay: DecayConfig,
    pub day_night: DayNightConfig,
    /// Energy spent per second of sprinting.
    pub exertion_energy_per_sec: f32,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            resources: ResourceConfig::default(),
            decay: DecayConfig::default(),
            day_night: DayNightConfig::default(),
            exertion_energy_per_sec: 2.0,
        }
    }
}

impl SurvivalConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        for (stat, max) in self.resources.max.iter() {
            if !(max.is_finite() && max > 0.0) {
                return Err(RulesError::InvalidConfig(format!(
                    "max {stat} must be positive, got {max}"
                )));
            }
        }

        for (name, value) in [
            ("critical_threshold", self.resources.critical_threshold),
            ("danger_threshold", self.resources.danger_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(RulesError::InvalidConfig(format!(
                    "{name} must be a percentage in [0, 100], got {value}"
                )));
            }
        }

        let period = self.decay.tick_period_secs;
        if !(period > 0.0 && Duration::try_from_secs_f64(period).is_ok()) {
            return Err(RulesError::InvalidConfig(format!(
                "decay tick period must be a positive representable duration, got {period}"
            )));
        }

        for (stat, rate) in self.decay.rates_per_hour.iter() {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(RulesError::InvalidConfig(format!(
                    "decay rate for {stat} must be non-negative, got {rate}"
                )));
            }
        }

        let day = &self.day_night;
        if !(day.day_duration_minutes.is_finite() && day.day_duration_minutes > 0.0) {
            return Err(RulesError::InvalidConfig(format!(
                "day duration must be positive, got {}",
                day.day_duration_minutes
            )));
        }
        if !(0.0..1.0).contains(&day.start_time_of_day) {
            return Err(RulesError::InvalidConfig(format!(
                "start time of day must be in [0, 1), got {}",
                day.start_time_of_day
            )));
        }

        if !(self.exertion_energy_per_sec.is_finite() && self.exertion_energy_per_sec >= 0.0) {
            return Err(RulesError::InvalidConfig(format!(
                "exertion cost must be non-negative, got {}",
                self.exertion_energy_per_sec
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SurvivalConfig::default().validate().unwrap();
    }

    #[test]
    fn test_amount_per_tick_matches_thousandth_of_hour() {
        let decay = DecayConfig::default();
        assert!((decay.amount_per_tick(SurvivalStat::Hunger) - 0.005).abs() < 1e-6);
        assert!((decay.amount_per_tick(SurvivalStat::Thirst) - 0.008).abs() < 1e-6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SurvivalConfig::from_toml_str(
            r#"
            [decay]
            tick_period_secs = 1.0

            [resources]
            critical_threshold = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.decay.tick_period(), Duration::from_secs(1));
        assert_eq!(config.decay.rates_per_hour.thirst, 8.0);
        assert_eq!(config.resources.critical_threshold, 25.0);
        assert_eq!(config.resources.max.energy, 100.0);
    }

    #[test]
    fn test_rejects_zero_max() {
        let mut config = SurvivalConfig::default();
        config.resources.max.set(SurvivalStat::Energy, 0.0);
        assert!(matches!(
            config.validate(),
            Err(RulesError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_period() {
        let err = SurvivalConfig::from_toml_str("[decay]\ntick_period_secs = 0.0\n").unwrap_err();
        assert!(matches!(err, RulesError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unrepresentable_period() {
        let mut config = SurvivalConfig::default();
        config.decay.tick_period_secs = 1e30;
        assert!(matches!(
            config.validate(),
            Err(RulesError::InvalidConfig(_))
        ));
        assert_eq!(config.decay.tick_period(), Duration::MAX);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = SurvivalConfig::from_toml_str("[decay\n").unwrap_err();
        assert!(matches!(err, RulesError::Parse(_)));
    }
}
