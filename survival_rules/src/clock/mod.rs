//! Simulation time sources.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Supplies elapsed simulation time since the source was started.
///
/// Readings must never decrease. A session samples its clock once per tick
/// and derives the tick's delta from consecutive readings.
pub trait ClockSource: Send {
    /// Elapsed time since start.
    fn now(&self) -> Duration;

    /// Restart from zero. Only called when a session starts.
    fn reset(&mut self);
}

/// Wall-clock time, measured with [`Instant`].
#[derive(Debug, Clone)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for WallClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn reset(&mut self) {
        self.started = Instant::now();
    }
}

/// Deterministic clock advanced by hand.
///
/// Clones share the same time, so a test can keep one handle while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward, saturating at `Duration::MAX`.
    pub fn advance(&self, delta: Duration) {
        let mut elapsed = self.elapsed.lock();
        *elapsed = elapsed.saturating_add(delta);
    }

    /// Convenience for fractional seconds. Negative or NaN amounts are
    /// ignored; amounts too large for a `Duration` saturate.
    pub fn advance_secs(&self, secs: f64) {
        if !(secs >= 0.0) {
            return;
        }
        self.advance(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX));
    }

    /// Jump to an absolute time. Earlier times are ignored.
    pub fn set(&self, at: Duration) {
        let mut elapsed = self.elapsed.lock();
        if at > *elapsed {
            *elapsed = at;
        }
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> Duration {
        *self.elapsed.lock()
    }

    fn reset(&mut self) {
        *self.elapsed.lock() = Duration::ZERO;
    }
}
