//! Session clock: run/pause state and the real-time tick period.
//!
//! The engine itself has no notion of time. This clock only decides how
//! often a running session calls `step`.

use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest period a session will tick at, whatever the config says.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickClock {
    pub running:       bool,
    pub tick_seconds:  f64,
    /// Ticks stepped by this session since it was created.
    pub ticks_stepped: Tick,
}

impl TickClock {
    pub fn new(tick_seconds: f64) -> Self {
        Self {
            running: false,
            tick_seconds,
            ticks_stepped: 0,
        }
    }

    /// Returns true if the clock was paused and is now running.
    pub fn resume(&mut self) -> bool {
        let changed = !self.running;
        self.running = true;
        changed
    }

    /// Returns true if the clock was running and is now paused.
    pub fn pause(&mut self) -> bool {
        let changed = self.running;
        self.running = false;
        changed
    }

    pub fn record_tick(&mut self) -> Tick {
        self.ticks_stepped += 1;
        self.ticks_stepped
    }

    /// Real-time period between ticks. Non-finite or tiny values fall
    /// back to `MIN_TICK_PERIOD`.
    pub fn period(&self) -> Duration {
        if !self.tick_seconds.is_finite() || self.tick_seconds <= 0.0 {
            return MIN_TICK_PERIOD;
        }
        Duration::try_from_secs_f64(self.tick_seconds)
            .unwrap_or(Duration::MAX)
            .max(MIN_TICK_PERIOD)
    }
}
