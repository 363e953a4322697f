//! Time utilities for driving the simulation

use std::time::{Duration, Instant};

/// Default frames simulated per second
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Wall-clock duration of one frame at `frame_rate`
pub fn frame_duration(frame_rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(frame_rate.max(1)))
}

/// Monotonic host clock handing out frame deltas and input timestamps
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
        }
    }

    /// Seconds since the clock started. Used to stamp key events.
    pub fn now_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the previous lap, capped at `max_dt`
    pub fn lap(&mut self, max_dt: f32) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(max_dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
