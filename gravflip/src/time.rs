//! Frame clock port and its backends.

use std::time::{Duration, Instant};

/// The clock capability consumed by the game core.
pub trait Clock {
    /// Seconds between the previous two `update` calls.
    fn get_delta_time(&self) -> f32;

    /// Advance the time reference. Called once per frame, after render.
    fn update(&mut self);
}

/// Wall clock based on [`Instant`], with the delta capped to avoid a huge
/// step after a stall.
#[derive(Clone, Debug)]
pub struct SystemClock {
    last_frame: Instant,
    delta_time: Duration,
    max_delta: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: Duration::ZERO,
            max_delta: Duration::from_millis(250),
        }
    }

    /// Override the largest delta reported.
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn get_delta_time(&self) -> f32 {
        self.delta_time.as_secs_f32()
    }

    fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = (now - self.last_frame).min(self.max_delta);
        self.last_frame = now;
    }
}

/// Reports the same delta every frame. Deterministic runs and tests use it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedClock {
    delta_time: f32,
    frames: u64,
}

impl FixedClock {
    pub fn new(delta_time: f32) -> Self {
        Self {
            delta_time,
            frames: 0,
        }
    }

    /// 60 frames per second.
    pub fn sixty_fps() -> Self {
        Self::new(1.0 / 60.0)
    }

    /// Number of `update` calls so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> f32 {
        self.frames as f32 * self.delta_time
    }
}

impl Clock for FixedClock {
    fn get_delta_time(&self) -> f32 {
        self.delta_time
    }

    fn update(&mut self) {
        self.frames += 1;
    }
}
