use std::time::{Duration, Instant};

/// Wall-clock source for the frame loop.
///
/// `tick` is called once at the top of every frame; the delta it stores is
/// what camera movement and the FPS counter consume.
pub struct FrameClock {
    start: Instant,
    last: Instant,
    /// Time since the previous tick
    pub delta: Duration,
    /// Number of ticks so far
    pub frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
        self.frame_count += 1;
        self.delta
    }

    /// Seconds since the clock was created.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
