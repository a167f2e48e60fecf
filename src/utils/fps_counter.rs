use std::time::Duration;

/// Frame-rate estimate averaged over a fixed window.
///
/// The estimate is refreshed once per window (one second by default) so the
/// value shown on screen and fed to motion blur stays stable between updates.
pub struct FpsCounter {
    window: Duration,
    frames: u32,
    accumulated: Duration,
    current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            frames: 0,
            accumulated: Duration::ZERO,
            current_fps: 0.0,
        }
    }

    /// Records one frame that took `delta`. Returns the new estimate when the
    /// averaging window rolls over.
    pub fn tick(&mut self, delta: Duration) -> Option<f32> {
        self.frames += 1;
        self.accumulated += delta;

        if self.accumulated < self.window {
            return None;
        }

        self.current_fps = self.frames as f32 / self.accumulated.as_secs_f32();
        self.frames = 0;
        self.accumulated = Duration::ZERO;
        Some(self.current_fps)
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Average frame time in milliseconds, or zero before the first estimate.
    #[must_use]
    pub fn frame_time_ms(&self) -> f32 {
        if self.current_fps > 0.0 {
            1000.0 / self.current_fps
        } else {
            0.0
        }
    }
}
