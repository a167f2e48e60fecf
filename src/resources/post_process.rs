//! Post-process settings that are not tied to a single operator.

/// Frame rate the motion blur strength is calibrated against.
pub const MOTION_BLUR_REFERENCE_FPS: f32 = 60.0;

/// Velocity-buffer motion blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionBlurSettings {
    pub enabled: bool,
    /// Hard cap on taps per pixel, whatever the velocity.
    pub max_samples: u32,
}

impl Default for MotionBlurSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_samples: 32,
        }
    }
}

/// Blur strength for the current frame rate.
///
/// The velocity stored in the G-buffer covers one frame; at higher frame rates
/// a frame is shorter, so the streak is lengthened by `fps / 60`. The fps is
/// truncated to whole frames first so the value does not flicker with the
/// fractional part of the estimate.
#[must_use]
pub fn motion_blur_scale(fps: f32) -> f32 {
    fps.max(0.0).floor() / MOTION_BLUR_REFERENCE_FPS
}

/// Number of taps the shader takes for a velocity of `speed_px` pixels.
///
/// Mirrors the WGSL: at least one tap, never more than `max_samples`.
#[must_use]
pub fn motion_blur_sample_count(speed_px: f32, max_samples: u32) -> u32 {
    let wanted = speed_px.max(0.0) as u32;
    wanted.clamp(1, max_samples.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_one_at_reference_rate() {
        assert!((motion_blur_scale(60.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scale_truncates_fractional_fps() {
        assert!((motion_blur_scale(119.9) - 119.0 / 60.0).abs() < 1e-6);
        assert_eq!(motion_blur_scale(-5.0), 0.0);
    }

    #[test]
    fn sample_count_respects_cap() {
        assert_eq!(motion_blur_sample_count(0.2, 32), 1);
        assert_eq!(motion_blur_sample_count(12.7, 32), 12);
        assert_eq!(motion_blur_sample_count(500.0, 32), 32);
    }
}
