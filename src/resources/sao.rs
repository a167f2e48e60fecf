//! SAO (Scalable Ambient Obscurance) Configuration
//!
//! This module defines the ambient obscurance settings as pure data, in the
//! same style as [`ToneMappingMode`](super::tone_mapping::ToneMappingMode):
//! the UI edits a [`SaoSettings`] value between frames and the SAO pass packs
//! it into [`SaoUniforms`] at the start of every frame. Nothing here needs a
//! recompile when a value changes.
//!
//! # Algorithm
//!
//! 1. Each pixel takes `samples` taps along a spiral of `turns` revolutions
//!    inside a disk of `radius` (view-space units) projected onto the screen.
//!    The spiral is rotated per pixel by a fixed hash of the pixel
//!    coordinate, so the estimate is deterministic frame to frame.
//! 2. Each tap compares the reconstructed view-space position against the
//!    center pixel's position and normal. `bias` suppresses self-occlusion and
//!    `scale` controls the distance falloff.
//! 3. The averaged obscurance is shaped by `contrast` and written to an
//!    `R8Unorm` target (1.0 = unoccluded).
//! 4. A separable box blur of `blur_size` texels smooths the raw estimate.

use bytemuck::{Pod, Zeroable};

// ============================================================================
// GPU Uniform Structs
// ============================================================================

/// Parameters for the raw obscurance sub-pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SaoUniforms {
    pub samples: u32,
    pub turns: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub radius: f32,
    pub bias: f32,
    pub scale: f32,
    pub contrast: f32,
    /// Pixels per view-space unit at depth 1 (`height / (2 tan(fov/2))`).
    pub projection_scale: f32,
    pub _pad: [f32; 3],
}

/// Parameters for one direction of the separable blur.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SaoBlurUniforms {
    /// Texel step: `(1, 0)` horizontal, `(0, 1)` vertical.
    pub direction: [i32; 2],
    pub blur_size: u32,
    pub _pad: u32,
}

// ============================================================================
// SaoSettings
// ============================================================================

/// Runtime-tunable ambient obscurance parameters.
///
/// | Field      | Meaning                                   | Default |
/// |------------|-------------------------------------------|---------|
/// | `enabled`  | Run the pass at all                       | `true`  |
/// | `samples`  | Taps per pixel (0 produces no occlusion)  | 30      |
/// | `turns`    | Spiral revolutions across the taps        | 7       |
/// | `radius`   | World-space sampling radius               | 0.3     |
/// | `bias`     | Self-occlusion bias                       | 0.001   |
/// | `scale`    | Distance falloff scale                    | 0.7     |
/// | `contrast` | Output contrast exponent                  | 0.8     |
/// | `blur_size`| Box blur half-width in texels             | 4       |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaoSettings {
    pub enabled: bool,
    pub samples: u32,
    pub turns: u32,
    pub radius: f32,
    pub bias: f32,
    pub scale: f32,
    pub contrast: f32,
    pub blur_size: u32,
}

impl Default for SaoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: 30,
            turns: 7,
            radius: 0.3,
            bias: 0.001,
            scale: 0.7,
            contrast: 0.8,
            blur_size: 4,
        }
    }
}

/// Upper bound the WGSL loop is compiled against.
pub const SAO_MAX_SAMPLES: u32 = 64;
/// Upper bound on the blur half-width.
pub const SAO_MAX_BLUR_SIZE: u32 = 16;

impl SaoSettings {
    /// Packs the settings for the raw obscurance shader.
    ///
    /// `fov_y` is the camera's vertical field of view in radians; it converts
    /// the world-space radius into a screen-space disk.
    #[must_use]
    pub fn uniforms(&self, width: u32, height: u32, fov_y: f32) -> SaoUniforms {
        SaoUniforms {
            samples: self.samples.min(SAO_MAX_SAMPLES),
            turns: self.turns,
            viewport_width: width,
            viewport_height: height,
            radius: self.radius.max(0.0),
            bias: self.bias,
            scale: self.scale,
            contrast: self.contrast,
            projection_scale: projection_scale(height, fov_y),
            _pad: [0.0; 3],
        }
    }

    /// Packs the two blur directions, horizontal first.
    #[must_use]
    pub fn blur_uniforms(&self) -> [SaoBlurUniforms; 2] {
        let blur_size = self.blur_size.min(SAO_MAX_BLUR_SIZE);
        [
            SaoBlurUniforms {
                direction: [1, 0],
                blur_size,
                _pad: 0,
            },
            SaoBlurUniforms {
                direction: [0, 1],
                blur_size,
                _pad: 0,
            },
        ]
    }
}

/// Pixels covered by one view-space unit at unit depth.
#[must_use]
pub fn projection_scale(height: u32, fov_y: f32) -> f32 {
    height as f32 / (2.0 * (fov_y * 0.5).tan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_clamp_sample_count() {
        let settings = SaoSettings {
            samples: 500,
            ..Default::default()
        };
        let u = settings.uniforms(1280, 720, 45f32.to_radians());
        assert_eq!(u.samples, SAO_MAX_SAMPLES);
        assert_eq!(u.viewport_width, 1280);
        assert_eq!(u.viewport_height, 720);
    }

    #[test]
    fn blur_directions_are_orthogonal() {
        let [h, v] = SaoSettings::default().blur_uniforms();
        assert_eq!(h.direction, [1, 0]);
        assert_eq!(v.direction, [0, 1]);
        assert_eq!(h.blur_size, 4);
    }

    #[test]
    fn projection_scale_at_90_degrees_is_half_height() {
        let s = projection_scale(720, 90f32.to_radians());
        assert!((s - 360.0).abs() < 1e-3);
    }
}
