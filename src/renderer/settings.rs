//! Renderer Settings
//!
//! Initialisation-time configuration. Everything here is consumed once when
//! the [`Renderer`](super::Renderer) is built; per-frame knobs live in
//! [`FrameState`](crate::scene::FrameState) instead.
//!
//! ```rust,ignore
//! use lumina::renderer::RendererSettings;
//!
//! let settings = RendererSettings {
//!     vsync: false,
//!     enable_gpu_timing: false,
//!     ..Default::default()
//! };
//! ```

// ---------------------------------------------------------------------------
// EnvironmentSettings
// ---------------------------------------------------------------------------

/// Resolutions of the image-based lighting textures.
///
/// | Field             | Description                                  | Default |
/// |-------------------|----------------------------------------------|---------|
/// | `cube_size`       | Face size of the converted environment cube  | 512     |
/// | `irradiance_size` | Face size of the diffuse irradiance cube     | 32      |
/// | `prefilter_size`  | Base face size of the specular prefilter     | 128     |
/// | `prefilter_mips`  | Roughness levels in the prefilter chain      | 5       |
/// | `brdf_lut_size`   | Width and height of the split-sum BRDF table | 512     |
/// | `sample_count`    | Importance samples per prefilter/LUT texel   | 1024    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub cube_size: u32,
    pub irradiance_size: u32,
    pub prefilter_size: u32,
    pub prefilter_mips: u32,
    pub brdf_lut_size: u32,
    pub sample_count: u32,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            cube_size: 512,
            irradiance_size: 32,
            prefilter_size: 128,
            prefilter_mips: 5,
            brdf_lut_size: 512,
            sample_count: 1024,
        }
    }
}

impl EnvironmentSettings {
    /// Full mip chain length of the environment cube.
    #[must_use]
    pub fn cube_mip_count(&self) -> u32 {
        full_mip_count(self.cube_size)
    }

    /// Face size of prefilter level `mip`, never below one texel.
    #[must_use]
    pub fn prefilter_mip_size(&self, mip: u32) -> u32 {
        (self.prefilter_size >> mip).max(1)
    }

    /// Roughness encoded by prefilter level `mip`: `mip / (levels - 1)`.
    #[must_use]
    pub fn prefilter_roughness(&self, mip: u32) -> f32 {
        if self.prefilter_mips <= 1 {
            return 0.0;
        }
        mip as f32 / (self.prefilter_mips - 1) as f32
    }
}

/// Number of mips down to 1x1 for a square texture of `size`.
#[must_use]
pub fn full_mip_count(size: u32) -> u32 {
    u32::BITS - size.max(1).leading_zeros()
}

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

/// Global configuration for renderer initialization.
///
/// # Fields
///
/// | Field               | Description                               | Default           |
/// |---------------------|-------------------------------------------|-------------------|
/// | `width` / `height`  | Fixed viewport size of every target       | 1280 x 720        |
/// | `vsync`             | Vertical sync enabled                     | `true`            |
/// | `backends`          | Forced wgpu backend (or auto)             | `None`            |
/// | `power_preference`  | GPU adapter selection strategy            | `HighPerformance` |
/// | `enable_gpu_timing` | Request timestamp queries when available  | `true`            |
/// | `environment`       | IBL texture resolutions                   | see above         |
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Viewport width. Targets are sized once at startup and never resized.
    pub width: u32,
    pub height: u32,

    /// When `true`, the frame rate is capped to the display refresh rate.
    pub vsync: bool,

    /// `None` lets wgpu choose the best available backend for the platform.
    pub backends: Option<wgpu::Backends>,

    pub power_preference: wgpu::PowerPreference,

    /// Request `TIMESTAMP_QUERY` for per-pass GPU timings.
    ///
    /// Ignored with a warning when the adapter does not support it; timings
    /// are then reported as unavailable.
    pub enable_gpu_timing: bool,

    pub environment: EnvironmentSettings,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            backends: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            enable_gpu_timing: true,
            environment: EnvironmentSettings::default(),
        }
    }
}

impl RendererSettings {
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mip_count_reaches_one_texel() {
        assert_eq!(full_mip_count(512), 10);
        assert_eq!(full_mip_count(1), 1);
        assert_eq!(full_mip_count(100), 7);
    }
}
