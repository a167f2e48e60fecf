//! Tone Mapping & Exposure Configuration
//!
//! Pure data describing how the HDR lighting buffer is brought into display
//! range. The post-process pass reads these every frame; nothing here owns GPU
//! state.
//!
//! - [`ToneMappingMode`]: the three selectable operator curves
//! - [`CameraExposure`]: aperture / shutter / ISO triplet and its EV100 exposure

/// Tone mapping operator selection.
///
/// - [`Reinhard`](ToneMappingMode::Reinhard): classic `x / (1 + x)` curve,
///   soft highlight rolloff
/// - [`Filmic`](ToneMappingMode::Filmic): Hejl / Burgess-Dawson filmic fit
///   with the display gamma baked in
/// - [`Uncharted`](ToneMappingMode::Uncharted): Hable's Uncharted 2 curve with
///   white-point normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToneMappingMode {
    #[default]
    Reinhard,
    Filmic,
    Uncharted,
}

impl ToneMappingMode {
    /// Selector value consumed by the post-process shader (1-based).
    #[must_use]
    pub fn shader_index(self) -> u32 {
        match self {
            Self::Reinhard => 1,
            Self::Filmic => 2,
            Self::Uncharted => 3,
        }
    }

    /// Returns a human-readable name for the mode.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Reinhard => "Reinhard",
            Self::Filmic => "Filmic",
            Self::Uncharted => "Uncharted",
        }
    }

    /// Returns all available tone mapping modes.
    #[must_use]
    pub fn all() -> &'static [ToneMappingMode] {
        &[Self::Reinhard, Self::Filmic, Self::Uncharted]
    }

    /// Whether the curve already encodes display gamma.
    ///
    /// The filmic fit outputs gamma-space values, so the shader converts it
    /// back to linear before writing to an sRGB target.
    #[must_use]
    pub fn outputs_gamma_space(self) -> bool {
        matches!(self, Self::Filmic)
    }

    /// CPU reference of the curve, used by tests and UI previews.
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Reinhard => x / (1.0 + x),
            Self::Filmic => {
                let x = (x - 0.004).max(0.0);
                (x * (6.2 * x + 0.5)) / (x * (6.2 * x + 1.7) + 0.06)
            }
            Self::Uncharted => {
                const WHITE: f32 = 11.2;
                const EXPOSURE_BIAS: f32 = 2.0;
                (uncharted_partial(x * EXPOSURE_BIAS) / uncharted_partial(WHITE)).min(1.0)
            }
        }
    }
}

fn uncharted_partial(x: f32) -> f32 {
    const A: f32 = 0.15;
    const B: f32 = 0.50;
    const C: f32 = 0.10;
    const D: f32 = 0.20;
    const E: f32 = 0.02;
    const F: f32 = 0.30;
    ((x * (A * x + C * B) + D * E) / (x * (A * x + B) + D * F)) - E / F
}

// ============================================================================
// Photographic exposure
// ============================================================================

/// Physical camera settings driving exposure.
///
/// | Field           | Unit     | Default |
/// |-----------------|----------|---------|
/// | `aperture`      | f-stop   | 16      |
/// | `shutter_speed` | seconds  | 0.5     |
/// | `iso`           | ISO      | 1000    |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraExposure {
    pub aperture: f32,
    pub shutter_speed: f32,
    pub iso: f32,
}

impl Default for CameraExposure {
    fn default() -> Self {
        Self {
            aperture: 16.0,
            shutter_speed: 0.5,
            iso: 1000.0,
        }
    }
}

impl CameraExposure {
    /// Exposure value at ISO 100: `log2(N² / t · 100 / S)`.
    #[must_use]
    pub fn ev100(&self) -> f32 {
        let shutter = self.shutter_speed.max(f32::EPSILON);
        let iso = self.iso.max(f32::EPSILON);
        (self.aperture * self.aperture / shutter * 100.0 / iso).log2()
    }

    /// Linear scale applied to scene radiance before tone mapping.
    ///
    /// Uses the saturation-based sensitivity model: the maximum luminance the
    /// sensor records is `1.2 · 2^EV100`.
    #[must_use]
    pub fn exposure(&self) -> f32 {
        1.0 / (1.2 * self.ev100().exp2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_indices_are_one_based_and_distinct() {
        let indices: Vec<u32> = ToneMappingMode::all()
            .iter()
            .map(|m| m.shader_index())
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn curves_are_monotonic_and_bounded() {
        for mode in ToneMappingMode::all() {
            let mut last = mode.apply(0.0);
            for i in 1..200 {
                let v = mode.apply(i as f32 * 0.1);
                assert!(v >= last, "{} not monotonic", mode.name());
                assert!(v <= 1.05, "{} exceeds display range", mode.name());
                last = v;
            }
        }
    }
}
