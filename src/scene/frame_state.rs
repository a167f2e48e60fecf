//! Per-frame state
//!
//! [`FrameState`] is the single bag of toggles and sliders the UI and input
//! layer edit between frames. Every pass reads the fields it needs from one
//! shared `&FrameState`; nothing in the renderer mutates it.

use glam::{Mat4, Vec3};

use crate::resources::post_process::MotionBlurSettings;
use crate::resources::presets::{EnvironmentPreset, MaterialPreset, ModelPreset};
use crate::resources::sao::SaoSettings;
use crate::resources::tone_mapping::{CameraExposure, ToneMappingMode};

// ============================================================================
// Selectors
// ============================================================================

/// What the final image shows: the lit result or one raw G-buffer channel.
///
/// Bound to F1..F9 in viewer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GBufferView {
    #[default]
    Final,
    Position,
    Normal,
    Albedo,
    Roughness,
    Metalness,
    Depth,
    AmbientOcclusion,
    Velocity,
}

impl GBufferView {
    #[must_use]
    pub fn all() -> &'static [GBufferView] {
        &[
            Self::Final,
            Self::Position,
            Self::Normal,
            Self::Albedo,
            Self::Roughness,
            Self::Metalness,
            Self::Depth,
            Self::AmbientOcclusion,
            Self::Velocity,
        ]
    }

    /// Selector value consumed by the lighting and post-process shaders (1-based).
    #[must_use]
    pub fn shader_index(self) -> u32 {
        match self {
            Self::Final => 1,
            Self::Position => 2,
            Self::Normal => 3,
            Self::Albedo => 4,
            Self::Roughness => 5,
            Self::Metalness => 6,
            Self::Depth => 7,
            Self::AmbientOcclusion => 8,
            Self::Velocity => 9,
        }
    }

    /// View for a function key number (1 = F1).
    #[must_use]
    pub fn from_function_key(n: u32) -> Option<Self> {
        Self::all().get(n.checked_sub(1)? as usize).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Final => "Final",
            Self::Position => "Position",
            Self::Normal => "Normal",
            Self::Albedo => "Albedo",
            Self::Roughness => "Roughness",
            Self::Metalness => "Metalness",
            Self::Depth => "Depth",
            Self::AmbientOcclusion => "SAO",
            Self::Velocity => "Velocity",
        }
    }
}

/// Point light distance falloff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttenuationModel {
    /// `1 / d²`
    Quadratic,
    /// Inverse square windowed to zero at the light radius.
    #[default]
    Ue4,
}

impl AttenuationModel {
    #[must_use]
    pub fn all() -> &'static [AttenuationModel] {
        &[Self::Quadratic, Self::Ue4]
    }

    #[must_use]
    pub fn shader_index(self) -> u32 {
        match self {
            Self::Quadratic => 1,
            Self::Ue4 => 2,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Quadratic => "Quadratic",
            Self::Ue4 => "UE4",
        }
    }

    /// CPU reference of the falloff at `distance` for a light of `radius`.
    #[must_use]
    pub fn evaluate(self, distance: f32, radius: f32) -> f32 {
        let d2 = (distance * distance).max(1e-4);
        match self {
            Self::Quadratic => 1.0 / d2,
            Self::Ue4 => {
                let ratio = distance / radius.max(1e-4);
                let window = (1.0 - ratio.powi(4)).clamp(0.0, 1.0);
                window * window / (d2 + 1.0)
            }
        }
    }
}

// ============================================================================
// Material & model parameters
// ============================================================================

/// Scene-wide material overrides fed to the lighting pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub roughness: f32,
    pub metallic: f32,
    pub f0: Vec3,
    pub albedo: Vec3,
    pub ambient_intensity: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            roughness: 0.01,
            metallic: 0.02,
            f0: Vec3::splat(0.04),
            albedo: Vec3::ONE,
            ambient_intensity: 0.005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub position: Vec3,
    pub rotation_axis: Vec3,
    /// Multiplier on the idle spin, radians per 5 seconds.
    pub rotation_speed: f32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_axis: Vec3::Y,
            rotation_speed: 0.6,
        }
    }
}

impl ModelParams {
    /// Spin angle at `time` seconds.
    #[must_use]
    pub fn rotation_angle(&self, time: f32) -> f32 {
        time / 5.0 * self.rotation_speed
    }
}

// ============================================================================
// FrameState
// ============================================================================

/// Every runtime-tunable parameter of a frame.
///
/// | Group         | Defaults                                              |
/// |---------------|-------------------------------------------------------|
/// | Toggles       | points, directional, IBL, SAO on; FXAA, blur off      |
/// | Tone mapping  | Reinhard, aperture 16, shutter 0.5 s, ISO 1000        |
/// | Lighting      | UE4 attenuation, final view                           |
/// | Material      | roughness 0.01, metallic 0.02, F0 0.04, ambient 0.005 |
#[derive(Debug, Clone)]
pub struct FrameState {
    pub delta_seconds: f32,
    pub time_seconds: f32,
    /// Smoothed frame rate, drives the motion blur scale.
    pub fps: f32,

    pub point_lights: bool,
    pub directional_lights: bool,
    pub ibl: bool,
    pub fxaa: bool,

    pub sao: SaoSettings,
    pub motion_blur: MotionBlurSettings,
    pub tone_mapping: ToneMappingMode,
    pub exposure: CameraExposure,
    pub attenuation: AttenuationModel,
    pub gbuffer_view: GBufferView,

    pub material: MaterialParams,
    pub model: ModelParams,

    pub model_preset: ModelPreset,
    pub material_preset: MaterialPreset,
    pub environment_preset: EnvironmentPreset,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            delta_seconds: 0.0,
            time_seconds: 0.0,
            fps: 60.0,
            point_lights: true,
            directional_lights: true,
            ibl: true,
            fxaa: false,
            sao: SaoSettings::default(),
            motion_blur: MotionBlurSettings::default(),
            tone_mapping: ToneMappingMode::default(),
            exposure: CameraExposure::default(),
            attenuation: AttenuationModel::default(),
            gbuffer_view: GBufferView::default(),
            material: MaterialParams::default(),
            model: ModelParams::default(),
            model_preset: ModelPreset::default(),
            material_preset: MaterialPreset::default(),
            environment_preset: EnvironmentPreset::default(),
        }
    }
}

impl FrameState {
    /// Switches the material preset and applies its F0 override.
    pub fn select_material(&mut self, preset: MaterialPreset) {
        if preset == self.material_preset {
            return;
        }
        self.material_preset = preset;
        self.material.f0 = preset.f0();
    }
}

// ============================================================================
// Motion history
// ============================================================================

/// Last frame's `proj * view * model`, for velocity reconstruction.
///
/// [`advance`](Self::advance) hands out the stored matrix before replacing
/// it, so the current frame is always compared against the previous one.
/// On the very first frame there is no history and the current matrix is
/// returned, which yields zero velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionHistory {
    previous: Option<Mat4>,
}

impl MotionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous matrix, then stores `current`.
    pub fn advance(&mut self, current: Mat4) -> Mat4 {
        let previous = self.previous.unwrap_or(current);
        self.previous = Some(current);
        previous
    }

    #[must_use]
    pub fn previous(&self) -> Option<Mat4> {
        self.previous
    }

    /// Forgets the history, e.g. after the model is swapped.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
