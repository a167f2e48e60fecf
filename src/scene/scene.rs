use super::camera::Camera;
use super::frame_state::FrameState;
use super::light::{LightRegistry, default_lights};
use super::model::Model;
use crate::errors::Result;
use crate::resources::presets::ModelPreset;

/// Everything that is drawn: the camera, the lights and the model.
///
/// Scene data is plain CPU state. The renderer reads it once per frame and
/// never writes back.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub lights: LightRegistry,
    pub model: Model,
}

impl Scene {
    /// An empty scene: default camera and model, no lights.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let mut camera = Camera::default();
        camera.aspect = aspect;
        Self {
            camera,
            lights: LightRegistry::new(),
            model: Model::new(ModelPreset::default()),
        }
    }

    /// The reference scene with its three point lights and one directional light.
    pub fn with_default_lights(aspect: f32) -> Result<Self> {
        let mut scene = Self::new(aspect);
        default_lights(&mut scene.lights)?;
        Ok(scene)
    }

    /// Advances time-driven state (the model spin and preset swaps).
    pub fn update(&mut self, state: &FrameState) {
        self.model.reset(state.model_preset);
        self.model.animate(&state.model, state.time_seconds);
        self.model.transform.update_matrix();
    }
}
