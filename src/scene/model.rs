use super::frame_state::ModelParams;
use super::transform::Transform;
use crate::resources::mesh::MeshData;
use crate::resources::presets::ModelPreset;

/// The displayed model: CPU mesh plus transform.
///
/// The GPU copy lives in the renderer and is swapped through its own
/// `reset` whenever [`Model::reset`] reports a new mesh.
#[derive(Debug, Clone)]
pub struct Model {
    preset: ModelPreset,
    mesh: MeshData,
    pub transform: Transform,
}

impl Model {
    #[must_use]
    pub fn new(preset: ModelPreset) -> Self {
        let mut transform = Transform::new();
        transform.set_uniform_scale(preset.scale());
        Self {
            preset,
            mesh: preset.build_mesh(),
            transform,
        }
    }

    #[inline]
    #[must_use]
    pub fn preset(&self) -> ModelPreset {
        self.preset
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Replaces the mesh with `preset`'s. Returns `false` if it was already active.
    pub fn reset(&mut self, preset: ModelPreset) -> bool {
        if preset == self.preset {
            return false;
        }
        self.preset = preset;
        self.mesh = preset.build_mesh();
        self.transform.set_uniform_scale(preset.scale());
        true
    }

    /// Applies the UI placement and the idle spin at `time` seconds.
    pub fn animate(&mut self, params: &ModelParams, time: f32) {
        self.transform.position = params.position;
        self.transform.rotation_axis = params.rotation_axis;
        self.transform.rotation_angle = params.rotation_angle(time);
    }
}
