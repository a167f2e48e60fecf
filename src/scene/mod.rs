//! Scene data
//!
//! CPU-side state the renderer consumes each frame:
//! - Camera: first-person fly camera
//! - Light: point / directional lights in a slot-stable registry
//! - Shape: fixed vertex buffers and the draw recording seam
//! - Model: the displayed preset mesh and its transform
//! - FrameState: toggles and sliders edited between frames

pub mod camera;
pub mod frame_state;
pub mod light;
pub mod model;
pub mod scene;
pub mod shape;
pub mod transform;

pub use camera::{Camera, CameraMovement};
pub use frame_state::{
    AttenuationModel, FrameState, GBufferView, MaterialParams, ModelParams, MotionHistory,
};
pub use light::{
    DirectionalLight, Light, LightId, LightKind, LightRegistry, MAX_DIRECTIONAL_LIGHTS,
    MAX_POINT_LIGHTS, PointLight,
};
pub use model::Model;
pub use scene::Scene;
pub use shape::{DrawCall, DrawRecorder, Shape, ShapeKind};
pub use transform::Transform;
