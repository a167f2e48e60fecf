//! CPU-side resource definitions
//!
//! Plain data the renderer consumes, with no GPU state attached:
//! - Image: decoded HDR / LDR pixel buffers
//! - Mesh: vertex layouts and indexed triangle lists
//! - Primitives: procedural meshes for the model presets
//! - Presets: built-in models, materials and environments
//! - Sao / ToneMapping / PostProcess: effect parameters edited by the UI

pub mod image;
pub mod mesh;
pub mod post_process;
pub mod presets;
pub mod primitives;
pub mod sao;
pub mod tone_mapping;

pub use image::{HdrImage, LdrImage};
pub use mesh::{MeshData, MeshVertex, QuadVertex};
pub use post_process::{MotionBlurSettings, motion_blur_sample_count, motion_blur_scale};
pub use presets::{EnvironmentPreset, MaterialPreset, MaterialTexturePaths, ModelPreset};
pub use sao::{SaoBlurUniforms, SaoSettings, SaoUniforms};
pub use tone_mapping::{CameraExposure, ToneMappingMode};
