//! GPU core
//!
//! - [`GpuContext`] / [`WindowSurface`]: device, queue and presentation
//! - [`RenderTargetManager`]: validated off-screen attachments
//! - [`GpuProfiler`]: per-pass timestamp queries
//! - [`LightingLayout`]: resolved offsets of the lighting uniform table
//! - upload helpers for meshes and textures, plus the mip chain generator

pub mod context;
pub mod mesh;
pub mod mipmap;
pub mod pipeline;
pub mod profiler;
pub mod readback;
pub mod targets;
pub mod texture;
pub mod uniforms;

pub use context::{GpuContext, WindowSurface};
pub use mesh::GpuMesh;
pub use mipmap::{MipBlit, MipChain, blit_plan, cube_blit_plan};
pub use profiler::{FrameTimings, GpuProfiler, PassTiming, Stamp};
pub use targets::{
    AttachmentSpec, CubeTarget, CubeTargetDesc, GBuffer, RenderTarget, RenderTargetDesc,
    RenderTargetManager, validate_cube_target, validate_target,
};
pub use texture::{MaterialMips, MaterialTextures};
pub use uniforms::{
    GpuDirectionalLight, GpuPointLight, LIGHTING_LAYOUT, LightingFlags, LightingGlobals,
    LightingLayout, LightingUniforms,
};
