//! Frame-persistent targets and per-frame camera data.

use glam::{Mat4, Vec3};

use crate::errors::Result;
use crate::renderer::core::targets::{
    AttachmentSpec, GBUFFER_DEPTH_FORMAT, GBuffer, RenderTarget, RenderTargetDesc,
    RenderTargetManager,
};
use crate::scene::camera::Camera;

/// Format of the HDR lighting output.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Format of the obscurance targets.
pub const SAO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Every off-screen target the passes exchange, created once at startup.
///
/// | Target          | Writer              | Readers                  |
/// |-----------------|---------------------|--------------------------|
/// | `gbuffer`       | geometry            | SAO, lighting, post, fwd |
/// | `sao_raw`       | SAO                 | SAO blur                 |
/// | `sao_temp`      | SAO blur (H)        | SAO blur (V)             |
/// | `sao_blur`      | SAO blur (V)        | lighting, post           |
/// | `lighting`      | lighting            | post                     |
/// | `display_depth` | forward (depth blit)| forward                  |
pub struct FrameTargets {
    pub width: u32,
    pub height: u32,
    pub gbuffer: GBuffer,
    pub sao_raw: RenderTarget,
    pub sao_temp: RenderTarget,
    pub sao_blur: RenderTarget,
    pub lighting: RenderTarget,
    pub display_depth: RenderTarget,
}

impl FrameTargets {
    pub fn new(manager: &mut RenderTargetManager, width: u32, height: u32) -> Result<Self> {
        let gbuffer = manager.create_gbuffer(width, height)?;

        let sao = |label: &'static str| {
            RenderTargetDesc::new(label, width, height)
                .with_color(AttachmentSpec::new(label, SAO_FORMAT).linear())
                .with_usage(wgpu::TextureUsages::COPY_SRC)
        };
        let sao_raw = manager.create_target(&sao("SAO Raw"))?;
        let sao_temp = manager.create_target(&sao("SAO Blur Temp"))?;
        let sao_blur = manager.create_target(&sao("SAO Blur"))?;

        let lighting = manager.create_target(
            &RenderTargetDesc::new("Lighting", width, height)
                .with_color(AttachmentSpec::new("Lighting HDR", HDR_FORMAT).linear())
                .with_usage(wgpu::TextureUsages::COPY_SRC),
        )?;

        let display_depth = manager.create_target(
            &RenderTargetDesc::new("Display Depth", width, height)
                .with_depth(AttachmentSpec::new("Display Depth", GBUFFER_DEPTH_FORMAT))
                .with_usage(wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC),
        )?;

        Ok(Self {
            width,
            height,
            gbuffer,
            sao_raw,
            sao_temp,
            sao_blur,
            lighting,
            display_depth,
        })
    }

    #[must_use]
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Camera matrices for the frame being recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    pub inv_view: Mat4,
    pub inv_proj: Mat4,
    pub camera_position: Vec3,
    pub camera_right: Vec3,
    pub camera_up: Vec3,
    pub fov_y: f32,
}

impl FrameView {
    #[must_use]
    pub fn from_camera(camera: &Camera) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix();
        Self {
            view,
            proj,
            view_proj: proj * view,
            inv_view: view.inverse(),
            inv_proj: proj.inverse(),
            camera_position: camera.position,
            camera_right: camera.right(),
            camera_up: camera.up(),
            fov_y: camera.fov_radians(),
        }
    }
}
