//! Forward Overlay Pass
//!
//! Draws non-deferred geometry over the post-processed image:
//!
//! 1. Copy the G-buffer depth into the display depth target, so overlay
//!    geometry is hidden behind the model.
//! 2. Draw one camera-facing quad per visible point light, tinted with the
//!    light color. No lighting model, one transform and one color per draw.
//!
//! The timestamps of this pass cover step 2; the copy is recorded just
//! before it.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::core::pipeline::{shader_module, uniform_entry};
use crate::renderer::core::profiler::{PassTiming, Stamp};
use crate::renderer::core::targets::GBUFFER_DEPTH_FORMAT;
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::FrameView;
use crate::renderer::graph::node::RenderNode;
use crate::scene::light::{MAX_POINT_LIGHTS, PointLight};
use crate::scene::shape::ShapeKind;

/// World-space half extent of a light gizmo.
pub const GIZMO_SCALE: f32 = 0.15;
const UNIFORM_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct GizmoUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Model matrix of a quad at `position` facing the camera.
#[must_use]
pub fn billboard_matrix(position: Vec3, view: &FrameView) -> Mat4 {
    let right = view.camera_right * GIZMO_SCALE;
    let up = view.camera_up * GIZMO_SCALE;
    let toward_camera = view.camera_right.cross(view.camera_up) * GIZMO_SCALE;
    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        toward_camera.extend(0.0),
        position.extend(1.0),
    )
}

/// Point lights that get a gizmo this frame.
pub fn visible_gizmos<'a>(
    lights: impl Iterator<Item = Option<&'a PointLight>>,
    enabled: bool,
) -> impl Iterator<Item = &'a PointLight> {
    lights
        .flatten()
        .filter(move |light| enabled && light.gizmo)
}

pub struct ForwardPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    gizmo_count: u32,
}

impl ForwardPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gizmo Layout"),
            entries: &[uniform_entry(0, size_of::<GizmoUniforms>() as u64, true)],
        });
        let module = shader_module(device, "Gizmo Shader", include_str!("../../shaders/gizmo.wgsl"));
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Gizmo Pipeline Layout"),
            bind_group_layouts: &[Some(&layout)],
            immediate_size: 0,
        });
        let kind = ShapeKind::Quad;
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Gizmo Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[kind.vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: kind.topology(),
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: GBUFFER_DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Gizmo Uniforms"),
            size: UNIFORM_STRIDE * MAX_POINT_LIGHTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gizmo BG"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<GizmoUniforms>() as u64),
                }),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            gizmo_count: 0,
        }
    }

    /// Gizmos drawn by the last recorded frame.
    #[must_use]
    pub fn gizmo_count(&self) -> u32 {
        self.gizmo_count
    }

    fn copy_depth(ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let (Some(source), Some(destination)) =
            (ctx.targets.gbuffer.depth(), ctx.targets.display_depth.depth())
        else {
            log::error!("Depth blit skipped: a depth attachment is missing");
            return;
        };
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &source.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &destination.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::DepthOnly,
            },
            ctx.targets.extent(),
        );
    }
}

impl RenderNode for ForwardPass {
    fn name(&self) -> &'static str {
        "Forward"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let mut count = 0;
        let gizmos = visible_gizmos(ctx.scene.lights.point_slots(), ctx.state.point_lights);
        for (i, light) in gizmos.enumerate() {
            let mvp = ctx.view.view_proj * billboard_matrix(light.position, ctx.view);
            let uniforms = GizmoUniforms {
                mvp: mvp.to_cols_array_2d(),
                color: light.color.extend(1.0).to_array(),
            };
            ctx.queue.write_buffer(
                &self.uniform_buffer,
                i as u64 * UNIFORM_STRIDE,
                bytemuck::bytes_of(&uniforms),
            );
            count += 1;
        }
        self.gizmo_count = count;
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        Self::copy_depth(ctx, encoder);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Gizmo Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: ctx.targets.display_depth.depth_attachment(wgpu::LoadOp::Load),
            timestamp_writes: ctx.profiler.pass_writes(PassTiming::Forward, Stamp::Both),
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        for i in 0..self.gizmo_count {
            pass.set_bind_group(0, &self.bind_group, &[i * UNIFORM_STRIDE as u32]);
            ctx.quad.draw(&mut pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::camera::Camera;

    #[test]
    fn billboard_keeps_position_and_scale() {
        let view = FrameView::from_camera(&Camera::default());
        let m = billboard_matrix(Vec3::new(1.0, 2.0, 3.0), &view);
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
        assert!((m.x_axis.truncate().length() - GIZMO_SCALE).abs() < 1e-5);
    }

    #[test]
    fn gizmos_follow_toggle_and_flag() {
        let mut hidden = PointLight::new(Vec3::ZERO, Vec3::ONE, 3.0);
        hidden.gizmo = false;
        let shown = PointLight::new(Vec3::X, Vec3::ONE, 3.0);
        let slots = [Some(&hidden), None, Some(&shown)];
        assert_eq!(visible_gizmos(slots.into_iter(), true).count(), 1);
        assert_eq!(visible_gizmos(slots.into_iter(), false).count(), 0);
    }
}
