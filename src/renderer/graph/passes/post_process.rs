//! Post-Process Pass
//!
//! One full-screen draw from the HDR lighting target to the output view:
//! optional FXAA over tone-mapped neighbours, exposure and the selected
//! operator, then optional velocity blur. Debug G-buffer views bypass the
//! tone curve so raw channel values reach the screen.
//!
//! Inputs are the lit HDR target and the G-buffer effects channel, which
//! carries velocity. Ambient occlusion is not sampled here: the lighting pass
//! has already multiplied the blurred SAO term into the ambient light, and the
//! AO debug view reads `sao_blur` through the lighting pass as well.

use bytemuck::{Pod, Zeroable};

use crate::renderer::core::pipeline::{
    fullscreen_pipeline, sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::core::profiler::{PassTiming, Stamp};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::FrameTargets;
use crate::renderer::graph::node::RenderNode;
use crate::resources::post_process::motion_blur_scale;
use crate::scene::frame_state::FrameState;

const FLAG_FXAA: u32 = 1 << 0;
const FLAG_MOTION_BLUR: u32 = 1 << 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PostUniforms {
    pub texel: [f32; 2],
    pub exposure: f32,
    /// Velocity multiplier, `floor(fps) / 60`.
    pub motion_scale: f32,
    pub tone_mapping: u32,
    pub gbuffer_view: u32,
    pub flags: u32,
    pub max_samples: u32,
    /// Non-zero when the output view encodes sRGB on store.
    pub output_srgb: u32,
    pub _pad: [u32; 3],
}

impl PostUniforms {
    #[must_use]
    pub fn new(state: &FrameState, width: u32, height: u32, output_srgb: bool) -> Self {
        let mut flags = 0;
        if state.fxaa {
            flags |= FLAG_FXAA;
        }
        if state.motion_blur.enabled {
            flags |= FLAG_MOTION_BLUR;
        }
        Self {
            texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            exposure: state.exposure.exposure(),
            motion_scale: motion_blur_scale(state.fps),
            tone_mapping: state.tone_mapping.shader_index(),
            gbuffer_view: state.gbuffer_view.shader_index(),
            flags,
            max_samples: state.motion_blur.max_samples.max(1),
            output_srgb: u32::from(output_srgb),
            _pad: [0; 3],
        }
    }
}

pub struct PostProcessPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    output_srgb: bool,
}

impl PostProcessPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        targets: &FrameTargets,
        output_format: wgpu::TextureFormat,
    ) -> Self {
        let d2 = wgpu::TextureViewDimension::D2;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post Process Layout"),
            entries: &[
                uniform_entry(0, size_of::<PostUniforms>() as u64, false),
                texture_entry(1, d2),
                texture_entry(2, d2),
                sampler_entry(3),
            ],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "Post Process",
            include_str!("../../shaders/post_process.wgsl"),
            &[&layout],
            output_format,
        );

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Post Process Uniforms"),
            size: size_of::<PostUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post Process Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Post Process BG"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(targets.lighting.color_view(0)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(targets.gbuffer.effects()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            output_srgb: output_format.is_srgb(),
        }
    }
}

impl RenderNode for PostProcessPass {
    fn name(&self) -> &'static str {
        "Post Process"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let uniforms = PostUniforms::new(
            ctx.state,
            ctx.targets.width,
            ctx.targets.height,
            self.output_srgb,
        );
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Post Process Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: ctx.profiler.pass_writes(PassTiming::PostProcess, Stamp::Both),
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        ctx.quad.draw(&mut pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_pack_toggles() {
        let mut state = FrameState::default();
        let u = PostUniforms::new(&state, 1280, 720, true);
        assert_eq!(u.flags, 0);
        assert_eq!(u.tone_mapping, 1);
        assert_eq!(u.output_srgb, 1);

        state.fxaa = true;
        state.motion_blur.enabled = true;
        state.fps = 120.4;
        let u = PostUniforms::new(&state, 1280, 720, false);
        assert_eq!(u.flags, FLAG_FXAA | FLAG_MOTION_BLUR);
        assert!((u.motion_scale - 2.0).abs() < 1e-6);
        assert!((u.texel[0] - 1.0 / 1280.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_block_is_16_byte_aligned() {
        assert_eq!(size_of::<PostUniforms>() % 16, 0);
    }
}
