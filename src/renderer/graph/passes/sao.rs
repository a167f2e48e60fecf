//! Ambient Obscurance Pass
//!
//! Three full-screen draws when enabled:
//!
//! ```text
//! position + normal ──► raw estimate ──► sao_raw
//! sao_raw  ──► horizontal blur ──► sao_temp
//! sao_temp ──► vertical blur   ──► sao_blur
//! ```
//!
//! When disabled the pass still runs, but only clears `sao_blur` to 1.0 so
//! lighting and the debug view read "no occlusion" instead of last frame's
//! estimate.

use crate::renderer::core::pipeline::{fullscreen_pipeline, texture_entry, uniform_entry};
use crate::renderer::core::profiler::{PassTiming, Stamp};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{FrameTargets, SAO_FORMAT};
use crate::renderer::graph::node::RenderNode;
use crate::resources::sao::{SaoBlurUniforms, SaoUniforms};

pub struct SaoPass {
    raw_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,

    raw_uniforms: wgpu::Buffer,
    blur_uniforms: [wgpu::Buffer; 2],

    raw_bind_group: wgpu::BindGroup,
    /// Horizontal reads `sao_raw`, vertical reads `sao_temp`.
    blur_bind_groups: [wgpu::BindGroup; 2],

    enabled: bool,
}

impl SaoPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, targets: &FrameTargets) -> Self {
        let d2 = wgpu::TextureViewDimension::D2;
        let raw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SAO Raw Layout"),
            entries: &[
                uniform_entry(0, size_of::<SaoUniforms>() as u64, false),
                texture_entry(1, d2),
                texture_entry(2, d2),
            ],
        });
        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SAO Blur Layout"),
            entries: &[
                uniform_entry(0, size_of::<SaoBlurUniforms>() as u64, false),
                texture_entry(1, d2),
            ],
        });

        let raw_pipeline = fullscreen_pipeline(
            device,
            "SAO Raw",
            include_str!("../../shaders/sao.wgsl"),
            &[&raw_layout],
            SAO_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "SAO Blur",
            include_str!("../../shaders/sao_blur.wgsl"),
            &[&blur_layout],
            SAO_FORMAT,
        );

        let uniform_buffer = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let raw_uniforms = uniform_buffer("SAO Uniforms", size_of::<SaoUniforms>());
        let blur_uniforms = [
            uniform_buffer("SAO Blur H Uniforms", size_of::<SaoBlurUniforms>()),
            uniform_buffer("SAO Blur V Uniforms", size_of::<SaoBlurUniforms>()),
        ];

        let raw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SAO Raw BG"),
            layout: &raw_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: raw_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(targets.gbuffer.position()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(targets.gbuffer.normal()),
                },
            ],
        });

        let blur_bind_group = |label: &str, uniforms: &wgpu::Buffer, source: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &blur_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                ],
            })
        };
        let blur_bind_groups = [
            blur_bind_group("SAO Blur H BG", &blur_uniforms[0], targets.sao_raw.color_view(0)),
            blur_bind_group("SAO Blur V BG", &blur_uniforms[1], targets.sao_temp.color_view(0)),
        ];

        Self {
            raw_pipeline,
            blur_pipeline,
            raw_uniforms,
            blur_uniforms,
            raw_bind_group,
            blur_bind_groups,
            enabled: true,
        }
    }

    fn fullscreen(
        &self,
        ctx: &ExecuteContext,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        stamp: Stamp,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: ctx.profiler.pass_writes(PassTiming::AmbientOcclusion, stamp),
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        ctx.quad.draw(&mut pass);
    }
}

impl RenderNode for SaoPass {
    fn name(&self) -> &'static str {
        "SAO"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let settings = &ctx.state.sao;
        self.enabled = settings.enabled;
        if !self.enabled {
            return;
        }
        let uniforms = settings.uniforms(ctx.targets.width, ctx.targets.height, ctx.view.fov_y);
        ctx.queue
            .write_buffer(&self.raw_uniforms, 0, bytemuck::bytes_of(&uniforms));
        for (buffer, blur) in self.blur_uniforms.iter().zip(settings.blur_uniforms()) {
            ctx.queue.write_buffer(buffer, 0, bytemuck::bytes_of(&blur));
        }
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let targets = ctx.targets;
        if !self.enabled {
            // Neutral fallback: a cleared, unoccluded buffer.
            let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("SAO Disabled Clear"),
                color_attachments: &targets
                    .sao_blur
                    .color_attachments(wgpu::LoadOp::Clear(wgpu::Color::WHITE)),
                depth_stencil_attachment: None,
                timestamp_writes: ctx.profiler.pass_writes(PassTiming::AmbientOcclusion, Stamp::Both),
                occlusion_query_set: None,
                multiview_mask: None,
            });
            return;
        }

        self.fullscreen(
            ctx,
            encoder,
            "SAO Raw Pass",
            targets.sao_raw.color_view(0),
            &self.raw_pipeline,
            &self.raw_bind_group,
            Stamp::Begin,
        );
        self.fullscreen(
            ctx,
            encoder,
            "SAO Blur H Pass",
            targets.sao_temp.color_view(0),
            &self.blur_pipeline,
            &self.blur_bind_groups[0],
            Stamp::None,
        );
        self.fullscreen(
            ctx,
            encoder,
            "SAO Blur V Pass",
            targets.sao_blur.color_view(0),
            &self.blur_pipeline,
            &self.blur_bind_groups[1],
            Stamp::End,
        );
    }
}
