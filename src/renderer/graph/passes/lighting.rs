//! Deferred Lighting Pass
//!
//! Shades every G-buffer pixel once with all registered lights plus the
//! image-based ambient term, writing HDR radiance into the lighting target.
//!
//! # Uniform traffic
//!
//! The globals block is rewritten every frame. Light slots are rewritten
//! only when the registry version or the view matrix moved since the last
//! upload; each slot goes to its own offset from [`LIGHTING_LAYOUT`], so a
//! light keeps its array index for as long as it lives. Vacant slots are
//! written zeroed, which the shader reads as disabled.
//!
//! # IBL binding
//!
//! The IBL bind group is keyed by the environment generation. A swapped
//! environment set gets a fresh bind group on the next `prepare`; a failed
//! swap leaves both untouched.

use bytemuck::Zeroable;
use glam::Mat4;

use crate::renderer::core::pipeline::{
    fullscreen_pipeline, sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::core::profiler::{PassTiming, Stamp};
use crate::renderer::core::uniforms::{
    GpuDirectionalLight, GpuPointLight, LIGHTING_LAYOUT, LightingFlags, LightingGlobals,
};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::frame::{FrameTargets, HDR_FORMAT};
use crate::renderer::graph::node::RenderNode;
use crate::renderer::graph::passes::environment::EnvironmentMapSet;
use crate::scene::light::{LightRegistry, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS};

/// What the light slots in the uniform buffer were last built from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LightUploadKey {
    version: u64,
    view: Mat4,
}

pub struct LightingPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    gbuffer_bind_group: wgpu::BindGroup,

    ibl_layout: wgpu::BindGroupLayout,
    ibl_sampler: wgpu::Sampler,
    ibl: Option<(u64, wgpu::BindGroup)>,

    uploaded: Option<LightUploadKey>,
    light_uploads: u64,
}

impl LightingPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, targets: &FrameTargets) -> Self {
        let d2 = wgpu::TextureViewDimension::D2;
        let cube = wgpu::TextureViewDimension::Cube;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Uniform Layout"),
            entries: &[uniform_entry(0, LIGHTING_LAYOUT.size, false)],
        });
        let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting G-Buffer Layout"),
            entries: &[
                texture_entry(0, d2),
                texture_entry(1, d2),
                texture_entry(2, d2),
                texture_entry(3, d2),
                texture_entry(4, d2),
            ],
        });
        let ibl_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting IBL Layout"),
            entries: &[
                texture_entry(0, cube),
                texture_entry(1, cube),
                texture_entry(2, d2),
                texture_entry(3, cube),
                sampler_entry(4),
            ],
        });

        let pipeline = fullscreen_pipeline(
            device,
            "Deferred Lighting",
            include_str!("../../shaders/lighting.wgsl"),
            &[&uniform_layout, &gbuffer_layout, &ibl_layout],
            HDR_FORMAT,
        );

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Uniforms"),
            size: LIGHTING_LAYOUT.size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Uniform BG"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let gbuffer = &targets.gbuffer;
        let views = [
            gbuffer.position(),
            gbuffer.albedo(),
            gbuffer.normal(),
            gbuffer.effects(),
            targets.sao_blur.color_view(0),
        ];
        let entries: Vec<wgpu::BindGroupEntry> = views
            .iter()
            .enumerate()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        let gbuffer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting G-Buffer BG"),
            layout: &gbuffer_layout,
            entries: &entries,
        });

        let ibl_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("IBL Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            gbuffer_bind_group,
            ibl_layout,
            ibl_sampler,
            ibl: None,
            uploaded: None,
            light_uploads: 0,
        }
    }

    /// Generation of the environment set the IBL bind group points at.
    #[must_use]
    pub fn bound_environment(&self) -> Option<u64> {
        self.ibl.as_ref().map(|(generation, _)| *generation)
    }

    /// How many times the light slots were rewritten.
    #[must_use]
    pub fn light_uploads(&self) -> u64 {
        self.light_uploads
    }

    fn bind_environment(&mut self, device: &wgpu::Device, environment: &EnvironmentMapSet) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting IBL BG"),
            layout: &self.ibl_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&environment.irradiance.cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&environment.prefilter.cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&environment.brdf_lut),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&environment.cube.cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.ibl_sampler),
                },
            ],
        });
        self.ibl = Some((environment.generation(), bind_group));
    }

    fn upload_lights(&mut self, queue: &wgpu::Queue, lights: &LightRegistry, view: &Mat4) {
        let mut points = [GpuPointLight::zeroed(); MAX_POINT_LIGHTS];
        for (gpu, light) in points.iter_mut().zip(lights.point_slots()) {
            if let Some(light) = light {
                *gpu = GpuPointLight::from_light(light, view);
            }
        }
        let mut directionals = [GpuDirectionalLight::zeroed(); MAX_DIRECTIONAL_LIGHTS];
        for (gpu, light) in directionals.iter_mut().zip(lights.directional_slots()) {
            if let Some(light) = light {
                *gpu = GpuDirectionalLight::from_light(light, view);
            }
        }

        for (slot, light) in points.iter().enumerate() {
            queue.write_buffer(
                &self.uniform_buffer,
                LIGHTING_LAYOUT.point_offset(slot),
                bytemuck::bytes_of(light),
            );
        }
        for (slot, light) in directionals.iter().enumerate() {
            queue.write_buffer(
                &self.uniform_buffer,
                LIGHTING_LAYOUT.directional_offset(slot),
                bytemuck::bytes_of(light),
            );
        }
        self.light_uploads += 1;
    }
}

impl RenderNode for LightingPass {
    fn name(&self) -> &'static str {
        "Lighting"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        if self.bound_environment() != Some(ctx.environment.generation()) {
            self.bind_environment(ctx.device, ctx.environment);
        }

        let key = LightUploadKey {
            version: ctx.scene.lights.version(),
            view: ctx.view.view,
        };
        if self.uploaded != Some(key) {
            self.upload_lights(ctx.queue, &ctx.scene.lights, &ctx.view.view);
            self.uploaded = Some(key);
        }

        let state = ctx.state;
        let (w, h) = (ctx.targets.width as f32, ctx.targets.height as f32);
        let globals = LightingGlobals {
            inv_view: ctx.view.inv_view.to_cols_array_2d(),
            inv_proj: ctx.view.inv_proj.to_cols_array_2d(),
            view: ctx.view.view.to_cols_array_2d(),
            screen: [w, h, 1.0 / w, 1.0 / h],
            f0: state.material.f0.extend(0.0).to_array(),
            roughness: state.material.roughness,
            metallic: state.material.metallic,
            ambient_intensity: state.material.ambient_intensity,
            flags: LightingFlags::from_state(state).bits(),
            attenuation: state.attenuation.shader_index(),
            gbuffer_view: state.gbuffer_view.shader_index(),
            prefilter_max_mip: ctx.environment.prefilter.mip_levels().saturating_sub(1) as f32,
            _pad: 0,
        };
        ctx.queue.write_buffer(
            &self.uniform_buffer,
            LIGHTING_LAYOUT.globals,
            bytemuck::bytes_of(&globals),
        );
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some((_, ibl)) = &self.ibl else {
            log::error!("Lighting pass ran before an environment was bound");
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Lighting Pass"),
            color_attachments: &ctx
                .targets
                .lighting
                .color_attachments(wgpu::LoadOp::Clear(wgpu::Color::BLACK)),
            depth_stencil_attachment: None,
            timestamp_writes: ctx.profiler.pass_writes(PassTiming::Lighting, Stamp::Both),
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.gbuffer_bind_group, &[]);
        pass.set_bind_group(2, ibl, &[]);
        ctx.quad.draw(&mut pass);
    }
}
