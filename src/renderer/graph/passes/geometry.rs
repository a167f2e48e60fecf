//! Geometry Pass
//!
//! Rasterizes the model into the four G-buffer attachments in one pass with
//! multiple render targets. Color and depth are cleared first.
//!
//! The pass also owns the motion history. `prepare` fetches last frame's
//! `proj * view * model` for the velocity output and only then stores the
//! current one.

use std::borrow::Cow;
use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::renderer::core::mesh::GpuMesh;
use crate::renderer::core::profiler::{PassTiming, Stamp};
use crate::renderer::core::targets::{GBUFFER_DEPTH_FORMAT, GBuffer};
use crate::renderer::core::texture::{MaterialMips, MaterialTextures};
use crate::renderer::graph::context::{ExecuteContext, PrepareContext};
use crate::renderer::graph::node::RenderNode;
use crate::resources::mesh::MeshVertex;
use crate::resources::presets::{MaterialPreset, ModelPreset};
use crate::scene::frame_state::MotionHistory;
use crate::scene::model::Model;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct GeometryUniforms {
    model_view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    mvp: [[f32; 4]; 4],
    prev_mvp: [[f32; 4]; 4],
    albedo: [f32; 4],
}

pub struct GeometryPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    material_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,

    mesh: GpuMesh,
    model_preset: ModelPreset,
    material_preset: MaterialPreset,
    mips: MaterialMips,
    asset_root: PathBuf,

    history: MotionHistory,
}

impl GeometryPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        gbuffer: &GBuffer,
        model: &Model,
        material: MaterialPreset,
        asset_root: PathBuf,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Geometry Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("G-Buffer Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/gbuffer.wgsl"
            ))),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("G-Buffer Pipeline Layout"),
            bind_group_layouts: &[Some(&uniform_layout), Some(&material_layout)],
            immediate_size: 0,
        });
        let targets = gbuffer.target().color_targets();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("G-Buffer Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
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
            label: Some("Geometry Uniforms"),
            size: size_of::<GeometryUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Uniform BG"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            ..Default::default()
        });

        let mips = MaterialMips::new(device);
        let textures = MaterialTextures::load(
            device,
            queue,
            &mips,
            &material.texture_paths(&asset_root),
        );
        let material_bind_group =
            Self::material_bind_group(device, &material_layout, &textures, &sampler);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            material_layout,
            material_bind_group,
            sampler,
            mesh: GpuMesh::new(device, model.mesh()),
            model_preset: model.preset(),
            material_preset: material,
            mips,
            asset_root,
            history: MotionHistory::new(),
        }
    }

    fn material_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        textures: &MaterialTextures,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let [albedo, normal, roughness, metalness, ao] = textures.views();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material BG"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(albedo),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(roughness),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(metalness),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(ao),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Swaps the GPU mesh for `model`'s and forgets the motion history.
    pub fn reset_model(&mut self, device: &wgpu::Device, model: &Model) {
        self.mesh.reset(device, model.mesh());
        self.model_preset = model.preset();
        self.history.reset();
        log::info!("Model set to {}", model.preset().name());
    }

    /// Loads `preset`'s textures and rebinds them.
    pub fn reset_material(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        preset: MaterialPreset,
    ) {
        let textures = MaterialTextures::load(
            device,
            queue,
            &self.mips,
            &preset.texture_paths(&self.asset_root),
        );
        self.material_bind_group =
            Self::material_bind_group(device, &self.material_layout, &textures, &self.sampler);
        self.material_preset = preset;
        log::info!("Material set to {}", preset.name());
    }

    #[must_use]
    pub fn material_preset(&self) -> MaterialPreset {
        self.material_preset
    }

    #[must_use]
    pub fn history(&self) -> &MotionHistory {
        &self.history
    }
}

impl RenderNode for GeometryPass {
    fn name(&self) -> &'static str {
        "Geometry"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        if ctx.scene.model.preset() != self.model_preset {
            self.reset_model(ctx.device, &ctx.scene.model);
        }
        if ctx.state.material_preset != self.material_preset {
            self.reset_material(ctx.device, ctx.queue, ctx.state.material_preset);
        }

        let model = ctx.scene.model.transform.cached_matrix();
        let model_view = ctx.view.view * model;
        let mvp = ctx.view.proj * model_view;
        // Read last frame's matrix before this frame's replaces it.
        let prev_mvp = self.history.advance(mvp);

        let uniforms = GeometryUniforms {
            model_view: model_view.to_cols_array_2d(),
            proj: ctx.view.proj.to_cols_array_2d(),
            normal_matrix: model_view.inverse().transpose().to_cols_array_2d(),
            mvp: mvp.to_cols_array_2d(),
            prev_mvp: prev_mvp.to_cols_array_2d(),
            albedo: Vec4::from((ctx.state.material.albedo, 1.0)).to_array(),
        };
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let target = ctx.targets.gbuffer.target();
        let colors = target.color_attachments(wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT));
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &colors,
            depth_stencil_attachment: target.depth_attachment(wgpu::LoadOp::Clear(1.0)),
            timestamp_writes: ctx.profiler.pass_writes(PassTiming::Geometry, Stamp::Both),
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.material_bind_group, &[]);
        self.mesh.draw(&mut pass);
    }
}
