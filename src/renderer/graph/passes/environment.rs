//! Environment Precomputation
//!
//! Derives the image-based lighting textures from one equirectangular HDR
//! source, in a fixed order:
//!
//! ```text
//! equirect ──► env cube (512², full mips) ──┬──► irradiance cube (32²)
//!                                           └──► prefilter cube (128², 5 mips)
//! quad ──────► BRDF LUT (512², Rg16Float, rendered once)
//! ```
//!
//! Every face of every cube is rendered by drawing the cube [`Shape`] through
//! one of six fixed capture views into a `(face, mip)` slice view. The whole
//! stage is recorded into a single encoder and submitted once.
//!
//! The output is a fresh [`EnvironmentMapSet`]. The caller swaps it in only
//! when the stage succeeded, so the lighting pass never sees a half-updated
//! set.

use std::borrow::Cow;
use std::num::NonZeroU64;
use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use crate::errors::{LuminaError, Result};
use crate::renderer::core::mipmap::MipChain;
use crate::renderer::core::targets::{
    AttachmentSpec, CubeTarget, CubeTargetDesc, RenderTarget, RenderTargetDesc,
    RenderTargetManager,
};
use crate::renderer::core::texture::upload_hdr;
use crate::renderer::settings::EnvironmentSettings;
use crate::resources::image::HdrImage;
use crate::scene::shape::{Shape, ShapeKind};

pub const CUBE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const BRDF_LUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;

/// Capture uniform stride; the default `min_uniform_buffer_offset_alignment`.
const UNIFORM_STRIDE: u64 = 256;

// ============================================================================
// Capture geometry
// ============================================================================

/// Look-at matrices for the six faces in `+X, -X, +Y, -Y, +Z, -Z` order.
///
/// Up vectors follow the usual cube map convention: `-Y` for the side faces,
/// `+Z` for `+Y` and `-Z` for `-Y`.
#[must_use]
pub fn capture_views() -> [Mat4; 6] {
    let eye = Vec3::ZERO;
    [
        Mat4::look_at_rh(eye, Vec3::X, Vec3::NEG_Y),
        Mat4::look_at_rh(eye, Vec3::NEG_X, Vec3::NEG_Y),
        Mat4::look_at_rh(eye, Vec3::Y, Vec3::Z),
        Mat4::look_at_rh(eye, Vec3::NEG_Y, Vec3::NEG_Z),
        Mat4::look_at_rh(eye, Vec3::Z, Vec3::NEG_Y),
        Mat4::look_at_rh(eye, Vec3::NEG_Z, Vec3::NEG_Y),
    ]
}

/// 90° square projection shared by all faces.
///
/// Row 0 of a wgpu render target is NDC `y = +1`, while cube face texel rows
/// run along `-up`, so clip-space `y` is negated.
#[must_use]
pub fn capture_projection() -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
        * Mat4::perspective_rh(90f32.to_radians(), 1.0, 0.1, 10.0)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct CaptureUniforms {
    view_proj: [[f32; 4]; 4],
    roughness: f32,
    /// Face size of the cube being sampled.
    source_resolution: f32,
    sample_count: u32,
    _pad: u32,
}

// ============================================================================
// EnvironmentMapSet
// ============================================================================

/// One consistent snapshot of the IBL textures.
pub struct EnvironmentMapSet {
    pub source: wgpu::Texture,
    pub cube: CubeTarget,
    pub irradiance: CubeTarget,
    pub prefilter: CubeTarget,
    pub brdf_lut: wgpu::TextureView,
    generation: u64,
}

impl EnvironmentMapSet {
    /// Monotonic id of the precompute run that produced this set.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ============================================================================
// EnvironmentStage
// ============================================================================

/// Pipelines and scratch state of the precompute stage.
pub struct EnvironmentStage {
    settings: EnvironmentSettings,
    cube: Shape,
    quad: Shape,

    uniform_layout: wgpu::BindGroupLayout,
    equirect_layout: wgpu::BindGroupLayout,
    cube_layout: wgpu::BindGroupLayout,

    equirect_pipeline: wgpu::RenderPipeline,
    irradiance_pipeline: wgpu::RenderPipeline,
    prefilter_pipeline: wgpu::RenderPipeline,
    brdf_pipeline: wgpu::RenderPipeline,

    sampler: wgpu::Sampler,
    mips: MipChain,

    brdf_lut: Option<RenderTarget>,
    generation: u64,
}

impl EnvironmentStage {
    #[must_use]
    pub fn new(device: &wgpu::Device, settings: EnvironmentSettings) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Capture Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(size_of::<CaptureUniforms>() as u64),
                },
                count: None,
            }],
        });

        let source_layout = |label: &str, dimension: wgpu::TextureViewDimension| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: dimension,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })
        };
        let equirect_layout = source_layout("Equirect Source Layout", wgpu::TextureViewDimension::D2);
        let cube_layout = source_layout("Cube Source Layout", wgpu::TextureViewDimension::Cube);

        let capture_pipeline = |label: &str,
                                source: &'static str,
                                layouts: &[&wgpu::BindGroupLayout],
                                kind: ShapeKind,
                                format: wgpu::TextureFormat| {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
            });
            let layouts: SmallVec<[Option<&wgpu::BindGroupLayout>; 2]> =
                layouts.iter().copied().map(Some).collect();
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &layouts,
                immediate_size: 0,
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
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
                        format,
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
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let equirect_pipeline = capture_pipeline(
            "Equirect To Cube",
            include_str!("../../shaders/equirect_to_cube.wgsl"),
            &[&uniform_layout, &equirect_layout],
            ShapeKind::Cube,
            CUBE_FORMAT,
        );
        let irradiance_pipeline = capture_pipeline(
            "Irradiance Convolution",
            include_str!("../../shaders/irradiance.wgsl"),
            &[&uniform_layout, &cube_layout],
            ShapeKind::Cube,
            CUBE_FORMAT,
        );
        let prefilter_pipeline = capture_pipeline(
            "Specular Prefilter",
            include_str!("../../shaders/prefilter.wgsl"),
            &[&uniform_layout, &cube_layout],
            ShapeKind::Cube,
            CUBE_FORMAT,
        );
        let brdf_pipeline = capture_pipeline(
            "BRDF LUT",
            include_str!("../../shaders/brdf_lut.wgsl"),
            &[&uniform_layout],
            ShapeKind::Quad,
            BRDF_LUT_FORMAT,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Environment Capture Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let mips = MipChain::new(device, CUBE_FORMAT);

        Self {
            settings,
            cube: Shape::upload(device, ShapeKind::Cube),
            quad: Shape::upload(device, ShapeKind::Quad),
            uniform_layout,
            equirect_layout,
            cube_layout,
            equirect_pipeline,
            irradiance_pipeline,
            prefilter_pipeline,
            brdf_pipeline,
            sampler,
            mips,
            brdf_lut: None,
            generation: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EnvironmentSettings {
        &self.settings
    }

    /// Number of precompute runs that completed.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the whole stage on `image` and returns the new set.
    ///
    /// Nothing is returned on failure, so the caller's current set stays
    /// in place.
    pub fn precompute(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        targets: &mut RenderTargetManager,
        image: &HdrImage,
    ) -> Result<EnvironmentMapSet> {
        if image.is_empty() {
            return Err(LuminaError::EnvironmentPrecompute(
                "source image has no pixels".to_string(),
            ));
        }
        let started = Instant::now();
        let s = self.settings;

        let cube = targets.create_cube_target(&CubeTargetDesc {
            label: "Environment Cube",
            size: s.cube_size,
            mip_levels: s.cube_mip_count(),
            format: CUBE_FORMAT,
        })?;
        let irradiance = targets.create_cube_target(&CubeTargetDesc {
            label: "Irradiance Cube",
            size: s.irradiance_size,
            mip_levels: 1,
            format: CUBE_FORMAT,
        })?;
        let prefilter = targets.create_cube_target(&CubeTargetDesc {
            label: "Prefilter Cube",
            size: s.prefilter_size,
            mip_levels: s.prefilter_mips,
            format: CUBE_FORMAT,
        })?;
        if self.brdf_lut.is_none() {
            let lut = targets.create_target(
                &RenderTargetDesc::new("BRDF LUT", s.brdf_lut_size, s.brdf_lut_size)
                    .with_color(AttachmentSpec::new("BRDF LUT", BRDF_LUT_FORMAT).linear())
                    .with_usage(wgpu::TextureUsages::COPY_SRC),
            )?;
            self.brdf_lut = Some(lut);
            self.record_brdf_lut(device, queue);
        }
        let Some(brdf_lut) = self.brdf_lut.as_ref().map(|t| t.color_view(0).clone()) else {
            return Err(LuminaError::EnvironmentPrecompute(
                "BRDF LUT missing".to_string(),
            ));
        };

        let source = upload_hdr(device, queue, image, "Environment Equirect");
        let source_view = source.create_view(&wgpu::TextureViewDescriptor::default());

        // Draw order: 6 equirect faces, 6 irradiance faces, 6 x mips prefilter.
        let uniforms = self.capture_uniforms();
        let uniform_buffer = self.upload_uniforms(device, queue, &uniforms);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Capture Uniform BG"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(size_of::<CaptureUniforms>() as u64),
                }),
            }],
        });
        let source_bind_group = |layout: &wgpu::BindGroupLayout, view: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Capture Source BG"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
        };
        let equirect_bg = source_bind_group(&self.equirect_layout, &source_view);
        let cube_bg = source_bind_group(&self.cube_layout, &cube.cube_view);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Environment Precompute"),
        });
        let mut draw = 0u32;

        // 1. Equirect -> cube, then the full mip chain.
        for face in 0..6 {
            self.capture(
                &mut encoder,
                &cube.face_view(face, 0),
                &self.equirect_pipeline,
                &uniform_bind_group,
                draw,
                &equirect_bg,
            );
            draw += 1;
        }
        let blits = self.mips.generate_cube(device, &mut encoder, &cube)?;

        // 2. Irradiance.
        for face in 0..6 {
            self.capture(
                &mut encoder,
                &irradiance.face_view(face, 0),
                &self.irradiance_pipeline,
                &uniform_bind_group,
                draw,
                &cube_bg,
            );
            draw += 1;
        }

        // 3. Prefilter, one roughness per mip.
        for mip in 0..s.prefilter_mips {
            for face in 0..6 {
                self.capture(
                    &mut encoder,
                    &prefilter.face_view(face, mip),
                    &self.prefilter_pipeline,
                    &uniform_bind_group,
                    draw,
                    &cube_bg,
                );
                draw += 1;
            }
        }

        queue.submit(Some(encoder.finish()));

        self.generation += 1;
        log::info!(
            "Environment precompute #{} done in {:.1} ms ({draw} captures, {blits} mip blits)",
            self.generation,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(EnvironmentMapSet {
            source,
            cube,
            irradiance,
            prefilter,
            brdf_lut,
            generation: self.generation,
        })
    }

    /// Uniform entries in draw order, plus one trailing entry for the LUT.
    fn capture_uniforms(&self) -> Vec<CaptureUniforms> {
        let s = self.settings;
        let proj = capture_projection();
        let views = capture_views();
        let entry = |face: usize, roughness: f32, source_resolution: u32| CaptureUniforms {
            view_proj: (proj * views[face]).to_cols_array_2d(),
            roughness,
            source_resolution: source_resolution as f32,
            sample_count: s.sample_count,
            _pad: 0,
        };

        let mut entries = Vec::with_capacity(12 + 6 * s.prefilter_mips as usize);
        // The equirect source is sampled by UV and has no face size.
        entries.extend((0..6).map(|face| entry(face, 0.0, 0)));
        entries.extend((0..6).map(|face| entry(face, 0.0, s.cube_size)));
        for mip in 0..s.prefilter_mips {
            let roughness = s.prefilter_roughness(mip);
            entries.extend((0..6).map(|face| entry(face, roughness, s.cube_size)));
        }
        entries
    }

    fn upload_uniforms(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        entries: &[CaptureUniforms],
    ) -> wgpu::Buffer {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Uniforms"),
            size: UNIFORM_STRIDE * entries.len().max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        for (i, entry) in entries.iter().enumerate() {
            queue.write_buffer(&buffer, i as u64 * UNIFORM_STRIDE, bytemuck::bytes_of(entry));
        }
        buffer
    }

    fn capture(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        uniforms: &wgpu::BindGroup,
        draw: u32,
        source: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Environment Capture"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, uniforms, &[draw * UNIFORM_STRIDE as u32]);
        pass.set_bind_group(1, source, &[]);
        self.cube.draw(&mut pass);
    }

    fn record_brdf_lut(&self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let Some(lut) = &self.brdf_lut else {
            return;
        };
        let entry = CaptureUniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            roughness: 0.0,
            source_resolution: 0.0,
            sample_count: self.settings.sample_count,
            _pad: 0,
        };
        let buffer = self.upload_uniforms(device, queue, &[entry]);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("BRDF LUT Uniform BG"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(size_of::<CaptureUniforms>() as u64),
                }),
            }],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("BRDF LUT"),
        });
        {
            let attachments = lut.color_attachments(wgpu::LoadOp::Clear(wgpu::Color::BLACK));
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("BRDF LUT Pass"),
                color_attachments: &attachments,
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.brdf_pipeline);
            pass.set_bind_group(0, &bind_group, &[0]);
            self.quad.draw(&mut pass);
        }
        queue.submit(Some(encoder.finish()));
        log::info!(
            "BRDF LUT rendered ({0}x{0})",
            self.settings.brdf_lut_size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_views_look_down_each_axis() {
        let forward = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ];
        for (view, dir) in capture_views().iter().zip(forward) {
            // A view matrix maps its forward direction onto -Z.
            let mapped = view.transform_vector3(dir);
            assert!((mapped - Vec3::NEG_Z).length() < 1e-5);
        }
    }

    #[test]
    fn uniform_entry_count_matches_draws() {
        let s = EnvironmentSettings::default();
        assert_eq!(12 + 6 * s.prefilter_mips, 42);
        assert!(size_of::<CaptureUniforms>() as u64 <= UNIFORM_STRIDE);
    }
}
