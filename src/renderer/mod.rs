//! Rendering System
//!
//! [`Renderer`] owns the GPU context, every off-screen target, the
//! environment maps and the pass sequence. One call to
//! [`Renderer::render_frame`] records and submits a whole frame:
//!
//! 1. swap the environment if the selected preset changed
//! 2. `prepare` every pass (uniform uploads, bind group refreshes)
//! 3. record geometry, SAO, lighting, post-process, forward and UI passes
//!    into one encoder
//! 4. resolve the timestamp queries, submit, and block on the readback
//!
//! The renderer only reads the [`Scene`] and [`FrameState`]; the caller
//! mutates both between frames.

pub mod core;
pub mod graph;
pub mod settings;

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::resources::image::HdrImage;
use crate::resources::presets::{EnvironmentPreset, MaterialPreset};
use crate::scene::frame_state::FrameState;
use crate::scene::scene::Scene;
use crate::scene::shape::{Shape, ShapeKind};

use self::core::{FrameTimings, GpuContext, GpuProfiler, RenderTargetManager};
use self::graph::passes::{
    EnvironmentMapSet, EnvironmentStage, ForwardPass, GeometryPass, LightingPass,
    PostProcessPass, SaoPass, UiOverlay,
};
use self::graph::{ExecuteContext, FrameTargets, FrameView, PrepareContext, RenderGraph};

pub use self::settings::{EnvironmentSettings, RendererSettings};

pub struct Renderer {
    gpu: GpuContext,
    settings: RendererSettings,
    output_format: wgpu::TextureFormat,
    asset_root: PathBuf,

    target_manager: RenderTargetManager,
    targets: FrameTargets,
    profiler: GpuProfiler,
    quad: Shape,

    environment_stage: EnvironmentStage,
    environment: EnvironmentMapSet,
    environment_preset: EnvironmentPreset,

    graph: RenderGraph,
    last_timings: FrameTimings,
}

impl Renderer {
    /// Builds every target and pass, then runs the first environment
    /// precompute for `state.environment_preset`.
    ///
    /// Fails if any render target is incomplete or the first precompute
    /// cannot run.
    pub fn new(
        gpu: GpuContext,
        settings: RendererSettings,
        output_format: wgpu::TextureFormat,
        asset_root: impl Into<PathBuf>,
        scene: &Scene,
        state: &FrameState,
    ) -> Result<Self> {
        let asset_root = asset_root.into();
        let device = &gpu.device;
        let queue = &gpu.queue;

        let mut target_manager = RenderTargetManager::new(device);
        let targets = FrameTargets::new(&mut target_manager, settings.width, settings.height)?;
        log::info!(
            "Frame targets ready: {}x{}, {} render targets",
            settings.width,
            settings.height,
            target_manager.created()
        );

        let profiler = GpuProfiler::new(device, queue, gpu.supports_timestamps());

        let mut environment_stage = EnvironmentStage::new(device, settings.environment);
        let preset = state.environment_preset;
        let image = HdrImage::load_or_fallback(preset.path(&asset_root), false);
        let environment =
            environment_stage.precompute(device, queue, &mut target_manager, &image)?;
        log::info!("Environment '{}' bound", preset.name());

        let graph = RenderGraph {
            geometry: GeometryPass::new(
                device,
                queue,
                &targets.gbuffer,
                &scene.model,
                state.material_preset,
                asset_root.clone(),
            ),
            sao: SaoPass::new(device, &targets),
            lighting: LightingPass::new(device, &targets),
            post_process: PostProcessPass::new(device, &targets, output_format),
            forward: ForwardPass::new(device, output_format),
        };
        log::info!("Render graph: {}", graph.node_names().join(" -> "));

        let quad = Shape::upload(device, ShapeKind::Quad);

        Ok(Self {
            gpu,
            settings,
            output_format,
            asset_root,
            target_manager,
            targets,
            profiler,
            quad,
            environment_stage,
            environment,
            environment_preset: preset,
            graph,
            last_timings: FrameTimings::default(),
        })
    }

    /// Records, submits and times one frame into `output_view`.
    ///
    /// `output_view` must have the format given at construction and the
    /// size in [`RendererSettings`].
    pub fn render_frame(
        &mut self,
        output_view: &wgpu::TextureView,
        scene: &Scene,
        state: &FrameState,
        mut ui: Option<&mut dyn UiOverlay>,
    ) -> Result<FrameTimings> {
        if state.environment_preset != self.environment_preset
            && let Err(e) = self.reset_environment_preset(state.environment_preset)
        {
            log::warn!(
                "Keeping environment generation {} after failed swap: {e}",
                self.environment.generation()
            );
        }

        let view = FrameView::from_camera(&scene.camera);
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;

        let mut prepare = PrepareContext {
            device,
            queue,
            targets: &self.targets,
            environment: &self.environment,
            scene,
            state,
            view: &view,
        };
        self.graph.prepare(&mut prepare);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        if let Some(ui) = ui.as_deref_mut() {
            ui.prepare(device, queue, &mut encoder);
        }

        let execute = ExecuteContext {
            device,
            targets: &self.targets,
            state,
            profiler: &self.profiler,
            quad: &self.quad,
            output_view,
        };
        self.graph.execute(&execute, &mut encoder, ui.as_deref());

        self.profiler.resolve(&mut encoder);
        queue.submit(Some(encoder.finish()));

        let timings = self.profiler.read(device)?;
        self.last_timings = timings;
        Ok(timings)
    }

    /// Reruns the environment precompute on `image` and swaps the result in.
    ///
    /// Returns the new environment generation. On failure the previous maps
    /// stay bound and the error is returned after logging.
    pub fn reset_environment(&mut self, image: &HdrImage) -> Result<u64> {
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        match self
            .environment_stage
            .precompute(device, queue, &mut self.target_manager, image)
        {
            Ok(set) => {
                self.environment = set;
                Ok(self.environment.generation())
            }
            Err(e) => {
                log::error!(
                    "Environment swap failed, keeping generation {}: {e}",
                    self.environment.generation()
                );
                Err(e)
            }
        }
    }

    /// Loads `preset` from the asset root and swaps it in.
    ///
    /// The preset counts as selected even when loading fails, so a broken
    /// file is reported once instead of every frame.
    pub fn reset_environment_preset(&mut self, preset: EnvironmentPreset) -> Result<u64> {
        self.environment_preset = preset;
        let path = preset.path(&self.asset_root);
        let image = HdrImage::load(&path, false).inspect_err(|e| {
            log::error!("Environment '{}' not loaded: {e}", preset.name());
        })?;
        let generation = self.reset_environment(&image)?;
        log::info!("Environment '{}' bound (generation {generation})", preset.name());
        Ok(generation)
    }

    /// Loads `preset`'s textures for the geometry pass.
    pub fn reset_material(&mut self, preset: MaterialPreset) {
        self.graph
            .geometry
            .reset_material(&self.gpu.device, &self.gpu.queue, preset);
    }

    /// An offscreen color texture usable as `render_frame` output.
    #[must_use]
    pub fn create_output_texture(&self) -> wgpu::Texture {
        self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Output"),
            size: self.targets.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.output_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    // === Accessors ===

    #[inline]
    #[must_use]
    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.gpu.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.gpu.queue
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[must_use]
    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }

    #[must_use]
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    #[must_use]
    pub fn targets(&self) -> &FrameTargets {
        &self.targets
    }

    #[must_use]
    pub fn environment(&self) -> &EnvironmentMapSet {
        &self.environment
    }

    #[must_use]
    pub fn environment_generation(&self) -> u64 {
        self.environment.generation()
    }

    #[must_use]
    pub fn environment_preset(&self) -> EnvironmentPreset {
        self.environment_preset
    }

    #[must_use]
    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    #[must_use]
    pub fn timings_enabled(&self) -> bool {
        self.profiler.is_enabled()
    }

    /// Timings of the last rendered frame.
    #[must_use]
    pub fn last_timings(&self) -> FrameTimings {
        self.last_timings
    }
}
