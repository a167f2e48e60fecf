//! Winit-based viewer
//!
//! - [`App`]: builder for the window title, renderer settings and asset root
//! - [`Viewer`]: window, surface, renderer, scene and UI of a running session
//! - `AppRunner`: the winit [`ApplicationHandler`] driving the frame loop
//!
//! One frame, in order:
//!
//! 1. tick the clock and FPS counter, write time and FPS into the frame state
//! 2. apply the input gathered since the last frame (camera, key bindings)
//! 3. build the egui panels, then advance the scene
//! 4. acquire the swapchain image, render, present
//!
//! ```rust,ignore
//! lumina::app::App::new()
//!     .with_title("Lumina")
//!     .with_asset_root("assets")
//!     .run()?;
//! ```

pub mod input_adapter;

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::bindings::{InputOutcome, apply_input};
use crate::app::input::Input;
use crate::app::panels::{self, FrameStats};
use crate::app::ui::UiPass;
use crate::errors::{LuminaError, Result};
use crate::renderer::Renderer;
use crate::renderer::core::{GpuContext, WindowSurface};
use crate::renderer::settings::RendererSettings;
use crate::scene::frame_state::FrameState;
use crate::scene::scene::Scene;
use crate::utils::{FpsCounter, FrameClock};

/// Viewer builder.
pub struct App {
    title: String,
    settings: RendererSettings,
    asset_root: PathBuf,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Lumina".into(),
            settings: RendererSettings::default(),
            asset_root: PathBuf::from("assets"),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Directory holding `textures/pbr` and `textures/hdr`.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Opens the window and blocks until it is closed.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            app: self,
            viewer: None,
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// A running viewer session.
pub struct Viewer {
    window: Arc<Window>,
    surface: WindowSurface,
    renderer: Renderer,
    scene: Scene,
    state: FrameState,
    input: Input,
    ui: UiPass,
    clock: FrameClock,
    fps: FpsCounter,
}

impl Viewer {
    pub fn new(window: Arc<Window>, settings: RendererSettings, asset_root: PathBuf) -> Result<Self> {
        let instance = GpuContext::create_instance(&settings);
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| LuminaError::SurfaceError(e.to_string()))?;
        let gpu = pollster::block_on(GpuContext::request(instance, &settings, Some(&surface)))?;
        let surface = WindowSurface::configure(&gpu, surface, &settings)?;
        let format = surface.format();

        let state = FrameState::default();
        let mut scene = Scene::with_default_lights(settings.aspect_ratio())?;
        scene.update(&state);

        let renderer = Renderer::new(gpu, settings, format, asset_root, &scene, &state)?;
        let ui = UiPass::new(renderer.device(), format, &window);

        Ok(Self {
            window,
            surface,
            renderer,
            scene,
            state,
            input: Input::new(),
            ui,
            clock: FrameClock::new(),
            fps: FpsCounter::default(),
        })
    }

    /// Routes a window event to egui first, then to the viewer input.
    fn handle_event(&mut self, event: &WindowEvent) {
        if !self.ui.handle_input(&self.window, event) {
            input_adapter::process_window_event(&mut self.input, event);
        }
        if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
            self.ui.set_scale_factor(*scale_factor as f32);
        }
    }

    fn frame(&mut self) -> InputOutcome {
        let delta = self.clock.tick();
        if let Some(fps) = self.fps.tick(delta) {
            self.state.fps = fps;
        }
        self.state.delta_seconds = self.clock.dt_seconds();
        self.state.time_seconds = self.clock.elapsed_seconds();

        let outcome = apply_input(
            &self.input,
            &mut self.scene.camera,
            &mut self.state,
            self.ui.wants_pointer_input(),
        );
        self.input.end_frame();
        if outcome == InputOutcome::Quit {
            return outcome;
        }

        let stats = FrameStats {
            fps: self.fps.fps(),
            frame_time_ms: self.fps.frame_time_ms(),
            timings: self.renderer.last_timings(),
            timings_enabled: self.renderer.timings_enabled(),
        };
        self.ui.begin_frame(&self.window);
        let ctx = self.ui.context().clone();
        panels::draw(&ctx, &mut self.scene, &mut self.state, &stats);
        self.ui.end_frame(&self.window);

        self.scene.update(&self.state);

        let output = match self.surface.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                self.surface.reconfigure(self.renderer.device());
                return InputOutcome::Continue;
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                return InputOutcome::Continue;
            }
            wgpu::CurrentSurfaceTexture::Validation => {
                log::error!("Surface acquire failed validation");
                return InputOutcome::Continue;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(e) =
            self.renderer
                .render_frame(&view, &self.scene, &self.state, Some(&mut self.ui))
        {
            log::error!("Frame failed: {e}");
        }
        self.window.pre_present_notify();
        output.present();

        InputOutcome::Continue
    }
}

struct AppRunner {
    app: App,
    viewer: Option<Viewer>,
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let settings = self.app.settings.clone();
        // Targets are allocated once at this size, so the window is fixed too.
        let attributes = Window::default_attributes()
            .with_title(&self.app.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(settings.width, settings.height))
            .with_resizable(false);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Initializing renderer...");
        match Viewer::new(window, settings, self.app.asset_root.clone()) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => {
                log::error!("Fatal renderer error: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };

        viewer.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if viewer.frame() == InputOutcome::Quit {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }
}
