//! wgpu Context
//!
//! [`GpuContext`] holds the core GPU handles: instance, adapter, device and
//! queue. It can be created headless (offscreen rendering and tests) or
//! against a window surface, which is then wrapped in a [`WindowSurface`].

use std::sync::Arc;

use crate::errors::{LuminaError, Result};
use crate::renderer::settings::RendererSettings;

/// Core wgpu context holding GPU handles.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Features actually enabled on `device`.
    pub features: wgpu::Features,
}

impl GpuContext {
    #[must_use]
    pub fn create_instance(settings: &RendererSettings) -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: settings.backends.unwrap_or(wgpu::Backends::all()),
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        })
    }

    /// Requests an adapter and device on `instance`.
    ///
    /// `compatible_surface` must be passed when the device will present to a
    /// window.
    pub async fn request(
        instance: wgpu::Instance,
        settings: &RendererSettings,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LuminaError::AdapterRequestFailed(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let mut required_features = wgpu::Features::empty();
        if settings.enable_gpu_timing {
            if adapter.features().contains(wgpu::Features::TIMESTAMP_QUERY) {
                required_features |= wgpu::Features::TIMESTAMP_QUERY;
            } else {
                log::warn!("Adapter lacks TIMESTAMP_QUERY; GPU pass timings disabled");
            }
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lumina Device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        // Validation errors are logged; the invalid object stays in use.
        device.on_uncaptured_error(Arc::new(|error: wgpu::Error| {
            log::error!("[wgpu] {error}");
        }));

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            features: required_features,
        })
    }

    /// Blocking headless construction.
    pub fn headless(settings: &RendererSettings) -> Result<Self> {
        let instance = Self::create_instance(settings);
        pollster::block_on(Self::request(instance, settings, None))
    }

    #[inline]
    #[must_use]
    pub fn supports_timestamps(&self) -> bool {
        self.features.contains(wgpu::Features::TIMESTAMP_QUERY)
    }
}

/// A configured presentation surface.
pub struct WindowSurface {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    pub fn configure(
        gpu: &GpuContext,
        surface: wgpu::Surface<'static>,
        settings: &RendererSettings,
    ) -> Result<Self> {
        let mut config = surface
            .get_default_config(&gpu.adapter, settings.width, settings.height)
            .ok_or_else(|| {
                LuminaError::SurfaceError("Surface not supported by adapter".to_string())
            })?;

        // Prefer an sRGB swapchain so the post-process output is encoded once.
        let caps = surface.get_capabilities(&gpu.adapter);
        if let Some(srgb) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            config.format = srgb;
        }
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&gpu.device, &config);
        log::info!(
            "Surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self { surface, config })
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Re-applies the stored configuration after the surface was lost.
    pub fn reconfigure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.config);
    }
}
