//! # Lumina
//!
//! A deferred physically based renderer on wgpu with image-based lighting.
//!
//! A frame runs a fixed pass sequence: a four-target G-buffer, scalable
//! ambient obscurance with a separable blur, Cook-Torrance lighting against
//! point and directional lights plus a precomputed environment, then one
//! post-process pass (exposure, tone mapping, FXAA, motion blur) and a forward
//! overlay for light gizmos and the UI.
//!
//! - [`renderer`]: GPU context, targets, passes and the [`Renderer`] frame driver
//! - [`scene`]: camera, light registry, model and the per-frame [`FrameState`]
//! - [`resources`]: CPU images, procedural meshes, presets and effect settings
//! - [`app`]: the winit + egui viewer (feature `viewer`)

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

#[cfg(feature = "viewer")]
pub mod app;

pub use errors::{LuminaError, Result};
pub use renderer::core::{FrameTimings, GpuContext, PassTiming};
pub use renderer::{EnvironmentSettings, Renderer, RendererSettings};
pub use resources::{EnvironmentPreset, HdrImage, MaterialPreset, ModelPreset, ToneMappingMode};
pub use scene::{Camera, FrameState, GBufferView, Light, LightRegistry, Scene};

#[cfg(feature = "viewer")]
pub use app::App;
