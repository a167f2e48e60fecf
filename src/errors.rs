//! Error Types
//!
//! This module defines the error types used throughout the renderer.
//!
//! # Overview
//!
//! The main error type [`LuminaError`] covers every failure mode the renderer
//! reports to its caller:
//! - GPU initialization failures
//! - Render target completeness violations
//! - Environment precomputation failures
//! - Asset (image) loading errors
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, LuminaError>`.
//!
//! ```rust,ignore
//! use lumina::errors::{LuminaError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the renderer.
#[derive(Error, Debug)]
pub enum LuminaError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create or configure the presentation surface.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// A render target failed its completeness check.
    #[error("Incomplete render target '{label}': {reason}")]
    IncompleteRenderTarget {
        /// Debug label of the offending target
        label: String,
        /// Which completeness rule was violated
        reason: String,
    },

    /// The environment precomputation stage could not run.
    #[error("Environment precompute failed: {0}")]
    EnvironmentPrecompute(String),

    /// Reading GPU data back to the CPU failed.
    #[error("GPU readback failed: {0}")]
    Readback(String),

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// The light registry has no free slot for the requested light kind.
    #[error("Light registry full: {kind} capacity is {capacity}")]
    LightCapacityExceeded {
        /// Light kind (point / directional)
        kind: &'static str,
        /// Fixed capacity of the shader uniform array
        capacity: usize,
    },

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error ({path}): {message}")]
    ImageDecodeError {
        /// Path of the image that failed to decode
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    // ========================================================================
    // Windowing Errors
    // ========================================================================
    /// Event loop error (winit).
    #[cfg(feature = "viewer")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),
}

/// Alias for `Result<T, LuminaError>`.
pub type Result<T> = std::result::Result<T, LuminaError>;
