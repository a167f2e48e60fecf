//! Lighting Uniform Table
//!
//! The deferred lighting shader reads one uniform buffer laid out as
//! [`LightingUniforms`]. Field offsets are resolved once into a
//! [`LightingLayout`] so per-light updates write straight to
//! `points + slot * stride` without looking anything up per frame.
//!
//! ```text
//! 0      LightingGlobals     256 bytes
//! 256    points[16]          48 bytes each
//! 1024   directionals[4]     32 bytes each
//! 1152   end
//! ```

use std::mem::{offset_of, size_of};

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::scene::frame_state::FrameState;
use crate::scene::light::{
    DirectionalLight, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, PointLight,
};

bitflags! {
    /// Lighting toggles packed into `LightingGlobals::flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LightingFlags: u32 {
        const POINT_LIGHTS = 1 << 0;
        const DIRECTIONAL_LIGHTS = 1 << 1;
        const IBL = 1 << 2;
        const SAO = 1 << 3;
    }
}

impl LightingFlags {
    #[must_use]
    pub fn from_state(state: &FrameState) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::POINT_LIGHTS, state.point_lights);
        flags.set(Self::DIRECTIONAL_LIGHTS, state.directional_lights);
        flags.set(Self::IBL, state.ibl);
        flags.set(Self::SAO, state.sao.enabled);
        flags
    }
}

// ============================================================================
// GPU structs
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuPointLight {
    /// View-space position.
    pub position: [f32; 3],
    pub radius: f32,
    /// Linear color premultiplied by intensity; `w` unused.
    pub color: [f32; 4],
    pub enabled: u32,
    pub _pad: [u32; 3],
}

impl GpuPointLight {
    #[must_use]
    pub fn from_light(light: &PointLight, view: &Mat4) -> Self {
        Self {
            position: view.transform_point3(light.position).to_array(),
            radius: light.radius,
            color: light.radiance().extend(1.0).to_array(),
            enabled: 1,
            _pad: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    /// View-space direction the light travels in, normalized.
    pub direction: [f32; 3],
    pub enabled: u32,
    pub color: [f32; 4],
}

impl GpuDirectionalLight {
    #[must_use]
    pub fn from_light(light: &DirectionalLight, view: &Mat4) -> Self {
        let rotation = Mat3::from_mat4(*view);
        let direction = (rotation * light.direction).normalize_or(Vec3::NEG_Y);
        Self {
            direction: direction.to_array(),
            enabled: 1,
            color: light.radiance().extend(1.0).to_array(),
        }
    }
}

/// Per-frame camera, material and selector values.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingGlobals {
    pub inv_view: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// `(width, height, 1 / width, 1 / height)` of the lighting target.
    pub screen: [f32; 4],
    /// Dielectric reflectance at normal incidence, `w` unused.
    pub f0: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub ambient_intensity: f32,
    /// [`LightingFlags`] bits.
    pub flags: u32,
    pub attenuation: u32,
    pub gbuffer_view: u32,
    /// Highest prefilter mip, `levels - 1`.
    pub prefilter_max_mip: f32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingUniforms {
    pub globals: LightingGlobals,
    pub points: [GpuPointLight; MAX_POINT_LIGHTS],
    pub directionals: [GpuDirectionalLight; MAX_DIRECTIONAL_LIGHTS],
}

// ============================================================================
// Layout table
// ============================================================================

/// Byte offsets into the lighting uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingLayout {
    pub globals: u64,
    pub points: u64,
    pub point_stride: u64,
    pub directionals: u64,
    pub directional_stride: u64,
    pub size: u64,
}

impl LightingLayout {
    /// Resolves the table from the Rust struct definitions.
    #[must_use]
    pub const fn resolve() -> Self {
        Self {
            globals: offset_of!(LightingUniforms, globals) as u64,
            points: offset_of!(LightingUniforms, points) as u64,
            point_stride: size_of::<GpuPointLight>() as u64,
            directionals: offset_of!(LightingUniforms, directionals) as u64,
            directional_stride: size_of::<GpuDirectionalLight>() as u64,
            size: size_of::<LightingUniforms>() as u64,
        }
    }

    /// Offset of point light `slot`.
    #[must_use]
    pub fn point_offset(&self, slot: usize) -> u64 {
        self.points + slot as u64 * self.point_stride
    }

    #[must_use]
    pub fn directional_offset(&self, slot: usize) -> u64 {
        self.directionals + slot as u64 * self.directional_stride
    }
}

pub const LIGHTING_LAYOUT: LightingLayout = LightingLayout::resolve();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_toggles() {
        let mut state = FrameState::default();
        state.ibl = false;
        let flags = LightingFlags::from_state(&state);
        assert!(flags.contains(LightingFlags::POINT_LIGHTS | LightingFlags::SAO));
        assert!(!flags.contains(LightingFlags::IBL));
    }

    #[test]
    fn globals_are_256_bytes() {
        assert_eq!(size_of::<LightingGlobals>(), 256);
    }
}
