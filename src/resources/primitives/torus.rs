use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::mesh::{MeshData, MeshVertex};

pub struct TorusOptions {
    /// Distance from the torus center to the tube center.
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

impl Default for TorusOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.4,
            radial_segments: 32,
            tubular_segments: 64,
        }
    }
}

/// Torus lying in the XZ plane.
#[must_use]
pub fn create_torus(options: &TorusOptions) -> MeshData {
    let radial = options.radial_segments.max(3);
    let tubular = options.tubular_segments.max(3);
    let mut mesh = MeshData::default();

    for j in 0..=radial {
        let v = j as f32 / radial as f32;
        let tube_angle = v * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32;
            let ring_angle = u * TAU;

            let center = Vec3::new(ring_angle.cos(), 0.0, -ring_angle.sin()) * options.radius;
            let outward = center.normalize_or_zero();
            let normal = outward * tube_angle.cos() + Vec3::Y * tube_angle.sin();
            let position = center + normal * options.tube;

            mesh.vertices
                .push(MeshVertex::new(position.to_array(), normal.to_array(), [u, v]));
        }
    }

    let stride = tubular + 1;
    for j in 0..radial {
        for i in 0..tubular {
            let a = j * stride + i;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    mesh
}
