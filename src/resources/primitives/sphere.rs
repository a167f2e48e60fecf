use std::f32::consts::PI;

use crate::resources::mesh::{MeshData, MeshVertex};

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 64,
            height_segments: 32,
        }
    }
}

/// UV sphere, Y-up, poles included as degenerate rings.
#[must_use]
pub fn create_sphere(options: &SphereOptions) -> MeshData {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);
    let mut mesh = MeshData::default();

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        // theta runs from the south pole (0) to the north pole (PI)
        let theta = v * PI;
        let ring = theta.sin();
        let py = -theta.cos();

        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let n = [-ring * phi.cos(), py, ring * phi.sin()];
            mesh.vertices.push(MeshVertex::new(
                [n[0] * radius, n[1] * radius, n[2] * radius],
                n,
                [u, 1.0 - v],
            ));
        }
    }

    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = v0 + stride;
            let v3 = v2 + 1;
            mesh.indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
        }
    }

    mesh
}
