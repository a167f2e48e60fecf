use glam::Vec3;

use crate::resources::mesh::{MeshData, MeshVertex};

/// Square pyramid with flat-shaded faces, base on y = -height/2.
#[must_use]
pub fn create_pyramid(base: f32, height: f32) -> MeshData {
    let h = base * 0.5;
    let y0 = -height * 0.5;
    let apex = Vec3::new(0.0, height * 0.5, 0.0);
    let corners = [
        Vec3::new(-h, y0, h),
        Vec3::new(h, y0, h),
        Vec3::new(h, y0, -h),
        Vec3::new(-h, y0, -h),
    ];

    let mut mesh = MeshData::default();
    let mut push_triangle = |a: Vec3, b: Vec3, c: Vec3, uvs: [[f32; 2]; 3]| {
        let n = (b - a).cross(c - a).normalize_or_zero().to_array();
        let base_index = mesh.vertices.len() as u32;
        for (p, uv) in [a, b, c].into_iter().zip(uvs) {
            mesh.vertices.push(MeshVertex::new(p.to_array(), n, uv));
        }
        mesh.indices
            .extend_from_slice(&[base_index, base_index + 1, base_index + 2]);
    };

    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        push_triangle(a, b, apex, [[0.0, 1.0], [1.0, 1.0], [0.5, 0.0]]);
    }

    // base, facing -Y
    push_triangle(corners[0], corners[3], corners[2], [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    push_triangle(corners[0], corners[2], corners[1], [[0.0, 0.0], [1.0, 1.0], [1.0, 0.0]]);

    mesh
}
