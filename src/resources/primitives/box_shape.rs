use glam::Vec3;

use crate::resources::mesh::{MeshData, MeshVertex};

/// Face frames as `(normal, u, v)` with `u × v = normal`, so the corner order
/// below winds counter-clockwise seen from outside.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
];

const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Axis-aligned box centered on the origin, 4 vertices per face.
#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = MeshData::default();

    for (face, (normal, u, v)) in FACES.iter().enumerate() {
        for (su, sv) in CORNERS {
            let p = (*normal + *u * su + *v * sv) * half;
            mesh.vertices.push(MeshVertex::new(
                p.to_array(),
                normal.to_array(),
                [(su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5],
            ));
        }
        let base = face as u32 * 4;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}

/// Unit cube (side 2) as 36 independent vertices, for non-indexed drawing.
#[must_use]
pub fn cube_vertices() -> Vec<MeshVertex> {
    create_box(2.0, 2.0, 2.0).unindexed()
}
