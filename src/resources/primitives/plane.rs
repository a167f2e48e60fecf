use crate::resources::mesh::MeshVertex;

/// A 2x2 ground plane in XZ facing +Y, as two independent triangles.
#[must_use]
pub fn plane_vertices() -> Vec<MeshVertex> {
    const N: [f32; 3] = [0.0, 1.0, 0.0];
    let corner = |x: f32, z: f32| MeshVertex::new([x, 0.0, z], N, [(x + 1.0) * 0.5, (z + 1.0) * 0.5]);

    vec![
        corner(-1.0, 1.0),
        corner(1.0, 1.0),
        corner(1.0, -1.0),
        corner(-1.0, 1.0),
        corner(1.0, -1.0),
        corner(-1.0, -1.0),
    ]
}
