//! Procedural meshes for the model presets and the fixed shapes.

pub mod box_shape;
pub mod plane;
pub mod pyramid;
pub mod sphere;
pub mod torus;

pub use box_shape::{create_box, cube_vertices};
pub use plane::plane_vertices;
pub use pyramid::create_pyramid;
pub use sphere::{SphereOptions, create_sphere};
pub use torus::{TorusOptions, create_torus};
