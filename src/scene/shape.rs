//! Fixed Shapes
//!
//! Static, non-indexed vertex buffers for the three built-in shape kinds:
//!
//! | Kind    | Vertices | Topology        | Layout                       |
//! |---------|----------|-----------------|------------------------------|
//! | `Cube`  | 36       | `TriangleList`  | position + normal + texcoord |
//! | `Plane` | 6        | `TriangleList`  | position + normal + texcoord |
//! | `Quad`  | 4        | `TriangleStrip` | position + texcoord          |
//!
//! Drawing goes through the [`DrawRecorder`] seam so the issued call can be
//! observed without a GPU.

use wgpu::util::DeviceExt;

use super::transform::Transform;
use crate::resources::mesh::{MeshVertex, QuadVertex};
use crate::resources::primitives::{cube_vertices, plane_vertices};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cube,
    Plane,
    Quad,
}

impl ShapeKind {
    #[must_use]
    pub fn vertex_count(self) -> u32 {
        match self {
            Self::Cube => 36,
            Self::Plane => 6,
            Self::Quad => 4,
        }
    }

    #[must_use]
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Cube | Self::Plane => wgpu::PrimitiveTopology::TriangleList,
            Self::Quad => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }

    #[must_use]
    pub fn vertex_layout(self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            Self::Cube | Self::Plane => MeshVertex::layout(),
            Self::Quad => QuadVertex::layout(),
        }
    }

    /// Raw vertex bytes for this kind.
    #[must_use]
    pub fn vertex_bytes(self) -> Vec<u8> {
        match self {
            Self::Cube => bytemuck::cast_slice(&cube_vertices()).to_vec(),
            Self::Plane => bytemuck::cast_slice(&plane_vertices()).to_vec(),
            Self::Quad => bytemuck::cast_slice(&quad_vertices()).to_vec(),
        }
    }
}

/// Unit quad in the XY plane covering NDC `[-1, 1]²`, strip order.
#[must_use]
pub fn quad_vertices() -> [QuadVertex; 4] {
    [
        QuadVertex {
            position: [-1.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        },
        QuadVertex {
            position: [-1.0, -1.0, 0.0],
            uv: [0.0, 1.0],
        },
        QuadVertex {
            position: [1.0, 1.0, 0.0],
            uv: [1.0, 0.0],
        },
        QuadVertex {
            position: [1.0, -1.0, 0.0],
            uv: [1.0, 1.0],
        },
    ]
}

// ============================================================================
// Draw recording
// ============================================================================

/// One non-indexed draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub topology: wgpu::PrimitiveTopology,
    pub vertex_count: u32,
    pub vertex_buffer: Option<&'a wgpu::Buffer>,
}

/// Sink for draw calls.
///
/// Implemented by `wgpu::RenderPass`; tests implement it with a recorder
/// that just stores the calls.
pub trait DrawRecorder {
    fn record(&mut self, call: DrawCall<'_>);
}

impl DrawRecorder for wgpu::RenderPass<'_> {
    fn record(&mut self, call: DrawCall<'_>) {
        if let Some(buffer) = call.vertex_buffer {
            self.set_vertex_buffer(0, buffer.slice(..));
        }
        self.draw(0..call.vertex_count, 0..1);
    }
}

// ============================================================================
// Shape
// ============================================================================

/// A fixed shape plus its model transform.
///
/// The vertex buffer is created once by [`Shape::upload`]; only the transform
/// changes afterwards.
#[derive(Debug)]
pub struct Shape {
    kind: ShapeKind,
    pub transform: Transform,
    vertex_buffer: Option<wgpu::Buffer>,
}

impl Shape {
    /// A shape with no GPU buffer yet.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            transform: Transform::new(),
            vertex_buffer: None,
        }
    }

    /// A shape with its vertex buffer uploaded.
    #[must_use]
    pub fn upload(device: &wgpu::Device, kind: ShapeKind) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match kind {
                ShapeKind::Cube => "Cube Vertices",
                ShapeKind::Plane => "Plane Vertices",
                ShapeKind::Quad => "Quad Vertices",
            }),
            contents: &kind.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            kind,
            transform: Transform::new(),
            vertex_buffer: Some(buffer),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn draw_call(&self) -> DrawCall<'_> {
        DrawCall {
            topology: self.kind.topology(),
            vertex_count: self.kind.vertex_count(),
            vertex_buffer: self.vertex_buffer.as_ref(),
        }
    }

    pub fn draw(&self, recorder: &mut impl DrawRecorder) {
        recorder.record(self.draw_call());
    }
}
