//! Render Graph Contexts
//!
//! Two phase-separated views of the frame:
//!
//! - [`PrepareContext`]: handed mutably to every node's `prepare`. Nodes
//!   upload uniforms and rebuild bind groups here.
//! - [`ExecuteContext`]: shared read-only by every node's `run`. Nodes only
//!   record commands.
//!
//! Both hold plain references to disjoint renderer fields, so the borrow
//! checker lets a node read the targets while the orchestrator still owns
//! the node list.

use super::frame::{FrameTargets, FrameView};
use crate::renderer::core::profiler::GpuProfiler;
use crate::renderer::graph::passes::environment::EnvironmentMapSet;
use crate::scene::frame_state::FrameState;
use crate::scene::scene::Scene;
use crate::scene::shape::Shape;

/// Context for the prepare phase.
pub struct PrepareContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub targets: &'a FrameTargets,
    /// The currently bound IBL snapshot.
    pub environment: &'a EnvironmentMapSet,
    pub scene: &'a Scene,
    pub state: &'a FrameState,
    pub view: &'a FrameView,
}

/// Context for the execute phase.
pub struct ExecuteContext<'a> {
    pub device: &'a wgpu::Device,
    pub targets: &'a FrameTargets,
    pub state: &'a FrameState,
    pub profiler: &'a GpuProfiler,
    /// Fullscreen quad, `TriangleStrip`.
    pub quad: &'a Shape,
    /// Final color target: the swapchain image or an offscreen texture.
    pub output_view: &'a wgpu::TextureView,
}
