//! Render pipeline organisation
//!
//! - [`FrameTargets`] / [`FrameView`]: the off-screen targets and camera
//!   matrices shared by the passes
//! - [`PrepareContext`] / [`ExecuteContext`]: what a pass sees in each phase
//! - [`RenderNode`]: the pass trait
//! - [`RenderGraph`]: the fixed pass sequence
//! - [`passes`]: environment precompute plus the five scene passes

pub mod context;
pub mod frame;
pub mod graph;
pub mod node;
pub mod passes;

pub use context::{ExecuteContext, PrepareContext};
pub use frame::{FrameTargets, FrameView};
pub use graph::RenderGraph;
pub use node::RenderNode;
