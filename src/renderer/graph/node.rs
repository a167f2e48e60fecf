//! Render Node Trait
//!
//! Every pass in the frame sequence implements [`RenderNode`].

use super::context::{ExecuteContext, PrepareContext};

/// One pass of the frame.
///
/// - `prepare` runs first with mutable access to the node: uniform uploads,
///   bind group rebuilds, cached per-frame state
/// - `run` records GPU commands and must not mutate the node
///
/// Every `run` opens and closes its own render passes. Nothing stays bound
/// after it returns.
pub trait RenderNode {
    /// Name used for debug groups and logs.
    fn name(&self) -> &'static str;

    fn prepare(&mut self, _ctx: &mut PrepareContext) {}

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}
