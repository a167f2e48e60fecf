//! Frame Sequence
//!
//! [`RenderGraph`] owns the five scene passes and runs them in their fixed
//! data-dependency order:
//!
//! ```text
//! Geometry ─► SAO ─► Lighting ─► Post Process ─► Forward ─► UI
//! ```
//!
//! Every node is prepared first, then all of them record into one command
//! encoder. The UI hook is recorded last, into its own pass.

use super::context::{ExecuteContext, PrepareContext};
use super::node::RenderNode;
use super::passes::ui::{UiOverlay, record_ui_pass};
use super::passes::{ForwardPass, GeometryPass, LightingPass, PostProcessPass, SaoPass};

pub struct RenderGraph {
    pub geometry: GeometryPass,
    pub sao: SaoPass,
    pub lighting: LightingPass,
    pub post_process: PostProcessPass,
    pub forward: ForwardPass,
}

impl RenderGraph {
    /// Nodes in execution order.
    #[must_use]
    pub fn nodes(&self) -> [&dyn RenderNode; 5] {
        [
            &self.geometry,
            &self.sao,
            &self.lighting,
            &self.post_process,
            &self.forward,
        ]
    }

    fn nodes_mut(&mut self) -> [&mut dyn RenderNode; 5] {
        [
            &mut self.geometry,
            &mut self.sao,
            &mut self.lighting,
            &mut self.post_process,
            &mut self.forward,
        ]
    }

    /// Names in execution order, for logs and the UI.
    #[must_use]
    pub fn node_names(&self) -> [&'static str; 5] {
        self.nodes().map(|node| node.name())
    }

    pub fn prepare(&mut self, ctx: &mut PrepareContext) {
        for node in self.nodes_mut() {
            node.prepare(ctx);
        }
    }

    /// Records every node, then the UI pass.
    pub fn execute(
        &self,
        ctx: &ExecuteContext,
        encoder: &mut wgpu::CommandEncoder,
        ui: Option<&dyn UiOverlay>,
    ) {
        for node in self.nodes() {
            encoder.push_debug_group(node.name());
            node.run(ctx, encoder);
            encoder.pop_debug_group();
        }
        encoder.push_debug_group("UI");
        record_ui_pass(ctx, encoder, ui);
        encoder.pop_debug_group();
    }
}
