//! UI overlay hook.
//!
//! The renderer records one load-and-store pass over the output view after
//! the forward overlay and hands it to a [`UiOverlay`]. The viewer plugs its
//! egui renderer in here; headless callers pass `None` and the pass is
//! still recorded, so the UI timestamps stay valid.

use crate::renderer::core::profiler::{PassTiming, Stamp};
use crate::renderer::graph::context::ExecuteContext;

/// Something that paints on top of the finished frame.
pub trait UiOverlay {
    /// Uploads vertex data and textures. Called before the UI pass begins.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
    );

    /// Records draw calls into the UI pass.
    fn paint(&self, pass: &mut wgpu::RenderPass<'static>);
}

pub(crate) fn record_ui_pass(
    ctx: &ExecuteContext,
    encoder: &mut wgpu::CommandEncoder,
    overlay: Option<&dyn UiOverlay>,
) {
    let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("UI Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: ctx.output_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: ctx.profiler.pass_writes(PassTiming::Ui, Stamp::Both),
        occlusion_query_set: None,
        multiview_mask: None,
    });
    if let Some(overlay) = overlay {
        let mut pass = pass.forget_lifetime();
        overlay.paint(&mut pass);
    }
}
