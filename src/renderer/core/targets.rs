//! Render Targets
//!
//! Off-screen attachments grouped the way passes consume them:
//!
//! - [`RenderTarget`]: N color attachments plus an optional depth attachment,
//!   all the same size
//! - [`GBuffer`]: a [`RenderTarget`] with exactly four colors and a depth
//! - [`CubeTarget`]: a cube texture whose `(face, mip)` slices are rendered
//!   one at a time by the environment stage
//!
//! Every target goes through [`validate_target`] before a single texture is
//! allocated. A descriptor that would not produce a usable attachment set is
//! rejected with [`LuminaError::IncompleteRenderTarget`].
//!
//! Targets own their textures. Passes never keep an attachment "bound" across
//! calls: every pass opens and closes its own `wgpu::RenderPass`, which is the
//! only binding scope that exists.

use smallvec::SmallVec;

use crate::errors::{LuminaError, Result};

// ============================================================================
// Descriptors
// ============================================================================

/// One requested attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSpec {
    pub label: &'static str,
    pub format: wgpu::TextureFormat,
    /// Filter of the sampler downstream passes read this attachment with.
    pub filter: wgpu::FilterMode,
}

impl AttachmentSpec {
    #[must_use]
    pub const fn new(label: &'static str, format: wgpu::TextureFormat) -> Self {
        Self {
            label,
            format,
            filter: wgpu::FilterMode::Nearest,
        }
    }

    #[must_use]
    pub const fn linear(mut self) -> Self {
        self.filter = wgpu::FilterMode::Linear;
        self
    }
}

/// Full description of a 2D render target.
#[derive(Debug, Clone)]
pub struct RenderTargetDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub colors: SmallVec<[AttachmentSpec; 4]>,
    pub depth: Option<AttachmentSpec>,
    /// Usage added on top of `RENDER_ATTACHMENT | TEXTURE_BINDING`.
    pub extra_usage: wgpu::TextureUsages,
}

impl RenderTargetDesc {
    #[must_use]
    pub fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            width,
            height,
            colors: SmallVec::new(),
            depth: None,
            extra_usage: wgpu::TextureUsages::empty(),
        }
    }

    #[must_use]
    pub fn with_color(mut self, spec: AttachmentSpec) -> Self {
        self.colors.push(spec);
        self
    }

    #[must_use]
    pub fn with_depth(mut self, spec: AttachmentSpec) -> Self {
        self.depth = Some(spec);
        self
    }

    #[must_use]
    pub fn with_usage(mut self, usage: wgpu::TextureUsages) -> Self {
        self.extra_usage |= usage;
        self
    }
}

/// Description of a cube render target.
#[derive(Debug, Clone, Copy)]
pub struct CubeTargetDesc {
    pub label: &'static str,
    pub size: u32,
    pub mip_levels: u32,
    pub format: wgpu::TextureFormat,
}

// ============================================================================
// Validation
// ============================================================================

fn incomplete(label: &str, reason: impl Into<String>) -> LuminaError {
    LuminaError::IncompleteRenderTarget {
        label: label.to_string(),
        reason: reason.into(),
    }
}

fn is_color_renderable(format: wgpu::TextureFormat, features: wgpu::Features) -> bool {
    !format.is_depth_stencil_format()
        && format
            .guaranteed_format_features(features)
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
}

/// Checks that `desc` describes a complete target on a device with `limits`.
///
/// Rules:
/// - both dimensions are non-zero and within `max_texture_dimension_2d`
/// - at least one attachment is requested
/// - color attachment count and total per-sample byte cost fit the limits
/// - every color format is color-renderable
/// - the depth format has a depth aspect
///
/// Attachment sizes cannot disagree: they are all allocated from `desc`.
pub fn validate_target(
    desc: &RenderTargetDesc,
    limits: &wgpu::Limits,
    features: wgpu::Features,
) -> Result<()> {
    let label = desc.label;
    if desc.width == 0 || desc.height == 0 {
        return Err(incomplete(
            label,
            format!("zero-sized target {}x{}", desc.width, desc.height),
        ));
    }
    let max = limits.max_texture_dimension_2d;
    if desc.width > max || desc.height > max {
        return Err(incomplete(
            label,
            format!("{}x{} exceeds the {max} texel limit", desc.width, desc.height),
        ));
    }
    if desc.colors.is_empty() && desc.depth.is_none() {
        return Err(incomplete(label, "no attachments"));
    }
    if desc.colors.len() > limits.max_color_attachments as usize {
        return Err(incomplete(
            label,
            format!(
                "{} color attachments, device allows {}",
                desc.colors.len(),
                limits.max_color_attachments
            ),
        ));
    }

    let mut bytes_per_sample = 0;
    for spec in &desc.colors {
        if !is_color_renderable(spec.format, features) {
            return Err(incomplete(
                label,
                format!("'{}' format {:?} is not color-renderable", spec.label, spec.format),
            ));
        }
        bytes_per_sample += spec.format.target_pixel_byte_cost().unwrap_or(0);
    }
    if bytes_per_sample > limits.max_color_attachment_bytes_per_sample {
        return Err(incomplete(
            label,
            format!(
                "{bytes_per_sample} bytes per sample, device allows {}",
                limits.max_color_attachment_bytes_per_sample
            ),
        ));
    }

    if let Some(depth) = &desc.depth
        && !depth.format.has_depth_aspect()
    {
        return Err(incomplete(
            label,
            format!("'{}' format {:?} has no depth aspect", depth.label, depth.format),
        ));
    }
    Ok(())
}

/// Checks a cube target descriptor.
pub fn validate_cube_target(
    desc: &CubeTargetDesc,
    limits: &wgpu::Limits,
    features: wgpu::Features,
) -> Result<()> {
    if desc.size == 0 || desc.size > limits.max_texture_dimension_2d {
        return Err(incomplete(desc.label, format!("invalid face size {}", desc.size)));
    }
    let full_chain = crate::renderer::settings::full_mip_count(desc.size);
    if desc.mip_levels == 0 || desc.mip_levels > full_chain {
        return Err(incomplete(
            desc.label,
            format!(
                "{} mip levels requested, face size {} allows 1..={full_chain}",
                desc.mip_levels, desc.size
            ),
        ));
    }
    if !is_color_renderable(desc.format, features) {
        return Err(incomplete(
            desc.label,
            format!("format {:?} is not color-renderable", desc.format),
        ));
    }
    Ok(())
}

// ============================================================================
// Targets
// ============================================================================

/// One allocated attachment.
#[derive(Debug)]
pub struct Attachment {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub filter: wgpu::FilterMode,
}

/// A complete, fixed-size set of attachments.
#[derive(Debug)]
pub struct RenderTarget {
    label: &'static str,
    width: u32,
    height: u32,
    colors: SmallVec<[Attachment; 4]>,
    depth: Option<Attachment>,
}

impl RenderTarget {
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Color attachment `index`.
    ///
    /// # Panics
    /// If `index` is out of range. Attachment indices are fixed by the
    /// descriptor a pass built the target from.
    #[must_use]
    pub fn color(&self, index: usize) -> &Attachment {
        &self.colors[index]
    }

    #[must_use]
    pub fn color_view(&self, index: usize) -> &wgpu::TextureView {
        &self.colors[index].view
    }

    #[must_use]
    pub fn depth(&self) -> Option<&Attachment> {
        self.depth.as_ref()
    }

    /// Color attachments for a render pass, all with the same load op.
    #[must_use]
    pub fn color_attachments(
        &self,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> SmallVec<[Option<wgpu::RenderPassColorAttachment<'_>>; 4]> {
        self.colors
            .iter()
            .map(|a| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &a.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect()
    }

    /// Depth attachment for a render pass, if the target has one.
    #[must_use]
    pub fn depth_attachment(
        &self,
        load: wgpu::LoadOp<f32>,
    ) -> Option<wgpu::RenderPassDepthStencilAttachment<'_>> {
        self.depth
            .as_ref()
            .map(|d| wgpu::RenderPassDepthStencilAttachment {
                view: &d.view,
                depth_ops: Some(wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            })
    }

    /// Color target states for a pipeline writing this target, no blending.
    #[must_use]
    pub fn color_targets(&self) -> SmallVec<[Option<wgpu::ColorTargetState>; 4]> {
        self.colors
            .iter()
            .map(|a| {
                Some(wgpu::ColorTargetState {
                    format: a.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect()
    }
}

/// Attachment order of the G-buffer.
pub mod gbuffer_slot {
    pub const POSITION: usize = 0;
    pub const ALBEDO: usize = 1;
    pub const NORMAL: usize = 2;
    pub const EFFECTS: usize = 3;
}

/// The geometry pass output.
///
/// | Slot | Content                                   | Format        |
/// |------|-------------------------------------------|---------------|
/// | 0    | view-space position, linear depth in `a`  | `Rgba16Float` |
/// | 1    | albedo, alpha                             | `Rgba8Unorm`  |
/// | 2    | view-space normal, roughness in `a`       | `Rgba16Float` |
/// | 3    | AO texture `r`, velocity `gb`, metal `a`  | `Rgba16Float` |
/// | D    | hardware depth                            | `Depth32Float`|
#[derive(Debug)]
pub struct GBuffer {
    target: RenderTarget,
}

pub const GBUFFER_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

impl GBuffer {
    /// The standard descriptor at `width x height`.
    #[must_use]
    pub fn descriptor(width: u32, height: u32) -> RenderTargetDesc {
        use wgpu::TextureFormat as F;
        RenderTargetDesc::new("G-Buffer", width, height)
            .with_color(AttachmentSpec::new("gPosition", F::Rgba16Float))
            .with_color(AttachmentSpec::new("gAlbedo", F::Rgba8Unorm))
            .with_color(AttachmentSpec::new("gNormal", F::Rgba16Float))
            .with_color(AttachmentSpec::new("gEffects", F::Rgba16Float))
            .with_depth(AttachmentSpec::new("gDepth", GBUFFER_DEPTH_FORMAT))
            .with_usage(wgpu::TextureUsages::COPY_SRC)
    }

    /// Wraps `target`, checking the four-color-plus-depth shape.
    pub fn from_target(target: RenderTarget) -> Result<Self> {
        if target.color_count() != 4 {
            return Err(incomplete(
                target.label,
                format!("G-buffer needs 4 color attachments, got {}", target.color_count()),
            ));
        }
        if target.depth.is_none() {
            return Err(incomplete(target.label, "G-buffer needs a depth attachment"));
        }
        Ok(Self { target })
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    #[must_use]
    pub fn position(&self) -> &wgpu::TextureView {
        self.target.color_view(gbuffer_slot::POSITION)
    }

    #[must_use]
    pub fn albedo(&self) -> &wgpu::TextureView {
        self.target.color_view(gbuffer_slot::ALBEDO)
    }

    #[must_use]
    pub fn normal(&self) -> &wgpu::TextureView {
        self.target.color_view(gbuffer_slot::NORMAL)
    }

    #[must_use]
    pub fn effects(&self) -> &wgpu::TextureView {
        self.target.color_view(gbuffer_slot::EFFECTS)
    }

    /// The G-buffer always carries depth; checked in [`from_target`](Self::from_target).
    #[must_use]
    pub fn depth(&self) -> Option<&Attachment> {
        self.target.depth()
    }
}

/// A cube texture rendered face by face.
#[derive(Debug)]
pub struct CubeTarget {
    pub texture: wgpu::Texture,
    /// Full cube view over every mip, for sampling.
    pub cube_view: wgpu::TextureView,
    size: u32,
    mip_levels: u32,
}

impl CubeTarget {
    #[inline]
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    /// Face size at `mip`.
    #[must_use]
    pub fn mip_size(&self, mip: u32) -> u32 {
        (self.size >> mip).max(1)
    }

    /// A single-face, single-mip 2D view usable as a color attachment.
    #[must_use]
    pub fn face_view(&self, face: u32, mip: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cube Face View"),
            format: None,
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: mip,
            mip_level_count: Some(1),
            base_array_layer: face,
            array_layer_count: Some(1),
            usage: Some(wgpu::TextureUsages::RENDER_ATTACHMENT),
        })
    }

    /// A single-face, single-mip 2D view for sampling.
    #[must_use]
    pub fn face_source_view(&self, face: u32, mip: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cube Face Source View"),
            format: None,
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: mip,
            mip_level_count: Some(1),
            base_array_layer: face,
            array_layer_count: Some(1),
            usage: Some(wgpu::TextureUsages::TEXTURE_BINDING),
        })
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Allocates validated targets.
pub struct RenderTargetManager {
    device: wgpu::Device,
    limits: wgpu::Limits,
    features: wgpu::Features,
    created: usize,
}

impl RenderTargetManager {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            device: device.clone(),
            limits: device.limits(),
            features: device.features(),
            created: 0,
        }
    }

    /// Number of targets allocated so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }

    /// Validates `desc` and allocates its attachments.
    pub fn create_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTarget> {
        if let Err(e) = validate_target(desc, &self.limits, self.features) {
            log::error!("{e}");
            return Err(e);
        }

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | desc.extra_usage;

        let colors = desc
            .colors
            .iter()
            .map(|spec| self.allocate(spec, size, usage))
            .collect();
        let depth = desc.depth.as_ref().map(|spec| self.allocate(spec, size, usage));

        self.created += 1;
        log::info!(
            "Created render target '{}' {}x{} ({} color{})",
            desc.label,
            desc.width,
            desc.height,
            desc.colors.len(),
            if depth.is_some() { " + depth" } else { "" }
        );

        Ok(RenderTarget {
            label: desc.label,
            width: desc.width,
            height: desc.height,
            colors,
            depth,
        })
    }

    /// Allocates and checks the G-buffer.
    pub fn create_gbuffer(&mut self, width: u32, height: u32) -> Result<GBuffer> {
        let target = self.create_target(&GBuffer::descriptor(width, height))?;
        GBuffer::from_target(target).inspect_err(|e| log::error!("{e}"))
    }

    /// Validates `desc` and allocates a cube texture.
    pub fn create_cube_target(&mut self, desc: &CubeTargetDesc) -> Result<CubeTarget> {
        if let Err(e) = validate_cube_target(desc, &self.limits, self.features) {
            log::error!("{e}");
            return Err(e);
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.size,
                height: desc.size,
                depth_or_array_layers: 6,
            },
            mip_level_count: desc.mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(desc.label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        self.created += 1;
        log::debug!(
            "Created cube target '{}' {}² x {} mips",
            desc.label,
            desc.size,
            desc.mip_levels
        );

        Ok(CubeTarget {
            texture,
            cube_view,
            size: desc.size,
            mip_levels: desc.mip_levels,
        })
    }

    fn allocate(
        &self,
        spec: &AttachmentSpec,
        size: wgpu::Extent3d,
        usage: wgpu::TextureUsages,
    ) -> Attachment {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(spec.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: spec.format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Attachment {
            texture,
            view,
            format: spec.format,
            filter: spec.filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gbuffer_descriptor_fits_default_limits() {
        let desc = GBuffer::descriptor(1280, 720);
        assert_eq!(desc.colors.len(), 4);
        validate_target(&desc, &wgpu::Limits::default(), wgpu::Features::empty())
            .expect("G-buffer must validate");
    }

    #[test]
    fn rgba32_position_would_exceed_byte_budget() {
        let mut desc = GBuffer::descriptor(1280, 720);
        desc.colors[0].format = wgpu::TextureFormat::Rgba32Float;
        desc.colors[2].format = wgpu::TextureFormat::Rgba32Float;
        let err = validate_target(&desc, &wgpu::Limits::default(), wgpu::Features::empty());
        assert!(err.is_err());
    }
}
