//! Mip chains.
//!
//! Textures are uploaded or captured into level 0 only. [`MipChain`] fills
//! the remaining levels layer by layer: level `n` of a layer is a bilinear
//! downsample of level `n - 1` of the same layer. For the environment cube
//! that means six independent face chains that never read across a seam.

use super::pipeline::{fullscreen_pipeline, sampler_entry, texture_entry};
use super::targets::CubeTarget;
use crate::errors::{LuminaError, Result};
use crate::scene::shape::{Shape, ShapeKind};

/// One downsample: `layer` level `level - 1` into `layer` level `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipBlit {
    pub layer: u32,
    pub level: u32,
}

impl MipBlit {
    #[inline]
    #[must_use]
    pub fn source_level(self) -> u32 {
        self.level - 1
    }
}

/// Blits for `layers` layers of `mip_levels` levels, one layer at a time.
pub fn blit_plan(layers: u32, mip_levels: u32) -> impl Iterator<Item = MipBlit> {
    (0..layers).flat_map(move |layer| (1..mip_levels).map(move |level| MipBlit { layer, level }))
}

/// Blits for a six-face cube.
pub fn cube_blit_plan(mip_levels: u32) -> impl Iterator<Item = MipBlit> {
    blit_plan(6, mip_levels)
}

fn level_view(
    texture: &wgpu::Texture,
    blit: MipBlit,
    level: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Mip Level View"),
        format: None,
        dimension: Some(wgpu::TextureViewDimension::D2),
        aspect: wgpu::TextureAspect::All,
        base_mip_level: level,
        mip_level_count: Some(1),
        base_array_layer: blit.layer,
        array_layer_count: Some(1),
        usage: Some(usage),
    })
}

/// Downsample pipeline bound to one texture format.
pub struct MipChain {
    format: wgpu::TextureFormat,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
    quad: Shape,
}

impl MipChain {
    #[must_use]
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mip Chain Layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                sampler_entry(1),
            ],
        });
        let pipeline = fullscreen_pipeline(
            device,
            &format!("Mip Chain Pipeline {format:?}"),
            include_str!("../shaders/mip_blit.wgsl"),
            &[&layout],
            format,
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mip Chain Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            format,
            layout,
            sampler,
            pipeline,
            quad: Shape::upload(device, ShapeKind::Quad),
        }
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Fills levels `1..` of every face of `cube` from level 0.
    ///
    /// Returns the number of blits recorded.
    pub fn generate_cube(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        cube: &CubeTarget,
    ) -> Result<u32> {
        self.check_format(cube.format())?;
        let mut blits = 0;
        for blit in cube_blit_plan(cube.mip_levels()) {
            let source = cube.face_source_view(blit.layer, blit.source_level());
            let target = cube.face_view(blit.layer, blit.level);
            self.blit(device, encoder, &source, &target);
            blits += 1;
        }
        log::trace!(
            "Filled {} mips per face of a {}² cube ({blits} blits)",
            cube.mip_levels(),
            cube.size()
        );
        Ok(blits)
    }

    /// Fills levels `1..` of every layer of a 2D `texture` from level 0.
    pub fn generate(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
    ) -> Result<u32> {
        self.check_format(texture.format())?;
        let mut blits = 0;
        for blit in blit_plan(texture.depth_or_array_layers(), texture.mip_level_count()) {
            let source = level_view(
                texture,
                blit,
                blit.source_level(),
                wgpu::TextureUsages::TEXTURE_BINDING,
            );
            let target = level_view(
                texture,
                blit,
                blit.level,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            );
            self.blit(device, encoder, &source, &target);
            blits += 1;
        }
        Ok(blits)
    }

    fn check_format(&self, format: wgpu::TextureFormat) -> Result<()> {
        if format == self.format {
            Ok(())
        } else {
            Err(LuminaError::IncompleteRenderTarget {
                label: "mip chain".to_string(),
                reason: format!("built for {:?}, given {format:?}", self.format),
            })
        }
    }

    fn blit(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mip Chain BG"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mip Chain Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        self.quad.draw(&mut pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_plan_covers_every_face_below_the_base_level() {
        let blits: Vec<_> = cube_blit_plan(6).collect();
        assert_eq!(blits.len(), 6 * 5);
        for face in 0..6 {
            let levels: Vec<_> = blits
                .iter()
                .filter(|b| b.layer == face)
                .map(|b| b.level)
                .collect();
            assert_eq!(levels, vec![1, 2, 3, 4, 5], "face {face}");
        }
    }

    #[test]
    fn plan_reads_the_level_it_just_wrote() {
        let blits: Vec<_> = cube_blit_plan(4).collect();
        for pair in blits.windows(2) {
            if pair[0].layer == pair[1].layer {
                assert_eq!(pair[1].source_level(), pair[0].level);
            }
        }
        assert!(blits.iter().all(|b| b.source_level() + 1 == b.level));
    }

    #[test]
    fn single_level_textures_need_no_blits() {
        assert_eq!(cube_blit_plan(1).count(), 0);
        assert_eq!(cube_blit_plan(0).count(), 0);
        assert_eq!(blit_plan(1, 1).count(), 0);
    }

    #[test]
    fn flat_plan_stays_on_its_layer() {
        let blits: Vec<_> = blit_plan(1, 9).collect();
        assert_eq!(blits.len(), 8);
        assert!(blits.iter().all(|b| b.layer == 0));
    }
}
