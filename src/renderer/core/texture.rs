//! Texture upload
//!
//! - [`upload_ldr`] / [`upload_hdr`]: CPU images to sampled 2D textures
//! - [`MaterialTextures`]: the five PBR channels the geometry pass samples,
//!   with per-channel fallbacks for missing files

use crate::renderer::core::mipmap::MipChain;
use crate::renderer::settings::full_mip_count;
use crate::resources::image::{HdrImage, LdrImage};
use crate::resources::presets::MaterialTexturePaths;

/// Fallback texels when a channel fails to load.
pub mod fallback {
    pub const ALBEDO: [u8; 4] = [255, 255, 255, 255];
    /// Tangent-space +Z.
    pub const NORMAL: [u8; 4] = [128, 128, 255, 255];
    pub const ROUGHNESS: [u8; 4] = [255, 255, 255, 255];
    pub const METALNESS: [u8; 4] = [0, 0, 0, 255];
    pub const AO: [u8; 4] = [255, 255, 255, 255];
}

/// Mip chains for the two material texture formats.
pub struct MaterialMips {
    pub srgb: MipChain,
    pub linear: MipChain,
}

impl MaterialMips {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            srgb: MipChain::new(device, wgpu::TextureFormat::Rgba8UnormSrgb),
            linear: MipChain::new(device, wgpu::TextureFormat::Rgba8Unorm),
        }
    }
}

/// Uploads an 8-bit image in the format of `mips`, with a full mip chain.
pub fn upload_ldr(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    mips: &MipChain,
    image: &LdrImage,
    label: &str,
) -> wgpu::Texture {
    let format = mips.format();
    let mip_level_count = full_mip_count(image.width.max(image.height));
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        texture.size(),
    );

    if mip_level_count > 1 {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Texture Mip Encoder"),
        });
        if let Err(e) = mips.generate(device, &mut encoder, &texture) {
            log::warn!("{label} keeps only its base level: {e}");
        }
        queue.submit(Some(encoder.finish()));
    }
    texture
}

/// Uploads a float image as `Rgba16Float`, single mip.
pub fn upload_hdr(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &HdrImage,
    label: &str,
) -> wgpu::Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let texels = image.to_rgba16f();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(&texels),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(8 * image.width),
            rows_per_image: Some(image.height),
        },
        texture.size(),
    );
    texture
}

/// The five material channels, bound at fixed slots 0..5 of the geometry
/// pass material group.
pub struct MaterialTextures {
    pub albedo: wgpu::TextureView,
    pub normal: wgpu::TextureView,
    pub roughness: wgpu::TextureView,
    pub metalness: wgpu::TextureView,
    pub ao: wgpu::TextureView,
}

impl MaterialTextures {
    /// Loads every channel, substituting the fallback texel for failures.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mips: &MaterialMips,
        paths: &MaterialTexturePaths,
    ) -> Self {
        let images = [
            LdrImage::load_or_fallback(&paths.albedo, true, fallback::ALBEDO),
            LdrImage::load_or_fallback(&paths.normal, true, fallback::NORMAL),
            LdrImage::load_or_fallback(&paths.roughness, true, fallback::ROUGHNESS),
            LdrImage::load_or_fallback(&paths.metalness, true, fallback::METALNESS),
            LdrImage::load_or_fallback(&paths.ao, true, fallback::AO),
        ];
        Self::from_images(device, queue, mips, &images)
    }

    /// Single-texel fallbacks for every channel.
    pub fn fallback(device: &wgpu::Device, queue: &wgpu::Queue, mips: &MaterialMips) -> Self {
        let images = [
            LdrImage::solid(fallback::ALBEDO),
            LdrImage::solid(fallback::NORMAL),
            LdrImage::solid(fallback::ROUGHNESS),
            LdrImage::solid(fallback::METALNESS),
            LdrImage::solid(fallback::AO),
        ];
        Self::from_images(device, queue, mips, &images)
    }

    fn from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mips: &MaterialMips,
        images: &[LdrImage; 5],
    ) -> Self {
        let [albedo, normal, roughness, metalness, ao] = images;
        let view = |image: &LdrImage, label: &str, chain: &MipChain| {
            upload_ldr(device, queue, chain, image, label)
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        Self {
            albedo: view(albedo, "Material Albedo", &mips.srgb),
            normal: view(normal, "Material Normal", &mips.linear),
            roughness: view(roughness, "Material Roughness", &mips.linear),
            metalness: view(metalness, "Material Metalness", &mips.linear),
            ao: view(ao, "Material AO", &mips.linear),
        }
    }

    /// Views in binding order.
    #[must_use]
    pub fn views(&self) -> [&wgpu::TextureView; 5] {
        [
            &self.albedo,
            &self.normal,
            &self.roughness,
            &self.metalness,
            &self.ao,
        ]
    }
}
