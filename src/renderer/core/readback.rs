//! Blocking GPU → CPU copies.
//!
//! Used by the profiler once per frame and by tests that inspect render
//! targets. Every call submits and then waits for the device to go idle.

use std::sync::mpsc;

use crate::errors::{LuminaError, Result};

/// Maps `buffer` for reading, waits, and returns a copy of its contents.
///
/// The buffer must have `MAP_READ` usage and all writes to it must already
/// be submitted.
pub fn map_buffer_blocking(device: &wgpu::Device, buffer: &wgpu::Buffer) -> Result<Vec<u8>> {
    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| LuminaError::Readback(e.to_string()))?;
    rx.recv()
        .map_err(|e| LuminaError::Readback(e.to_string()))?
        .map_err(|e| LuminaError::Readback(e.to_string()))?;

    let bytes = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(bytes)
}

/// Reads one layer of one mip of `texture` into tightly packed rows.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    layer: u32,
    aspect: wgpu::TextureAspect,
) -> Result<Vec<u8>> {
    let width = (texture.width() >> mip_level).max(1);
    let height = (texture.height() >> mip_level).max(1);
    let texel = texture
        .format()
        .block_copy_size(Some(aspect))
        .ok_or_else(|| {
            LuminaError::Readback(format!("{:?} has no copyable {aspect:?}", texture.format()))
        })?;

    let unpadded = width * texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Texture Readback"),
        size: u64::from(padded) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Texture Readback Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let raw = map_buffer_blocking(device, &buffer)?;
    let mut packed = Vec::with_capacity((unpadded * height) as usize);
    for row in raw.chunks_exact(padded as usize) {
        packed.extend_from_slice(&row[..unpadded as usize]);
    }
    Ok(packed)
}
