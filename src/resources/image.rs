//! Image Decoding
//!
//! Thin layer over the `image` crate producing CPU pixel buffers ready for
//! upload. Two flavors exist:
//!
//! - [`HdrImage`]: linear RGBA float pixels for the equirectangular
//!   environment source
//! - [`LdrImage`]: 8-bit RGBA pixels for material textures
//!
//! Load failures are reported as [`LuminaError::ImageDecodeError`]; callers
//! that must keep rendering use the `*_or_fallback` helpers, which log the
//! failing path and substitute a 1x1 image.

use std::path::Path;

use half::f16;

use crate::errors::{LuminaError, Result};

/// Linear-light RGBA float image.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl HdrImage {
    /// Decodes an HDR (or any float-capable) image from disk.
    ///
    /// Equirectangular maps are stored top row first, which is the row order
    /// the conversion shader expects, so `flip_vertically` is normally `false`.
    pub fn load(path: impl AsRef<Path>, flip_vertically: bool) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| LuminaError::ImageDecodeError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let decoded = if flip_vertically {
            decoded.flipv()
        } else {
            decoded
        };
        let rgba = decoded.into_rgba32f();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .pixels()
            .map(|p| [p.0[0], p.0[1], p.0[2], 1.0])
            .collect();

        log::info!("Loaded HDR image {} ({width}x{height})", path.display());
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Loads `path`, or logs the failure and returns a 1x1 black image.
    pub fn load_or_fallback(path: impl AsRef<Path>, flip_vertically: bool) -> Self {
        match Self::load(path, flip_vertically) {
            Ok(image) => image,
            Err(e) => {
                log::error!("{e}");
                Self::solid([0.0, 0.0, 0.0])
            }
        }
    }

    /// A 1x1 image of a single color.
    #[must_use]
    pub fn solid(rgb: [f32; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[rgb[0], rgb[1], rgb[2], 1.0]],
        }
    }

    /// Builds an image by evaluating `f(u, v)` at each texel center.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(f32, f32) -> [f32; 3]) -> Self {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let u = (x as f32 + 0.5) / width as f32;
                let v = (y as f32 + 0.5) / height as f32;
                let [r, g, b] = f(u, v);
                pixels.push([r, g, b, 1.0]);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Pixels converted to half floats, tightly packed as `Rgba16Float` texels.
    #[must_use]
    pub fn to_rgba16f(&self) -> Vec<f16> {
        self.pixels
            .iter()
            .flat_map(|p| p.map(f16::from_f32))
            .collect()
    }
}

/// 8-bit RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdrImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LdrImage {
    pub fn load(path: impl AsRef<Path>, flip_vertically: bool) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| LuminaError::ImageDecodeError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let decoded = if flip_vertically {
            decoded.flipv()
        } else {
            decoded
        };
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Loads `path`, or logs the failure and returns `fallback` as a 1x1 image.
    pub fn load_or_fallback(path: impl AsRef<Path>, flip_vertically: bool, fallback: [u8; 4]) -> Self {
        match Self::load(path, flip_vertically) {
            Ok(image) => image,
            Err(e) => {
                log::error!("{e}");
                Self::solid(fallback)
            }
        }
    }

    #[must_use]
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_single_texel() {
        let img = LdrImage::load_or_fallback("does/not/exist.png", true, [1, 2, 3, 4]);
        assert_eq!((img.width, img.height), (1, 1));
        assert_eq!(img.pixels, vec![1, 2, 3, 4]);

        let hdr = HdrImage::load_or_fallback("does/not/exist.hdr", false);
        assert_eq!(hdr.pixels, vec![[0.0, 0.0, 0.0, 1.0]]);
    }

    #[test]
    fn from_fn_samples_texel_centers() {
        let img = HdrImage::from_fn(2, 1, |u, _| [u, 0.0, 0.0]);
        assert_eq!(img.pixels[0][0], 0.25);
        assert_eq!(img.pixels[1][0], 0.75);
        assert_eq!(img.to_rgba16f().len(), 8);
    }
}
