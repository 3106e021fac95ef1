use std::path::Path;

use image::{ImageBuffer, Rgba as ImageRgba};

use crate::scene::graph::Rgba;
use crate::utils::color::{hsv_to_rgb, rgb_to_hsv};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texel buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to encode texture: {0}")]
    EncodeFailed(#[from] image::ImageError),
}

/// CPU-side RGBA8 texel buffer, row-major, 4 bytes per texel.
///
/// Imported textures are read-only once the owning graph has been
/// transformed; the recoloring pass always allocates a new buffer instead of
/// writing through a shared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Single-color texture.
    pub fn solid(width: u32, height: u32, texel: [u8; 4]) -> Self {
        let pixels = texel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ])
    }

    /// Bake a tint and brightness factor into a new same-dimension texture.
    ///
    /// Each texel is multiplied by `tint`, its value channel (in HSV space)
    /// scaled by `brightness`, and converted back to RGB. The output alpha is
    /// the input texel's alpha, untouched.
    pub fn baked(&self, tint: Rgba, brightness: f32) -> TextureData {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for texel in self.pixels.chunks_exact(4) {
            let r = texel[0] as f32 / 255.0 * tint.r;
            let g = texel[1] as f32 / 255.0 * tint.g;
            let b = texel[2] as f32 / 255.0 * tint.b;

            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r, g, b) = hsv_to_rgb(h, s, (v * brightness).clamp(0.0, 1.0));

            pixels.push(channel_to_u8(r));
            pixels.push(channel_to_u8(g));
            pixels.push(channel_to_u8(b));
            pixels.push(texel[3]);
        }
        TextureData {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Write the buffer as a PNG file, for diagnostics.
    pub fn save_png(&self, path: &Path) -> Result<(), TextureError> {
        let buffer: ImageBuffer<ImageRgba<u8>, _> =
            ImageBuffer::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
                TextureError::SizeMismatch {
                    width: self.width,
                    height: self.height,
                    expected: self.width as usize * self.height as usize * 4,
                    actual: self.pixels.len(),
                },
            )?;
        buffer.save(path)?;
        Ok(())
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
