//! Texture decoding into CPU-side RGBA8 pixel data.

use std::path::Path;

use anyhow::{Context, Result};

/// Decoded image, always RGBA8, ready for GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn new_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "pixel data does not match {width}x{height} RGBA8"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image file (PNG or JPEG) into RGBA8.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded texture {} ({}x{})", path.display(), width, height);
        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// White/gray checkerboard, the fallback when no texture file is given.
    pub fn checkerboard(size: u32) -> Self {
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    pixels.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    pixels.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self::new_rgba8(size, size, pixels)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width * self.height * 4) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_valid() {
        let tex = TextureData::checkerboard(32);
        assert!(tex.is_valid());
        assert_eq!(tex.pixels.len(), 32 * 32 * 4);
        // Top-left cell is white, the next 8x8 cell over is gray.
        assert_eq!(&tex.pixels[0..4], &[255, 255, 255, 255]);
        let offset = (8 * 4) as usize;
        assert_eq!(&tex.pixels[offset..offset + 4], &[128, 128, 128, 255]);
    }

    #[test]
    fn missing_image_error_names_the_path() {
        let err = TextureData::from_path("/no/such/texture.png").unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/texture.png"));
    }
}
