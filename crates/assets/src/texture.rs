use crate::AssetError;
use std::path::Path;
use tracing::debug;

/// Tightly packed RGBA8 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Bytes per row as uploaded.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Decode an image file of any supported format into RGBA8.
pub fn load_texture(path: &Path) -> Result<TextureData, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    debug!(path = %path.display(), width = rgba.width(), height = rgba.height(), "texture decoded");
    Ok(TextureData {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Square checkerboard with `cells` squares per side.
pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> TextureData {
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let even = (x / cell + y / cell) % 2 == 0;
            pixels.extend_from_slice(if even { &a } else { &b });
        }
    }
    TextureData {
        width: size,
        height: size,
        pixels,
    }
}
