//! Image assets for the renderer: a 2D texture for the cube ring and a
//! six-face cubemap for the sky.
//!
//! Files are decoded into tightly packed RGBA8 blobs. The renderer uploads the
//! bytes as-is and never looks at file formats itself. Paths left unset fall
//! back to procedurally generated images.

mod cubemap;
mod texture;

pub use cubemap::{CubeFace, CubemapData, load_cubemap, sky_gradient};
pub use texture::{TextureData, checkerboard, load_texture};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("cubemap face {face:?} is {found}px, expected {expected}px")]
    CubemapFaceMismatch {
        face: CubeFace,
        expected: u32,
        found: u32,
    },
    #[error("cubemap face {face:?} is {width}x{height}, faces must be square")]
    NotSquare {
        face: CubeFace,
        width: u32,
        height: u32,
    },
}

/// Where to find image assets. Unset entries use procedural fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// 2D texture applied to the cubes.
    pub texture: Option<PathBuf>,
    /// Directory holding `px.png nx.png py.png ny.png pz.png nz.png`.
    pub sky: Option<PathBuf>,
}

/// Edge length of the generated fallback images.
pub const FALLBACK_SIZE: u32 = 256;

/// Decoded images for one renderer instance.
#[derive(Debug, Clone)]
pub struct SceneTextures {
    pub cube: TextureData,
    pub sky: CubemapData,
}

impl SceneTextures {
    /// Load every configured asset. A configured path that fails to load is
    /// an error; it never silently falls back.
    pub fn load(paths: &AssetPaths) -> Result<Self, AssetError> {
        let cube = match &paths.texture {
            Some(path) => load_texture(path)?,
            None => checkerboard(FALLBACK_SIZE, 8, [230, 230, 230, 255], [60, 90, 160, 255]),
        };
        let sky = match &paths.sky {
            Some(dir) => load_cubemap(dir)?,
            None => sky_gradient(FALLBACK_SIZE),
        };
        info!(
            texture = %describe(&paths.texture),
            sky = %describe(&paths.sky),
            cube_size = cube.width,
            sky_size = sky.size,
            "assets loaded"
        );
        Ok(Self { cube, sky })
    }

    /// Procedural fallbacks only; never touches the filesystem.
    pub fn fallback() -> Self {
        Self {
            cube: checkerboard(FALLBACK_SIZE, 8, [230, 230, 230, 255], [60, 90, 160, 255]),
            sky: sky_gradient(FALLBACK_SIZE),
        }
    }
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "procedural".into(),
    }
}
