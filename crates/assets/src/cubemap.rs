use crate::AssetError;
use crate::texture::load_texture;
use std::path::Path;
use tracing::debug;

/// Cubemap faces in GPU layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// File stem inside a cubemap directory.
    pub fn stem(self) -> &'static str {
        match self {
            CubeFace::PosX => "px",
            CubeFace::NegX => "nx",
            CubeFace::PosY => "py",
            CubeFace::NegY => "ny",
            CubeFace::PosZ => "pz",
            CubeFace::NegZ => "nz",
        }
    }

    pub fn layer(self) -> usize {
        self as usize
    }

    /// Direction sampled at face coordinates `u, v` in `[-1, 1]`, with `v`
    /// growing downwards.
    pub fn direction(self, u: f32, v: f32) -> [f32; 3] {
        match self {
            CubeFace::PosX => [1.0, -v, -u],
            CubeFace::NegX => [-1.0, -v, u],
            CubeFace::PosY => [u, 1.0, v],
            CubeFace::NegY => [u, -1.0, -v],
            CubeFace::PosZ => [u, -v, 1.0],
            CubeFace::NegZ => [-u, -v, -1.0],
        }
    }
}

/// Six square RGBA8 faces of equal size, stored layer after layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubemapData {
    pub size: u32,
    data: Vec<u8>,
}

impl CubemapData {
    fn face_len(size: u32) -> usize {
        (size * size * 4) as usize
    }

    pub fn face(&self, face: CubeFace) -> &[u8] {
        let len = Self::face_len(self.size);
        let start = face.layer() * len;
        &self.data[start..start + len]
    }

    /// All six faces, layer-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Load `px nx py ny pz nz` `.png` faces from a directory.
pub fn load_cubemap(dir: &Path) -> Result<CubemapData, AssetError> {
    let mut size = None;
    let mut data = Vec::new();
    for face in CubeFace::ALL {
        let tex = load_texture(&dir.join(format!("{}.png", face.stem())))?;
        if tex.width != tex.height {
            return Err(AssetError::NotSquare {
                face,
                width: tex.width,
                height: tex.height,
            });
        }
        let expected = *size.get_or_insert(tex.width);
        if tex.width != expected {
            return Err(AssetError::CubemapFaceMismatch {
                face,
                expected,
                found: tex.width,
            });
        }
        data.extend_from_slice(&tex.pixels);
    }
    let size = size.unwrap_or(0);
    debug!(dir = %dir.display(), size, "cubemap loaded");
    Ok(CubemapData { size, data })
}

/// Procedural sky: zenith blue fading to a pale horizon, dark ground below.
pub fn sky_gradient(size: u32) -> CubemapData {
    const ZENITH: [f32; 3] = [0.18, 0.35, 0.75];
    const HORIZON: [f32; 3] = [0.8, 0.85, 0.9];
    const GROUND: [f32; 3] = [0.15, 0.13, 0.12];

    let mut data = Vec::with_capacity(CubemapData::face_len(size) * 6);
    for face in CubeFace::ALL {
        for y in 0..size {
            for x in 0..size {
                let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                let [dx, dy, dz] = face.direction(u, v);
                let up = dy / (dx * dx + dy * dy + dz * dz).sqrt();
                let (from, to, t) = if up >= 0.0 {
                    (HORIZON, ZENITH, up.sqrt())
                } else {
                    (HORIZON, GROUND, (-up * 4.0).min(1.0))
                };
                for c in 0..3 {
                    let value = from[c] + (to[c] - from[c]) * t;
                    data.push((value * 255.0).round() as u8);
                }
                data.push(255);
            }
        }
    }
    CubemapData { size, data }
}
