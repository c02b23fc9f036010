use orbitlab_assets::AssetPaths;
use orbitlab_common::Extent;
use orbitlab_scene::{Projection, SceneConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a renderer needs at init. Every field has a default, so a
/// config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub scene: SceneConfig,
    pub projection: Projection,
    /// Offscreen clear color, linear RGBA.
    pub clear_color: [f64; 4],
    /// Initial surface size.
    pub size: Extent,
    pub assets: AssetPaths,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            projection: Projection::default(),
            clear_color: [0.05, 0.05, 0.08, 1.0],
            size: Extent::default(),
            assets: AssetPaths::default(),
        }
    }
}

impl RendererConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject projections that cannot produce a usable frustum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if !(p.fov_y > 0.0 && p.fov_y < std::f32::consts::PI) {
            return Err(ConfigError::Invalid(format!(
                "fov_y must be in (0, pi), got {}",
                p.fov_y
            )));
        }
        if !(p.near > 0.0 && p.far > p.near) {
            return Err(ConfigError::Invalid(format!(
                "need 0 < near < far, got near={} far={}",
                p.near, p.far
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitlab_scene::DepthConvention;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renderer.json");
        std::fs::write(
            &path,
            r#"{ "scene": { "instance_count": 40 }, "size": { "width": 640, "height": 480 } }"#,
        )
        .unwrap();

        let config = RendererConfig::from_json_file(&path).unwrap();
        assert_eq!(config.scene.instance_count, 40);
        assert_eq!(config.size, Extent::new(640, 480));
        assert_eq!(config.projection, Projection::default());
        assert_eq!(config.projection.depth, DepthConvention::Reversed);
    }

    #[test]
    fn json_roundtrip() {
        let config = RendererConfig::default();
        let back: RendererConfig = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RendererConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ scene: ").unwrap();
        assert!(matches!(
            RendererConfig::from_json_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn bad_projection_is_rejected() {
        let mut config = RendererConfig::default();
        config.projection.near = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.projection.near = 0.1;
        config.projection.fov_y = 4.0;
        assert!(config.validate().is_err());
    }
}
