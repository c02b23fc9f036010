use crate::instances::{InstanceRing, MAX_INSTANCES};
use crate::lights::{Light, Lights, LightsError};
use glam::Vec4;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Scene-level settings, loaded as part of the renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of cubes on the ring.
    pub instance_count: usize,
    pub ring_radius: f32,
    pub ambient: Vec4,
    /// Explicit lights. `None` selects the built-in palette.
    pub lights: Option<Vec<Light>>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            instance_count: 24,
            ring_radius: 6.0,
            ambient: Vec4::new(0.08, 0.08, 0.1, 1.0),
            lights: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("requested {requested} instances, capacity is {capacity}")]
    TooManyInstances { requested: usize, capacity: usize },
    #[error("ring radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error(transparent)]
    Lights(#[from] LightsError),
}

/// Everything drawn by the opaque pass plus the lighting environment.
/// Built once at init and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub instances: InstanceRing,
    pub lights: Lights,
    pub ambient: Vec4,
}

impl Scene {
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        if config.instance_count > MAX_INSTANCES {
            return Err(SceneError::TooManyInstances {
                requested: config.instance_count,
                capacity: MAX_INSTANCES,
            });
        }
        if !(config.ring_radius.is_finite() && config.ring_radius > 0.0) {
            return Err(SceneError::InvalidRadius(config.ring_radius));
        }

        let instances = InstanceRing::new(config.instance_count, config.ring_radius);
        let lights = match &config.lights {
            Some(list) => Lights::from_lights(list.iter().copied())?,
            None => Lights::palette(config.ring_radius),
        };
        info!(
            instances = instances.len(),
            lights = lights.count(),
            radius = config.ring_radius,
            "scene built"
        );

        Ok(Self {
            instances,
            lights,
            ambient: config.ambient,
        })
    }
}

impl Default for Scene {
    fn default() -> Self {
        let config = SceneConfig::default();
        Self {
            instances: InstanceRing::new(config.instance_count, config.ring_radius),
            lights: Lights::palette(config.ring_radius),
            ambient: config.ambient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::{ColorGenerator, MAX_LIGHTS, PositionGenerator};
    use glam::Vec3;

    fn fixed_light(x: f32) -> Light {
        Light::new(
            PositionGenerator::Fixed {
                position: Vec3::new(x, 1.0, 0.0),
            },
            ColorGenerator::Constant { color: Vec4::ONE },
        )
    }

    #[test]
    fn default_config_uses_palette() {
        let scene = Scene::from_config(&SceneConfig::default()).unwrap();
        assert_eq!(scene.instances.len(), 24);
        assert_eq!(scene.lights, Lights::palette(6.0));
        assert_eq!(scene, Scene::default());
    }

    #[test]
    fn explicit_lights_replace_palette() {
        let config = SceneConfig {
            lights: Some(vec![fixed_light(1.0), fixed_light(2.0)]),
            ..SceneConfig::default()
        };
        let scene = Scene::from_config(&config).unwrap();
        assert_eq!(scene.lights.count(), 2);
        assert_eq!(scene.lights.positions_at(0)[1], Vec4::new(2.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn too_many_lights_is_rejected() {
        let config = SceneConfig {
            lights: Some((0..=MAX_LIGHTS).map(|i| fixed_light(i as f32)).collect()),
            ..SceneConfig::default()
        };
        let err = Scene::from_config(&config).unwrap_err();
        assert!(matches!(err, SceneError::Lights(LightsError::Full { capacity: 5 })));
    }

    #[test]
    fn too_many_instances_is_rejected() {
        let config = SceneConfig {
            instance_count: MAX_INSTANCES + 1,
            ..SceneConfig::default()
        };
        assert_eq!(
            Scene::from_config(&config).unwrap_err(),
            SceneError::TooManyInstances {
                requested: MAX_INSTANCES + 1,
                capacity: MAX_INSTANCES,
            }
        );
    }

    #[test]
    fn bad_radius_is_rejected() {
        for radius in [0.0, -1.0, f32::NAN] {
            let config = SceneConfig {
                ring_radius: radius,
                ..SceneConfig::default()
            };
            assert!(matches!(
                Scene::from_config(&config),
                Err(SceneError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SceneConfig = serde_json::from_str(r#"{ "instance_count": 8 }"#).unwrap();
        assert_eq!(config.instance_count, 8);
        assert_eq!(config.ring_radius, SceneConfig::default().ring_radius);
        assert!(config.lights.is_none());
    }
}
