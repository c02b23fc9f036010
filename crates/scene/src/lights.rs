use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Capacity of the light registry and of the shader's light arrays.
pub const MAX_LIGHTS: usize = 5;

/// Time-parameterized light position. Evaluates to a homogeneous point (w = 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionGenerator {
    Fixed {
        position: Vec3,
    },
    /// Circle in the XZ plane around `center`.
    Orbit {
        center: Vec3,
        radius: f32,
        period_ms: f32,
        phase: f32,
    },
    /// Sinusoidal motion along `axis` around `base`.
    Bob {
        base: Vec3,
        axis: Vec3,
        amplitude: f32,
        period_ms: f32,
        phase: f32,
    },
}

/// Time-parameterized light color (RGBA, alpha unused by shading).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorGenerator {
    Constant {
        color: Vec4,
    },
    /// `base * (1 + amplitude * sin(angle))`, clamped at zero.
    Pulse {
        base: Vec4,
        amplitude: f32,
        period_ms: f32,
        phase: f32,
    },
    /// Full saturation hue rotation.
    HueCycle {
        period_ms: f32,
        intensity: f32,
    },
}

/// Angle swept after `t_ms` for a cycle of `period_ms`. A zero period stands
/// still at `phase`, a negative one turns the other way.
fn cycle_angle(t_ms: u64, period_ms: f32, phase: f32) -> f32 {
    if period_ms == 0.0 {
        return phase;
    }
    // Reduce in f64 first so large timestamps keep their precision.
    let period = period_ms.abs() as f64;
    let turn = ((t_ms as f64) % period / period) as f32 * TAU;
    phase + turn.copysign(period_ms)
}

impl PositionGenerator {
    pub fn sample(&self, t_ms: u64) -> Vec4 {
        match *self {
            PositionGenerator::Fixed { position } => position.extend(1.0),
            PositionGenerator::Orbit {
                center,
                radius,
                period_ms,
                phase,
            } => {
                let a = cycle_angle(t_ms, period_ms, phase);
                (center + Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)).extend(1.0)
            }
            PositionGenerator::Bob {
                base,
                axis,
                amplitude,
                period_ms,
                phase,
            } => {
                let a = cycle_angle(t_ms, period_ms, phase);
                (base + axis.normalize_or_zero() * amplitude * a.sin()).extend(1.0)
            }
        }
    }
}

impl ColorGenerator {
    pub fn sample(&self, t_ms: u64) -> Vec4 {
        match *self {
            ColorGenerator::Constant { color } => color,
            ColorGenerator::Pulse {
                base,
                amplitude,
                period_ms,
                phase,
            } => {
                let a = cycle_angle(t_ms, period_ms, phase);
                let k = (1.0 + amplitude * a.sin()).max(0.0);
                (base.truncate() * k).extend(base.w)
            }
            ColorGenerator::HueCycle {
                period_ms,
                intensity,
            } => {
                let a = cycle_angle(t_ms, period_ms, 0.0);
                (hue_to_rgb(a / TAU) * intensity).extend(1.0)
            }
        }
    }
}

/// Fully saturated color for a hue in `[0, 1)`.
fn hue_to_rgb(h: f32) -> Vec3 {
    let h = h.rem_euclid(1.0) * 6.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    match h as u32 {
        0 => Vec3::new(1.0, x, 0.0),
        1 => Vec3::new(x, 1.0, 0.0),
        2 => Vec3::new(0.0, 1.0, x),
        3 => Vec3::new(0.0, x, 1.0),
        4 => Vec3::new(x, 0.0, 1.0),
        _ => Vec3::new(1.0, 0.0, x),
    }
}

/// A point light as a pair of generators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: PositionGenerator,
    pub color: ColorGenerator,
}

impl Light {
    pub fn new(position: PositionGenerator, color: ColorGenerator) -> Self {
        Self { position, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LightsError {
    #[error("light registry is full ({capacity} lights)")]
    Full { capacity: usize },
}

/// Append-only, bounded light registry. Index order is shading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LightList")]
pub struct Lights {
    lights: Vec<Light>,
}

/// Wire shape of [`Lights`]; deserializing goes through the capacity check.
#[derive(Deserialize)]
struct LightList {
    lights: Vec<Light>,
}

impl TryFrom<LightList> for Lights {
    type Error = LightsError;

    fn try_from(list: LightList) -> Result<Self, LightsError> {
        Lights::from_lights(list.lights)
    }
}

impl Lights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, light: Light) -> Result<(), LightsError> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(LightsError::Full {
                capacity: MAX_LIGHTS,
            });
        }
        self.lights.push(light);
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn positions_at(&self, t_ms: u64) -> Vec<Vec4> {
        self.lights.iter().map(|l| l.position.sample(t_ms)).collect()
    }

    pub fn colors_at(&self, t_ms: u64) -> Vec<Vec4> {
        self.lights.iter().map(|l| l.color.sample(t_ms)).collect()
    }

    /// Build a registry from a list, failing on the first light past capacity.
    pub fn from_lights(lights: impl IntoIterator<Item = Light>) -> Result<Self, LightsError> {
        let mut registry = Self::new();
        for light in lights {
            registry.add(light)?;
        }
        Ok(registry)
    }

    /// Default palette: two lights circling the cube ring in opposite
    /// directions, one bobbing above the focus, one color-cycling overhead.
    pub fn palette(ring_radius: f32) -> Self {
        let palette = [
            Light::new(
                PositionGenerator::Orbit {
                    center: Vec3::new(0.0, 1.0, 0.0),
                    radius: ring_radius,
                    period_ms: 6_000.0,
                    phase: 0.0,
                },
                ColorGenerator::Constant {
                    color: Vec4::new(1.0, 0.85, 0.6, 1.0),
                },
            ),
            Light::new(
                PositionGenerator::Orbit {
                    center: Vec3::new(0.0, -0.5, 0.0),
                    radius: ring_radius * 0.8,
                    period_ms: -9_000.0,
                    phase: std::f32::consts::PI,
                },
                ColorGenerator::Pulse {
                    base: Vec4::new(0.3, 0.5, 1.0, 1.0),
                    amplitude: 0.5,
                    period_ms: 2_500.0,
                    phase: 0.0,
                },
            ),
            Light::new(
                PositionGenerator::Bob {
                    base: Vec3::new(0.0, 2.0, 0.0),
                    axis: Vec3::Y,
                    amplitude: 1.5,
                    period_ms: 4_000.0,
                    phase: 0.0,
                },
                ColorGenerator::Constant {
                    color: Vec4::new(0.9, 0.3, 0.3, 1.0),
                },
            ),
            Light::new(
                PositionGenerator::Fixed {
                    position: Vec3::new(0.0, ring_radius, 0.0),
                },
                ColorGenerator::HueCycle {
                    period_ms: 12_000.0,
                    intensity: 0.6,
                },
            ),
        ];
        Self {
            lights: palette.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(x: f32) -> Light {
        Light::new(
            PositionGenerator::Fixed {
                position: Vec3::new(x, 0.0, 0.0),
            },
            ColorGenerator::Constant { color: Vec4::ONE },
        )
    }

    #[test]
    fn add_past_capacity_fails() {
        let mut lights = Lights::new();
        for i in 0..MAX_LIGHTS {
            assert!(lights.add(fixed(i as f32)).is_ok());
        }
        assert_eq!(
            lights.add(fixed(99.0)),
            Err(LightsError::Full {
                capacity: MAX_LIGHTS
            })
        );
        assert_eq!(lights.count(), MAX_LIGHTS);
    }

    #[test]
    fn order_is_preserved() {
        let lights = Lights::from_lights([fixed(1.0), fixed(2.0), fixed(3.0)]).unwrap();
        let xs: Vec<f32> = lights.positions_at(0).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn sampling_is_idempotent() {
        let lights = Lights::palette(6.0);
        for t in [0, 1, 1_234, 86_400_000] {
            assert_eq!(lights.positions_at(t), lights.positions_at(t));
            assert_eq!(lights.colors_at(t), lights.colors_at(t));
        }
    }

    #[test]
    fn sample_lengths_match_count() {
        let mut lights = Lights::new();
        assert!(lights.positions_at(10).is_empty());
        lights.add(fixed(0.0)).unwrap();
        lights.add(fixed(1.0)).unwrap();
        assert_eq!(lights.positions_at(10).len(), lights.count());
        assert_eq!(lights.colors_at(10).len(), lights.count());
        let palette = Lights::palette(4.0);
        assert!(palette.count() <= MAX_LIGHTS);
        assert_eq!(palette.colors_at(500).len(), palette.count());
    }

    #[test]
    fn orbit_stays_on_circle() {
        let generator = PositionGenerator::Orbit {
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 4.0,
            period_ms: 1_000.0,
            phase: 0.0,
        };
        for t in [0, 250, 500, 999, 10_001] {
            let p = generator.sample(t);
            assert_eq!(p.w, 1.0);
            assert!((p.y - 2.0).abs() < 1e-6);
            let d = Vec3::new(p.x - 1.0, 0.0, p.z - 3.0).length();
            assert!((d - 4.0).abs() < 1e-4);
        }
        let quarter = generator.sample(250);
        assert!((quarter.z - 7.0).abs() < 1e-4);
    }

    #[test]
    fn zero_period_is_static() {
        let generator = PositionGenerator::Bob {
            base: Vec3::ZERO,
            axis: Vec3::Y,
            amplitude: 2.0,
            period_ms: 0.0,
            phase: std::f32::consts::FRAC_PI_2,
        };
        assert_eq!(generator.sample(0), generator.sample(123_456));
        assert!((generator.sample(0).y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn negative_period_runs_backwards() {
        let forward = PositionGenerator::Orbit {
            center: Vec3::ZERO,
            radius: 1.0,
            period_ms: 1_000.0,
            phase: 0.0,
        };
        let backward = PositionGenerator::Orbit {
            center: Vec3::ZERO,
            radius: 1.0,
            period_ms: -1_000.0,
            phase: 0.0,
        };
        let (f, b) = (forward.sample(250), backward.sample(250));
        assert!((f.z - 1.0).abs() < 1e-5);
        assert!((b.z + 1.0).abs() < 1e-5);
    }

    #[test]
    fn pulse_never_negative() {
        let generator = ColorGenerator::Pulse {
            base: Vec4::new(1.0, 0.5, 0.25, 1.0),
            amplitude: 3.0,
            period_ms: 100.0,
            phase: 0.0,
        };
        for t in 0..100 {
            let c = generator.sample(t);
            assert!(c.x >= 0.0 && c.y >= 0.0 && c.z >= 0.0);
            assert_eq!(c.w, 1.0);
        }
    }

    #[test]
    fn hue_cycle_starts_red() {
        let generator = ColorGenerator::HueCycle {
            period_ms: 600.0,
            intensity: 1.0,
        };
        assert_eq!(generator.sample(0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        let green = generator.sample(200);
        assert!((green.y - 1.0).abs() < 1e-5 && green.x < 1e-4);
    }

    #[test]
    fn lights_roundtrip_through_json() {
        let palette = Lights::palette(5.0);
        let json = serde_json::to_string(&palette).unwrap();
        assert!(json.contains("\"kind\":\"orbit\""));
        let back: Lights = serde_json::from_str(&json).unwrap();
        assert_eq!(back, palette);
    }

    #[test]
    fn json_past_capacity_is_rejected() {
        let full = Lights::from_lights((0..MAX_LIGHTS).map(|i| fixed(i as f32))).unwrap();
        let mut value = serde_json::to_value(&full).unwrap();
        let extra = serde_json::to_value(fixed(99.0)).unwrap();
        value["lights"].as_array_mut().unwrap().push(extra);
        assert_eq!(value["lights"].as_array().unwrap().len(), MAX_LIGHTS + 1);

        let err = serde_json::from_value::<Lights>(value).unwrap_err();
        assert!(err.to_string().contains("light registry is full"), "{err}");

        let back: Lights = serde_json::from_value(serde_json::to_value(&full).unwrap()).unwrap();
        assert_eq!(back.count(), MAX_LIGHTS);
    }
}
