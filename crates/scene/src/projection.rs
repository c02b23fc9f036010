use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// How clip-space depth maps to the depth buffer.
///
/// Both conventions use a `[0, w]` clip depth range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthConvention {
    /// Near maps to 0.0, far to 1.0. Clear 1.0, compare less.
    Standard,
    /// Near maps to 1.0, far to 0.0. Clear 0.0, compare greater-equal.
    #[default]
    Reversed,
}

impl DepthConvention {
    /// Depth value of "nothing drawn yet".
    pub fn clear_value(self) -> f32 {
        match self {
            DepthConvention::Standard => 1.0,
            DepthConvention::Reversed => 0.0,
        }
    }

    /// Clip-space z (divided by w) that lands on the far plane.
    pub fn far_depth(self) -> f32 {
        self.clear_value()
    }

    /// Matrix that rewrites this convention's clip z into the symmetric
    /// `[-w, w]` range with near at `-w`, so plane extraction can use one set
    /// of row identities for every backend.
    pub fn to_symmetric(self) -> Mat4 {
        match self {
            // z' = 2z - w
            DepthConvention::Standard => Mat4::from_cols(
                Vec4::X,
                Vec4::Y,
                Vec4::new(0.0, 0.0, 2.0, 0.0),
                Vec4::new(0.0, 0.0, -1.0, 1.0),
            ),
            // z' = w - 2z
            DepthConvention::Reversed => Mat4::from_cols(
                Vec4::X,
                Vec4::Y,
                Vec4::new(0.0, 0.0, -2.0, 0.0),
                Vec4::new(0.0, 0.0, 1.0, 1.0),
            ),
        }
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    #[serde(default)]
    pub depth: DepthConvention,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 100.0,
            depth: DepthConvention::Reversed,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        match self.depth {
            DepthConvention::Standard => {
                Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
            }
            // Swapping the planes flips the depth range: near lands on 1.0.
            DepthConvention::Reversed => {
                Mat4::perspective_rh(self.fov_y, aspect, self.far, self.near)
            }
        }
    }
}
