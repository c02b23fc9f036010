use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with the given half extents.
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The 8 corners, x varying fastest, then y, then z.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Bounds of this box after transforming all corners by `m`.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in self.corners() {
            let p = m.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }
}

/// Pixel dimensions of a presentation surface or render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same extent with both sides clamped to at least one pixel.
    /// GPU textures cannot be zero sized, minimized windows report 0x0.
    pub fn at_least_one(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        let e = self.at_least_one();
        e.width as f32 / e.height as f32
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_corners_cover_both_extremes() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::new(1.0, 2.0, 3.0));
        let corners = b.corners();
        assert!(corners.contains(&b.min));
        assert!(corners.contains(&b.max));
        assert_eq!(b.center(), Vec3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn aabb_translated() {
        let b = Aabb::from_center(Vec3::ZERO, Vec3::splat(0.5));
        let moved = b.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, -2.0)));
        assert_eq!(moved.min, Vec3::new(9.5, -0.5, -2.5));
        assert_eq!(moved.max, Vec3::new(10.5, 0.5, -1.5));
    }

    #[test]
    fn aabb_rotated_grows() {
        let b = Aabb::from_center(Vec3::ZERO, Vec3::splat(0.5));
        let rotated = b.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let half_diag = 0.5 * std::f32::consts::SQRT_2;
        assert!((rotated.max.x - half_diag).abs() < 1e-5);
        assert!((rotated.max.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn extent_aspect_never_divides_by_zero() {
        assert_eq!(Extent::new(0, 0).aspect(), 1.0);
        assert_eq!(Extent::new(200, 100).aspect(), 2.0);
    }
}
