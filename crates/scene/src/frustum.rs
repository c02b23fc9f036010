use crate::projection::DepthConvention;
use glam::{Mat4, Vec3, Vec4};
use orbitlab_common::Aabb;

/// A clipping plane `(a, b, c, d)` with an inward-pointing unit normal.
/// A point is on the visible side when `a*x + b*y + c*z + d >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane(pub Vec4);

impl Plane {
    /// Plane scaled so its normal has unit length.
    fn normalized(v: Vec4) -> Self {
        let len = v.truncate().length();
        if len > 0.0 { Self(v / len) } else { Self(v) }
    }

    pub fn normal(&self) -> Vec3 {
        self.0.truncate()
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.0.dot(p.extend(1.0))
    }
}

/// View frustum as six named planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub near: Plane,
    pub far: Plane,
    pub left: Plane,
    pub right: Plane,
    pub top: Plane,
    pub bottom: Plane,
}

impl Frustum {
    /// Build the frustum from a view matrix and a projection written for the
    /// given depth convention.
    ///
    /// The projection is first rewritten to symmetric clip depth, then the
    /// planes come from the rows of `projection * view`:
    /// near = r4 + r3, far = r4 - r3, left = r4 + r1, right = r4 - r1,
    /// top = r4 - r2, bottom = r4 + r2.
    pub fn from_view_projection(view: &Mat4, projection: &Mat4, depth: DepthConvention) -> Self {
        let adjusted = depth.to_symmetric() * *projection;
        let m = adjusted * *view;
        let (r1, r2, r3, r4) = (m.row(0), m.row(1), m.row(2), m.row(3));

        Self {
            near: Plane::normalized(r4 + r3),
            far: Plane::normalized(r4 - r3),
            left: Plane::normalized(r4 + r1),
            right: Plane::normalized(r4 - r1),
            top: Plane::normalized(r4 - r2),
            bottom: Plane::normalized(r4 + r2),
        }
    }

    /// Planes in near, far, left, right, top, bottom order.
    pub fn planes(&self) -> [Plane; 6] {
        [self.near, self.far, self.left, self.right, self.top, self.bottom]
    }

    /// Conservative box test.
    ///
    /// A box is rejected only when all 8 of its corners lie behind one single
    /// plane. Boxes that straddle a plane are always kept; boxes outside near
    /// a frustum edge may be kept too.
    pub fn test_box(&self, min: Vec3, max: Vec3) -> bool {
        let corners = Aabb::new(min, max).corners();
        for plane in self.planes() {
            if corners.iter().all(|&c| plane.signed_distance(c) < 0.0) {
                return false;
            }
        }
        true
    }

    pub fn intersects_box(&self, aabb: &Aabb) -> bool {
        self.test_box(aabb.min, aabb.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Projection;

    fn test_frustum(depth: DepthConvention) -> Frustum {
        let projection = Projection {
            fov_y: 90f32.to_radians(),
            near: 0.1,
            far: 100.0,
            depth,
        };
        Frustum::from_view_projection(&Mat4::IDENTITY, &projection.matrix(1.0), depth)
    }

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::from_center(center, Vec3::splat(0.5))
    }

    #[test]
    fn planes_are_normalized() {
        let f = test_frustum(DepthConvention::Reversed);
        for plane in f.planes() {
            assert!((plane.normal().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn near_and_far_planes_sit_at_clip_distances() {
        let f = test_frustum(DepthConvention::Reversed);
        // Camera looks down -Z: near plane normal points away from the eye.
        assert!(f.near.normal().z < 0.0);
        assert!((f.near.signed_distance(Vec3::new(0.0, 0.0, -0.1))).abs() < 1e-3);
        assert!((f.far.signed_distance(Vec3::new(0.0, 0.0, -100.0))).abs() < 1e-2);
    }

    #[test]
    fn box_inside_is_visible() {
        let f = test_frustum(DepthConvention::Reversed);
        assert!(f.intersects_box(&unit_box_at(Vec3::new(0.0, 0.0, -5.0))));
    }

    #[test]
    fn box_beyond_far_is_culled() {
        let f = test_frustum(DepthConvention::Reversed);
        assert!(!f.intersects_box(&unit_box_at(Vec3::new(0.0, 0.0, -1000.0))));
    }

    #[test]
    fn box_behind_eye_is_culled() {
        let f = test_frustum(DepthConvention::Reversed);
        assert!(!f.intersects_box(&unit_box_at(Vec3::new(0.0, 0.0, 1000.0))));
    }

    #[test]
    fn box_outside_side_plane_is_culled() {
        let f = test_frustum(DepthConvention::Reversed);
        // fov 90: at depth 5 the half-width is 5.
        assert!(!f.intersects_box(&unit_box_at(Vec3::new(20.0, 0.0, -5.0))));
        assert!(!f.intersects_box(&unit_box_at(Vec3::new(0.0, -20.0, -5.0))));
    }

    #[test]
    fn straddling_box_is_visible() {
        let f = test_frustum(DepthConvention::Reversed);
        let across_far = Aabb::new(Vec3::new(-0.5, -0.5, -150.0), Vec3::new(0.5, 0.5, -50.0));
        assert!(f.intersects_box(&across_far));
        let across_left = Aabb::new(Vec3::new(-6.0, -0.5, -5.5), Vec3::new(-4.0, 0.5, -4.5));
        assert!(f.intersects_box(&across_left));
    }

    #[test]
    fn corner_region_false_positive_is_kept() {
        // Looking along (-1, 0, -1) with a 90 degree fov puts the right plane
        // on x = 0 and the far plane on x + z = -100 * sqrt(2).
        let depth = DepthConvention::Reversed;
        let projection = Projection {
            fov_y: 90f32.to_radians(),
            near: 0.1,
            far: 100.0,
            depth,
        };
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(-1.0, 0.0, -1.0), Vec3::Y);
        let f = Frustum::from_view_projection(&view, &projection.matrix(1.0), depth);

        // Every point with x <= 0 has x + z <= -142, past the far plane, and
        // every point with x > 0 is right of the right plane: fully outside.
        // Still, neither plane alone has all corners behind it.
        let outside = Aabb::new(Vec3::new(-0.3, -0.5, -143.0), Vec3::new(2.0, 0.5, -142.0));
        assert!(outside.max.z < -100.0 * std::f32::consts::SQRT_2);
        assert!(f.intersects_box(&outside));
    }

    #[test]
    fn conventions_agree() {
        let a = test_frustum(DepthConvention::Reversed);
        let b = test_frustum(DepthConvention::Standard);
        for (pa, pb) in a.planes().iter().zip(b.planes().iter()) {
            assert!((pa.normal() - pb.normal()).length() < 1e-3, "{pa:?} vs {pb:?}");
            assert!((pa.0.w - pb.0.w).abs() <= 1e-3 * (1.0 + pa.0.w.abs()));
        }
    }
}
