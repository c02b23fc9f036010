use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// One frame's worth of orbit input: azimuth, polar and radial deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraDelta {
    pub d_phi: f32,
    pub d_theta: f32,
    pub d_r: f32,
}

impl CameraDelta {
    pub fn new(d_phi: f32, d_theta: f32, d_r: f32) -> Self {
        Self { d_phi, d_theta, d_r }
    }

    pub fn is_zero(&self) -> bool {
        self.d_phi == 0.0 && self.d_theta == 0.0 && self.d_r == 0.0
    }
}

/// Orbit camera on a sphere around a focus point.
///
/// The camera stores only its spherical parameters. View matrix and eye
/// position are both derived from them on request, so they always agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    focus: Vec3,
    phi: f32,
    theta: f32,
    r: f32,
}

pub const MIN_RADIUS: f32 = 1.0;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, -PI, FRAC_PI_4, 3.0)
    }
}

impl OrbitCamera {
    /// Out-of-range `theta` and `r` are clamped the same way `orbit` clamps them.
    pub fn new(focus: Vec3, phi: f32, theta: f32, r: f32) -> Self {
        Self {
            focus,
            phi,
            theta: theta.clamp(-FRAC_PI_2, FRAC_PI_2),
            r: r.max(MIN_RADIUS),
        }
    }

    /// Apply an incremental orbit: `phi -= d_phi`, `theta += d_theta`, `r += d_r`.
    pub fn orbit(&mut self, d_phi: f32, d_theta: f32, d_r: f32) {
        self.phi -= d_phi;
        self.theta = (self.theta + d_theta).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.r = (self.r + d_r).max(MIN_RADIUS);
    }

    pub fn apply(&mut self, delta: CameraDelta) {
        self.orbit(delta.d_phi, delta.d_theta, delta.d_r);
    }

    pub fn view_matrix(&self) -> Mat4 {
        derive_view_matrix(self.focus, self.phi, self.theta, self.r)
    }

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        eye_position(self.focus, self.phi, self.theta, self.r)
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn radius(&self) -> f32 {
        self.r
    }
}

fn spherical(phi: f32, theta: f32) -> Vec3 {
    Vec3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
}

pub fn eye_position(focus: Vec3, phi: f32, theta: f32, r: f32) -> Vec3 {
    focus + spherical(phi, theta) * r
}

/// Right-handed look-at from the orbit parameters.
///
/// Up is the spherical direction a quarter turn above the eye direction, which
/// stays well defined at the poles where world Y would be parallel to the view.
pub fn derive_view_matrix(focus: Vec3, phi: f32, theta: f32, r: f32) -> Mat4 {
    let eye = eye_position(focus, phi, theta, r);
    let up = spherical(phi, theta + FRAC_PI_2);
    Mat4::look_at_rh(eye, focus, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_camera_position() {
        let cam = OrbitCamera::default();
        let h = 3.0 * FRAC_PI_4.cos();
        assert!(approx(cam.position(), Vec3::new(-h, 3.0 * FRAC_PI_4.sin(), 0.0)));
    }

    #[test]
    fn zero_move_keeps_view() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 0.3, -0.7, 5.0);
        let before = cam.view_matrix();
        cam.orbit(0.0, 0.0, 0.0);
        assert_eq!(cam.view_matrix(), before);
    }

    #[test]
    fn theta_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 100.0, 0.0);
        assert_eq!(cam.theta(), FRAC_PI_2);
        cam.orbit(0.0, -1000.0, 0.0);
        assert_eq!(cam.theta(), -FRAC_PI_2);
        for _ in 0..50 {
            cam.orbit(0.0, 0.3, 0.0);
            assert!(cam.theta() <= FRAC_PI_2 && cam.theta() >= -FRAC_PI_2);
        }
    }

    #[test]
    fn radius_has_floor() {
        let mut cam = OrbitCamera::default();
        assert_eq!(cam.radius(), 3.0);
        cam.orbit(0.0, 0.0, -10.0);
        assert_eq!(cam.radius(), 1.0);
        cam.orbit(0.0, 0.0, 0.5);
        assert_eq!(cam.radius(), 1.5);
    }

    #[test]
    fn phi_subtracts() {
        let mut cam = OrbitCamera::new(Vec3::ZERO, 1.0, 0.0, 2.0);
        cam.apply(CameraDelta::new(0.25, 0.0, 0.0));
        assert_eq!(cam.phi(), 0.75);
    }

    #[test]
    fn view_maps_focus_in_front_of_eye() {
        let cam = OrbitCamera::default();
        let focus_view = cam.view_matrix().transform_point3(cam.focus());
        // Right-handed view space looks down -Z.
        assert!(focus_view.z < 0.0);
        assert!((focus_view.z + cam.radius()).abs() < 1e-5);
        assert!(focus_view.x.abs() < 1e-5 && focus_view.y.abs() < 1e-5);
    }

    #[test]
    fn view_and_position_agree() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.4, -0.2, 1.5);
        let eye_view = cam.view_matrix().transform_point3(cam.position());
        assert!(approx(eye_view, Vec3::ZERO));
    }

    #[test]
    fn pole_view_is_finite() {
        let cam = OrbitCamera::new(Vec3::ZERO, 0.0, FRAC_PI_2, 4.0);
        let view = cam.view_matrix();
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
