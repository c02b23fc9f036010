use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use orbitlab_common::Extent;
use orbitlab_scene::{Instance, MAX_LIGHTS, Projection};

/// Per-frame scene uniform block, laid out to match the WGSL `SceneConstants`
/// struct. This host copy is the source of truth; it is uploaded whole on
/// every update.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneConstants {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// `x` holds the number of active lights; `yzw` are padding.
    pub light_count: [u32; 4],
    pub light_positions: [[f32; 4]; MAX_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_LIGHTS],
    pub ambient: [f32; 4],
}

impl Default for SceneConstants {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl SceneConstants {
    /// Fill from sampled light data. Entries past `MAX_LIGHTS` are ignored and
    /// unused slots stay zero.
    pub fn new(
        view_proj: Mat4,
        camera_pos: Vec3,
        positions: &[Vec4],
        colors: &[Vec4],
        ambient: Vec4,
    ) -> Self {
        let mut constants = Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
            ambient: ambient.to_array(),
            ..Self::default()
        };
        let count = positions.len().min(colors.len()).min(MAX_LIGHTS);
        constants.light_count[0] = count as u32;
        for i in 0..count {
            constants.light_positions[i] = positions[i].to_array();
            constants.light_colors[i] = colors[i].to_array();
        }
        constants
    }

    pub fn light_count(&self) -> usize {
        self.light_count[0] as usize
    }

    pub fn view_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }
}

/// One entry of the GPU instance table.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    pub world: [[f32; 4]; 4],
    /// `x` shine, `y` parity, `zw` unused.
    pub params: [f32; 4],
}

impl From<&Instance> for InstanceRecord {
    fn from(inst: &Instance) -> Self {
        Self {
            world: inst.world.to_cols_array_2d(),
            params: [inst.shine, inst.parity as f32, 0.0, 0.0],
        }
    }
}

/// What the sky pass needs from the frame: the camera it must stay centered on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyView {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_pos: Vec3,
}

impl Default for SkyView {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_pos: Vec3::ZERO,
        }
    }
}

impl SkyView {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Sky sphere transform: scaled to `radius`, centered on the eye.
    pub fn world(&self, radius: f32) -> Mat4 {
        Mat4::from_translation(self.camera_pos) * Mat4::from_scale(Vec3::splat(radius))
    }
}

/// Radius of a sky sphere that comfortably encloses the near region of the
/// view frustum for the given surface shape.
pub fn sky_radius(projection: &Projection, extent: Extent) -> f32 {
    let extent = extent.at_least_one();
    let n = projection.near;
    let half_w = (projection.fov_y * 0.5).tan() * n;
    let half_h = half_w * extent.height as f32 / extent.width as f32;
    (n * n + half_w * half_w + half_h * half_h).sqrt() * 22.2
}
