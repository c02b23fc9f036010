use crate::config::RendererConfig;
use crate::constants::{InstanceRecord, SceneConstants, SkyView};
use glam::Mat4;
use orbitlab_common::Extent;
use orbitlab_scene::{Frustum, OrbitCamera, Projection, Scene, SceneError, VisibleSet};
use std::ops::Range;
use tracing::debug;

/// Milliseconds elapsed since the first sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    start_ms: Option<u64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first call fixes the epoch and returns 0. Timestamps earlier than
    /// the epoch also read as 0.
    pub fn elapsed(&mut self, now_ms: u64) -> u64 {
        let start = *self.start_ms.get_or_insert(now_ms);
        now_ms.saturating_sub(start)
    }

    pub fn started(&self) -> bool {
        self.start_ms.is_some()
    }
}

/// Arguments of the single opaque indexed-instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstancedDraw {
    pub index_count: u32,
    pub instance_count: u32,
}

impl InstancedDraw {
    pub fn indices(&self) -> Range<u32> {
        0..self.index_count
    }

    /// `0..visible`; empty when nothing survived culling.
    pub fn instances(&self) -> Range<u32> {
        0..self.instance_count
    }
}

/// Summary of one update, for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub elapsed_ms: u64,
    pub visible: usize,
    pub total: usize,
}

/// Host-side state of the frame pipeline.
///
/// `update` recomputes everything derived from the camera and time; the GPU
/// backend only uploads what this produces.
#[derive(Debug, Clone)]
pub struct FrameState {
    scene: Scene,
    records: Vec<InstanceRecord>,
    projection: Projection,
    extent: Extent,
    clock: FrameClock,
    frame: u64,
    elapsed_ms: u64,
    view: Mat4,
    proj: Mat4,
    frustum: Option<Frustum>,
    visible: VisibleSet,
    constants: SceneConstants,
    sky: SkyView,
}

impl FrameState {
    pub fn new(scene: Scene, projection: Projection, extent: Extent) -> Self {
        let records = scene.instances.instances().iter().map(InstanceRecord::from).collect();
        Self {
            scene,
            records,
            projection,
            extent: extent.at_least_one(),
            clock: FrameClock::new(),
            frame: 0,
            elapsed_ms: 0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            frustum: None,
            visible: VisibleSet::default(),
            constants: SceneConstants::default(),
            sky: SkyView::default(),
        }
    }

    pub fn from_config(config: &RendererConfig) -> Result<Self, SceneError> {
        let scene = Scene::from_config(&config.scene)?;
        Ok(Self::new(scene, config.projection, config.size))
    }

    /// Recompute view, projection, frustum, visible list, scene constants and
    /// sky view for `camera` at wall-clock time `now_ms`.
    pub fn update(&mut self, camera: &OrbitCamera, now_ms: u64) -> FrameStats {
        self.elapsed_ms = self.clock.elapsed(now_ms);
        self.frame += 1;

        self.view = camera.view_matrix();
        self.proj = self.projection.matrix(self.extent.aspect());
        let frustum = Frustum::from_view_projection(&self.view, &self.proj, self.projection.depth);
        self.visible = self.scene.instances.cull(&frustum);
        self.frustum = Some(frustum);

        let eye = camera.position();
        let lights = &self.scene.lights;
        self.constants = SceneConstants::new(
            self.proj * self.view,
            eye,
            &lights.positions_at(self.elapsed_ms),
            &lights.colors_at(self.elapsed_ms),
            self.scene.ambient,
        );
        self.sky = SkyView {
            view: self.view,
            projection: self.proj,
            camera_pos: eye,
        };

        let stats = self.stats();
        debug!(
            frame = stats.frame,
            elapsed_ms = stats.elapsed_ms,
            visible = stats.visible,
            total = stats.total,
            "frame updated"
        );
        stats
    }

    /// Adopt a new surface size. Returns `false` when nothing changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let extent = Extent::new(width, height).at_least_one();
        if extent == self.extent {
            return false;
        }
        self.extent = extent;
        true
    }

    pub fn opaque_draw(&self, index_count: u32) -> InstancedDraw {
        InstancedDraw {
            index_count,
            instance_count: self.visible.len() as u32,
        }
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frame: self.frame,
            elapsed_ms: self.elapsed_ms,
            visible: self.visible.len(),
            total: self.records.len(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// Full instance table, in ring order.
    pub fn instance_records(&self) -> &[InstanceRecord] {
        &self.records
    }

    pub fn constants(&self) -> &SceneConstants {
        &self.constants
    }

    pub fn sky_view(&self) -> &SkyView {
        &self.sky
    }

    /// Frustum of the last update, `None` before the first one.
    pub fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.proj * self.view
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn frame_index(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use orbitlab_scene::{DepthConvention, SceneConfig};
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI};

    fn default_state() -> FrameState {
        FrameState::from_config(&RendererConfig::default()).unwrap()
    }

    #[test]
    fn clock_starts_at_first_sample() {
        let mut clock = FrameClock::new();
        assert!(!clock.started());
        assert_eq!(clock.elapsed(5_000), 0);
        assert_eq!(clock.elapsed(5_016), 16);
        assert_eq!(clock.elapsed(4_000), 0);
    }

    #[test]
    fn end_to_end_view_projection_is_deterministic() {
        let mut state = default_state();
        let camera = OrbitCamera::new(Vec3::ZERO, -PI, FRAC_PI_4, 3.0);
        let stats = state.update(&camera, 0);
        assert_eq!(stats.elapsed_ms, 0);
        assert_eq!(stats.frame, 1);

        // Eye from the spherical formula, up a quarter turn above it.
        let phi = -PI;
        let eye = Vec3::new(FRAC_PI_4.cos() * phi.cos(), FRAC_PI_4.sin(), FRAC_PI_4.cos() * phi.sin()) * 3.0;
        let up_theta = FRAC_PI_4 + FRAC_PI_2;
        let up = Vec3::new(up_theta.cos() * phi.cos(), up_theta.sin(), up_theta.cos() * phi.sin());
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
        let proj = Mat4::perspective_rh(FRAC_PI_3, 1280.0 / 720.0, 100.0, 0.1);
        let expected = proj * view;

        let got = state.view_projection();
        assert!(got.abs_diff_eq(expected, 1e-5), "{got:?} vs {expected:?}");
        assert_eq!(state.constants().view_projection(), got);

        // A second state fed the same inputs agrees exactly.
        let mut again = default_state();
        again.update(&camera, 0);
        assert_eq!(again.constants(), state.constants());
    }

    #[test]
    fn constants_carry_camera_and_lights() {
        let mut state = default_state();
        let camera = OrbitCamera::default();
        state.update(&camera, 1_000);
        state.update(&camera, 1_250);
        assert_eq!(state.elapsed_ms(), 250);

        let c = state.constants();
        assert_eq!(c.camera_pos, camera.position().extend(1.0).to_array());
        let lights = &state.scene().lights;
        assert_eq!(c.light_count(), lights.count());
        assert_eq!(c.light_positions[0], lights.positions_at(250)[0].to_array());
        assert_eq!(c.ambient, SceneConfig::default().ambient.to_array());
        assert_eq!(state.sky_view().camera_pos, camera.position());
    }

    #[test]
    fn visible_list_is_rebuilt_each_update() {
        let mut state = default_state();
        let mut camera = OrbitCamera::default();
        state.update(&camera, 0);
        let first = state.visible().clone();
        assert!(!first.is_empty());

        // Look straight up from far above the ring.
        camera = OrbitCamera::new(Vec3::new(0.0, 300.0, 0.0), 0.0, -FRAC_PI_2, 60.0);
        state.update(&camera, 16);
        assert!(state.visible().is_empty());

        state.update(&OrbitCamera::default(), 32);
        assert_eq!(state.visible(), &first);
    }

    #[test]
    fn zero_visible_means_zero_instances() {
        let mut state = default_state();
        let camera = OrbitCamera::new(Vec3::new(0.0, 300.0, 0.0), 0.0, -FRAC_PI_2, 60.0);
        state.update(&camera, 0);
        let draw = state.opaque_draw(36);
        assert_eq!(draw.instance_count, 0);
        assert!(draw.instances().is_empty());
        assert_eq!(draw.indices(), 0..36);
    }

    #[test]
    fn draw_count_matches_visible() {
        let mut state = default_state();
        state.update(&OrbitCamera::default(), 0);
        let draw = state.opaque_draw(36);
        assert_eq!(draw.instance_count as usize, state.visible().len());
        assert!(state.visible().len() <= state.instance_records().len());
    }

    #[test]
    fn resize_is_idempotent() {
        let mut state = default_state();
        assert!(!state.resize(1280, 720));
        assert!(state.resize(800, 600));
        assert!(!state.resize(800, 600));
        assert_eq!(state.extent(), Extent::new(800, 600));
        // Minimized windows clamp to one pixel.
        assert!(state.resize(0, 0));
        assert!(!state.resize(1, 1));
    }

    #[test]
    fn resize_changes_projection_aspect() {
        let mut state = default_state();
        let camera = OrbitCamera::default();
        state.update(&camera, 0);
        let wide = state.view_projection();
        state.resize(720, 720);
        state.update(&camera, 16);
        assert_ne!(state.view_projection(), wide);
    }

    #[test]
    fn standard_depth_culls_like_reversed() {
        let mut config = RendererConfig::default();
        let mut reversed = FrameState::from_config(&config).unwrap();
        config.projection.depth = DepthConvention::Standard;
        let mut standard = FrameState::from_config(&config).unwrap();
        let camera = OrbitCamera::new(Vec3::ZERO, 0.7, 0.2, 4.0);
        reversed.update(&camera, 0);
        standard.update(&camera, 0);
        assert_eq!(reversed.visible(), standard.visible());
    }

    #[test]
    fn ambient_comes_from_config() {
        let mut config = RendererConfig::default();
        config.scene.ambient = Vec4::new(0.5, 0.4, 0.3, 1.0);
        let mut state = FrameState::from_config(&config).unwrap();
        state.update(&OrbitCamera::default(), 0);
        assert_eq!(state.constants().ambient, [0.5, 0.4, 0.3, 1.0]);
    }
}
