use crate::config::RendererConfig;
use crate::frame::FrameState;
use crate::lifecycle::{Lifecycle, LifecycleError};
use crate::passes::{FRAME_PASSES, Pass};
use orbitlab_scene::{OrbitCamera, SceneError};
use std::fmt::Write;

/// Index count of the cube mesh the opaque pass draws.
const CUBE_INDEX_COUNT: u32 = 36;

/// Backend-agnostic renderer interface. The frame loop drives any
/// implementation the same way: update, render, resize on demand, shutdown.
pub trait FrameRenderer {
    /// What a rendered frame produces.
    type Output;
    type Error: std::error::Error;

    /// Prepare the next frame for `camera` at wall-clock time `now_ms`.
    fn update_at(&mut self, camera: &OrbitCamera, now_ms: u64) -> Result<(), Self::Error>;

    /// Draw the frame prepared by the last update.
    fn render(&mut self) -> Result<Self::Output, Self::Error>;

    /// Returns `false` when the size did not change and nothing was rebuilt.
    fn resize(&mut self, width: u32, height: u32) -> Result<bool, Self::Error>;

    /// Release everything. Safe to call more than once.
    fn shutdown(&mut self);
}

/// Debug text renderer: runs the full frame pipeline without a GPU and
/// reports each frame as text.
///
/// Useful for CLI output, logging, and testing the pipeline on machines
/// without an adapter.
#[derive(Debug)]
pub struct DebugTextRenderer {
    state: FrameState,
    lifecycle: Lifecycle,
}

impl DebugTextRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, SceneError> {
        Ok(Self {
            state: FrameState::from_config(config)?,
            lifecycle: Lifecycle::ready(),
        })
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    fn report(&self) -> String {
        let state = &self.state;
        let stats = state.stats();
        let extent = state.extent();
        let eye = state.sky_view().camera_pos;
        let draw = state.opaque_draw(CUBE_INDEX_COUNT);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} (t={} ms, {}x{}) ===",
            stats.frame, stats.elapsed_ms, extent.width, extent.height
        );
        let _ = writeln!(out, "Camera: eye=({:.2}, {:.2}, {:.2})", eye.x, eye.y, eye.z);
        let _ = writeln!(
            out,
            "Visible: {}/{} {:?}",
            stats.visible,
            stats.total,
            state.visible().as_slice()
        );

        let constants = state.constants();
        let _ = writeln!(out, "Lights: {}", constants.light_count());
        for i in 0..constants.light_count() {
            let p = constants.light_positions[i];
            let c = constants.light_colors[i];
            let _ = writeln!(
                out,
                "  [{i}] pos=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2})",
                p[0], p[1], p[2], c[0], c[1], c[2]
            );
        }

        let passes: Vec<String> = FRAME_PASSES
            .iter()
            .map(|pass| match pass {
                Pass::Opaque => format!(
                    "{pass}({} idx x {} inst)",
                    draw.index_count, draw.instance_count
                ),
                _ => pass.to_string(),
            })
            .collect();
        let _ = writeln!(out, "Passes: {}", passes.join(" -> "));
        out
    }
}

impl FrameRenderer for DebugTextRenderer {
    type Output = String;
    type Error = LifecycleError;

    fn update_at(&mut self, camera: &OrbitCamera, now_ms: u64) -> Result<(), LifecycleError> {
        self.lifecycle.begin_update()?;
        self.state.update(camera, now_ms);
        Ok(())
    }

    fn render(&mut self) -> Result<String, LifecycleError> {
        self.lifecycle.begin_render()?;
        Ok(self.report())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<bool, LifecycleError> {
        self.lifecycle.begin_resize()?;
        Ok(self.state.resize(width, height))
    }

    fn shutdown(&mut self) {
        self.lifecycle.shutdown();
    }
}
