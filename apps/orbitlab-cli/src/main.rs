use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use orbitlab_render::{DebugTextRenderer, FrameRenderer, RendererConfig};
use orbitlab_render_wgpu::Renderer;
use orbitlab_scene::{OrbitCamera, Scene};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orbitlab-cli", about = "CLI tool for orbitlab")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON renderer config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective renderer config as JSON
    Config,
    /// Run the frame pipeline without a GPU and print each frame
    Frames {
        /// Number of frames to run
        #[arg(short, long, default_value = "3")]
        count: u64,
        /// Simulated milliseconds between frames
        #[arg(long, default_value = "16")]
        step_ms: u64,
        /// Azimuth change per frame, in radians
        #[arg(long, default_value = "0.0")]
        orbit: f32,
    },
    /// Sample every light at a point in time
    Lights {
        /// Milliseconds since the first frame
        #[arg(short, long, default_value = "0")]
        t_ms: u64,
    },
    /// Render frames on the GPU into an offscreen backbuffer
    Gpu {
        #[arg(short, long, default_value = "3")]
        frames: u64,
        #[arg(long, default_value = "640")]
        width: u32,
        #[arg(long, default_value = "360")]
        height: u32,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RendererConfig> {
    match path {
        Some(path) => RendererConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(RendererConfig::default()),
    }
}

/// Simulated clock for frame `frame`, pinned at `u64::MAX` instead of wrapping.
fn frame_time_ms(frame: u64, step_ms: u64) -> u64 {
    frame.saturating_mul(step_ms)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("orbitlab-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", orbitlab_render::crate_info());
            println!(
                "scene: {} instances, ring radius {}",
                config.scene.instance_count, config.scene.ring_radius
            );
            println!(
                "projection: fov_y={:.3} near={} far={} depth={:?}",
                config.projection.fov_y,
                config.projection.near,
                config.projection.far,
                config.projection.depth
            );
        }
        Commands::Config => {
            println!("{}", config.to_json()?);
        }
        Commands::Frames {
            count,
            step_ms,
            orbit,
        } => {
            let mut renderer = DebugTextRenderer::new(&config)?;
            let mut camera = OrbitCamera::default();
            for frame in 0..count {
                renderer.update_at(&camera, frame_time_ms(frame, step_ms))?;
                print!("{}", renderer.render()?);
                camera.orbit(orbit, 0.0, 0.0);
            }
            renderer.shutdown();
        }
        Commands::Lights { t_ms } => {
            let scene = Scene::from_config(&config.scene)?;
            let positions = scene.lights.positions_at(t_ms);
            let colors = scene.lights.colors_at(t_ms);
            println!("Lights at t={t_ms} ms: {}", scene.lights.count());
            for (i, (p, c)) in positions.iter().zip(&colors).enumerate() {
                println!(
                    "  [{i}] pos=({:.2}, {:.2}, {:.2}) color=({:.2}, {:.2}, {:.2})",
                    p.x, p.y, p.z, c.x, c.y, c.z
                );
            }
        }
        Commands::Gpu {
            frames,
            width,
            height,
        } => {
            tracing::info!(frames, width, height, "headless GPU run");
            let mut renderer = Renderer::headless(width, height, &config)?;
            if let Some(info) = renderer.adapter_info() {
                println!("adapter: {} ({})", info.name, info.backend.to_str());
            }
            let mut camera = OrbitCamera::default();
            for frame in 0..frames {
                renderer.update_at(&camera, frame_time_ms(frame, 16))?;
                let status = renderer.render()?;
                let stats = renderer.frame_state().stats();
                println!(
                    "frame {}: {:?}, visible {}/{}",
                    stats.frame, status, stats.visible, stats.total
                );
                camera.orbit(0.05, 0.0, 0.0);
            }
            let eye: Vec3 = camera.position();
            println!(
                "final eye=({:.2}, {:.2}, {:.2}), targets generation {:?}",
                eye.x,
                eye.y,
                eye.z,
                renderer.targets_generation()
            );
            renderer.shutdown();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_time_saturates() {
        assert_eq!(frame_time_ms(3, 16), 48);
        assert_eq!(frame_time_ms(0, u64::MAX), 0);
        assert_eq!(frame_time_ms(2, u64::MAX), u64::MAX);
    }

    #[test]
    fn frames_accepts_huge_step() {
        let cli = Cli::try_parse_from(["orbitlab-cli", "frames", "--count", "2", "--step-ms", "18446744073709551615"])
            .unwrap();
        match cli.command {
            Commands::Frames { count, step_ms, .. } => {
                assert_eq!(frame_time_ms(count - 1, step_ms), u64::MAX);
            }
            _ => panic!("expected the frames subcommand"),
        }
    }
}
