use crate::texture::COLOR_FORMAT;
use orbitlab_common::Extent;
use orbitlab_render::{CompareOp, Pass};
use orbitlab_scene::DepthConvention;
use tracing::debug;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn compare_function(op: CompareOp) -> wgpu::CompareFunction {
    match op {
        CompareOp::Less => wgpu::CompareFunction::Less,
        CompareOp::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareOp::Greater => wgpu::CompareFunction::Greater,
        CompareOp::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
    }
}

/// Pipeline depth state for `pass`, `None` for passes without depth.
pub fn depth_stencil(pass: Pass, convention: DepthConvention) -> Option<wgpu::DepthStencilState> {
    pass.depth_state(convention).map(|state| wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: state.write,
        depth_compare: compare_function(state.compare),
        stencil: Default::default(),
        bias: Default::default(),
    })
}

/// Size-dependent offscreen attachments: the color target the scene passes
/// draw into, which post-processing then samples, plus its depth buffer.
///
/// Rebuilding replaces every view at once; the old textures drop with them.
pub struct RenderTargets {
    // Views before textures: dropped in reverse of creation.
    pub depth_view: wgpu::TextureView,
    pub color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    color: wgpu::Texture,
    extent: Extent,
    generation: u64,
}

impl RenderTargets {
    pub fn new(device: &wgpu::Device, extent: Extent) -> Self {
        let extent = extent.at_least_one();
        let (color, color_view) = create_color(device, extent);
        let (depth, depth_view) = create_depth(device, extent);
        Self {
            depth_view,
            color_view,
            depth,
            color,
            extent,
            generation: 0,
        }
    }

    /// Recreate every target at `extent`. Returns `false` and keeps the
    /// current resources when the size is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, extent: Extent) -> bool {
        let extent = extent.at_least_one();
        if extent == self.extent {
            return false;
        }
        let (color, color_view) = create_color(device, extent);
        let (depth, depth_view) = create_depth(device, extent);
        self.color_view = color_view;
        self.color = color;
        self.depth_view = depth_view;
        self.depth = depth;
        self.extent = extent;
        self.generation += 1;
        debug!(
            width = extent.width,
            height = extent.height,
            generation = self.generation,
            "render targets rebuilt"
        );
        true
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Bumped every time the targets are reallocated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color
    }

    pub fn depth_texture(&self) -> &wgpu::Texture {
        &self.depth
    }
}

fn extent3d(extent: Extent) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: extent.width,
        height: extent.height,
        depth_or_array_layers: 1,
    }
}

fn create_color(device: &wgpu::Device, extent: Extent) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen_color"),
        size: extent3d(extent),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&Default::default());
    (texture, view)
}

fn create_depth(device: &wgpu::Device, extent: Extent) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: extent3d(extent),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&Default::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_depth_pipeline_states() {
        let conv = DepthConvention::Reversed;
        let opaque = depth_stencil(Pass::Opaque, conv).unwrap();
        assert_eq!(opaque.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert!(opaque.depth_write_enabled);

        let sky = depth_stencil(Pass::Sky, conv).unwrap();
        assert_eq!(sky.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert!(!sky.depth_write_enabled);

        let transparent = depth_stencil(Pass::Transparent, conv).unwrap();
        assert_eq!(transparent.depth_compare, wgpu::CompareFunction::Greater);
        assert!(!transparent.depth_write_enabled);

        assert!(depth_stencil(Pass::PostProcess, conv).is_none());
    }
}
