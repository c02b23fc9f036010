use crate::error::RenderError;
use orbitlab_assets::{CubemapData, TextureData};
use wgpu::util::DeviceExt;

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A sampled texture and the view shaders bind.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub texture: wgpu::Texture,
}

impl GpuTexture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &TextureData,
    ) -> Result<Self, RenderError> {
        check_extent(&device.limits(), label, image.width, image.height)?;
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width.max(1),
                    height: image.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: COLOR_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { view, texture })
    }

    /// Six-layer texture viewed as a cube.
    pub fn from_cubemap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        cubemap: &CubemapData,
    ) -> Result<Self, RenderError> {
        check_extent(&device.limits(), label, cubemap.size, cubemap.size)?;
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: cubemap.size.max(1),
                    height: cubemap.size.max(1),
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: COLOR_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            cubemap.as_bytes(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Ok(Self { view, texture })
    }
}

/// Reject images the device cannot hold before they reach wgpu.
fn check_extent(limits: &wgpu::Limits, label: &str, width: u32, height: u32) -> Result<(), RenderError> {
    let max = limits.max_texture_dimension_2d;
    if width > max || height > max {
        return Err(RenderError::TextureTooLarge {
            label: label.to_string(),
            width,
            height,
            max,
        });
    }
    Ok(())
}

pub fn linear_sampler(device: &wgpu::Device, label: &str, address: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

pub fn point_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Layout entry for a filterable float texture.
pub fn texture_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

pub fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_within_limits() {
        let limits = wgpu::Limits::downlevel_defaults();
        let max = limits.max_texture_dimension_2d;
        assert!(check_extent(&limits, "cube_texture", max, max).is_ok());
        assert!(check_extent(&limits, "cube_texture", 1, 1).is_ok());
    }

    #[test]
    fn oversized_extent_is_rejected() {
        let limits = wgpu::Limits::downlevel_defaults();
        let max = limits.max_texture_dimension_2d;
        let err = check_extent(&limits, "sky_cubemap", 1, max + 1).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TextureTooLarge { ref label, width: 1, height, max: m }
                if label == "sky_cubemap" && height == max + 1 && m == max
        ));
    }
}
