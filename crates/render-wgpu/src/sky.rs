use crate::context::GpuContext;
use crate::error::RenderError;
use crate::mesh::{self, GpuMesh, Vertex};
use crate::shaders;
use crate::targets::depth_stencil;
use crate::texture::{self, COLOR_FORMAT, GpuTexture};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use orbitlab_assets::CubemapData;
use orbitlab_common::Extent;
use orbitlab_render::{Pass, SkyView, sky_radius};
use orbitlab_scene::Projection;
use tracing::debug;
use wgpu::util::DeviceExt;

const SPHERE_STACKS: u16 = 16;
const SPHERE_SLICES: u16 = 32;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SkyUniforms {
    view_proj: [[f32; 4]; 4],
    world: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    params: [f32; 4],
}

/// Cubemap-textured sphere that follows the eye and is pinned to the far
/// plane, so opaque geometry always wins the depth test against it.
pub struct Sky {
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    mesh: GpuMesh,
    uniform_buffer: wgpu::Buffer,
    projection: Projection,
    radius: f32,
}

impl Sky {
    pub fn new(
        context: &GpuContext,
        cubemap: &CubemapData,
        projection: Projection,
        extent: Extent,
    ) -> Result<Self, RenderError> {
        let device = &context.device;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_uniforms"),
            contents: bytemuck::bytes_of(&SkyUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let cubemap_texture = GpuTexture::from_cubemap(device, &context.queue, "sky_cubemap", cubemap)?;
        let sampler = texture::linear_sampler(device, "sky_sampler", wgpu::AddressMode::ClampToEdge);
        let mesh = GpuMesh::upload(device, "sky_sphere", &mesh::uv_sphere(SPHERE_STACKS, SPHERE_SLICES));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky_bind_group_layout"),
            entries: &[
                texture::uniform_entry(0, wgpu::ShaderStages::VERTEX),
                texture::texture_entry(1, wgpu::TextureViewDimension::Cube),
                texture::sampler_entry(2),
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&cubemap_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let depth = projection.depth;
        let pipeline = context.validated("sky_pipeline", |device| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("sky_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::SKY_SHADER.into()),
            });
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("sky_pipeline_layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("sky_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_sky"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::position_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_sky"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                // Seen from inside; no culling so winding does not matter.
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_stencil(Pass::Sky, depth),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        })?;

        Ok(Self {
            bind_group,
            pipeline,
            mesh,
            uniform_buffer,
            projection,
            radius: sky_radius(&projection, extent),
        })
    }

    /// Recompute the sphere radius for a new surface shape.
    pub fn resize(&mut self, extent: Extent) {
        self.radius = sky_radius(&self.projection, extent);
        debug!(radius = self.radius, "sky radius updated");
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn update(&self, queue: &wgpu::Queue, view: &SkyView) {
        let uniforms = sky_uniforms(view, self.radius, self.projection.depth.far_depth());
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        self.mesh.bind(pass);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

fn sky_uniforms(view: &SkyView, radius: f32, far_depth: f32) -> SkyUniforms {
    let camera: Vec3 = view.camera_pos;
    SkyUniforms {
        view_proj: view.view_projection().to_cols_array_2d(),
        world: view.world(radius).to_cols_array_2d(),
        camera_pos: camera.extend(1.0).to_array(),
        params: [far_depth, 0.0, 0.0, 0.0],
    }
}
