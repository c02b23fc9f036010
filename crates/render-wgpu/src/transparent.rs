use crate::context::GpuContext;
use crate::error::RenderError;
use crate::mesh::{self, GpuMesh, Vertex};
use crate::shaders;
use crate::targets::depth_stencil;
use crate::texture::{self, COLOR_FORMAT};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use orbitlab_render::Pass;
use orbitlab_scene::DepthConvention;
use wgpu::util::DeviceExt;

pub const QUAD_COUNT: usize = 2;

/// One blended quad: where it sits and its straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadSpec {
    pub world: Mat4,
    pub color: Vec4,
}

/// The two fixed quads, farthest first so they blend back to front from the
/// default viewpoint.
pub fn default_quads() -> [QuadSpec; QUAD_COUNT] {
    [
        QuadSpec {
            world: Mat4::from_translation(Vec3::new(0.4, 0.0, 0.0)),
            color: Vec4::new(0.2, 0.5, 1.0, 0.5),
        },
        QuadSpec {
            world: Mat4::IDENTITY,
            color: Vec4::new(1.0, 0.35, 0.2, 0.5),
        },
    ]
}

/// Color blends source-over; destination alpha is kept as written by the
/// opaque pass and only RGB is written.
pub fn blend_state() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Zero,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadUniform {
    world: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransparentUniforms {
    view_proj: [[f32; 4]; 4],
    quads: [QuadUniform; QUAD_COUNT],
}

fn transparent_uniforms(view_proj: Mat4, quads: &[QuadSpec; QUAD_COUNT]) -> TransparentUniforms {
    TransparentUniforms {
        view_proj: view_proj.to_cols_array_2d(),
        quads: quads.map(|q| QuadUniform {
            world: q.world.to_cols_array_2d(),
            color: q.color.to_array(),
        }),
    }
}

/// Alpha-blended quads drawn after the opaque ring and the sky, one draw per
/// quad in list order.
pub struct Transparent {
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    mesh: GpuMesh,
    uniform_buffer: wgpu::Buffer,
    quads: [QuadSpec; QUAD_COUNT],
}

impl Transparent {
    pub fn new(context: &GpuContext, depth: DepthConvention) -> Result<Self, RenderError> {
        let device = &context.device;
        let quads = default_quads();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("transparent_uniforms"),
            contents: bytemuck::bytes_of(&transparent_uniforms(Mat4::IDENTITY, &quads)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let mesh = GpuMesh::upload(device, "quad", &mesh::quad());

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transparent_bind_group_layout"),
            entries: &[texture::uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("transparent_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline = context.validated("transparent_pipeline", |device| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("transparent_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::TRANSPARENT_SHADER.into()),
            });
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("transparent_pipeline_layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("transparent_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_quad"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::position_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_quad"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(blend_state()),
                        write_mask: wgpu::ColorWrites::COLOR,
                    })],
                }),
                // Both faces visible.
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_stencil(Pass::Transparent, depth),
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
            quads,
        })
    }

    pub fn quads(&self) -> &[QuadSpec; QUAD_COUNT] {
        &self.quads
    }

    pub fn update(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        let uniforms = transparent_uniforms(view_proj, &self.quads);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        self.mesh.bind(pass);
        for quad in 0..QUAD_COUNT as u32 {
            pass.draw_indexed(0..self.mesh.index_count, 0, quad..quad + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_size() {
        assert_eq!(std::mem::size_of::<TransparentUniforms>(), 64 + 2 * 80);
    }

    #[test]
    fn quads_are_half_transparent_and_back_to_front() {
        let quads = default_quads();
        assert!(quads.iter().all(|q| q.color.w == 0.5));
        // Default eye sits on -X looking at the origin.
        let eye = Vec3::new(-3.0, 0.0, 0.0);
        let center = |q: &QuadSpec| q.world.transform_point3(Vec3::new(0.6, 0.0, 0.0));
        assert!(center(&quads[0]).distance(eye) > center(&quads[1]).distance(eye));
    }

    #[test]
    fn blending_keeps_destination_alpha() {
        let blend = blend_state();
        assert_eq!(blend.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(blend.alpha.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }
}
