use crate::context::GpuContext;
use crate::error::RenderError;
use crate::mesh::{self, GpuMesh, Vertex};
use crate::shaders;
use crate::targets::depth_stencil;
use crate::texture::{self, COLOR_FORMAT, GpuTexture};
use orbitlab_assets::TextureData;
use orbitlab_render::{FrameState, InstanceRecord, InstancedDraw, Pass, SceneConstants};
use orbitlab_scene::{DepthConvention, MAX_INSTANCES};
use wgpu::util::DeviceExt;

/// The instanced cube ring: scene constants, the full instance table and the
/// per-frame visible-index list, drawn with one indexed-instanced call.
pub struct OpaquePass {
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    mesh: GpuMesh,
    visible_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    scene_buffer: wgpu::Buffer,
}

impl OpaquePass {
    pub fn new(
        context: &GpuContext,
        image: &TextureData,
        depth: DepthConvention,
    ) -> Result<Self, RenderError> {
        let device = &context.device;

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_constants"),
            contents: bytemuck::bytes_of(&SceneConstants::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_table"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceRecord>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let visible_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("visible_indices"),
            size: (MAX_INSTANCES * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let cube_texture = GpuTexture::from_image(device, &context.queue, "cube_texture", image)?;
        let sampler = texture::linear_sampler(device, "cube_sampler", wgpu::AddressMode::Repeat);
        let mesh = GpuMesh::upload(device, "cube", &mesh::cube());

        let storage = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("opaque_bind_group_layout"),
            entries: &[
                texture::uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ),
                storage(1),
                storage(2),
                texture::texture_entry(3, wgpu::TextureViewDimension::D2),
                texture::sampler_entry(4),
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("opaque_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: instance_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: visible_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&cube_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline = context.validated("opaque_pipeline", |device| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("opaque_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::OPAQUE_SHADER.into()),
            });
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("opaque_pipeline_layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("opaque_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: depth_stencil(Pass::Opaque, depth),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        })?;

        Ok(Self {
            bind_group,
            pipeline,
            mesh,
            visible_buffer,
            instance_buffer,
            scene_buffer,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.index_count
    }

    /// Push this frame's visible list, the instance table and the scene
    /// constants to the device.
    pub fn upload(&self, queue: &wgpu::Queue, state: &FrameState) {
        let visible = state.visible().as_slice();
        if !visible.is_empty() {
            queue.write_buffer(&self.visible_buffer, 0, bytemuck::cast_slice(visible));
        }
        let records = state.instance_records();
        if !records.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(records));
        }
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(state.constants()));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, draw: InstancedDraw) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        self.mesh.bind(pass);
        pass.draw_indexed(draw.indices(), 0, draw.instances());
    }
}
