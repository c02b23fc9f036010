use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x3,
    ];
    const POSITION_ONLY: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Same stride, only `@location(0)` bound.
    pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::POSITION_ONLY,
        }
    }
}

fn v(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Vertex {
    Vertex {
        position,
        uv,
        normal,
    }
}

/// CPU-side indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Unit cube centered on the origin, counter-clockwise faces seen from outside.
pub fn cube() -> MeshData {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        v([-p, -p,  p], [0.0, 1.0], [0.0, 0.0, 1.0]),
        v([ p, -p,  p], [1.0, 1.0], [0.0, 0.0, 1.0]),
        v([ p,  p,  p], [1.0, 0.0], [0.0, 0.0, 1.0]),
        v([-p,  p,  p], [0.0, 0.0], [0.0, 0.0, 1.0]),
        // -Z face
        v([ p, -p, -p], [0.0, 1.0], [0.0, 0.0, -1.0]),
        v([-p, -p, -p], [1.0, 1.0], [0.0, 0.0, -1.0]),
        v([-p,  p, -p], [1.0, 0.0], [0.0, 0.0, -1.0]),
        v([ p,  p, -p], [0.0, 0.0], [0.0, 0.0, -1.0]),
        // +X face
        v([ p, -p,  p], [0.0, 1.0], [1.0, 0.0, 0.0]),
        v([ p, -p, -p], [1.0, 1.0], [1.0, 0.0, 0.0]),
        v([ p,  p, -p], [1.0, 0.0], [1.0, 0.0, 0.0]),
        v([ p,  p,  p], [0.0, 0.0], [1.0, 0.0, 0.0]),
        // -X face
        v([-p, -p, -p], [0.0, 1.0], [-1.0, 0.0, 0.0]),
        v([-p, -p,  p], [1.0, 1.0], [-1.0, 0.0, 0.0]),
        v([-p,  p,  p], [1.0, 0.0], [-1.0, 0.0, 0.0]),
        v([-p,  p, -p], [0.0, 0.0], [-1.0, 0.0, 0.0]),
        // +Y face
        v([-p,  p,  p], [0.0, 1.0], [0.0, 1.0, 0.0]),
        v([ p,  p,  p], [1.0, 1.0], [0.0, 1.0, 0.0]),
        v([ p,  p, -p], [1.0, 0.0], [0.0, 1.0, 0.0]),
        v([-p,  p, -p], [0.0, 0.0], [0.0, 1.0, 0.0]),
        // -Y face
        v([-p, -p, -p], [0.0, 1.0], [0.0, -1.0, 0.0]),
        v([ p, -p, -p], [1.0, 1.0], [0.0, -1.0, 0.0]),
        v([ p, -p,  p], [1.0, 0.0], [0.0, -1.0, 0.0]),
        v([-p, -p,  p], [0.0, 0.0], [0.0, -1.0, 0.0]),
    ];
    let indices = (0..6u16)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();
    MeshData { vertices, indices }
}

/// Unit UV sphere with `stacks` latitude bands and `slices` longitude bands.
pub fn uv_sphere(stacks: u16, slices: u16) -> MeshData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut vertices = Vec::with_capacity((stacks as usize + 1) * (slices as usize + 1));
    for i in 0..=stacks {
        let t = i as f32 / stacks as f32;
        let polar = t * PI;
        for j in 0..=slices {
            let s = j as f32 / slices as f32;
            let azimuth = s * TAU;
            let n = [
                polar.sin() * azimuth.cos(),
                polar.cos(),
                polar.sin() * azimuth.sin(),
            ];
            vertices.push(v(n, [s, t], n));
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity(stacks as usize * slices as usize * 6);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    MeshData { vertices, indices }
}

/// 2x2 quad on the `x = 0.6` plane.
pub fn quad() -> MeshData {
    let n = [-1.0, 0.0, 0.0];
    let vertices = vec![
        v([0.6, -1.0, -1.0], [0.0, 1.0], n),
        v([0.6, 1.0, -1.0], [0.0, 0.0], n),
        v([0.6, 1.0, 1.0], [1.0, 0.0], n),
        v([0.6, -1.0, 1.0], [1.0, 1.0], n),
    ];
    MeshData {
        vertices,
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// Mesh uploaded to immutable GPU buffers.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn face_normal(mesh: &MeshData, tri: &[u16]) -> Vec3 {
        let p = |i: u16| Vec3::from(mesh.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn cube_is_closed_and_outward() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for tri in mesh.indices.chunks(3) {
            let stored = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal(&mesh, tri).dot(stored) > 0.0, "triangle {tri:?} winds inward");
        }
        for vertex in &mesh.vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn sphere_is_unit() {
        let mesh = uv_sphere(16, 24);
        assert_eq!(mesh.vertices.len(), 17 * 25);
        assert_eq!(mesh.indices.len(), 16 * 24 * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        for vertex in &mesh.vertices {
            assert!((Vec3::from(vertex.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn quad_lies_on_plane() {
        let mesh = quad();
        assert_eq!(mesh.indices, vec![0, 2, 1, 0, 3, 2]);
        assert!(mesh.vertices.iter().all(|v| v.position[0] == 0.6));
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().attributes.len(), 3);
        assert_eq!(Vertex::position_layout().array_stride, 32);
    }
}
