use crate::frustum::Frustum;
use glam::{Mat4, Vec3};
use orbitlab_common::Aabb;
use std::f32::consts::TAU;

/// Upper bound on instances; GPU instance tables are sized for this.
pub const MAX_INSTANCES: usize = 256;

/// One copy of the base cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub world: Mat4,
    /// Specular exponent.
    pub shine: f32,
    /// 0 for even ring slots, 1 for odd ones. Odd instances shade untextured.
    pub parity: u32,
}

impl Instance {
    /// Shading parameters derived from the ring slot: even and odd slots
    /// alternate materials, shine steps through four exponents.
    pub fn for_slot(index: usize, world: Mat4) -> Self {
        Self {
            world,
            shine: 8.0 * (1u32 << (index % 4)) as f32,
            parity: (index % 2) as u32,
        }
    }
}

/// Instances placed evenly on a horizontal circle around the origin,
/// each turned to face the center.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRing {
    instances: Vec<Instance>,
    local_bounds: Aabb,
    radius: f32,
}

impl InstanceRing {
    /// Unit cube bounds, matching the cube mesh's `[-0.5, 0.5]` extent.
    pub fn unit_cube_bounds() -> Aabb {
        Aabb::from_center(Vec3::ZERO, Vec3::splat(0.5))
    }

    /// `count` is clamped to [`MAX_INSTANCES`].
    pub fn new(count: usize, radius: f32) -> Self {
        let count = count.min(MAX_INSTANCES);
        let instances = (0..count)
            .map(|i| {
                let angle = TAU * i as f32 / count as f32;
                let position = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
                let world = Mat4::from_translation(position) * Mat4::from_rotation_y(-angle);
                Instance::for_slot(i, world)
            })
            .collect();
        Self {
            instances,
            local_bounds: Self::unit_cube_bounds(),
            radius,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    /// World-space bounds of one instance.
    pub fn world_bounds(&self, index: usize) -> Option<Aabb> {
        self.instances
            .get(index)
            .map(|inst| self.local_bounds.transformed(&inst.world))
    }

    /// Indices of every instance whose world bounds pass the frustum test,
    /// in ring order. Built fresh on each call.
    pub fn cull(&self, frustum: &Frustum) -> VisibleSet {
        let indices = self
            .instances
            .iter()
            .enumerate()
            .filter(|(_, inst)| frustum.intersects_box(&self.local_bounds.transformed(&inst.world)))
            .map(|(i, _)| i as u32)
            .collect();
        VisibleSet(indices)
    }
}

/// Surviving instance indices for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet(pub Vec<u32>);

impl VisibleSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains(&index)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}
