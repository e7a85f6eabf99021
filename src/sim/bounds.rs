//! Course bounds
//!
//! Side walls for every segment, a wall across the far end, and an invisible
//! floor under the whole course that catches anything falling off a platform.

use glam::Vec3;

use super::scene::{CuboidCollider, MeshNode, RigidBodyDesc};
use crate::consts::*;
use crate::renderer::MaterialId;

/// Static colliders enclosing a course of `length` segments
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub length: usize,
    /// `length` side-wall bodies followed by the terminal body
    pub bodies: Vec<RigidBodyDesc>,
}

impl Bounds {
    pub fn generate(length: usize) -> Self {
        log::debug!("Generating bounds for {} segments", length);

        let mut bodies = Vec::with_capacity(length + 1);

        for i in 0..length {
            let z = crate::segment_z(i);
            bodies.push(
                wall_body()
                    .with_mesh(MeshNode::new(
                        MaterialId::Wall,
                        Vec3::new(SIDE_WALL_X, WALL_Y, z),
                        SIDE_WALL_SCALE,
                    ))
                    .with_mesh(MeshNode::new(
                        MaterialId::Wall,
                        Vec3::new(-SIDE_WALL_X, WALL_Y, z),
                        SIDE_WALL_SCALE,
                    )),
            );
        }

        let len = length as f32;
        bodies.push(
            wall_body()
                .with_mesh(MeshNode::new(
                    MaterialId::Wall,
                    Vec3::new(0.0, WALL_Y, Self::end_wall_z(length)),
                    END_WALL_SCALE,
                ))
                .with_collider(CuboidCollider {
                    half_extents: Vec3::new(2.0, 0.1, 2.0 * len),
                    position: Vec3::new(0.0, -0.1, -(len * 2.0) + 2.0),
                    restitution: CATCH_FLOOR_RESTITUTION,
                    friction: CATCH_FLOOR_FRICTION,
                }),
        );

        Self { length, bodies }
    }

    /// Z of the end wall for a course of `length` segments
    pub fn end_wall_z(length: usize) -> f32 {
        length as f32 * -SEGMENT_SPACING + END_WALL_INSET
    }

    pub fn side_walls(&self) -> &[RigidBodyDesc] {
        &self.bodies[..self.length]
    }

    /// End wall + catch floor
    pub fn terminal(&self) -> &RigidBodyDesc {
        &self.bodies[self.length]
    }

    /// The mesh-less floor collider
    pub fn catch_floor(&self) -> &CuboidCollider {
        &self.terminal().colliders[0]
    }
}

fn wall_body() -> RigidBodyDesc {
    RigidBodyDesc::fixed(Vec3::ZERO).with_surface(WALL_RESTITUTION, WALL_FRICTION)
}
