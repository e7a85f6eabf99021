//! Scene description handed to the host renderer and physics engine
//!
//! Every mesh is the shared unit cube scaled by its transform, so a node only
//! names its material. Bodies carry world-space poses; meshes and colliders are
//! local to their body.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::physics::{BodyHandle, Pose};
use crate::renderer::MaterialId;

/// Local transform of a mesh inside its body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_translation_scale(translation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A visible box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub material: MaterialId,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshNode {
    pub fn new(material: MaterialId, translation: Vec3, scale: Vec3) -> Self {
        Self {
            material,
            transform: Transform::from_translation_scale(translation, scale),
            cast_shadow: false,
            receive_shadow: true,
        }
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }
}

/// How the physics engine drives a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves
    Fixed,
    /// Pose set from outside each frame, still pushes dynamic bodies
    KinematicPosition,
}

/// Box collider given by half-extents, local to its body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuboidCollider {
    pub half_extents: Vec3,
    pub position: Vec3,
    pub restitution: f32,
    pub friction: f32,
}

/// A rigid body with its meshes and explicit colliders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub rotation: Quat,
    pub restitution: f32,
    pub friction: f32,
    pub meshes: Vec<MeshNode>,
    /// Colliders without a visible mesh
    pub colliders: Vec<CuboidCollider>,
}

impl RigidBodyDesc {
    fn new(body_type: BodyType, position: Vec3) -> Self {
        Self {
            body_type,
            position,
            rotation: Quat::IDENTITY,
            restitution: 0.0,
            friction: 0.5,
            meshes: Vec::new(),
            colliders: Vec::new(),
        }
    }

    pub fn fixed(position: Vec3) -> Self {
        Self::new(BodyType::Fixed, position)
    }

    pub fn kinematic(position: Vec3) -> Self {
        Self::new(BodyType::KinematicPosition, position)
    }

    pub fn with_surface(mut self, restitution: f32, friction: f32) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshNode) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_collider(mut self, collider: CuboidCollider) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn pose(&self) -> Pose {
        Pose {
            translation: self.position,
            rotation: self.rotation,
        }
    }

    /// Colliders the engine should build: one cuboid fitted to each mesh
    /// (using the body's surface), followed by the explicit colliders
    pub fn all_colliders(&self) -> Vec<CuboidCollider> {
        self.meshes
            .iter()
            .map(|mesh| CuboidCollider {
                half_extents: mesh.transform.scale * 0.5,
                position: mesh.transform.translation,
                restitution: self.restitution,
                friction: self.friction,
            })
            .chain(self.colliders.iter().copied())
            .collect()
    }
}

/// A body as it appears in a rendered scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyNode {
    /// Set once the body is registered with a world
    pub handle: Option<BodyHandle>,
    pub desc: RigidBodyDesc,
}

/// One composable scene fragment (a block or the bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    /// Segment origin
    pub position: Vec3,
    pub bodies: Vec<BodyNode>,
}

/// Full level scene in traversal order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub groups: Vec<Group>,
}

impl Scene {
    pub fn bodies(&self) -> impl Iterator<Item = &BodyNode> {
        self.groups.iter().flat_map(|g| g.bodies.iter())
    }

    pub fn mesh_count(&self) -> usize {
        self.bodies().map(|b| b.desc.meshes.len()).sum()
    }
}
