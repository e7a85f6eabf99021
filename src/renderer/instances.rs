//! Flatten a scene into per-material instance batches
//!
//! All meshes share the unit cube, so a whole course draws with one instanced
//! call per material regardless of its length.

use std::collections::BTreeMap;

use glam::Mat4;

use super::registry::{MaterialId, Registry};
use super::vertex::InstanceRaw;
use crate::sim::physics::{PhysicsWorld, Pose};
use crate::sim::scene::{BodyNode, Scene};

/// Instances sharing one material
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    pub material: MaterialId,
    pub instances: Vec<InstanceRaw>,
}

/// Batches using each body's rest pose
pub fn batch_scene(scene: &Scene) -> Vec<InstanceBatch> {
    batch_with(scene, |node| node.desc.pose())
}

/// Batches using live poses from `world` for mounted bodies
pub fn batch_scene_live<W: PhysicsWorld + ?Sized>(scene: &Scene, world: &W) -> Vec<InstanceBatch> {
    batch_with(scene, |node| {
        node.handle
            .and_then(|h| world.pose(h))
            .unwrap_or_else(|| node.desc.pose())
    })
}

fn batch_with(scene: &Scene, pose_of: impl Fn(&BodyNode) -> Pose) -> Vec<InstanceBatch> {
    let registry = Registry::get();
    let mut batches: BTreeMap<MaterialId, Vec<InstanceRaw>> = BTreeMap::new();

    for node in scene.bodies() {
        let pose = pose_of(node);
        let body = Mat4::from_rotation_translation(pose.rotation, pose.translation);
        for mesh in &node.desc.meshes {
            let model = body * mesh.transform.matrix();
            batches.entry(mesh.material).or_default().push(InstanceRaw {
                model: model.to_cols_array_2d(),
                color: registry.material(mesh.material).color,
            });
        }
    }

    batches
        .into_iter()
        .map(|(material, instances)| InstanceBatch { material, instances })
        .collect()
}
