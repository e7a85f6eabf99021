//! Block variants
//!
//! A block is one course segment: a floor platform and, for obstacle kinds, a
//! kinematic body driven by its motion law.

use std::str::FromStr;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::motion::MotionLaw;
use super::physics::{BodyHandle, PhysicsWorld};
use super::scene::{BodyNode, Group, MeshNode, RigidBodyDesc};
use crate::consts::*;
use crate::error::ConfigError;
use crate::renderer::MaterialId;

/// Segment variants. Names parse case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum BlockKind {
    /// First segment, no obstacle
    Start,
    Spinner,
    Limbo,
    Axe,
    /// Last segment, no obstacle
    End,
}

impl BlockKind {
    /// Default random pool
    pub const OBSTACLES: [BlockKind; 3] = [BlockKind::Spinner, BlockKind::Axe, BlockKind::Limbo];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Start => "Start",
            BlockKind::Spinner => "Spinner",
            BlockKind::Limbo => "Limbo",
            BlockKind::Axe => "Axe",
            BlockKind::End => "End",
        }
    }

    /// Start and End are fixed endpoints
    pub fn is_selectable(&self) -> bool {
        !matches!(self, BlockKind::Start | BlockKind::End)
    }

    fn floor_material(&self) -> MaterialId {
        if self.is_selectable() {
            MaterialId::FloorObstacle
        } else {
            MaterialId::FloorEndpoint
        }
    }

    /// End sits flush; every other floor is recessed so its top is at y = 0
    fn floor_offset(&self) -> Vec3 {
        match self {
            BlockKind::End => Vec3::ZERO,
            _ => Vec3::new(0.0, -FLOOR_RECESS, 0.0),
        }
    }

    fn obstacle_scale(&self) -> Option<Vec3> {
        match self {
            BlockKind::Spinner | BlockKind::Limbo => Some(BAR_SCALE),
            BlockKind::Axe => Some(AXE_SCALE),
            BlockKind::Start | BlockKind::End => None,
        }
    }

    /// Draw the per-instance motion parameter
    fn draw_motion<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MotionLaw> {
        match self {
            BlockKind::Spinner => Some(MotionLaw::spin(rng)),
            BlockKind::Limbo => Some(MotionLaw::limbo(rng)),
            BlockKind::Axe => Some(MotionLaw::axe(rng)),
            BlockKind::Start | BlockKind::End => None,
        }
    }
}

impl FromStr for BlockKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(BlockKind::Start),
            "spinner" => Ok(BlockKind::Spinner),
            "limbo" => Ok(BlockKind::Limbo),
            "axe" => Ok(BlockKind::Axe),
            "end" => Ok(BlockKind::End),
            _ => Err(ConfigError::UnknownKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for BlockKind {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The animated part of an obstacle block
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Drawn once at construction
    pub law: MotionLaw,
    pub body: RigidBodyDesc,
    handle: Option<BodyHandle>,
}

impl Obstacle {
    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }
}

/// One placed segment
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    /// Segment origin in world space
    pub position: Vec3,
    pub floor: RigidBodyDesc,
    floor_handle: Option<BodyHandle>,
    pub obstacle: Option<Obstacle>,
}

impl Block {
    /// Build a block of `kind` at `position`.
    ///
    /// Obstacle kinds draw their motion parameter from `rng` here and never
    /// again. `position` is taken as-is.
    pub fn build<R: Rng + ?Sized>(kind: BlockKind, position: Vec3, rng: &mut R) -> Self {
        let floor = RigidBodyDesc::fixed(position)
            .with_surface(CATCH_FLOOR_RESTITUTION, CATCH_FLOOR_FRICTION)
            .with_mesh(MeshNode::new(kind.floor_material(), kind.floor_offset(), FLOOR_SCALE));

        let obstacle = kind
            .draw_motion(rng)
            .zip(kind.obstacle_scale())
            .map(|(law, scale)| Obstacle {
                law,
                body: RigidBodyDesc::kinematic(position + OBSTACLE_BODY_OFFSET)
                    .with_surface(OBSTACLE_RESTITUTION, OBSTACLE_FRICTION)
                    .with_mesh(MeshNode::new(MaterialId::Obstacle, Vec3::ZERO, scale).casting_shadow()),
                handle: None,
            });

        Self {
            kind,
            position,
            floor,
            floor_handle: None,
            obstacle,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.floor_handle.is_some()
    }

    /// Register this block's bodies with `world` (no-op if already mounted)
    pub fn mount<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        if self.floor_handle.is_none() {
            self.floor_handle = Some(world.create_body(&self.floor));
        }
        if let Some(obstacle) = &mut self.obstacle {
            if obstacle.handle.is_none() {
                obstacle.handle = Some(world.create_body(&obstacle.body));
            }
        }
    }

    /// Handles this block holds, detaching them from the block
    pub fn take_handles(&mut self) -> Vec<BodyHandle> {
        let mut handles: Vec<BodyHandle> = self.floor_handle.take().into_iter().collect();
        if let Some(obstacle) = &mut self.obstacle {
            handles.extend(obstacle.handle.take());
        }
        handles
    }

    /// Per-frame callback.
    ///
    /// Silently does nothing until the obstacle body exists in `world`.
    pub fn update<W: PhysicsWorld + ?Sized>(&self, t: f32, world: &mut W) {
        let Some(obstacle) = &self.obstacle else {
            return;
        };
        let Some(body) = obstacle.handle.and_then(|h| world.body_mut(h)) else {
            log::trace!("{} at z={}: body not ready", self.kind.as_str(), self.position.z);
            return;
        };
        obstacle.law.apply(t, self.position, body);
    }

    /// Scene fragment for this block
    pub fn group(&self) -> Group {
        let mut bodies = vec![BodyNode {
            handle: self.floor_handle,
            desc: self.floor.clone(),
        }];
        if let Some(obstacle) = &self.obstacle {
            bodies.push(BodyNode {
                handle: obstacle.handle,
                desc: obstacle.body.clone(),
            });
        }
        Group {
            label: self.kind.as_str().to_string(),
            position: self.position,
            bodies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::HeadlessWorld;
    use crate::sim::scene::BodyType;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn build(kind: BlockKind, z: f32) -> Block {
        let mut rng = Pcg32::seed_from_u64(42);
        Block::build(kind, Vec3::new(0.0, 0.0, z), &mut rng)
    }

    #[test]
    fn test_start_and_end_floors() {
        let start = build(BlockKind::Start, 0.0);
        assert!(start.obstacle.is_none());
        let mesh = start.floor.meshes[0];
        assert_eq!(mesh.transform.scale, Vec3::new(4.0, 0.2, 4.0));
        assert_eq!(mesh.transform.translation, Vec3::new(0.0, -0.1, 0.0));
        assert_eq!(mesh.material, MaterialId::FloorEndpoint);

        let end = build(BlockKind::End, -8.0);
        assert!(end.obstacle.is_none());
        assert_eq!(end.floor.meshes[0].transform.translation, Vec3::ZERO);
        assert_eq!(end.floor.position, Vec3::new(0.0, 0.0, -8.0));
    }

    #[test]
    fn test_obstacle_blocks() {
        for (kind, scale) in [
            (BlockKind::Spinner, Vec3::new(3.5, 0.3, 0.3)),
            (BlockKind::Limbo, Vec3::new(3.5, 0.3, 0.3)),
            (BlockKind::Axe, Vec3::new(1.5, 1.5, 0.3)),
        ] {
            let block = build(kind, -4.0);
            assert_eq!(block.floor.meshes[0].material, MaterialId::FloorObstacle);
            assert_eq!(block.floor.meshes[0].transform.translation.y, -0.1);

            let obstacle = block.obstacle.as_ref().unwrap();
            assert_eq!(obstacle.body.body_type, BodyType::KinematicPosition);
            assert_eq!(obstacle.body.position, Vec3::new(0.0, 0.3, -4.0));
            assert_eq!(obstacle.body.restitution, 0.3);
            assert_eq!(obstacle.body.friction, 0.0);
            assert_eq!(obstacle.body.meshes[0].transform.scale, scale);
            assert!(obstacle.body.meshes[0].cast_shadow);
        }
    }

    #[test]
    fn test_update_before_mount_is_noop() {
        let mut world = HeadlessWorld::new();
        let block = build(BlockKind::Limbo, -4.0);
        block.update(1.0, &mut world);
        world.step(1.0 / 60.0);
        assert!(world.is_empty());
    }

    #[test]
    fn test_update_after_unmount_is_noop() {
        let mut world = HeadlessWorld::new();
        let mut block = build(BlockKind::Axe, -4.0);
        block.mount(&mut world);
        let handle = block.obstacle.as_ref().unwrap().handle().unwrap();
        world.remove_body(handle);

        // Handle is dangling - still no panic
        block.update(1.0, &mut world);
    }

    #[test]
    fn test_mount_then_update_moves_obstacle() {
        let mut world = HeadlessWorld::new();
        let mut block = build(BlockKind::Axe, -12.0);
        block.mount(&mut world);
        assert!(block.is_mounted());
        assert_eq!(world.len(), 2);

        // Mounting twice does not duplicate bodies
        block.mount(&mut world);
        assert_eq!(world.len(), 2);

        let MotionLaw::Axe { time_offset } = block.obstacle.as_ref().unwrap().law else {
            panic!("axe block has axe law");
        };
        block.update(2.0, &mut world);
        world.step(1.0 / 60.0);

        let handle = block.obstacle.as_ref().unwrap().handle().unwrap();
        let pose = world.pose(handle).unwrap();
        let expected_x = (2.0 + time_offset).sin() * 1.25;
        assert!((pose.translation.x - expected_x).abs() < 1e-5);
        assert_eq!(pose.translation.y, 0.75);
        assert_eq!(pose.translation.z, -12.0);
    }

    #[test]
    fn test_take_handles() {
        let mut world = HeadlessWorld::new();
        let mut block = build(BlockKind::Spinner, -4.0);
        block.mount(&mut world);
        assert_eq!(block.take_handles().len(), 2);
        assert!(!block.is_mounted());
        assert!(block.take_handles().is_empty());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            BlockKind::Start,
            BlockKind::Spinner,
            BlockKind::Limbo,
            BlockKind::Axe,
            BlockKind::End,
        ] {
            assert_eq!(kind.as_str().parse::<BlockKind>().unwrap(), kind);
        }
        assert_eq!("AXE".parse::<BlockKind>().unwrap(), BlockKind::Axe);
        assert!(matches!(
            "pendulum".parse::<BlockKind>(),
            Err(ConfigError::UnknownKind(name)) if name == "pendulum"
        ));
        assert!(!BlockKind::Start.is_selectable());
        assert!(BlockKind::Limbo.is_selectable());
    }
}
