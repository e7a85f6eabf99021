//! Level simulation module
//!
//! Everything here is pure and host-agnostic:
//! - Seeded RNG only
//! - Stable scene order (Start, obstacles, End, Bounds)
//! - Physics reached only through the `PhysicsWorld` trait

pub mod blocks;
pub mod bounds;
pub mod level;
pub mod memo;
pub mod motion;
pub mod physics;
pub mod scene;

pub use blocks::{Block, BlockKind, Obstacle};
pub use bounds::Bounds;
pub use level::{Level, LevelParams, draw_sequence};
pub use memo::Memo;
pub use motion::{KinematicTarget, MotionLaw, axe_offset, limbo_offset, spinner_angle, spinner_rotation};
pub use physics::{BodyHandle, HeadlessWorld, KinematicBody, PhysicsWorld, Pose};
pub use scene::{BodyNode, BodyType, CuboidCollider, Group, MeshNode, RigidBodyDesc, Scene, Transform};
