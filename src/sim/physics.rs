//! Physics world seam
//!
//! The level never steps physics itself. It registers body descriptions with
//! a host world and, once per frame, hands kinematic bodies their next pose.
//! `HeadlessWorld` is a minimal host used by the native runner, the web
//! bindings and tests.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::scene::{BodyType, CuboidCollider, RigidBodyDesc};

/// Opaque handle to a body registered with a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Position + orientation of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };
}

/// Setters for a kinematic-position body.
///
/// Targets are consumed by the world's next step; calling a setter more than
/// once before a step keeps the last value.
pub trait KinematicBody {
    fn set_next_kinematic_translation(&mut self, translation: Vec3);
    fn set_next_kinematic_rotation(&mut self, rotation: Quat);
}

/// The subset of a rigid-body engine the level needs
pub trait PhysicsWorld {
    /// Register a body and its colliders
    fn create_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle;
    /// Remove a body; unknown handles are ignored
    fn remove_body(&mut self, handle: BodyHandle);
    /// Mutable access to a live body, `None` if the handle is not registered
    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut dyn KinematicBody>;
    /// Current pose of a live body
    fn pose(&self, handle: BodyHandle) -> Option<Pose>;
}

/// A body tracked by `HeadlessWorld`
#[derive(Debug, Clone)]
pub struct HeadlessBody {
    pub desc: RigidBodyDesc,
    /// Colliders the body was registered with
    pub colliders: Vec<CuboidCollider>,
    pub pose: Pose,
    /// Velocity implied by the last kinematic move
    pub linvel: Vec3,
    pub angvel: Vec3,
    next_translation: Option<Vec3>,
    next_rotation: Option<Quat>,
    /// Time stepped since the pending targets were set
    since_target: f32,
}

impl HeadlessBody {
    fn new(desc: &RigidBodyDesc) -> Self {
        Self {
            desc: desc.clone(),
            colliders: desc.all_colliders(),
            pose: desc.pose(),
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            next_translation: None,
            next_rotation: None,
            since_target: 0.0,
        }
    }

    pub fn is_kinematic(&self) -> bool {
        self.desc.body_type == BodyType::KinematicPosition
    }

    /// Move toward the pending targets so they are reached `span` seconds
    /// after being set, deriving velocities over `dt`
    fn step(&mut self, dt: f32, span: f32) {
        self.linvel = Vec3::ZERO;
        self.angvel = Vec3::ZERO;
        if dt <= 0.0 || (self.next_translation.is_none() && self.next_rotation.is_none()) {
            return;
        }

        let remaining = span - self.since_target;
        // Last substep of the span lands exactly on the targets
        let arrive = remaining <= dt * (1.0 + 1e-3);
        let fraction = if arrive { 1.0 } else { dt / remaining };
        self.since_target += dt;

        if let Some(target) = self.next_translation {
            let delta = (target - self.pose.translation) * fraction;
            self.linvel = delta / dt;
            self.pose.translation = if arrive { target } else { self.pose.translation + delta };
        }

        if let Some(target) = self.next_rotation {
            let mut delta = target * self.pose.rotation.inverse();
            // Shortest arc
            if delta.w < 0.0 {
                delta = -delta;
            }
            let arc = delta.to_scaled_axis() * fraction;
            self.angvel = arc / dt;
            self.pose.rotation = if arrive {
                target.normalize()
            } else {
                (Quat::from_scaled_axis(arc) * self.pose.rotation).normalize()
            };
        }

        if arrive {
            self.next_translation = None;
            self.next_rotation = None;
        }
    }
}

impl KinematicBody for HeadlessBody {
    fn set_next_kinematic_translation(&mut self, translation: Vec3) {
        if self.is_kinematic() {
            self.next_translation = Some(translation);
            self.since_target = 0.0;
        }
    }

    fn set_next_kinematic_rotation(&mut self, rotation: Quat) {
        if self.is_kinematic() {
            self.next_rotation = Some(rotation);
            self.since_target = 0.0;
        }
    }
}

/// In-memory world without collision response.
///
/// Kinematic bodies glide to their targets over the frame interval, spread
/// evenly across however many fixed steps the host runs in that frame, and
/// record the velocity a real solver would use to push dynamic bodies along.
/// Without a frame interval a target is reached in a single step.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWorld {
    /// Sorted by handle for deterministic iteration
    bodies: BTreeMap<BodyHandle, HeadlessBody>,
    next_id: u32,
    frame_interval: Option<f32>,
}

impl HeadlessWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time between kinematic targets, i.e. the host's frame delta
    pub fn set_frame_interval(&mut self, interval: f32) {
        self.frame_interval = (interval > 0.0).then_some(interval);
    }

    /// Advance one fixed step
    pub fn step(&mut self, dt: f32) {
        let span = self.frame_interval.unwrap_or(dt);
        for body in self.bodies.values_mut() {
            body.step(dt, span);
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&HeadlessBody> {
        self.bodies.get(&handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &HeadlessBody)> {
        self.bodies.iter().map(|(h, b)| (*h, b))
    }

    /// Total colliders across all registered bodies
    pub fn collider_count(&self) -> usize {
        self.bodies.values().map(|b| b.colliders.len()).sum()
    }

    /// Poses of every kinematic body, in handle order
    pub fn kinematic_poses(&self) -> Vec<(BodyHandle, Pose)> {
        self.bodies()
            .filter(|(_, b)| b.is_kinematic())
            .map(|(h, b)| (h, b.pose))
            .collect()
    }
}

impl PhysicsWorld for HeadlessWorld {
    fn create_body(&mut self, desc: &RigidBodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(handle, HeadlessBody::new(desc));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if self.bodies.remove(&handle).is_none() {
            log::debug!("remove_body: unknown handle {:?}", handle);
        }
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut dyn KinematicBody> {
        self.bodies
            .get_mut(&handle)
            .map(|b| b as &mut dyn KinematicBody)
    }

    fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.bodies.get(&handle).map(|b| b.pose)
    }
}
