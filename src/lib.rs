//! Obstacle Course - procedurally generated platform levels
//!
//! Core modules:
//! - `sim`: Level generation, block variants, bounds and kinematic motion
//! - `renderer`: Shared geometry/material registry and GPU instance data
//! - `settings`: Data-driven level configuration
//! - `error`: Configuration errors

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::ConfigError;
pub use settings::Settings;
pub use sim::{BlockKind, Level, LevelParams};

/// Level layout constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (120 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Distance between consecutive segments along -Z
    pub const SEGMENT_SPACING: f32 = 4.0;

    /// Default number of random obstacle segments
    pub const DEFAULT_OBSTACLE_COUNT: usize = 5;

    /// Platform floor (unit cube scaled)
    pub const FLOOR_SCALE: Vec3 = Vec3::new(4.0, 0.2, 4.0);
    /// Floors are recessed so their top sits at y = 0
    pub const FLOOR_RECESS: f32 = 0.1;

    /// Obstacle body rest position relative to the segment origin
    pub const OBSTACLE_BODY_OFFSET: Vec3 = Vec3::new(0.0, 0.3, 0.0);
    /// Spinner and limbo bar
    pub const BAR_SCALE: Vec3 = Vec3::new(3.5, 0.3, 0.3);
    /// Axe blade
    pub const AXE_SCALE: Vec3 = Vec3::new(1.5, 1.5, 0.3);
    pub const OBSTACLE_RESTITUTION: f32 = 0.3;
    pub const OBSTACLE_FRICTION: f32 = 0.0;

    /// Limbo bar hovers this far above the segment on average
    pub const LIMBO_LIFT: f32 = 1.15;
    /// Axe swing half-width
    pub const AXE_AMPLITUDE: f32 = 1.25;
    /// Axe blade height above the segment
    pub const AXE_LIFT: f32 = 0.75;

    /// Side walls
    pub const SIDE_WALL_SCALE: Vec3 = Vec3::new(0.3, 1.5, 4.0);
    pub const SIDE_WALL_X: f32 = 2.15;
    pub const WALL_Y: f32 = 0.55;
    /// Wall at the far end of the course
    pub const END_WALL_SCALE: Vec3 = Vec3::new(4.6, 1.5, 0.3);
    pub const END_WALL_INSET: f32 = 1.85;
    pub const WALL_RESTITUTION: f32 = 0.2;
    pub const WALL_FRICTION: f32 = 0.0;

    /// Catch floor beneath the whole course
    pub const CATCH_FLOOR_RESTITUTION: f32 = 0.2;
    pub const CATCH_FLOOR_FRICTION: f32 = 1.0;
}

/// Z coordinate of the segment at `index`
#[inline]
pub fn segment_z(index: usize) -> f32 {
    index as f32 * -consts::SEGMENT_SPACING
}
