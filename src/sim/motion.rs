//! Obstacle motion laws
//!
//! Pure functions of elapsed time and a per-instance parameter drawn once when
//! the obstacle is built. Results are submitted as kinematic targets, so the
//! physics step moves the body there instead of teleporting it.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::KinematicBody;
use crate::consts::{AXE_AMPLITUDE, AXE_LIFT, LIMBO_LIFT};

/// Spinner angle about +Y (radians)
#[inline]
pub fn spinner_angle(t: f32, speed: f32) -> f32 {
    t * speed
}

#[inline]
pub fn spinner_rotation(t: f32, speed: f32) -> Quat {
    Quat::from_rotation_y(spinner_angle(t, speed))
}

/// Limbo bar height above its segment, in [0.15, 2.15]
#[inline]
pub fn limbo_offset(t: f32, time_offset: f32) -> f32 {
    (t + time_offset).sin() + LIMBO_LIFT
}

/// Axe sideways offset, in [-1.25, 1.25]
#[inline]
pub fn axe_offset(t: f32, time_offset: f32) -> f32 {
    (t + time_offset).sin() * AXE_AMPLITUDE
}

/// What a motion law asks of its body this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KinematicTarget {
    Translation(Vec3),
    Rotation(Quat),
}

/// Per-instance motion, fixed for the obstacle's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionLaw {
    /// Rotate about +Y at `speed` rad/s (sign gives direction)
    Spin { speed: f32 },
    /// Bob up and down
    Limbo { time_offset: f32 },
    /// Swing side to side
    Axe { time_offset: f32 },
}

impl MotionLaw {
    /// Spinner with |speed| in [0.5, 1.5) and a random direction
    pub fn spin<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let magnitude = rng.random_range(0.5..1.5);
        let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        MotionLaw::Spin {
            speed: magnitude * sign,
        }
    }

    pub fn limbo<R: Rng + ?Sized>(rng: &mut R) -> Self {
        MotionLaw::Limbo {
            time_offset: random_phase(rng),
        }
    }

    pub fn axe<R: Rng + ?Sized>(rng: &mut R) -> Self {
        MotionLaw::Axe {
            time_offset: random_phase(rng),
        }
    }

    /// Target at time `t` for an obstacle on the segment at `base`
    pub fn target(&self, t: f32, base: Vec3) -> KinematicTarget {
        match *self {
            MotionLaw::Spin { speed } => KinematicTarget::Rotation(spinner_rotation(t, speed)),
            MotionLaw::Limbo { time_offset } => KinematicTarget::Translation(Vec3::new(
                base.x,
                base.y + limbo_offset(t, time_offset),
                base.z,
            )),
            MotionLaw::Axe { time_offset } => KinematicTarget::Translation(Vec3::new(
                base.x + axe_offset(t, time_offset),
                base.y + AXE_LIFT,
                base.z,
            )),
        }
    }

    /// Submit this frame's target to `body`
    pub fn apply(&self, t: f32, base: Vec3, body: &mut dyn KinematicBody) {
        match self.target(t, base) {
            KinematicTarget::Translation(v) => body.set_next_kinematic_translation(v),
            KinematicTarget::Rotation(q) => body.set_next_kinematic_rotation(q),
        }
    }
}

/// Uniform phase in [0, 2π)
fn random_phase<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(0.0..TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    #[derive(Default)]
    struct Recorder {
        translation: Option<Vec3>,
        rotation: Option<Quat>,
    }

    impl KinematicBody for Recorder {
        fn set_next_kinematic_translation(&mut self, translation: Vec3) {
            self.translation = Some(translation);
        }
        fn set_next_kinematic_rotation(&mut self, rotation: Quat) {
            self.rotation = Some(rotation);
        }
    }

    #[test]
    fn test_spin_draw_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        let (mut neg, mut pos) = (0, 0);
        for _ in 0..1000 {
            let MotionLaw::Spin { speed } = MotionLaw::spin(&mut rng) else {
                panic!("expected spin");
            };
            assert!((0.5..1.5).contains(&speed.abs()), "speed {speed}");
            if speed < 0.0 {
                neg += 1;
            } else {
                pos += 1;
            }
        }
        // Both directions show up
        assert!(neg > 100 && pos > 100);
    }

    #[test]
    fn test_phase_draw_range() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..1000 {
            let MotionLaw::Axe { time_offset } = MotionLaw::axe(&mut rng) else {
                panic!("expected axe");
            };
            assert!((0.0..TAU).contains(&time_offset));
        }
    }

    #[test]
    fn test_limbo_extremes() {
        assert!((limbo_offset(PI / 2.0, 0.0) - 2.15).abs() < 1e-6);
        assert!((limbo_offset(-PI / 2.0, 0.0) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_axe_target_keeps_height_and_depth() {
        let law = MotionLaw::Axe { time_offset: 0.0 };
        let base = Vec3::new(0.0, 0.0, -8.0);
        let KinematicTarget::Translation(p) = law.target(PI / 2.0, base) else {
            panic!("axe moves by translation");
        };
        assert!((p.x - 1.25).abs() < 1e-6);
        assert_eq!(p.y, 0.75);
        assert_eq!(p.z, -8.0);
    }

    #[test]
    fn test_limbo_target_keeps_horizontal() {
        let law = MotionLaw::Limbo { time_offset: 1.0 };
        let base = Vec3::new(0.5, 0.0, -4.0);
        let KinematicTarget::Translation(p) = law.target(2.0, base) else {
            panic!("limbo moves by translation");
        };
        assert_eq!(p.x, 0.5);
        assert_eq!(p.z, -4.0);
        assert!((p.y - (3.0f32.sin() + 1.15)).abs() < 1e-6);
    }

    #[test]
    fn test_apply_routes_to_setter() {
        let mut body = Recorder::default();
        MotionLaw::Spin { speed: 1.0 }.apply(1.0, Vec3::ZERO, &mut body);
        assert!(body.translation.is_none());
        let q = body.rotation.unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_y(1.0), 1e-6));

        let mut body = Recorder::default();
        MotionLaw::Limbo { time_offset: 0.0 }.apply(0.0, Vec3::ZERO, &mut body);
        assert!(body.rotation.is_none());
        assert!(body.translation.is_some());
    }

    proptest! {
        #[test]
        fn prop_spinner_angle_is_t_times_speed(
            t in 0.0f32..1000.0,
            speed in 0.5f32..1.5,
            neg in any::<bool>(),
        ) {
            let speed = if neg { -speed } else { speed };
            let q = spinner_rotation(t, speed);
            // q and -q are the same rotation
            let expected = Quat::from_rotation_y(t * speed);
            prop_assert!(q.dot(expected).abs() > 0.9999);
            prop_assert_eq!(spinner_angle(t, speed), t * speed);
        }

        #[test]
        fn prop_limbo_offset_bounded(t in 0.0f32..10_000.0, off in 0.0f32..TAU) {
            let y = limbo_offset(t, off);
            prop_assert!((0.15 - 1e-5..=2.15 + 1e-5).contains(&y));
            prop_assert_eq!(y, (t + off).sin() + 1.15);
        }

        #[test]
        fn prop_axe_offset_bounded(t in 0.0f32..10_000.0, off in 0.0f32..TAU) {
            let x = axe_offset(t, off);
            prop_assert!((-1.25 - 1e-5..=1.25 + 1e-5).contains(&x));
            prop_assert_eq!(x, (t + off).sin() * 1.25);
        }
    }
}
