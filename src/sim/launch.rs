//! Launch input mapping
//!
//! Turns a press/release pair into a launch command. A short gesture is a
//! tap and throws the body up with a random velocity; a longer one is a
//! slingshot pull, launching opposite the drag.
//!
//! Randomness comes from any `rand::Rng`, so callers inject a seeded
//! generator (the driver uses `Pcg32`).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Request to create one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchCommand {
    pub origin: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: u32,
}

impl LaunchCommand {
    /// Launch from `origin` with a random radius and palette color
    pub fn new<R: Rng + ?Sized>(origin: Vec2, velocity: Vec2, rng: &mut R) -> Self {
        Self {
            origin,
            velocity,
            radius: random_radius(rng),
            color: random_color(rng),
        }
    }
}

pub fn random_radius<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(BODY_RADIUS_MIN..BODY_RADIUS_MAX)
}

pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    BODY_PALETTE[rng.random_range(0..BODY_PALETTE.len())]
}

/// Random small upward throw
pub fn tap_velocity<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.random_range(TAP_VX_RANGE.0..=TAP_VX_RANGE.1),
        rng.random_range(TAP_VY_RANGE.0..=TAP_VY_RANGE.1),
    )
}

/// Slingshot velocity: away from the release point, scaled by pull length
pub fn drag_velocity(press: Vec2, release: Vec2) -> Vec2 {
    let pull = press - release;
    let speed = (pull.length() * DRAG_VELOCITY_SCALE).min(MAX_LAUNCH_SPEED);
    pull.normalize_or_zero() * speed
}

/// Whether a gesture is short enough to count as a tap
#[inline]
pub fn is_tap(press: Vec2, release: Vec2) -> bool {
    press.distance(release) < TAP_THRESHOLD
}

/// Map a completed press/release gesture to a launch from the press point
pub fn launch_from_gesture<R: Rng + ?Sized>(
    press: Vec2,
    release: Vec2,
    rng: &mut R,
) -> LaunchCommand {
    let velocity = if is_tap(press, release) {
        tap_velocity(rng)
    } else {
        drag_velocity(press, release)
    };
    LaunchCommand::new(press, velocity, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tap_velocity_ranges() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let v = tap_velocity(&mut rng);
            assert!((TAP_VX_RANGE.0..=TAP_VX_RANGE.1).contains(&v.x));
            assert!((TAP_VY_RANGE.0..=TAP_VY_RANGE.1).contains(&v.y));
        }
    }

    #[test]
    fn test_drag_launches_opposite_the_pull() {
        // Pulled 100px down and to the left: fires up and to the right
        let press = Vec2::new(200.0, 200.0);
        let release = Vec2::new(140.0, 280.0);
        let v = drag_velocity(press, release);

        assert!(v.x > 0.0 && v.y < 0.0);
        assert!((v.length() - 100.0 * DRAG_VELOCITY_SCALE).abs() < 1e-4);
        let dir = (press - release).normalize();
        assert!((v.normalize() - dir).length() < 1e-5);
    }

    #[test]
    fn test_drag_speed_is_capped() {
        let v = drag_velocity(Vec2::new(0.0, 0.0), Vec2::new(0.0, 5000.0));
        assert!((v.length() - MAX_LAUNCH_SPEED).abs() < 1e-4);
        assert!(v.y < 0.0);
    }

    #[test]
    fn test_short_gesture_is_a_tap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let press = Vec2::new(300.0, 300.0);
        let cmd = launch_from_gesture(press, press + Vec2::new(3.0, 0.0), &mut rng);

        assert_eq!(cmd.origin, press);
        assert!(cmd.velocity.y <= TAP_VY_RANGE.1);
        assert!((BODY_RADIUS_MIN..BODY_RADIUS_MAX).contains(&cmd.radius));
        assert!(BODY_PALETTE.contains(&cmd.color));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let press = Vec2::new(100.0, 100.0);
        let a = launch_from_gesture(press, press, &mut Pcg32::seed_from_u64(99));
        let b = launch_from_gesture(press, press, &mut Pcg32::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
