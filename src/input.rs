//! Pointer gesture tracking
//!
//! Press starts an aim, move updates the aim indicator, release produces a
//! launch command. All calls happen between frames on the same thread.

use glam::Vec2;
use rand::Rng;

use crate::sim::{LaunchCommand, launch_from_gesture};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AimGesture {
    /// (press point, latest pointer position) while the pointer is down
    active: Option<(Vec2, Vec2)>,
}

impl AimGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, pos: Vec2) {
        self.active = Some((pos, pos));
    }

    /// Track the pointer; ignored when nothing is pressed
    pub fn move_to(&mut self, pos: Vec2) {
        if let Some((_, current)) = self.active.as_mut() {
            *current = pos;
        }
    }

    /// Finish the gesture. A release without a press launches nothing.
    pub fn release<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) -> Option<LaunchCommand> {
        let (press, _) = self.active.take()?;
        Some(launch_from_gesture(press, pos, rng))
    }

    /// Drop an in-progress gesture (pointer left the arena, view torn down)
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Aim indicator for rendering
    pub fn aim(&self) -> Option<(Vec2, Vec2)> {
        self.active
    }

    pub fn is_aiming(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_press_move_release() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut gesture = AimGesture::new();

        gesture.press(Vec2::new(400.0, 200.0));
        gesture.move_to(Vec2::new(400.0, 260.0));
        assert_eq!(
            gesture.aim(),
            Some((Vec2::new(400.0, 200.0), Vec2::new(400.0, 260.0)))
        );

        let cmd = gesture.release(Vec2::new(400.0, 300.0), &mut rng).unwrap();
        assert_eq!(cmd.origin, Vec2::new(400.0, 200.0));
        // Pulled down: launches straight up
        assert!(cmd.velocity.y < 0.0);
        assert!(cmd.velocity.x.abs() < 1e-5);
        assert!(!gesture.is_aiming());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut gesture = AimGesture::new();
        gesture.move_to(Vec2::new(10.0, 10.0));
        assert!(gesture.aim().is_none());
        assert!(gesture.release(Vec2::new(10.0, 10.0), &mut rng).is_none());
    }

    #[test]
    fn test_cancel_drops_the_aim() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut gesture = AimGesture::new();
        gesture.press(Vec2::new(50.0, 50.0));
        gesture.cancel();
        assert!(gesture.release(Vec2::new(90.0, 90.0), &mut rng).is_none());
    }
}
