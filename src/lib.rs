//! Bounce Sandbox - launch balls into an obstacle arena and chain bounce combos
//!
//! Core modules:
//! - `sim`: Physics stepper, circle/rectangle collision, scoring and combo state
//! - `driver`: Per-frame orchestration (step, score, decay, render hand-off)
//! - `input`: Press/drag/release gesture mapping to launch commands
//! - `platform`: Browser/native clock and frame scheduling
//! - `persistence`: Key/value storage for settings and high scores

pub mod driver;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use driver::{FrameControl, FrameDriver, Render};
pub use highscores::HighScores;
pub use settings::{GravityLevel, Settings};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
///
/// Physics values are per frame: the stepper runs once per display refresh
/// and does not scale by elapsed time.
pub mod consts {
    /// Arena dimensions (arena-local pixels, origin top-left, +y down)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 500.0;

    /// Gravity per gravity level (pixels/frame²)
    pub const GRAVITY_LOW: f32 = 0.25;
    pub const GRAVITY_NORMAL: f32 = 0.5;
    pub const GRAVITY_HIGH: f32 = 0.8;

    /// Energy kept after bouncing off a wall, the ceiling or the floor
    pub const WALL_DAMPING: f32 = 0.7;
    /// Energy kept after bouncing off an obstacle
    pub const OBSTACLE_DAMPING: f32 = 0.8;
    /// Below this speed a contact is resting, not a bounce
    pub const MIN_BOUNCE_VELOCITY: f32 = 1.0;
    /// Horizontal friction on floor contact
    pub const FLOOR_FRICTION_BOUNCE: f32 = 0.85;
    pub const FLOOR_FRICTION_REST: f32 = 0.98;
    /// Substitute distance when a body centre sits exactly on a surface
    pub const COLLISION_EPSILON: f32 = 1e-4;

    /// Bounces closer together than this grow the combo (milliseconds)
    pub const COMBO_WINDOW_MS: f64 = 1000.0;
    pub const MAX_COMBO: u32 = 10;

    /// Press/release closer than this is a tap, not a drag
    pub const TAP_THRESHOLD: f32 = 5.0;
    /// Tap launch velocity ranges
    pub const TAP_VX_RANGE: (f32, f32) = (-3.0, 3.0);
    pub const TAP_VY_RANGE: (f32, f32) = (-9.0, -4.0);
    /// Drag distance to launch speed
    pub const DRAG_VELOCITY_SCALE: f32 = 0.15;
    pub const MAX_LAUNCH_SPEED: f32 = 20.0;

    /// Body radius range (min inclusive, max exclusive)
    pub const BODY_RADIUS_MIN: f32 = 10.0;
    pub const BODY_RADIUS_MAX: f32 = 20.0;

    /// Body colors (0xRRGGBB)
    pub const BODY_PALETTE: [u32; 8] = [
        0xff6b6b, 0xfeca57, 0x48dbfb, 0x1dd1a1, 0xff9ff3, 0x54a0ff, 0x5f27cd, 0xff9f43,
    ];
}

/// Axis-aligned arena bounds every body is kept inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: consts::ARENA_WIDTH,
            height: consts::ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a circle lies fully inside the arena (with a small tolerance)
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        const TOLERANCE: f32 = 1e-3;
        center.x >= radius - TOLERANCE
            && center.x <= self.width - radius + TOLERANCE
            && center.y >= radius - TOLERANCE
            && center.y <= self.height - radius + TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_contains_circle() {
        let arena = Arena::default();
        assert!(arena.contains_circle(Vec2::new(400.0, 250.0), 12.0));
        assert!(arena.contains_circle(Vec2::new(12.0, 488.0), 12.0));
        assert!(!arena.contains_circle(Vec2::new(5.0, 250.0), 12.0));
        assert!(!arena.contains_circle(Vec2::new(400.0, 495.0), 12.0));
    }
}
