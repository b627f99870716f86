//! Simulation state and core types
//!
//! The `Simulation` is the explicit context the frame driver owns: body
//! registry, static obstacles, score/combo and the active gravity level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::launch::LaunchCommand;
use super::scoring::ScoreState;
use super::step::{BounceEvent, step_bodies};
use crate::consts::*;
use crate::settings::GravityLevel;
use crate::Arena;

/// A simulated circular body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed at creation, always > 0
    pub radius: f32,
    /// Display color (0xRRGGBB), ignored by physics
    pub color: u32,
}

impl Body {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, color: u32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            color,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The live set of bodies, in launch order
///
/// Bodies are only ever added one at a time or removed all at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
    /// Next body ID (never reused, survives `clear`)
    next_id: u32,
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a body and return its ID
    pub fn insert(&mut self, pos: Vec2, vel: Vec2, radius: f32, color: u32) -> u32 {
        let radius = if radius > 0.0 {
            radius
        } else {
            log::warn!("Rejected body radius {}, using {}", radius, BODY_RADIUS_MIN);
            BODY_RADIUS_MIN
        };

        let id = self.next_id;
        self.next_id += 1;
        self.bodies.push(Body::new(id, pos, vel, radius, color));
        id
    }

    /// Remove every body. IDs keep counting from where they were.
    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn as_mut_slice(&mut self) -> &mut [Body] {
        &mut self.bodies
    }
}

/// A static axis-aligned rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// The fixed obstacle layout of the default arena
pub const DEFAULT_OBSTACLES: [Obstacle; 6] = [
    Obstacle::new(100.0, 150.0, 120.0, 16.0),
    Obstacle::new(550.0, 150.0, 120.0, 16.0),
    Obstacle::new(250.0, 280.0, 100.0, 16.0),
    Obstacle::new(450.0, 300.0, 100.0, 16.0),
    Obstacle::new(80.0, 400.0, 90.0, 16.0),
    Obstacle::new(630.0, 400.0, 90.0, 16.0),
];

/// Render-facing view of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
}

/// Read-only state handed to the render collaborator each frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Bodies in launch order
    pub bodies: Vec<BodyView>,
    pub score: u64,
    pub combo: u32,
    pub obstacles: Vec<Obstacle>,
    /// Aim indicator (press point, current pointer) while a drag is active
    pub aim: Option<(Vec2, Vec2)>,
    /// Best persisted score, if any
    pub high_score: Option<u64>,
}

/// Complete mutable simulation context
#[derive(Debug, Clone)]
pub struct Simulation {
    pub arena: Arena,
    pub bodies: BodyRegistry,
    obstacles: Vec<Obstacle>,
    pub score: ScoreState,
    pub gravity: GravityLevel,
}

impl Simulation {
    /// Default arena with the six standard obstacles
    pub fn new(gravity: GravityLevel) -> Self {
        Self::with_layout(Arena::default(), DEFAULT_OBSTACLES.to_vec(), gravity)
    }

    pub fn with_layout(arena: Arena, obstacles: Vec<Obstacle>, gravity: GravityLevel) -> Self {
        Self {
            arena,
            bodies: BodyRegistry::new(),
            obstacles,
            score: ScoreState::new(),
            gravity,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Create a body from a launch command
    pub fn launch(&mut self, cmd: &LaunchCommand) -> u32 {
        let id = self
            .bodies
            .insert(cmd.origin, cmd.velocity, cmd.radius, cmd.color);
        log::debug!(
            "Launched body {} at ({:.1}, {:.1}) with velocity ({:.2}, {:.2})",
            id,
            cmd.origin.x,
            cmd.origin.y,
            cmd.velocity.x,
            cmd.velocity.y
        );
        id
    }

    /// Advance one frame: step physics, score bounces, decay the combo
    pub fn advance(&mut self, now_ms: f64) -> Vec<BounceEvent> {
        let events = step_bodies(
            self.bodies.as_mut_slice(),
            &self.obstacles,
            self.arena,
            self.gravity.acceleration(),
        );

        for event in &events {
            let combo = self.score.on_bounce(now_ms);
            log::debug!(
                "Bounce: body {} off {:?} (combo x{}, score {})",
                event.body_id,
                event.surface,
                combo,
                self.score.score
            );
        }

        self.score.decay(now_ms);
        events
    }

    /// Clear the session. Returns the final score when there is one to keep.
    pub fn reset(&mut self) -> Option<u64> {
        let final_score = self.score.reset();
        self.bodies.clear();
        final_score
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bodies: self
                .bodies
                .iter()
                .map(|b| BodyView {
                    pos: b.pos,
                    radius: b.radius,
                    color: b.color,
                })
                .collect(),
            score: self.score.score,
            combo: self.score.combo,
            obstacles: self.obstacles.clone(),
            aim: None,
            high_score: None,
        }
    }
}
