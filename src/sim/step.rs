//! Per-frame physics step
//!
//! One call advances every body by one frame: gravity, position, arena
//! boundaries, then obstacles. Each contact is resolved immediately, so later
//! checks in the same frame see the corrected position.

use glam::Vec2;

use super::collision::resolve_circle_rect;
use super::state::{Body, Obstacle};
use crate::Arena;
use crate::consts::*;

/// What a body bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    LeftWall,
    RightWall,
    Ceiling,
    Floor,
    /// Index into the obstacle list
    Obstacle(usize),
}

/// A collision energetic enough to count for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BounceEvent {
    pub body_id: u32,
    pub surface: Surface,
}

/// Outcome of a boundary contact on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    /// Reflected and damped
    Bounce,
    /// Too slow to bounce; component zeroed
    Rest,
    /// Already heading back inside; velocity untouched
    Leaving,
}

/// Resolve the velocity component of a boundary contact
///
/// `outward` is +1.0 when a positive component points through the boundary
/// and -1.0 when a negative one does.
fn resolve_axis(component: &mut f32, outward: f32) -> Contact {
    let outward_speed = *component * outward;
    if outward_speed > MIN_BOUNCE_VELOCITY {
        *component = -*component * WALL_DAMPING;
        Contact::Bounce
    } else if outward_speed > 0.0 {
        *component = 0.0;
        Contact::Rest
    } else {
        Contact::Leaving
    }
}

/// Advance a single body by one frame, appending any bounce events
pub fn step_body(
    body: &mut Body,
    obstacles: &[Obstacle],
    arena: Arena,
    gravity: f32,
    events: &mut Vec<BounceEvent>,
) {
    let r = body.radius;
    let body_id = body.id;
    let mut bounce = |surface: Surface| events.push(BounceEvent { body_id, surface });

    body.vel.y += gravity;
    body.pos += body.vel;

    if body.pos.x - r < 0.0 {
        body.pos.x = r;
        if resolve_axis(&mut body.vel.x, -1.0) == Contact::Bounce {
            bounce(Surface::LeftWall);
        }
    }

    if body.pos.x + r > arena.width {
        body.pos.x = arena.width - r;
        if resolve_axis(&mut body.vel.x, 1.0) == Contact::Bounce {
            bounce(Surface::RightWall);
        }
    }

    if body.pos.y - r < 0.0 {
        body.pos.y = r;
        if resolve_axis(&mut body.vel.y, -1.0) == Contact::Bounce {
            bounce(Surface::Ceiling);
        }
    }

    if body.pos.y + r > arena.height {
        body.pos.y = arena.height - r;
        // Rolling friction: rougher on impact than while resting
        if resolve_axis(&mut body.vel.y, 1.0) == Contact::Bounce {
            body.vel.x *= FLOOR_FRICTION_BOUNCE;
            bounce(Surface::Floor);
        } else {
            body.vel.x *= FLOOR_FRICTION_REST;
        }
    }

    for (index, rect) in obstacles.iter().enumerate() {
        if resolve_circle_rect(body, rect, OBSTACLE_DAMPING) && body.speed() > MIN_BOUNCE_VELOCITY
        {
            bounce(Surface::Obstacle(index));
        }
    }

    // Obstacle push-out must never leave the arena
    body.pos = body.pos.clamp(
        Vec2::splat(r),
        Vec2::new(arena.width - r, arena.height - r).max(Vec2::splat(r)),
    );
}

/// Advance every body by one frame and collect the bounce events
pub fn step_bodies(
    bodies: &mut [Body],
    obstacles: &[Obstacle],
    arena: Arena,
    gravity: f32,
) -> Vec<BounceEvent> {
    let mut events = Vec::new();
    for body in bodies.iter_mut() {
        step_body(body, obstacles, arena, gravity, &mut events);
    }
    events
}
