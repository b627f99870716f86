//! Collision detection and response for circles against rectangles
//!
//! Bodies are circles, obstacles are axis-aligned rectangles. The contact
//! normal comes from the closest point on the rectangle to the circle centre.

use glam::Vec2;

use super::state::{Body, Obstacle};
use crate::consts::COLLISION_EPSILON;

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Resolve overlap between a body and an obstacle
///
/// Pushes the body out of the rectangle along the contact normal and, if it
/// was moving into the surface, reflects its velocity and scales it by
/// `damping`. Returns true whenever the two overlapped, even if the velocity
/// was left alone (resting contact).
pub fn resolve_circle_rect(body: &mut Body, rect: &Obstacle, damping: f32) -> bool {
    let closest = rect.closest_point(body.pos);
    let delta = body.pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= body.radius * body.radius {
        return false;
    }

    // Centre on or inside the rectangle: no usable direction, eject upward.
    // Any non-zero offset, however small, keeps its own direction.
    let (normal, dist) = match delta.try_normalize() {
        Some(normal) => (normal, dist_sq.sqrt()),
        None => (Vec2::NEG_Y, COLLISION_EPSILON),
    };

    let approach = body.vel.dot(normal);
    if approach < 0.0 {
        body.vel = reflect_velocity(body.vel, normal) * damping;
    }

    body.pos += normal * (body.radius - dist);
    true
}
