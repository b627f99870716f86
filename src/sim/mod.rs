//! Simulation module
//!
//! All physics and scoring lives here. This module has no rendering or
//! platform dependencies:
//! - One step per frame, no wall-clock scaling
//! - Time only enters through the `now_ms` passed to scoring
//! - Randomness only through an injected `rand::Rng`
//! - Stable iteration order (launch order)

pub mod collision;
pub mod launch;
pub mod scoring;
pub mod state;
pub mod step;

pub use collision::{reflect_velocity, resolve_circle_rect};
pub use launch::{LaunchCommand, drag_velocity, launch_from_gesture, tap_velocity};
pub use scoring::ScoreState;
pub use state::{
    Body, BodyRegistry, BodyView, DEFAULT_OBSTACLES, Obstacle, Simulation, Snapshot,
};
pub use step::{BounceEvent, Surface, step_bodies, step_body};
