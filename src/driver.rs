//! Frame driver
//!
//! Owns every piece of mutable session state and runs one frame at a time:
//! physics step, bounce scoring, passive combo decay, then a render hand-off.
//! The platform loop calls `frame` once per display refresh and only
//! reschedules while it returns `FrameControl::Continue`.

use std::cell::RefCell;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::highscores::HighScores;
use crate::input::AimGesture;
use crate::persistence::Storage;
use crate::settings::{GravityLevel, Settings};
use crate::sim::{LaunchCommand, Simulation, Snapshot, tap_velocity};

/// Render collaborator: reads a snapshot, never touches physics state
pub trait Render {
    fn render(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> Render for F {
    fn render(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Whether the platform loop should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

pub struct FrameDriver {
    sim: Simulation,
    gesture: AimGesture,
    settings: Settings,
    high_scores: HighScores,
    storage: Box<dyn Storage>,
    /// Launch randomness (seeded, reproducible per session)
    rng: Pcg32,
    seed: u64,
    running: bool,
    frames: u64,
    bounces: u64,
}

impl FrameDriver {
    /// Load settings and high scores from `storage` and build a fresh session
    pub fn new(storage: Box<dyn Storage>, seed: u64) -> Self {
        let settings = Settings::load(&*storage);
        let high_scores = HighScores::load(&*storage);
        log::info!(
            "Session created (seed: {}, gravity: {})",
            seed,
            settings.gravity.as_str()
        );

        Self {
            sim: Simulation::new(settings.gravity),
            gesture: AimGesture::new(),
            settings,
            high_scores,
            storage,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            running: false,
            frames: 0,
            bounces: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            log::info!("Frame loop started");
        }
        self.running = true;
    }

    /// Stop the loop. The next `frame` call does nothing and returns `Stop`.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Frame loop stopped after {} frames", self.frames);
        }
        self.running = false;
        self.gesture.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance physics and scoring by one frame without rendering.
    /// Returns the snapshot to draw, or `None` when stopped.
    pub fn step(&mut self, now_ms: f64) -> Option<Snapshot> {
        if !self.running {
            return None;
        }

        let events = self.sim.advance(now_ms);
        self.bounces += events.len() as u64;
        self.frames += 1;
        Some(self.snapshot())
    }

    /// Run one frame at `now_ms`
    pub fn frame(&mut self, now_ms: f64, renderer: &mut dyn Render) -> FrameControl {
        match self.step(now_ms) {
            Some(snapshot) => {
                renderer.render(&snapshot);
                FrameControl::Continue
            }
            None => FrameControl::Stop,
        }
    }

    /// Run one frame on a driver shared with the host
    ///
    /// The borrow ends before `renderer` runs, so a render callback may call
    /// back into the driver (stop, reset, input) without a double borrow.
    pub fn frame_shared(
        driver: &RefCell<FrameDriver>,
        now_ms: f64,
        renderer: &mut dyn Render,
    ) -> FrameControl {
        let stepped = driver.borrow_mut().step(now_ms);
        let Some(snapshot) = stepped else {
            return FrameControl::Stop;
        };
        renderer.render(&snapshot);

        if driver.borrow().is_running() {
            FrameControl::Continue
        } else {
            FrameControl::Stop
        }
    }

    /// Create a body directly
    pub fn launch(&mut self, cmd: &LaunchCommand) -> u32 {
        self.sim.launch(cmd)
    }

    /// Drop a body at `pos` with a random tap velocity
    pub fn tap(&mut self, pos: Vec2) -> u32 {
        let velocity = tap_velocity(&mut self.rng);
        let cmd = LaunchCommand::new(pos, velocity, &mut self.rng);
        self.sim.launch(&cmd)
    }

    pub fn press(&mut self, pos: Vec2) {
        self.gesture.press(pos);
    }

    pub fn move_pointer(&mut self, pos: Vec2) {
        self.gesture.move_to(pos);
    }

    /// Finish a gesture; returns the new body's ID if one was launched
    pub fn release(&mut self, pos: Vec2) -> Option<u32> {
        let cmd = self.gesture.release(pos, &mut self.rng)?;
        Some(self.sim.launch(&cmd))
    }

    /// Clear the arena and record the final score. `date_ms` is wall-clock
    /// Unix time for the high score entry. Returns the rank if it placed.
    pub fn reset(&mut self, date_ms: f64) -> Option<usize> {
        let cleared = self.sim.bodies.len();
        let final_score = self.sim.reset()?;
        log::info!("Reset: final score {} ({} bodies cleared)", final_score, cleared);

        let rank = self.high_scores.add_score(final_score, date_ms);
        if let Some(rank) = rank {
            log::info!("New high score #{}: {}", rank, final_score);
            self.high_scores.save(&mut *self.storage);
        }
        rank
    }

    /// Change gravity (takes effect next frame) and persist it
    pub fn set_gravity(&mut self, gravity: GravityLevel) {
        self.settings.gravity = gravity;
        self.sim.gravity = gravity;
        self.settings.save(&mut *self.storage);
    }

    /// Render snapshot of the current state
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.sim.snapshot();
        snapshot.aim = self.gesture.aim();
        snapshot.high_score = self.high_scores.top_score();
        snapshot
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Frames run since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Bounce events scored since creation
    pub fn bounces(&self) -> u64 {
        self.bounces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn driver() -> FrameDriver {
        FrameDriver::new(Box::new(MemoryStorage::new()), 1234)
    }

    #[test]
    fn test_stopped_driver_does_nothing() {
        let mut driver = driver();
        driver.tap(Vec2::new(400.0, 100.0));
        let before = driver.snapshot().bodies[0].pos;

        let mut rendered = 0;
        let control = driver.frame(16.0, &mut |_: &Snapshot| rendered += 1);

        assert_eq!(control, FrameControl::Stop);
        assert_eq!(rendered, 0);
        assert_eq!(driver.frames(), 0);
        assert_eq!(driver.snapshot().bodies[0].pos, before);
    }

    #[test]
    fn test_frame_steps_and_renders() {
        let mut driver = driver();
        driver.start();
        driver.tap(Vec2::new(400.0, 100.0));
        let before = driver.snapshot().bodies[0].pos;

        let mut seen = Vec::new();
        for i in 0..3 {
            let control = driver.frame(i as f64 * 16.0, &mut |s: &Snapshot| seen.push(s.bodies[0].pos));
            assert_eq!(control, FrameControl::Continue);
        }

        assert_eq!(driver.frames(), 3);
        assert_eq!(seen.len(), 3);
        assert_ne!(seen[0], before);
    }

    #[test]
    fn test_stop_cancels_further_frames() {
        let mut driver = driver();
        driver.start();
        assert_eq!(driver.frame(0.0, &mut |_: &Snapshot| {}), FrameControl::Continue);

        driver.stop();
        assert!(!driver.is_running());
        assert_eq!(driver.frame(16.0, &mut |_: &Snapshot| {}), FrameControl::Stop);
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn test_renderer_can_stop_a_shared_driver() {
        use std::rc::Rc;

        let shared = Rc::new(RefCell::new(driver()));
        shared.borrow_mut().start();
        shared.borrow_mut().tap(Vec2::new(400.0, 100.0));

        let handle = Rc::clone(&shared);
        let mut stop_on_render = move |_: &Snapshot| {
            let mut driver = handle.borrow_mut();
            driver.press(Vec2::new(10.0, 10.0));
            driver.stop();
        };

        assert_eq!(
            FrameDriver::frame_shared(&shared, 0.0, &mut stop_on_render),
            FrameControl::Stop
        );
        assert_eq!(
            FrameDriver::frame_shared(&shared, 16.0, &mut stop_on_render),
            FrameControl::Stop
        );
        assert_eq!(shared.borrow().frames(), 1);
        assert!(!shared.borrow().is_running());
    }

    #[test]
    fn test_shared_frame_continues_while_running() {
        let shared = RefCell::new(driver());
        shared.borrow_mut().start();

        let mut rendered = 0;
        for i in 0..4 {
            let control =
                FrameDriver::frame_shared(&shared, i as f64 * 16.0, &mut |_: &Snapshot| rendered += 1);
            assert_eq!(control, FrameControl::Continue);
        }
        assert_eq!(rendered, 4);
        assert_eq!(shared.borrow().frames(), 4);
    }

    #[test]
    fn test_gesture_launches_and_shows_aim() {
        let mut driver = driver();
        driver.press(Vec2::new(200.0, 200.0));
        driver.move_pointer(Vec2::new(180.0, 240.0));
        assert_eq!(
            driver.snapshot().aim,
            Some((Vec2::new(200.0, 200.0), Vec2::new(180.0, 240.0)))
        );

        let id = driver.release(Vec2::new(160.0, 280.0));
        assert!(id.is_some());
        assert!(driver.snapshot().aim.is_none());
        assert_eq!(driver.simulation().bodies.len(), 1);
    }

    #[test]
    fn test_reset_with_nothing_scored_is_noop() {
        let mut driver = driver();
        assert_eq!(driver.reset(0.0), None);
        assert!(driver.high_scores().is_empty());
        assert_eq!(driver.simulation().score.score, 0);
        assert!(driver.simulation().bodies.is_empty());
    }

    #[test]
    fn test_set_gravity_applies_to_simulation() {
        let mut driver = driver();
        driver.set_gravity(GravityLevel::Low);
        assert_eq!(driver.simulation().gravity, GravityLevel::Low);
        assert_eq!(driver.settings().gravity, GravityLevel::Low);
    }
}
