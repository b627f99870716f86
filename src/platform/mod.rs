//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Frame scheduling (requestAnimationFrame on web, a paced loop on native)
//! - The JS-facing sandbox handle (web)

/// Wall-clock time in Unix milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time in Unix milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeLoop;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{Duration, Instant};

    use crate::driver::{FrameControl, FrameDriver, Render};

    /// Display refresh the native loop paces itself to
    const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

    /// Native stand-in for requestAnimationFrame
    ///
    /// Runs frames until the driver stops or `max_frames` is reached. With
    /// `realtime` off, frames run back to back on a simulated 60 Hz clock.
    #[derive(Debug, Clone)]
    pub struct NativeLoop {
        pub max_frames: Option<u64>,
        pub realtime: bool,
        /// Start of the simulated clock (Unix ms)
        pub start_ms: f64,
    }

    impl NativeLoop {
        pub fn new(max_frames: Option<u64>, realtime: bool) -> Self {
            Self {
                max_frames,
                realtime,
                start_ms: super::now_ms(),
            }
        }

        fn clock_ms(&self, frame: u64, started: Instant) -> f64 {
            if self.realtime {
                self.start_ms + started.elapsed().as_secs_f64() * 1000.0
            } else {
                self.start_ms + frame as f64 * FRAME_INTERVAL.as_secs_f64() * 1000.0
            }
        }

        /// Drive `driver` until it stops. `between_frames` runs before each
        /// frame, where input would be delivered. Returns frames run.
        pub fn run(
            &self,
            driver: &mut FrameDriver,
            renderer: &mut dyn Render,
            mut between_frames: impl FnMut(&mut FrameDriver, u64, f64),
        ) -> u64 {
            let started = Instant::now();
            let mut frame = 0;

            while self.max_frames.is_none_or(|max| frame < max) {
                let now = self.clock_ms(frame, started);
                between_frames(driver, frame, now);

                if driver.frame(now, renderer) == FrameControl::Stop {
                    break;
                }
                frame += 1;

                if self.realtime {
                    let next = started + FRAME_INTERVAL * frame as u32;
                    if let Some(wait) = next.checked_duration_since(Instant::now()) {
                        std::thread::sleep(wait);
                    }
                }
            }

            frame
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::persistence::MemoryStorage;
        use crate::sim::Snapshot;

        #[test]
        fn test_runs_until_frame_limit() {
            let mut driver = FrameDriver::new(Box::new(MemoryStorage::new()), 3);
            driver.start();
            let lp = NativeLoop::new(Some(30), false);

            let mut rendered = 0;
            let frames = lp.run(&mut driver, &mut |_: &Snapshot| rendered += 1, |_, _, _| {});

            assert_eq!(frames, 30);
            assert_eq!(rendered, 30);
        }

        #[test]
        fn test_stops_when_driver_stops() {
            let mut driver = FrameDriver::new(Box::new(MemoryStorage::new()), 3);
            driver.start();
            let lp = NativeLoop::new(None, false);

            let frames = lp.run(&mut driver, &mut |_: &Snapshot| {}, |d, frame, _| {
                if frame == 12 {
                    d.stop();
                }
            });

            assert_eq!(frames, 12);
            assert_eq!(driver.frames(), 12);
        }

        #[test]
        fn test_simulated_clock_advances_per_frame() {
            let lp = NativeLoop {
                max_frames: Some(3),
                realtime: false,
                start_ms: 0.0,
            };
            let mut driver = FrameDriver::new(Box::new(MemoryStorage::new()), 3);
            driver.start();

            let mut times = Vec::new();
            lp.run(&mut driver, &mut |_: &Snapshot| {}, |_, _, now| times.push(now));

            assert_eq!(times.len(), 3);
            assert_eq!(times[0], 0.0);
            assert!((times[2] - 2.0 * 16.667).abs() < 1e-6);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{AnimationLoop, Sandbox};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use crate::driver::{FrameControl, FrameDriver, Render};
    use crate::persistence::{LocalStorage, MemoryStorage, Storage};
    use crate::settings::GravityLevel;
    use crate::sim::Snapshot;

    type FrameCallback = Closure<dyn FnMut(f64)>;

    struct LoopState {
        callback: RefCell<Option<FrameCallback>>,
        request_id: Cell<Option<i32>>,
        cancelled: Cell<bool>,
        /// Set while the callback itself is on the stack
        in_frame: Cell<bool>,
    }

    impl LoopState {
        fn schedule(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let callback = self.callback.borrow();
            if let Some(cb) = callback.as_ref() {
                match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => self.request_id.set(Some(id)),
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }

        /// Drop the callback, breaking the callback -> state reference cycle.
        /// A callback that is still executing is dropped on the next tick.
        fn release(&self) {
            let Some(callback) = self.callback.borrow_mut().take() else {
                return;
            };
            if !self.in_frame.get() {
                drop(callback);
                return;
            }

            let deferred = Closure::once_into_js(move || drop(callback));
            let scheduled = web_sys::window()
                .map(|window| window.set_timeout_with_callback(deferred.unchecked_ref()));
            if !matches!(scheduled, Some(Ok(_))) {
                log::warn!("Could not defer frame callback release; it will leak");
            }
        }
    }

    /// A requestAnimationFrame loop that can be cancelled
    ///
    /// Dropping the handle cancels the pending frame and releases the
    /// callback, so no recurring callback outlives its owner. Cancelling from
    /// inside a render callback is allowed.
    pub struct AnimationLoop {
        state: Rc<LoopState>,
    }

    impl AnimationLoop {
        pub fn start<R: Render + 'static>(driver: Rc<RefCell<FrameDriver>>, mut renderer: R) -> Self {
            let state = Rc::new(LoopState {
                callback: RefCell::new(None),
                request_id: Cell::new(None),
                cancelled: Cell::new(false),
                in_frame: Cell::new(false),
            });

            let loop_state = Rc::clone(&state);
            let callback = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                loop_state.request_id.set(None);
                if loop_state.cancelled.get() {
                    return;
                }

                loop_state.in_frame.set(true);
                let control = FrameDriver::frame_shared(&driver, time, &mut renderer);
                loop_state.in_frame.set(false);

                if control == FrameControl::Continue && !loop_state.cancelled.get() {
                    loop_state.schedule();
                }
            });

            *state.callback.borrow_mut() = Some(callback);
            state.schedule();
            Self { state }
        }

        pub fn cancel(&self) {
            self.state.cancelled.set(true);
            if let Some(id) = self.state.request_id.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
            self.state.release();
        }
    }

    impl Drop for AnimationLoop {
        fn drop(&mut self) {
            self.cancel();
        }
    }

    /// Hands each snapshot to a JS callback as JSON
    struct JsRender {
        callback: js_sys::Function,
    }

    impl Render for JsRender {
        fn render(&mut self, snapshot: &Snapshot) {
            match serde_json::to_string(snapshot) {
                Ok(json) => {
                    let _ = self.callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
                }
                Err(e) => log::warn!("Snapshot encode failed: {}", e),
            }
        }
    }

    /// JS-facing sandbox owned by the host view
    #[wasm_bindgen]
    pub struct Sandbox {
        driver: Rc<RefCell<FrameDriver>>,
        frame_loop: Option<AnimationLoop>,
    }

    #[wasm_bindgen]
    impl Sandbox {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Sandbox {
            let storage: Box<dyn Storage> = match LocalStorage::open() {
                Ok(storage) => Box::new(storage),
                Err(e) => {
                    log::warn!("LocalStorage unavailable ({}), nothing will persist", e);
                    Box::new(MemoryStorage::new())
                }
            };
            let seed = super::now_ms() as u64;
            Sandbox {
                driver: Rc::new(RefCell::new(FrameDriver::new(storage, seed))),
                frame_loop: None,
            }
        }

        /// Start the frame loop; `render` receives a JSON snapshot each frame
        pub fn start(&mut self, render: js_sys::Function) {
            self.stop();
            self.driver.borrow_mut().start();
            self.frame_loop = Some(AnimationLoop::start(
                Rc::clone(&self.driver),
                JsRender { callback: render },
            ));
        }

        /// Stop rescheduling (call on view teardown)
        pub fn stop(&mut self) {
            if let Some(frame_loop) = self.frame_loop.take() {
                frame_loop.cancel();
            }
            self.driver.borrow_mut().stop();
        }

        pub fn press(&mut self, x: f32, y: f32) {
            self.driver.borrow_mut().press(Vec2::new(x, y));
        }

        pub fn move_pointer(&mut self, x: f32, y: f32) {
            self.driver.borrow_mut().move_pointer(Vec2::new(x, y));
        }

        pub fn release(&mut self, x: f32, y: f32) {
            self.driver.borrow_mut().release(Vec2::new(x, y));
        }

        pub fn reset(&mut self) {
            self.driver.borrow_mut().reset(super::now_ms());
        }

        /// Set gravity by name ("low", "normal", "high"); unknown names are ignored
        pub fn set_gravity(&mut self, name: &str) {
            match GravityLevel::from_str(name) {
                Some(level) => self.driver.borrow_mut().set_gravity(level),
                None => log::warn!("Unknown gravity level: {}", name),
            }
        }

        /// High score table as JSON
        pub fn high_scores_json(&self) -> String {
            serde_json::to_string(self.driver.borrow().high_scores()).unwrap_or_default()
        }
    }

    impl Default for Sandbox {
        fn default() -> Self {
            Self::new()
        }
    }

    #[wasm_bindgen(start)]
    pub fn wasm_start() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Bounce Sandbox module loaded");
    }
}
