//! Bounce Sandbox entry point
//!
//! Native: a headless run that scripts launches into the arena and logs the
//! score as it changes. Web: everything is driven through `platform::Sandbox`.

#[cfg(not(target_arch = "wasm32"))]
mod native_demo {
    use std::path::PathBuf;

    use bounce_sandbox::persistence::{FileStorage, MemoryStorage, Storage};
    use bounce_sandbox::platform::{NativeLoop, now_ms};
    use bounce_sandbox::sim::Snapshot;
    use bounce_sandbox::{FrameDriver, GravityLevel, Render};
    use clap::Parser;
    use glam::Vec2;
    use log::LevelFilter;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn parse_gravity(s: &str) -> Result<GravityLevel, String> {
        GravityLevel::from_str(s).ok_or_else(|| format!("expected low, normal or high, got '{s}'"))
    }

    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Number of frames to simulate
        #[arg(long, default_value_t = 600)]
        frames: u64,

        /// Seed for launch randomness (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,

        /// Gravity level to use and persist (low, normal, high)
        #[arg(long, value_parser = parse_gravity)]
        gravity: Option<GravityLevel>,

        /// Directory for settings and high scores (in-memory if omitted)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Number of scripted launches
        #[arg(long, default_value_t = 8)]
        launches: u32,

        /// Pace frames at 60 Hz instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Log level (off, error, warn, info, debug, trace)
        #[arg(long, default_value = "info")]
        log_level: String,
    }

    /// Logs score and combo whenever they change
    #[derive(Default)]
    struct LogRenderer {
        last: Option<(u64, u32)>,
    }

    impl Render for LogRenderer {
        fn render(&mut self, snapshot: &Snapshot) {
            let current = (snapshot.score, snapshot.combo);
            if self.last != Some(current) {
                log::info!(
                    "Score {} | combo x{} | {} bodies",
                    snapshot.score,
                    snapshot.combo,
                    snapshot.bodies.len()
                );
                self.last = Some(current);
            }
        }
    }

    fn open_storage(dir: Option<PathBuf>) -> Box<dyn Storage> {
        match dir.map(FileStorage::open) {
            Some(Ok(storage)) => {
                log::info!("Persisting to {}", storage.dir().display());
                Box::new(storage)
            }
            Some(Err(e)) => {
                log::warn!("Cannot use data directory ({}), nothing will persist", e);
                Box::new(MemoryStorage::new())
            }
            None => Box::new(MemoryStorage::new()),
        }
    }

    pub fn run() {
        let args = Args::parse();

        let level = match args.log_level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();

        log::info!("Bounce Sandbox (native) starting...");

        let seed = args.seed.unwrap_or_else(|| now_ms() as u64);
        let mut driver = FrameDriver::new(open_storage(args.data_dir), seed);
        if let Some(gravity) = args.gravity {
            driver.set_gravity(gravity);
        }

        // Spread the launches over the first two thirds of the run
        let spacing = (args.frames * 2 / 3 / u64::from(args.launches.max(1))).max(1);
        let mut script_rng = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let mut launched = 0;

        let mut renderer = LogRenderer::default();
        driver.start();
        let frame_loop = NativeLoop::new(Some(args.frames), args.realtime);
        let frames = frame_loop.run(&mut driver, &mut renderer, |driver, frame, _| {
            if launched >= args.launches || frame % spacing != 0 {
                return;
            }
            launched += 1;

            let press = Vec2::new(
                script_rng.random_range(60.0..740.0),
                script_rng.random_range(40.0..120.0),
            );
            if script_rng.random_bool(0.5) {
                driver.tap(press);
            } else {
                // Slingshot: pull back and let go
                let pull = Vec2::new(
                    script_rng.random_range(-80.0..80.0),
                    script_rng.random_range(-40.0..20.0),
                );
                driver.press(press);
                driver.move_pointer(press + pull * 0.5);
                driver.release(press + pull);
            }
        });
        driver.stop();

        let score = driver.simulation().score.score;
        log::info!(
            "Ran {} frames: {} bounces, final score {}",
            frames,
            driver.bounces(),
            score
        );

        if let Some(rank) = driver.reset(now_ms()) {
            log::info!("Score {} placed #{} on the high score table", score, rank);
        }
        for (i, entry) in driver.high_scores().entries.iter().enumerate() {
            log::info!(
                "  #{} {} ({})",
                i + 1,
                entry.score,
                bounce_sandbox::highscores::format_date(entry.date, now_ms())
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native_demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
