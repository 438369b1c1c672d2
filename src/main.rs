//! Arena Survival headless runner
//!
//! Plays a scripted session on a fixed timestep and logs what happened.
//! Usage: `arena-survival [config.json] [seed]`

use arena_survival::Config;
use arena_survival::Time;
use arena_survival::consts::*;
use arena_survival::sim::{HudStatus, ObstacleOverlap, SimEvent, SimulationState, TickInput, tick_with_signal};

/// Frame length of the pretend presenter (30 fps, two sim steps per frame)
const FRAME_DT: f32 = 1.0 / 30.0;
/// Length of the scripted session (seconds)
const SESSION_LENGTH: f32 = 20.0;

/// Driver holding all state
struct Game {
    config: Config,
    state: SimulationState,
    collision: ObstacleOverlap,
    accumulator: f32,
    ticks: u64,
    now: Time,
}

/// Simulation time after `ticks` fixed steps
fn sim_time(ticks: u64) -> Time {
    ticks as f32 * SIM_DT
}

impl Game {
    fn new(config: Config, seed: u64) -> Self {
        let state = SimulationState::new(&config, seed, 0.0);
        Self {
            config,
            state,
            collision: ObstacleOverlap,
            accumulator: 0.0,
            ticks: 0,
            now: 0.0,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.ticks += 1;
            self.now = sim_time(self.ticks);
            let input = scripted_input(self.now);
            tick_with_signal(
                &mut self.state,
                &self.config,
                &input,
                &mut self.collision,
                self.now,
                SIM_DT,
            );
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in self.state.events() {
                report(event, self.now);
            }
        }
    }
}

/// Idle through spawn protection, walk, ground jump, release, double jump,
/// then stand still long enough to regenerate
fn scripted_input(now: Time) -> TickInput {
    let mut input = TickInput::default();
    match now {
        t if t < 3.5 => {}
        t if t < 5.0 => input.forward = true,
        t if t < 5.1 => {
            input.forward = true;
            input.jump = true;
        }
        t if t < 5.2 => input.forward = true,
        t if t < 5.3 => input.jump = true,
        t if t < 8.0 => input.turn_left = true,
        t if t < 9.0 => input.look_delta = 0.02,
        _ => {}
    }
    input
}

fn report(event: &SimEvent, now: Time) {
    match event {
        SimEvent::SessionEnded { survival_seconds } => {
            log::info!("[{:6.2}] session ended after {:.1}s", now, survival_seconds)
        }
        SimEvent::ViolationRecorded { count, escalated } => {
            log::info!("[{:6.2}] violation #{} (escalated: {})", now, count, escalated)
        }
        other => log::debug!("[{:6.2}] {:?}", now, other),
    }
}

fn load_config(path: Option<String>) -> Result<Config, arena_survival::ConfigError> {
    match path {
        Some(path) => Config::load(path),
        None => {
            log::info!("No config file given, using defaults");
            Ok(Config::default())
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Arena Survival (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match load_config(args.next()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        None => 0,
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::error!("Invalid seed: {}", e);
            std::process::exit(1);
        }
    };

    let mut game = Game::new(config, seed);
    while game.now < SESSION_LENGTH && game.state.session.running {
        game.update(FRAME_DT);
    }

    let hud = HudStatus::from_state(&game.state, &game.config, game.now);
    log::info!(
        "Finished at {:.2}s: health {:.0}/{:.0} ({:?}), survived {}s, {} obstacles",
        game.now,
        hud.health,
        hud.max_health,
        hud.band,
        hud.survival_seconds,
        game.state.agents.len()
    );
    match serde_json::to_string_pretty(&hud) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize status: {}", e),
    }
}
