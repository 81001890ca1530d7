//! Headless tile platformer driver.
//!
//! Loads one or more levels, plays them with scripted random input for a
//! fixed number of ticks, and logs what happened. Useful to exercise the
//! simulation core without a renderer:
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --ticks 2000 --seed 7 --debug
//! ```
//!
//! When the player dies the driver waits two seconds of simulation time and
//! restarts the level, as a front end would after its death screen.

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};
use rustc_hash::FxHashMap;

use tileplat::components::animation::AnimationMachine;
use tileplat::components::mapposition::MapPosition;
use tileplat::components::rigidbody::RigidBody;
use tileplat::events::gameplay::GameplayEvent;
use tileplat::game::Simulation;
use tileplat::resources::gameconfig::GameConfig;
use tileplat::resources::gamestate::SessionState;
use tileplat::resources::input::{Action, InputState};
use tileplat::resources::tileworld::{TilePalette, TileWorld, WorldLoadError};

/// Level used when no `--level` is given.
const DEMO_LEVEL: [&str; 6] = [
    "                        ",
    "                        ",
    "      l   l             ",
    "    bbbbbbbbb      l    ",
    " p             m        ",
    "bbbbbbbbbbbbbbbbbbbbbb.b",
];

const RESPAWN_DELAY_MS: u32 = 2000;

/// Tile platformer simulation, run headless.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Level file (character grid). Repeat to play several levels in order.
    #[arg(long, value_name = "PATH")]
    level: Vec<PathBuf>,

    /// Tile palette in JSON. The built-in palette is used if omitted.
    #[arg(long, value_name = "PATH")]
    palette: Option<PathBuf>,

    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 1000)]
    ticks: u32,

    /// Seed for the scripted input.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Trace every actor every tick at debug level.
    #[arg(long)]
    debug: bool,
}

/// Random button presses that look vaguely like someone playing.
struct ScriptedInput {
    rng: fastrand::Rng,
    direction: Option<Action>,
    direction_ms: u32,
    attack_ms: u32,
}

impl ScriptedInput {
    fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            direction: None,
            direction_ms: 0,
            attack_ms: 0,
        }
    }

    fn drive(&mut self, input: &mut InputState, dt_ms: u32) {
        if self.direction_ms <= dt_ms {
            self.direction = match self.rng.u8(0..20) {
                0..=11 => Some(Action::Right),
                12..=16 => Some(Action::Left),
                _ => None,
            };
            self.direction_ms = self.rng.u32(200..1200);
        } else {
            self.direction_ms -= dt_ms;
        }
        input.set(Action::Left, self.direction == Some(Action::Left));
        input.set(Action::Right, self.direction == Some(Action::Right));

        input.set(Action::Jump, self.rng.f32() < 0.04);

        if self.attack_ms > dt_ms {
            self.attack_ms -= dt_ms;
        } else if self.attack_ms > 0 {
            self.attack_ms = 0;
        } else if self.rng.f32() < 0.01 {
            self.attack_ms = self.rng.u32(150..400);
        }
        input.set(Action::Attack, self.attack_ms > 0);

        input.set(
            Action::Crouch,
            self.direction.is_none() && self.rng.f32() < 0.05,
        );
    }
}

fn load_levels(cli: &Cli, config: &GameConfig) -> Result<Vec<TileWorld>, WorldLoadError> {
    let palette = match &cli.palette {
        Some(path) => TilePalette::load(path)?,
        None => TilePalette::default(),
    };
    if cli.level.is_empty() {
        info!("No level given, playing the demo level");
        return Ok(vec![TileWorld::from_rows(
            &DEMO_LEVEL,
            &palette,
            config.tile_size(),
        )?]);
    }
    cli.level
        .iter()
        .map(|path| TileWorld::load(path, &palette, config.tile_size()))
        .collect()
}

fn log_player(simulation: &Simulation) {
    let Some(player) = simulation.player() else {
        info!("No player on the map");
        return;
    };
    let world = simulation.world();
    if let (Some(position), Some(body), Some(animation)) = (
        world.get::<MapPosition>(player),
        world.get::<RigidBody>(player),
        world.get::<AnimationMachine>(player),
    ) {
        info!(
            "Player at {:?} moving {:?}, animation {}",
            position.pos,
            body.velocity,
            animation.current_name().unwrap_or("none")
        );
    }
}

fn run(cli: Cli) -> Result<(), WorldLoadError> {
    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{e}; using default configuration");
    }
    let levels = load_levels(&cli, &config)?;
    let tick_ms = config.tick_ms.max(1);

    let mut simulation = Simulation::new(config, levels);
    simulation.set_debug(cli.debug);
    let mut script = ScriptedInput::new(cli.seed);
    let mut sounds: FxHashMap<&'static str, u32> = FxHashMap::default();
    let mut dead_ms = 0;

    for _ in 0..cli.ticks {
        match simulation.session().state() {
            SessionState::Finished => break,
            SessionState::Dead => {
                dead_ms += tick_ms;
                if dead_ms >= RESPAWN_DELAY_MS {
                    dead_ms = 0;
                    simulation.reload_level();
                }
            }
            SessionState::Playing | SessionState::LevelComplete => {}
        }

        script.drive(&mut simulation.input_mut(), tick_ms);
        for event in simulation.advance(tick_ms) {
            if let GameplayEvent::Sound(name) = event {
                *sounds.entry(name).or_default() += 1;
            }
        }
    }

    let session = simulation.session();
    info!(
        "Stopped after {} ticks ({:.1} s): level {} of {}, {:?}, score {}",
        simulation.time().ticks,
        simulation.time().elapsed,
        session.level + 1,
        simulation.level_count(),
        session.state(),
        session.score
    );
    log_player(&simulation);
    let mut played: Vec<_> = sounds.into_iter().collect();
    played.sort();
    for (name, count) in played {
        info!("sound {name}: {count}");
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}
