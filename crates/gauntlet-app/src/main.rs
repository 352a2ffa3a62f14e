//! GAUNTLET command-line runner.
//!
//! Plays one round with the autopilot and prints a JSON report to stdout.
//! Logs go to stderr; set `RUST_LOG` to change the filter.
//!
//! ```bash
//! gauntlet --seed 7 --seconds 45
//! gauntlet --config level.json --realtime
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gauntlet_app::autoplay::{self, AutoplayReport, Pilot};
use gauntlet_app::error::{AppError, Result};
use gauntlet_app::game_loop;
use gauntlet_core::config::GameConfig;

#[derive(Parser)]
#[command(name = "gauntlet")]
#[command(about = "Headless runner for the GAUNTLET simulation core")]
#[command(version)]
struct Cli {
    /// JSON config file; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many simulated seconds
    #[arg(long, default_value = "60")]
    seconds: f64,

    /// Frames between autopilot shots
    #[arg(long, default_value = "6")]
    fire_every: u32,

    /// Autopilot engage range in meters
    #[arg(long, default_value = "12")]
    engage_range: f64,

    /// Run on the real-time game loop thread instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    for problem in config.validate() {
        warn!("{problem}");
    }

    let mut pilot = Pilot::new(cli.engage_range, cli.fire_every);
    info!(seed = config.seed, realtime = cli.realtime, "starting round");

    let report = if cli.realtime {
        run_realtime(config, &mut pilot, cli.seconds)?
    } else {
        autoplay::run_autoplay(config, &mut pilot, cli.seconds)
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GameConfig::from_json_str(&text)?)
}

/// Drive the threaded game loop from this thread, polling snapshots.
fn run_realtime(config: GameConfig, pilot: &mut Pilot, max_secs: f64) -> Result<AutoplayReport> {
    let seed = config.seed;
    let handle = game_loop::spawn_game_loop(config, |_| {})?;
    let deadline = Instant::now() + Duration::from_secs_f64(max_secs.max(0.0));

    let mut last_frame = None;
    let mut latest = None;
    while Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(16));
        let Some(snapshot) = handle.snapshot() else {
            continue;
        };
        if last_frame == Some(snapshot.time.frame) {
            continue;
        }
        last_frame = Some(snapshot.time.frame);

        for command in pilot.decide(&snapshot) {
            handle.send(command)?;
        }
        let finished = snapshot.state.is_finished();
        latest = Some(snapshot);
        if finished {
            break;
        }
    }

    handle.shutdown()?;
    let snapshot = latest.ok_or(AppError::LoopStopped)?;
    Ok(autoplay::report(seed, &snapshot))
}
