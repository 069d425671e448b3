#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Bastion session.

mod session;
mod session_log;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use bastion_rendering::{Color, Presentation, RenderingBackend};
use bastion_rendering_macroquad::MacroquadBackend;
use bastion_world::{LevelConfig, TileMap};
use clap::Parser;
use log::LevelFilter;

use self::{
    session::{Session, StopPolicy},
    session_log::SessionLog,
};

const WINDOW_TITLE: &str = "Tower Defense";

/// Command-line arguments accepted by the Bastion binary.
#[derive(Debug, Parser)]
#[command(name = "bastion", about = "Place towers, then survive the swarm.")]
struct CliArgs {
    /// TOML file overriding level tuning constants.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Tile map file with 20 rows of 25 tile codes.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,

    /// Seed for the enemy spawner.
    #[arg(long)]
    seed: Option<u64>,

    /// File the session log is written to.
    #[arg(long, value_name = "PATH", default_value = "game_log.txt")]
    log_file: PathBuf,

    /// Run without a window, stopping once the session is won.
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames.
    #[arg(long, value_name = "COUNT")]
    frames: Option<u32>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
}

/// Entry point for the Bastion command-line interface.
fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(error) = SessionLog::open(&args.log_file, LevelFilter::Info).install() {
        eprintln!("Failed to install session log: {error}");
    }

    let result = run(args);
    if let Err(error) = &result {
        log::error!("{error:#}");
        eprintln!("Game Crash: {error:#}");
    }

    session_log::close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(args: CliArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => LevelConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let map = args.map.as_deref().map(load_map).transpose()?;

    let presentation = Presentation::new(
        WINDOW_TITLE,
        Color::new(0.0, 0.0, 0.0, 1.0),
        config.arena_width,
        config.arena_height,
        config.frames_per_second,
    );
    let policy = StopPolicy {
        frame_cap: args.frames,
        stop_when_over: args.headless,
    };
    let mut session = Session::new(config, map, policy);
    log::info!("Game Engine started");

    if args.headless {
        bastion_rendering::HeadlessBackend::new(args.frames)
            .run(presentation, move |input, surface| session.frame(input, surface))
    } else {
        MacroquadBackend::new()
            .with_vsync(args.vsync)
            .run(presentation, move |input, surface| session.frame(input, surface))
    }
}

fn load_config(path: &Path) -> Result<LevelConfig> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&source).with_context(|| format!("failed to parse config {}", path.display()))
}

fn load_map(path: &Path) -> Result<TileMap> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read map {}", path.display()))?;
    TileMap::parse(&source).with_context(|| format!("failed to parse map {}", path.display()))
}
