#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use bastion_core::{Command, EnemyKind, Event, Point};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval_frames: u32,
    arena_width: u32,
    arena_height: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, arena size and seed.
    #[must_use]
    pub const fn new(interval_frames: u32, arena_width: u32, arena_height: u32, rng_seed: u64) -> Self {
        Self {
            interval_frames,
            arena_width,
            arena_height,
            rng_seed,
        }
    }
}

/// Arena edge an enemy enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Pure system that emits spawn commands once the spawn phase has started.
#[derive(Debug)]
pub struct Spawning {
    interval_frames: u32,
    arena_width: u32,
    arena_height: u32,
    timer: u32,
    active: bool,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval_frames: config.interval_frames,
            arena_width: config.arena_width,
            arena_height: config.arena_height,
            timer: 0,
            active: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Frames accumulated toward the next spawn.
    #[must_use]
    pub const fn timer(&self) -> u32 {
        self.timer
    }

    /// Reports whether the spawn phase is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Consumes the events of one frame and emits spawn commands.
    ///
    /// `Event::SpawnPhaseStarted` arms the timer and `Event::SessionWon`
    /// disarms it. Every `Event::TimeAdvanced` observed while armed counts as
    /// one frame, including the frame that armed it.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SpawnPhaseStarted => self.active = true,
                Event::SessionWon => {
                    self.active = false;
                    self.timer = 0;
                }
                _ => {}
            }
        }

        if !self.active || self.interval_frames == 0 {
            return;
        }

        let frames = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();

        for _ in 0..frames {
            self.timer += 1;
            if self.timer >= self.interval_frames {
                self.timer = 0;
                let position = self.entry_point();
                let kind = self.next_kind();
                out.push(Command::SpawnEnemy { kind, position });
            }
        }
    }

    fn entry_point(&mut self) -> Point {
        let width = self.arena_width.max(1);
        let height = self.arena_height.max(1);

        match self.next_edge() {
            Edge::Top => Point::new(self.rng.gen_range(0..width) as f32, 0.0),
            Edge::Bottom => Point::new(self.rng.gen_range(0..width) as f32, height as f32),
            Edge::Left => Point::new(0.0, self.rng.gen_range(0..height) as f32),
            Edge::Right => Point::new(width as f32, self.rng.gen_range(0..height) as f32),
        }
    }

    fn next_edge(&mut self) -> Edge {
        match self.rng.gen_range(0..4) {
            0 => Edge::Top,
            1 => Edge::Bottom,
            2 => Edge::Left,
            _ => Edge::Right,
        }
    }

    fn next_kind(&mut self) -> EnemyKind {
        if self.rng.gen_bool(0.5) {
            EnemyKind::Goblin
        } else {
            EnemyKind::Orc
        }
    }
}
