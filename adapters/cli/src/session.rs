//! Per-frame glue between an adapter, the builder system and the level.

use anyhow::{Context, Result};
use bastion_core::{render::TextureService, Command, Event, Point, TowerKind};
use bastion_rendering::{FrameControl, FrameInput, Surface};
use bastion_system_builder::{Builder, BuilderInput};
use bastion_world::{self as world, query, Level, LevelConfig, TileMap};

/// When a session stops on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StopPolicy {
    /// Stop after this many frames.
    pub(crate) frame_cap: Option<u32>,
    /// Stop on the frame the session is won.
    pub(crate) stop_when_over: bool,
}

/// One play session driven frame by frame by a rendering backend.
///
/// The level is built lazily on the first frame, once the backend can hand
/// out textures.
#[derive(Debug)]
pub(crate) struct Session {
    config: LevelConfig,
    map: Option<TileMap>,
    level: Option<Level>,
    builder: Builder,
    events: Vec<Event>,
    commands: Vec<Command>,
    frames: u32,
    policy: StopPolicy,
}

impl Session {
    pub(crate) fn new(config: LevelConfig, map: Option<TileMap>, policy: StopPolicy) -> Self {
        Self {
            config,
            map,
            level: None,
            builder: Builder::new(),
            events: Vec::new(),
            commands: Vec::new(),
            frames: 0,
            policy,
        }
    }

    fn start(&mut self, textures: &mut dyn TextureService) -> Result<Level> {
        let mut level =
            Level::new(self.config.clone(), textures).context("failed to initialise level")?;
        if let Some(map) = self.map.take() {
            level.load_map(map);
        }
        Ok(level)
    }

    /// Runs input, update and render for one frame.
    pub(crate) fn frame(
        &mut self,
        input: FrameInput,
        surface: &mut dyn Surface,
    ) -> Result<FrameControl> {
        let level = match self.level.take() {
            Some(level) => level,
            None => self.start(surface.textures())?,
        };
        let level = self.level.insert(level);

        self.commands.clear();
        self.builder
            .handle(&self.events, builder_input(input), &mut self.commands);

        self.events.clear();
        for command in self.commands.drain(..) {
            world::apply(level, surface.textures(), command, &mut self.events);
        }
        world::apply(level, surface.textures(), Command::Tick, &mut self.events);

        level.render(surface.canvas());
        surface.set_caption(&query::status(level).to_string());
        self.frames += 1;

        let capped = self.policy.frame_cap.is_some_and(|cap| self.frames >= cap);
        let finished = self.policy.stop_when_over && query::is_over(level);
        if !(capped || finished) {
            return Ok(FrameControl::Continue);
        }

        log::info!("Session finished after {} frames", self.frames);
        if let Some(level) = self.level.take() {
            level.shutdown(surface.textures());
        }
        Ok(FrameControl::Exit)
    }
}

fn builder_input(input: FrameInput) -> BuilderInput {
    BuilderInput {
        direction: input.direction,
        confirm_action: input.confirm_action,
        upgrade_action: input.upgrade_action,
        selected_kind: input.tower_hotkey.and_then(TowerKind::from_hotkey),
        click: input
            .pointer_click
            .map(|position| Point::new(position.x, position.y)),
    }
}
