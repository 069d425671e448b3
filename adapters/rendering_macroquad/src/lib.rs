#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Bastion.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Image decoding goes through the `image` crate because the tile set ships
//! as BMP, which macroquad's bundled decoder does not read.

mod textures;

use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureHandle, TextureService},
    Direction,
};
use bastion_rendering::{
    Color, FrameControl, FrameInput, Presentation, RenderingBackend, Surface,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    math::Vec2 as MacroquadVec2,
    shapes::draw_rectangle,
    text::draw_text,
    texture::{draw_texture_ex, DrawTextureParams},
};

use self::textures::TextureStore;

const CAPTION_FONT_SIZE: f32 = 20.0;

/// Keyboard and mouse state sampled at the start of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct KeyboardShortcuts {
    quit_requested: bool,
    direction: Option<Direction>,
    confirm: bool,
    upgrade: bool,
    hotkey: Option<u8>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let direction = [
            (KeyCode::Up, Direction::North),
            (KeyCode::Down, Direction::South),
            (KeyCode::Left, Direction::West),
            (KeyCode::Right, Direction::East),
        ]
        .into_iter()
        .find_map(|(key, direction)| is_key_pressed(key).then_some(direction));

        let hotkey = [(KeyCode::Key1, 1), (KeyCode::Key2, 2), (KeyCode::Key3, 3)]
            .into_iter()
            .find_map(|(key, digit)| is_key_pressed(key).then_some(digit));

        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            direction,
            confirm: is_key_pressed(KeyCode::Enter),
            upgrade: is_key_pressed(KeyCode::U),
            hotkey,
        }
    }

    fn into_frame_input(self, click: Option<Vec2>) -> FrameInput {
        FrameInput {
            direction: self.direction,
            confirm_action: self.confirm,
            upgrade_action: self.upgrade,
            tower_hotkey: self.hotkey,
            pointer_click: click,
        }
    }
}

fn gather_pointer_click() -> Option<Vec2> {
    if !is_mouse_button_pressed(MouseButton::Left) {
        return None;
    }
    let (x, y) = mouse_position();
    Some(Vec2::new(x, y))
}

/// Sleeps away the remainder of a fixed frame budget.
#[derive(Debug)]
struct FrameLimiter {
    budget: Duration,
    frame_start: Instant,
}

impl FrameLimiter {
    fn new(target_fps: u32) -> Self {
        Self {
            budget: Duration::from_secs(1) / target_fps.max(1),
            frame_start: Instant::now(),
        }
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.budget
            .saturating_sub(now.saturating_duration_since(self.frame_start))
    }

    fn wait(&mut self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        self.frame_start = Instant::now();
    }
}

/// Surface that draws straight into the macroquad window.
#[derive(Debug, Default)]
struct WindowSurface {
    textures: TextureStore,
    caption: String,
}

impl WindowSurface {
    fn draw_caption(&self) {
        if self.caption.is_empty() {
            return;
        }
        draw_text(
            &self.caption,
            8.0,
            CAPTION_FONT_SIZE,
            CAPTION_FONT_SIZE,
            macroquad::color::WHITE,
        );
    }
}

impl Canvas for WindowSurface {
    fn draw_texture(&mut self, texture: TextureHandle, dest: Rect, tint: Rgba) {
        let Some(texture) = self.textures.get(texture) else {
            return;
        };
        draw_texture_ex(
            texture,
            dest.x,
            dest.y,
            to_macroquad_color(tint.into()),
            DrawTextureParams {
                dest_size: Some(MacroquadVec2::new(dest.width, dest.height)),
                ..DrawTextureParams::default()
            },
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        draw_rectangle(
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            to_macroquad_color(color.into()),
        );
    }
}

impl Surface for WindowSurface {
    fn textures(&mut self) -> &mut dyn TextureService {
        &mut self.textures
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        self
    }

    fn set_caption(&mut self, caption: &str) {
        if self.caption != caption {
            log::debug!("{caption}");
            caption.clone_into(&mut self.caption);
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or rely on the frame limiter alone.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut dyn Surface) -> Result<FrameControl> + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            width,
            height,
            target_fps,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(width)?,
            window_height: i32::try_from(height)?,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (error_sender, error_receiver) = mpsc::channel::<anyhow::Error>();

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(clear_color);
            let mut surface = WindowSurface::default();
            let mut limiter = FrameLimiter::new(target_fps);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    log::info!("Quit requested");
                    break;
                }

                macroquad::window::clear_background(background);
                let input = keyboard.into_frame_input(gather_pointer_click());

                match update_frame(input, &mut surface) {
                    Ok(FrameControl::Continue) => {}
                    Ok(FrameControl::Exit) => break,
                    Err(error) => {
                        let _ = error_sender.send(error);
                        break;
                    }
                }
                surface.draw_caption();

                limiter.wait();
                macroquad::window::next_frame().await;
            }

            surface.textures.release_all();
        });

        match error_receiver.try_recv() {
            Ok(error) => Err(error),
            Err(_) => Ok(()),
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
