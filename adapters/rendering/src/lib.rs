#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Bastion adapters.
//!
//! Besides the backend trait this crate ships a headless backend together
//! with the texture service and canvas it drives, so simulations can run
//! without a window.

use std::collections::BTreeSet;

use anyhow::Result as AnyResult;
use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureHandle, TextureService},
    Direction, ResourceError,
};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

impl From<Rgba> for Color {
    fn from(value: Rgba) -> Self {
        let [red, green, blue, alpha] = value.to_f32();
        Self::new(red, green, blue, alpha)
    }
}

/// Per-frame input captured by an adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Arrow key pressed on this frame.
    pub direction: Option<Direction>,
    /// Whether the placement key was pressed on this frame.
    pub confirm_action: bool,
    /// Whether the upgrade key was pressed on this frame.
    pub upgrade_action: bool,
    /// Number key pressed on this frame.
    pub tower_hotkey: Option<u8>,
    /// Pointer position of a click issued on this frame, in screen units.
    pub pointer_click: Option<Vec2>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Window width in screen units.
    pub width: u32,
    /// Window height in screen units.
    pub height: u32,
    /// Frames presented per second.
    pub target_fps: u32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, width: u32, height: u32, target_fps: u32) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            width,
            height,
            target_fps,
        }
    }
}

/// Decision returned by the frame closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop the loop after this frame.
    Exit,
}

/// Drawing target and texture store handed to the frame closure.
pub trait Surface {
    /// Texture service backing the surface.
    fn textures(&mut self) -> &mut dyn TextureService;

    /// Canvas for the current frame.
    fn canvas(&mut self) -> &mut dyn Canvas;

    /// Status line shown by the backend, such as the window caption.
    fn set_caption(&mut self, caption: &str);
}

/// Rendering backend capable of presenting Bastion sessions.
pub trait RenderingBackend {
    /// Runs the rendering backend until the closure asks to exit, the player
    /// quits, or the closure fails.
    ///
    /// The provided `update_frame` closure receives the input captured for the
    /// frame and the surface to draw on. Errors returned by the closure stop
    /// the loop and are returned from `run`.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut dyn Surface) -> AnyResult<FrameControl> + 'static;
}

/// Texture service that accepts every path without touching the filesystem.
#[derive(Debug, Default)]
pub struct HeadlessTextures {
    next: u32,
    live: BTreeSet<TextureHandle>,
}

impl HeadlessTextures {
    /// Creates an empty texture service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles loaded and not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl TextureService for HeadlessTextures {
    fn load(&mut self, _path: &str) -> Result<TextureHandle, ResourceError> {
        let handle = TextureHandle::new(self.next);
        self.next += 1;
        let _ = self.live.insert(handle);
        Ok(handle)
    }

    fn release(&mut self, handle: TextureHandle) {
        let _ = self.live.remove(&handle);
    }
}

/// Texture service for which every asset is missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct MissingTextures;

impl TextureService for MissingTextures {
    fn load(&mut self, path: &str) -> Result<TextureHandle, ResourceError> {
        Err(ResourceError::Missing {
            path: path.to_owned(),
        })
    }

    fn release(&mut self, _handle: TextureHandle) {}
}

/// Draw operation captured by [`RecordingCanvas`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCall {
    /// Textured quad.
    Texture {
        /// Texture drawn.
        texture: TextureHandle,
        /// Destination rectangle.
        dest: Rect,
        /// Tint applied.
        tint: Rgba,
    },
    /// Solid rectangle.
    Fill {
        /// Filled rectangle.
        rect: Rect,
        /// Fill colour.
        color: Rgba,
    },
}

/// Canvas that records draw calls instead of rasterising them.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    /// Creates an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since the last [`RecordingCanvas::clear`].
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Forgets every recorded call.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn draw_texture(&mut self, texture: TextureHandle, dest: Rect, tint: Rgba) {
        self.calls.push(DrawCall::Texture {
            texture,
            dest,
            tint,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.calls.push(DrawCall::Fill { rect, color });
    }
}

/// Windowless backend that drives the frame closure with idle input.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessBackend {
    max_frames: Option<u32>,
}

impl HeadlessBackend {
    /// Creates a backend that stops after `max_frames` frames, or runs until
    /// the closure exits when `None`.
    #[must_use]
    pub const fn new(max_frames: Option<u32>) -> Self {
        Self { max_frames }
    }
}

/// Surface used by [`HeadlessBackend`].
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    textures: HeadlessTextures,
    canvas: RecordingCanvas,
    caption: String,
}

impl HeadlessSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last caption set by the frame closure.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Draw calls recorded during the current frame.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        self.canvas.calls()
    }

    /// Texture service backing the surface.
    #[must_use]
    pub fn headless_textures(&self) -> &HeadlessTextures {
        &self.textures
    }
}

impl Surface for HeadlessSurface {
    fn textures(&mut self) -> &mut dyn TextureService {
        &mut self.textures
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.canvas
    }

    fn set_caption(&mut self, caption: &str) {
        if self.caption != caption {
            log::debug!("{caption}");
            caption.clone_into(&mut self.caption);
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut dyn Surface) -> AnyResult<FrameControl> + 'static,
    {
        log::info!("Running '{}' headless", presentation.window_title);
        let mut surface = HeadlessSurface::new();
        let mut frames = 0;

        loop {
            if self.max_frames.is_some_and(|limit| frames >= limit) {
                log::info!("Frame limit of {frames} reached");
                return Ok(());
            }

            surface.canvas.clear();
            let control = update_frame(FrameInput::default(), &mut surface)?;
            frames += 1;

            if control == FrameControl::Exit {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    #[test]
    fn headless_textures_track_live_handles() {
        let mut textures = HeadlessTextures::new();
        let first = textures.load("a.png").expect("headless load succeeds");
        let second = textures.load("a.png").expect("headless load succeeds");
        assert_ne!(first, second, "every load yields a distinct handle");
        assert_eq!(textures.live_count(), 2);

        textures.release(first);
        textures.release(first);
        assert_eq!(textures.live_count(), 1);
    }

    #[test]
    fn missing_textures_report_the_path() {
        let error = MissingTextures
            .load("assets/water.png")
            .expect_err("every asset is missing");
        assert_eq!(error.path(), "assets/water.png");
    }

    #[test]
    fn recording_canvas_keeps_call_order() {
        let mut canvas = RecordingCanvas::new();
        let rect = Rect::new(0.0, 0.0, 8.0, 8.0);
        canvas.fill_rect(rect, Rgba::BLACK);
        canvas.draw_texture(TextureHandle::new(3), rect, Rgba::WHITE);

        assert!(matches!(canvas.calls()[0], DrawCall::Fill { .. }));
        assert!(matches!(canvas.calls()[1], DrawCall::Texture { .. }));
        canvas.clear();
        assert!(canvas.calls().is_empty());
    }

    #[test]
    fn headless_backend_honours_frame_limit_and_exit() {
        let presentation = Presentation::new("test", Color::from(Rgba::BLACK), 800, 600, 30);

        let counter = Rc::new(Cell::new(0));
        let seen = Rc::clone(&counter);
        HeadlessBackend::new(Some(5))
            .run(presentation.clone(), move |_, _| {
                seen.set(seen.get() + 1);
                Ok(FrameControl::Continue)
            })
            .expect("loop completes");
        assert_eq!(counter.get(), 5);

        let counter = Rc::new(Cell::new(0));
        let seen = Rc::clone(&counter);
        HeadlessBackend::new(None)
            .run(presentation.clone(), move |_, _| {
                seen.set(seen.get() + 1);
                Ok(if seen.get() == 3 {
                    FrameControl::Exit
                } else {
                    FrameControl::Continue
                })
            })
            .expect("loop completes");
        assert_eq!(counter.get(), 3);

        let failure = HeadlessBackend::new(None).run(presentation, |_, _| anyhow::bail!("boom"));
        assert!(failure.is_err());
    }
}
