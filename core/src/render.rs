//! Drawing and texture contracts implemented by rendering adapters.
//!
//! The simulation never talks to a graphics API directly: it loads textures
//! through a [`TextureService`] and draws through a [`Canvas`].

use serde::{Deserialize, Serialize};

use crate::ResourceError;

/// RGBA colour with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel, 255 is opaque.
    pub alpha: u8,
}

impl Rgba {
    /// Opaque white, used as the neutral texture tint.
    pub const WHITE: Rgba = Rgba::from_rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::from_rgb(0, 0, 0);

    /// Creates an opaque colour.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 255)
    }

    /// Creates a colour with explicit alpha.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Channels normalised to `0.0..=1.0`.
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.red) / 255.0,
            f32::from(self.green) / 255.0,
            f32::from(self.blue) / 255.0,
            f32::from(self.alpha) / 255.0,
        ]
    }
}

/// Axis-aligned rectangle in screen units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Opaque handle to a texture owned by a [`TextureService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Wraps a backend-specific texture index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Backend-specific texture index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Loads and releases textures on behalf of the simulation.
///
/// Every successful [`TextureService::load`] yields a distinct handle that the
/// caller owns exclusively until it hands it back through
/// [`TextureService::release`].
pub trait TextureService {
    /// Loads the texture stored at `path`.
    fn load(&mut self, path: &str) -> Result<TextureHandle, ResourceError>;

    /// Returns ownership of `handle` to the service.
    fn release(&mut self, handle: TextureHandle);
}

/// Immediate-mode drawing surface.
pub trait Canvas {
    /// Draws `texture` stretched into `dest`, modulated by `tint`.
    fn draw_texture(&mut self, texture: TextureHandle, dest: Rect, tint: Rgba);

    /// Fills `rect` with a solid colour.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
}
