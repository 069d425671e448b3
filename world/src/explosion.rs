//! Short-lived muzzle flashes.

use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureService},
    Point,
};

use crate::entity::{Body, Simulated, Sprite};

/// Frames an explosion stays on screen.
pub const EXPLOSION_LIFE: u32 = 10;

const SIZE: f32 = 32.0;
const FALLBACK_COLOR: Rgba = Rgba::from_rgb(255, 100, 0);

/// Muzzle flash that fades after [`EXPLOSION_LIFE`] frames.
#[derive(Debug, PartialEq)]
pub struct Explosion {
    body: Body,
    life: u32,
}

impl Explosion {
    /// Creates an explosion at `position`.
    #[must_use]
    pub fn new(position: Point, sprite: Sprite) -> Self {
        Self {
            body: Body::new(position, SIZE, SIZE, sprite),
            life: EXPLOSION_LIFE,
        }
    }

    /// Frames left on screen.
    #[must_use]
    pub const fn life(&self) -> u32 {
        self.life
    }

    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Simulated for Explosion {
    fn body(&self) -> &Body {
        &self.body
    }

    fn update(&mut self) {
        if !self.body.is_active() {
            return;
        }

        self.life = self.life.saturating_sub(1);
        if self.life == 0 {
            self.body.deactivate();
        }
        self.body.refresh_dest();
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        match self.body.sprite().texture() {
            Some(texture) => canvas.draw_texture(texture, self.body.dest(), Rgba::WHITE),
            None => {
                let position = self.body.position();
                canvas.fill_rect(Rect::new(position.x(), position.y(), SIZE, SIZE), FALLBACK_COLOR);
            }
        }
    }

    fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        Self {
            body: self.body.duplicate(textures),
            life: self.life,
        }
    }
}
