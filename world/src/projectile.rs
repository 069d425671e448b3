//! Cosmetic projectiles travelling from a tower to where its target stood.

use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureService},
    Point,
};

use crate::entity::{Body, Simulated, Sprite};

/// Speed of projectiles fired by towers.
pub const PROJECTILE_SPEED: f32 = 10.0;

const SPRITE_SIZE: f32 = 16.0;
const FALLBACK_SIZE: f32 = 8.0;

/// Projectile heading to a fixed point.
#[derive(Debug, PartialEq)]
pub struct Projectile {
    body: Body,
    speed: f32,
    target: Point,
    color: Rgba,
}

impl Projectile {
    /// Creates a projectile leaving `start` toward `target`.
    #[must_use]
    pub fn new(start: Point, target: Point, speed: f32, color: Rgba, sprite: Sprite) -> Self {
        Self {
            body: Body::new(start, SPRITE_SIZE, SPRITE_SIZE, sprite),
            speed,
            target,
            color,
        }
    }

    /// Point the projectile flies to.
    #[must_use]
    pub const fn target(&self) -> Point {
        self.target
    }

    /// Colour inherited from the firing tower.
    #[must_use]
    pub const fn color(&self) -> Rgba {
        self.color
    }

    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Simulated for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn update(&mut self) {
        if !self.body.is_active() {
            return;
        }

        let position = self.body.position();
        let distance = position.distance_to(self.target);
        if distance <= self.speed {
            self.body.set_position(self.target);
            self.body.deactivate();
        } else {
            let dx = (self.target.x() - position.x()) / distance;
            let dy = (self.target.y() - position.y()) / distance;
            self.body.set_position(Point::new(
                position.x() + dx * self.speed,
                position.y() + dy * self.speed,
            ));
        }

        self.body.refresh_dest();
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        match self.body.sprite().texture() {
            Some(texture) => canvas.draw_texture(texture, self.body.dest(), self.color),
            None => {
                let position = self.body.position();
                canvas.fill_rect(
                    Rect::new(position.x(), position.y(), FALLBACK_SIZE, FALLBACK_SIZE),
                    self.color,
                );
            }
        }
    }

    fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        Self {
            body: self.body.duplicate(textures),
            speed: self.speed,
            target: self.target,
            color: self.color,
        }
    }
}
