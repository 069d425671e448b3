//! Closed entity model shared by everything a level simulates.

use bastion_core::{
    render::{Canvas, Rect, TextureHandle, TextureService},
    EntityId, Point,
};

use crate::{enemy::Enemy, explosion::Explosion, projectile::Projectile, tower::Tower};

/// Texture path plus the handle loaded from it.
///
/// The handle is owned exclusively by the sprite; duplicating a sprite loads
/// a fresh handle from the same path.
#[derive(Debug, PartialEq, Eq)]
pub struct Sprite {
    path: String,
    texture: Option<TextureHandle>,
}

impl Sprite {
    /// Loads the texture at `path`. Failures are logged and leave the sprite
    /// without a texture.
    pub fn load(path: &str, textures: &mut dyn TextureService) -> Self {
        if path.is_empty() {
            return Self::empty();
        }

        let texture = match textures.load(path) {
            Ok(handle) => Some(handle),
            Err(error) => {
                log::warn!("{error}");
                None
            }
        };

        Self {
            path: path.to_owned(),
            texture,
        }
    }

    /// Sprite without path or texture; renders through fallbacks only.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            path: String::new(),
            texture: None,
        }
    }

    /// Path the texture was loaded from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Loaded texture, if loading succeeded.
    #[must_use]
    pub const fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Creates an independent sprite with its own texture handle.
    pub fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        Self::load(&self.path, textures)
    }

    /// Returns the texture handle to `textures`.
    pub fn release(&mut self, textures: &mut dyn TextureService) {
        if let Some(handle) = self.texture.take() {
            textures.release(handle);
        }
    }
}

/// State common to every entity.
#[derive(Debug, PartialEq)]
pub struct Body {
    position: Point,
    width: f32,
    height: f32,
    active: bool,
    dest: Rect,
    sprite: Sprite,
}

impl Body {
    /// Creates an active body.
    #[must_use]
    pub fn new(position: Point, width: f32, height: f32, sprite: Sprite) -> Self {
        Self {
            position,
            width,
            height,
            active: true,
            dest: Rect::new(position.x(), position.y(), width, height),
            sprite,
        }
    }

    /// Current position of the upper-left corner.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Reports whether the entity still takes part in the simulation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Destination rectangle computed by the last update.
    #[must_use]
    pub const fn dest(&self) -> Rect {
        self.dest
    }

    /// Sprite drawn for the entity.
    #[must_use]
    pub const fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub(crate) fn refresh_dest(&mut self) {
        self.dest = Rect::new(self.position.x(), self.position.y(), self.width, self.height);
    }

    pub(crate) fn release(&mut self, textures: &mut dyn TextureService) {
        self.sprite.release(textures);
    }

    /// Copies every field and loads a fresh texture for the copy.
    pub(crate) fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        Self {
            position: self.position,
            width: self.width,
            height: self.height,
            active: self.active,
            dest: self.dest,
            sprite: self.sprite.duplicate(textures),
        }
    }
}

/// Per-frame behaviour shared by every entity kind.
pub trait Simulated {
    /// Shared entity state.
    fn body(&self) -> &Body;

    /// Advances the entity by one fixed frame. No-op once inactive.
    fn update(&mut self);

    /// Draws the entity using the position computed by the last update.
    fn render(&self, canvas: &mut dyn Canvas);

    /// Produces an independent copy with its own texture handle.
    fn duplicate(&self, textures: &mut dyn TextureService) -> Self
    where
        Self: Sized;
}

/// Entities that carry health.
pub trait Damageable {
    /// Removes `amount` health, clamping at zero. No-op once inactive.
    fn take_damage(&mut self, amount: u32);

    /// Reports whether health is above zero.
    fn is_alive(&self) -> bool;

    /// Remaining health.
    fn health(&self) -> u32;
}

/// Every kind of entity a level holds.
#[derive(Debug)]
pub enum Entity {
    /// Hostile walker.
    Enemy(Enemy),
    /// Player-placed defence.
    Tower(Tower),
    /// Cosmetic shot travelling to where an enemy stood.
    Projectile(Projectile),
    /// Short-lived muzzle flash.
    Explosion(Explosion),
}

impl Entity {
    fn as_simulated(&self) -> &dyn Simulated {
        match self {
            Self::Enemy(enemy) => enemy,
            Self::Tower(tower) => tower,
            Self::Projectile(projectile) => projectile,
            Self::Explosion(explosion) => explosion,
        }
    }

    fn as_simulated_mut(&mut self) -> &mut dyn Simulated {
        match self {
            Self::Enemy(enemy) => enemy,
            Self::Tower(tower) => tower,
            Self::Projectile(projectile) => projectile,
            Self::Explosion(explosion) => explosion,
        }
    }

    /// Shared entity state.
    #[must_use]
    pub fn body(&self) -> &Body {
        self.as_simulated().body()
    }

    /// Reports whether the entity still takes part in the simulation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.body().is_active()
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.body().position()
    }

    /// Advances the entity by one frame.
    pub fn update(&mut self) {
        self.as_simulated_mut().update();
    }

    /// Draws the entity. Inactive entities draw nothing.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        if self.is_active() {
            self.as_simulated().render(canvas);
        }
    }

    /// Produces an independent copy with its own texture handle.
    pub fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        match self {
            Self::Enemy(enemy) => Self::Enemy(enemy.duplicate(textures)),
            Self::Tower(tower) => Self::Tower(tower.duplicate(textures)),
            Self::Projectile(projectile) => Self::Projectile(projectile.duplicate(textures)),
            Self::Explosion(explosion) => Self::Explosion(explosion.duplicate(textures)),
        }
    }

    /// Enemy view of the entity, if it is one.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&Enemy> {
        match self {
            Self::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Tower view of the entity, if it is one.
    #[must_use]
    pub const fn as_tower(&self) -> Option<&Tower> {
        match self {
            Self::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    pub(crate) fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match self {
            Self::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub(crate) fn as_tower_mut(&mut self) -> Option<&mut Tower> {
        match self {
            Self::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    pub(crate) fn release(&mut self, textures: &mut dyn TextureService) {
        match self {
            Self::Enemy(enemy) => enemy.body_mut().release(textures),
            Self::Tower(tower) => tower.body_mut().release(textures),
            Self::Projectile(projectile) => projectile.body_mut().release(textures),
            Self::Explosion(explosion) => explosion.body_mut().release(textures),
        }
    }
}

/// Entity stored by a level together with its identifier.
#[derive(Debug)]
pub struct Slot {
    id: EntityId,
    entity: Entity,
}

impl Slot {
    pub(crate) const fn new(id: EntityId, entity: Entity) -> Self {
        Self { id, entity }
    }

    /// Identifier allocated by the level.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Stored entity.
    #[must_use]
    pub const fn entity(&self) -> &Entity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}
