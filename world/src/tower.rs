//! Player-placed towers.

use bastion_core::{
    render::{Canvas, Rgba, TextureService},
    TowerKind,
};

use crate::{
    effect::Effect,
    enemy::Enemy,
    entity::{Body, Damageable, Simulated},
};

/// Side length of a tower sprite.
pub const TOWER_SIZE: f32 = 32.0;
/// Health every tower starts with.
pub const TOWER_HEALTH: u32 = 100;

/// Damage, range and look of a tower kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerProfile {
    /// Damage per shot.
    pub damage: u32,
    /// Firing range in world units.
    pub range: f32,
    /// Sprite tint.
    pub tint: Rgba,
    /// Colour of the projectiles it fires.
    pub projectile_color: Rgba,
}

impl TowerProfile {
    /// Profile of a freshly built tower of `kind`.
    #[must_use]
    pub const fn for_kind(kind: TowerKind) -> Self {
        match kind {
            TowerKind::Basic => Self {
                damage: 15,
                range: 150.0,
                tint: Rgba::WHITE,
                projectile_color: Rgba::BLACK,
            },
            TowerKind::Ice => Self {
                damage: 5,
                range: 800.0,
                tint: Rgba::from_rgb(0, 0, 255),
                projectile_color: Rgba::from_rgb(0, 255, 255),
            },
            TowerKind::Fire => Self {
                damage: 10,
                range: 150.0,
                tint: Rgba::from_rgb(255, 165, 0),
                projectile_color: Rgba::from_rgb(255, 165, 0),
            },
        }
    }
}

/// Stationary defence firing at enemies in range.
#[derive(Debug, PartialEq)]
pub struct Tower {
    body: Body,
    kind: TowerKind,
    damage: u32,
    range: f32,
    level: u32,
    health: u32,
}

impl Tower {
    /// Creates a level-one tower of `kind`.
    #[must_use]
    pub fn new(kind: TowerKind, body: Body) -> Self {
        let profile = TowerProfile::for_kind(kind);
        Self {
            body,
            kind,
            damage: profile.damage,
            range: profile.range,
            level: 1,
            health: TOWER_HEALTH,
        }
    }

    /// Kind the tower was built as.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Damage per shot.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Firing range.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Upgrade level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Colour of the projectiles this tower fires.
    #[must_use]
    pub const fn projectile_color(&self) -> Rgba {
        TowerProfile::for_kind(self.kind).projectile_color
    }

    /// Raises damage by 2 and range by 10.
    pub fn upgrade(&mut self) {
        self.level += 1;
        self.damage += 2;
        self.range += 10.0;
        log::info!("Tower upgraded!");
    }

    /// Reports whether `enemy` is alive and within range.
    #[must_use]
    pub fn can_attack(&self, enemy: &Enemy) -> bool {
        enemy.is_alive() && self.body.position().distance_to(enemy.body().position()) <= self.range
    }

    /// Damages `enemy` and attaches the tower's status effect.
    /// Returns whether the attack happened.
    pub fn attack(&self, enemy: &mut Enemy) -> bool {
        if !self.can_attack(enemy) {
            return false;
        }

        enemy.take_damage(self.damage);
        match self.kind {
            TowerKind::Basic => {}
            TowerKind::Ice => enemy.add_effect(Effect::slow(60, 0.5)),
            TowerKind::Fire => enemy.add_effect(Effect::burn(90, 2)),
        }
        true
    }

    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Simulated for Tower {
    fn body(&self) -> &Body {
        &self.body
    }

    fn update(&mut self) {
        if !self.body.is_active() {
            return;
        }

        self.body.refresh_dest();
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        if let Some(texture) = self.body.sprite().texture() {
            canvas.draw_texture(texture, self.body.dest(), TowerProfile::for_kind(self.kind).tint);
        }
    }

    fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        Self {
            body: self.body.duplicate(textures),
            kind: self.kind,
            damage: self.damage,
            range: self.range,
            level: self.level,
            health: self.health,
        }
    }
}

impl Damageable for Tower {
    fn take_damage(&mut self, amount: u32) {
        if !self.body.is_active() {
            return;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.body.deactivate();
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn health(&self) -> u32 {
        self.health
    }
}
