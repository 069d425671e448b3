//! Hostile walkers and their status effects.

use std::mem;

use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureService},
    EnemyKind, Point,
};

use crate::{
    effect::Effect,
    entity::{Body, Damageable, Simulated, Sprite},
};

/// Side length of an enemy sprite.
pub const ENEMY_SIZE: f32 = 32.0;

const HEALTH_BAR_OFFSET: f32 = 10.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;
const HEALTH_BAR_BACK: Rgba = Rgba::from_rgb(255, 0, 0);
const HEALTH_BAR_FILL: Rgba = Rgba::from_rgb(0, 255, 0);

/// Enemy walking toward a target point.
#[derive(Debug, PartialEq)]
pub struct Enemy {
    body: Body,
    kind: EnemyKind,
    health: u32,
    max_health: u32,
    speed: f32,
    target: Point,
    effects: Vec<Effect>,
}

impl Enemy {
    /// Creates an enemy standing at `position` and aiming at it.
    #[must_use]
    pub fn new(kind: EnemyKind, position: Point, health: u32, speed: f32, sprite: Sprite) -> Self {
        Self {
            body: Body::new(position, ENEMY_SIZE, ENEMY_SIZE, sprite),
            kind,
            health,
            max_health: health,
            speed,
            target: position,
            effects: Vec::new(),
        }
    }

    /// Kind the enemy was built from.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current movement speed in world units per frame.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Point the enemy walks toward.
    #[must_use]
    pub const fn target(&self) -> Point {
        self.target
    }

    /// Attached effects in attachment order.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Overrides the movement speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Redirects the enemy.
    pub fn set_target(&mut self, target: Point) {
        self.target = target;
    }

    /// Resets the speed to a terrain baseline, keeping active slows in force.
    pub fn set_terrain_speed(&mut self, baseline: f32) {
        let factor: f32 = self.effects.iter().map(Effect::speed_factor).product();
        self.speed = baseline * factor;
    }

    /// Attaches `effect` and applies it immediately.
    ///
    /// Each expiring slow restores the speed captured when it was applied, so
    /// overlapping slows can leave a stale speed behind. The level calls
    /// [`Enemy::set_terrain_speed`] every frame, which recomputes the speed
    /// from the terrain baseline and the slows still attached.
    pub fn add_effect(&mut self, mut effect: Effect) {
        effect.apply(self);
        self.effects.push(effect);
    }

    /// Logs a click on the enemy.
    pub fn on_click(&self) {
        log::info!("Clicked on Enemy: {}", self.name());
    }

    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn step(&mut self) {
        let position = self.body.position();
        let distance = position.distance_to(self.target);
        if distance <= self.speed {
            self.body.set_position(self.target);
            return;
        }

        let dx = (self.target.x() - position.x()) / distance;
        let dy = (self.target.y() - position.y()) / distance;
        self.body.set_position(Point::new(
            position.x() + dx * self.speed,
            position.y() + dy * self.speed,
        ));
    }

    fn tick_effects(&mut self) {
        let mut effects = mem::take(&mut self.effects);
        for effect in &mut effects {
            effect.update(self);
        }
        effects.retain(|effect| !effect.is_finished());
        self.effects = effects;
    }
}

impl Simulated for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn update(&mut self) {
        if !self.body.is_active() {
            return;
        }

        self.step();
        self.tick_effects();
        self.body.refresh_dest();
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let dest = self.body.dest();
        if let Some(texture) = self.body.sprite().texture() {
            canvas.draw_texture(texture, dest, Rgba::WHITE);
        }

        let fraction = if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        };
        let bar_y = dest.y - HEALTH_BAR_OFFSET;
        canvas.fill_rect(
            Rect::new(dest.x, bar_y, ENEMY_SIZE, HEALTH_BAR_HEIGHT),
            HEALTH_BAR_BACK,
        );
        canvas.fill_rect(
            Rect::new(dest.x, bar_y, ENEMY_SIZE * fraction, HEALTH_BAR_HEIGHT),
            HEALTH_BAR_FILL,
        );
    }

    fn duplicate(&self, textures: &mut dyn TextureService) -> Self {
        Self {
            body: self.body.duplicate(textures),
            kind: self.kind,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            target: self.target,
            effects: self.effects.clone(),
        }
    }
}

impl Damageable for Enemy {
    fn take_damage(&mut self, amount: u32) {
        if !self.body.is_active() {
            return;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.body.deactivate();
            log::info!("Enemy {} defeated!", self.name());
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn health(&self) -> u32 {
        self.health
    }
}

#[cfg(test)]
mod tests {
    use super::Enemy;
    use crate::{
        effect::Effect,
        entity::{Damageable, Simulated, Sprite},
    };
    use bastion_core::{EnemyKind, Point};
    use bastion_rendering::{DrawCall, RecordingCanvas};

    fn goblin(position: Point) -> Enemy {
        Enemy::new(EnemyKind::Goblin, position, 80, 1.5, Sprite::empty())
    }

    #[test]
    fn health_stays_within_bounds() {
        let mut enemy = goblin(Point::new(0.0, 0.0));
        enemy.take_damage(30);
        assert_eq!(enemy.health(), 50);
        assert!(enemy.body().is_active());

        enemy.take_damage(500);
        assert_eq!(enemy.health(), 0);
        assert!(!enemy.is_alive());
        assert!(!enemy.body().is_active());

        enemy.take_damage(5);
        assert_eq!(enemy.health(), 0, "damage on a dead enemy is a no-op");
        assert!(enemy.health() <= enemy.max_health());
    }

    #[test]
    fn walks_straight_and_snaps_onto_target() {
        let mut enemy = goblin(Point::new(0.0, 0.0));
        enemy.set_speed(2.0);
        enemy.set_target(Point::new(5.0, 0.0));

        enemy.update();
        assert_eq!(enemy.body().position(), Point::new(2.0, 0.0));
        enemy.update();
        assert_eq!(enemy.body().position(), Point::new(4.0, 0.0));
        enemy.update();
        assert_eq!(enemy.body().position(), Point::new(5.0, 0.0));
    }

    #[test]
    fn inactive_enemy_ignores_updates() {
        let mut enemy = goblin(Point::new(0.0, 0.0));
        enemy.set_target(Point::new(100.0, 0.0));
        enemy.take_damage(80);

        enemy.update();
        assert_eq!(enemy.body().position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn terrain_speed_keeps_slows() {
        let mut enemy = goblin(Point::new(0.0, 0.0));
        enemy.add_effect(crate::effect::Effect::slow(60, 0.5));
        enemy.set_terrain_speed(2.5);
        assert_eq!(enemy.speed(), 1.25);
    }

    #[test]
    fn health_bar_scales_with_health() {
        let mut enemy = goblin(Point::new(40.0, 50.0));
        enemy.take_damage(20);
        let mut canvas = RecordingCanvas::new();

        enemy.render(&mut canvas);

        let fills: Vec<f32> = canvas
            .calls()
            .iter()
            .filter_map(|call| match call {
                DrawCall::Fill { rect, .. } => Some(rect.width),
                DrawCall::Texture { .. } => None,
            })
            .collect();
        assert_eq!(fills, vec![32.0, 24.0]);
    }

    #[test]
    fn terrain_speed_clears_stale_overlapping_slows() {
        let mut enemy = goblin(Point::new(0.0, 0.0));
        enemy.add_effect(Effect::slow(30, 0.5));
        enemy.add_effect(Effect::slow(60, 0.5));
        assert_eq!(enemy.speed(), 0.375);
        enemy.set_terrain_speed(1.5);
        assert_eq!(enemy.speed(), 0.375);

        for _ in 0..61 {
            enemy.update();
        }
        assert!(enemy.effects().is_empty());
        assert_eq!(enemy.speed(), 0.75, "later slow restored the speed it saw");

        enemy.set_terrain_speed(1.5);
        assert_eq!(enemy.speed(), 1.5);
    }
}
