//! Builds concrete entities from kind tags.

use bastion_core::{render::TextureService, EnemyKind, Point, TowerKind};

use crate::{
    enemy::Enemy,
    entity::{Body, Sprite},
    tower::{Tower, TOWER_SIZE},
};

/// Health and speed an enemy kind spawns with.
#[must_use]
pub const fn enemy_stats(kind: EnemyKind) -> (u32, f32) {
    match kind {
        EnemyKind::Goblin => (80, 1.5),
        EnemyKind::Orc => (150, 0.8),
    }
}

/// Creates an enemy of `kind` at `position` using the sprite at `sprite_path`.
pub fn create_enemy(
    kind: EnemyKind,
    position: Point,
    sprite_path: &str,
    textures: &mut dyn TextureService,
) -> Enemy {
    let (health, speed) = enemy_stats(kind);
    Enemy::new(kind, position, health, speed, Sprite::load(sprite_path, textures))
}

/// Creates a level-one tower of `kind` with its upper-left corner at `position`.
pub fn create_tower(
    kind: TowerKind,
    position: Point,
    sprite_path: &str,
    textures: &mut dyn TextureService,
) -> Tower {
    let body = Body::new(
        position,
        TOWER_SIZE,
        TOWER_SIZE,
        Sprite::load(sprite_path, textures),
    );
    Tower::new(kind, body)
}
