//! Tuning constants for a play session.

use bastion_core::Point;
use serde::{Deserialize, Serialize};

/// Texture paths used by the level and its entities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpritePaths {
    /// Grass tile, mandatory.
    pub grass: String,
    /// Path tile, mandatory.
    pub path: String,
    /// Water tile, optional.
    pub water: String,
    /// Enemy sprite.
    pub enemy: String,
    /// Tower sprite, tinted per tower kind.
    pub tower: String,
    /// Projectile sprite.
    pub projectile: String,
    /// Muzzle-flash sprite.
    pub explosion: String,
}

impl Default for SpritePaths {
    fn default() -> Self {
        Self {
            grass: "assets/map_tile.bmp".to_owned(),
            path: "assets/path_tile.bmp".to_owned(),
            water: "assets/water.png".to_owned(),
            enemy: "assets/enemy.bmp".to_owned(),
            tower: "assets/tower.bmp".to_owned(),
            projectile: "assets/projectile.png".to_owned(),
            explosion: "assets/explosion.bmp".to_owned(),
        }
    }
}

/// Every tuning constant of a level.
///
/// Missing fields fall back to their defaults when deserialised, so a
/// configuration file only needs to list the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Side length of a square tile in world units.
    pub tile_size: f32,
    /// Logical frames simulated per second.
    pub frames_per_second: u32,
    /// Length of the preparation phase in seconds.
    pub prep_seconds: u32,
    /// Length of the whole session in seconds.
    pub session_seconds: u32,
    /// Frames between two enemy spawns.
    pub spawn_interval_frames: u32,
    /// Frames between two tower volleys.
    pub attack_period_frames: u32,
    /// Maximum number of towers the player may place.
    pub tower_cap: u32,
    /// Row index of the slow path lane.
    pub path_row: u32,
    /// Enemy speed on the path row.
    pub path_speed: f32,
    /// Enemy speed elsewhere.
    pub open_speed: f32,
    /// Distance under which an enemy strikes its target tower.
    pub contact_distance: f32,
    /// Arena width in world units.
    pub arena_width: u32,
    /// Arena height in world units.
    pub arena_height: u32,
    /// Raw placement values above this threshold on both axes are treated as
    /// screen coordinates by [`bastion_core::PlacementTarget::infer`].
    pub grid_threshold: i32,
    /// Seed for the spawn generator.
    pub seed: u64,
    /// Texture paths.
    pub sprites: SpritePaths,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            frames_per_second: 30,
            prep_seconds: 10,
            session_seconds: 60,
            spawn_interval_frames: 150,
            attack_period_frames: 30,
            tower_cap: 3,
            path_row: 10,
            path_speed: 1.0,
            open_speed: 2.5,
            contact_distance: 32.0,
            arena_width: 800,
            arena_height: 600,
            grid_threshold: 25,
            seed: 0x5eed_ba57_1011,
            sprites: SpritePaths::default(),
        }
    }
}

impl LevelConfig {
    /// Frames spent in the preparation phase, or `None` if the count does
    /// not fit a frame counter.
    #[must_use]
    pub const fn prep_frames(&self) -> Option<u32> {
        self.prep_seconds.checked_mul(self.frames_per_second)
    }

    /// Frames after which the session is won, or `None` if the count does
    /// not fit a frame counter.
    #[must_use]
    pub const fn session_frames(&self) -> Option<u32> {
        self.session_seconds.checked_mul(self.frames_per_second)
    }

    /// Point enemies walk to when no tower is standing.
    #[must_use]
    pub fn fallback_point(&self) -> Point {
        Point::new(
            self.arena_width as f32 / 2.0,
            self.arena_height as f32 / 2.0,
        )
    }

    /// Baseline enemy speed for the row containing `y`.
    #[must_use]
    pub fn terrain_speed(&self, y: f32) -> f32 {
        let tile = self.tile_size.max(1.0) as i64;
        if y as i64 / tile == i64::from(self.path_row) {
            self.path_speed
        } else {
            self.open_speed
        }
    }
}
