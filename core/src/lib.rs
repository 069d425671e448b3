#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the level executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Systems consume immutable candidate views and respond with new
//! command batches or strike lists.

mod error;
pub mod render;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::error::{GameError, PlacementError, ResourceError};

/// Position expressed in world units (screen pixels at scale one).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate, growing downwards.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Location of a single map tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Converts a world position into the tile containing it.
    ///
    /// Coordinates are truncated towards zero before the integer division, so
    /// negative positions and non-positive tile sizes yield `None`.
    #[must_use]
    pub fn from_world(position: Point, tile_size: f32) -> Option<Self> {
        if tile_size <= 0.0 || position.x() < 0.0 || position.y() < 0.0 {
            return None;
        }

        let tile = tile_size as u32;
        if tile == 0 {
            return None;
        }

        Some(Self::new(
            position.x() as u32 / tile,
            position.y() as u32 / tile,
        ))
    }

    /// Upper-left corner of the tile in world units.
    #[must_use]
    pub fn to_world(self, tile_size: f32) -> Point {
        Point::new(
            self.column as f32 * tile_size,
            self.row as f32 * tile_size,
        )
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Unique identifier assigned to every entity held by a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Cardinal cursor movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Plain tower with balanced damage and range.
    #[default]
    Basic,
    /// Long-range tower that slows its targets.
    Ice,
    /// Short-range tower that sets its targets on fire.
    Fire,
}

impl TowerKind {
    /// Maps the numeric selection keys `1..=3` onto tower kinds.
    #[must_use]
    pub const fn from_hotkey(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::Basic),
            2 => Some(Self::Ice),
            3 => Some(Self::Fire),
            _ => None,
        }
    }
}

/// Types of enemies the spawner can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fragile, fast enemy.
    Goblin,
    /// Sturdy, slow enemy.
    Orc,
}

impl EnemyKind {
    /// Display name carried by enemies of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Goblin => "Goblin",
            Self::Orc => "Orc",
        }
    }
}

/// Location requested for a tower placement.
///
/// Callers state explicitly whether they hold tile indices or a screen
/// position; screen positions are divided by the tile size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlacementTarget {
    /// Tile indices, used as-is.
    Grid(GridCoord),
    /// Screen position in world units.
    Screen(Point),
}

impl PlacementTarget {
    /// Classifies raw integer input using the legacy magnitude heuristic.
    ///
    /// When both values exceed `threshold` they are treated as screen
    /// coordinates, otherwise as tile indices. Prefer constructing the
    /// variants directly.
    #[must_use]
    pub fn infer(x: i32, y: i32, threshold: i32) -> Self {
        if x > threshold && y > threshold {
            Self::Screen(Point::new(x as f32, y as f32))
        } else {
            Self::Grid(GridCoord::new(
                u32::try_from(x).unwrap_or(u32::MAX),
                u32::try_from(y).unwrap_or(u32::MAX),
            ))
        }
    }

    /// Resolves the target to tile indices.
    #[must_use]
    pub fn to_grid(self, tile_size: f32) -> Option<GridCoord> {
        match self {
            Self::Grid(cell) => Some(cell),
            Self::Screen(position) => GridCoord::from_world(position, tile_size),
        }
    }
}

/// Commands that express all permissible level mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one fixed frame.
    Tick,
    /// Moves the placement cursor by one tile, clamped to the grid.
    MoveCursor {
        /// Direction of travel.
        direction: Direction,
    },
    /// Places the selected tower kind at the cursor.
    ConfirmPlacement,
    /// Places the selected tower kind at an explicit location.
    PlaceTower {
        /// Requested location.
        target: PlacementTarget,
    },
    /// Places the selected tower kind at raw coordinates that may be tile
    /// indices or screen pixels.
    ///
    /// The level resolves them with [`PlacementTarget::infer`] against its
    /// configured grid threshold.
    PlaceTowerAt {
        /// Column index or horizontal pixel.
        x: i32,
        /// Row index or vertical pixel.
        y: i32,
    },
    /// Changes the tower kind used by subsequent placements.
    SelectTowerKind {
        /// Kind to select.
        kind: TowerKind,
    },
    /// Upgrades every tower under the cursor.
    UpgradeAtCursor,
    /// Routes a pointer click to the entities occupying the clicked tile.
    Click {
        /// Screen position of the click.
        position: Point,
    },
    /// Spawns an enemy aimed at the level's fallback point.
    SpawnEnemy {
        /// Kind of enemy to construct.
        kind: EnemyKind,
        /// Entry position.
        position: Point,
    },
}

/// Events broadcast by the level after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The session clock advanced to the provided frame.
    TimeAdvanced {
        /// Frames elapsed since the session started.
        frame: u32,
    },
    /// Once-per-second reminder emitted during the preparation phase.
    PrepCountdown {
        /// Whole seconds left before enemies start spawning.
        seconds_remaining: u32,
    },
    /// The preparation phase ended and enemies started spawning.
    SpawnPhaseStarted,
    /// The session timer ran out with the player still standing.
    SessionWon,
    /// The placement cursor moved.
    CursorMoved {
        /// Tile now highlighted by the cursor.
        cell: GridCoord,
    },
    /// The tower kind used by placements changed.
    TowerKindSelected {
        /// Newly selected kind.
        kind: TowerKind,
    },
    /// A tower was placed.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: EntityId,
        /// Kind of tower that was constructed.
        kind: TowerKind,
        /// Tile holding the tower.
        cell: GridCoord,
    },
    /// A tower placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Requested location.
        target: PlacementTarget,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// A tower was upgraded.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: EntityId,
        /// Level reached by the tower.
        level: u32,
    },
    /// An enemy struck a tower.
    TowerDamaged {
        /// Identifier of the damaged tower.
        tower: EntityId,
        /// Health left after the strike.
        health: u32,
    },
    /// A tower lost all its health and was removed.
    TowerDestroyed {
        /// Identifier of the destroyed tower.
        tower: EntityId,
    },
    /// A tower fired at an enemy.
    TowerFired {
        /// Identifier of the firing tower.
        tower: EntityId,
        /// Identifier of the enemy hit.
        enemy: EntityId,
    },
    /// An enemy entered the level.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EntityId,
        /// Kind of enemy constructed.
        kind: EnemyKind,
        /// Entry position.
        position: Point,
    },
    /// An enemy lost all its health and was removed.
    EnemyDefeated {
        /// Identifier of the defeated enemy.
        enemy: EntityId,
        /// Display name of the enemy.
        name: String,
    },
    /// An enemy was clicked for inspection.
    EnemyInspected {
        /// Identifier of the inspected enemy.
        enemy: EntityId,
        /// Display name of the enemy.
        name: String,
        /// Current health.
        health: u32,
        /// Maximum health.
        max_health: u32,
    },
}

/// Phase of a play session as seen by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Towers may be placed; nothing spawns yet.
    Prep {
        /// Whole seconds left in the phase.
        seconds_remaining: u32,
    },
    /// Enemies are spawning.
    Survive {
        /// Whole seconds survived since spawning started.
        seconds_elapsed: u32,
    },
    /// The session timer ran out; terminal.
    Won,
}

/// Externally visible session state refreshed at the end of every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    /// Frames elapsed since the session started.
    pub frame: u32,
    /// Current phase.
    pub phase: SessionPhase,
}

impl SessionStatus {
    /// Derives the status for `frame` given the phase boundaries in frames.
    #[must_use]
    pub fn at_frame(frame: u32, frames_per_second: u32, prep_seconds: u32, won: bool) -> Self {
        if won {
            return Self {
                frame,
                phase: SessionPhase::Won,
            };
        }

        let seconds = frame / frames_per_second.max(1);
        let phase = if seconds < prep_seconds {
            SessionPhase::Prep {
                seconds_remaining: prep_seconds - seconds,
            }
        } else {
            SessionPhase::Survive {
                seconds_elapsed: seconds - prep_seconds,
            }
        };

        Self { frame, phase }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            SessionPhase::Prep { seconds_remaining } => {
                write!(f, "Tower Defense - PREP: {seconds_remaining}s")
            }
            SessionPhase::Survive { seconds_elapsed } => {
                write!(f, "Tower Defense - SURVIVE: {seconds_elapsed}s")
            }
            SessionPhase::Won => write!(f, "Tower Defense - SURVIVED!"),
        }
    }
}

/// Immutable view of an active entity offered to targeting systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the candidate entity.
    pub id: EntityId,
    /// Position of the candidate at the time of the snapshot.
    pub position: Point,
}

impl TargetCandidate {
    /// Creates a new candidate descriptor.
    #[must_use]
    pub const fn new(id: EntityId, position: Point) -> Self {
        Self { id, position }
    }
}

/// Movement target assigned to an enemy for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTarget {
    /// Enemy receiving the assignment.
    pub enemy: EntityId,
    /// Tower the enemy is walking toward, if any tower is standing.
    pub tower: Option<EntityId>,
    /// Point the enemy should walk toward.
    pub point: Point,
    /// Distance between the enemy and `point` when the assignment was made.
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::{GridCoord, PlacementTarget, Point, SessionPhase, SessionStatus, TowerKind};

    #[test]
    fn distance_is_euclidean_and_symmetric() {
        let origin = Point::new(0.0, 0.0);
        let other = Point::new(3.0, 4.0);
        assert_eq!(origin.distance_to(other), 5.0);
        assert_eq!(other.distance_to(origin), 5.0);
    }

    #[test]
    fn world_positions_truncate_into_tiles() {
        let cell = GridCoord::from_world(Point::new(65.9, 31.9), 32.0);
        assert_eq!(cell, Some(GridCoord::new(2, 0)));
        assert_eq!(GridCoord::from_world(Point::new(-1.0, 4.0), 32.0), None);
        assert_eq!(GridCoord::new(3, 2).to_world(32.0), Point::new(96.0, 64.0));
    }

    #[test]
    fn inferred_targets_follow_magnitude_heuristic() {
        assert_eq!(
            PlacementTarget::infer(12, 10, 25),
            PlacementTarget::Grid(GridCoord::new(12, 10))
        );
        assert_eq!(
            PlacementTarget::infer(400, 320, 25),
            PlacementTarget::Screen(Point::new(400.0, 320.0))
        );
        // Only one axis above the threshold still reads as tile indices.
        assert_eq!(
            PlacementTarget::infer(40, 3, 25).to_grid(32.0),
            Some(GridCoord::new(40, 3))
        );
        assert_eq!(
            PlacementTarget::infer(400, 320, 25).to_grid(32.0),
            Some(GridCoord::new(12, 10))
        );
    }

    #[test]
    fn hotkeys_select_tower_kinds() {
        assert_eq!(TowerKind::from_hotkey(1), Some(TowerKind::Basic));
        assert_eq!(TowerKind::from_hotkey(2), Some(TowerKind::Ice));
        assert_eq!(TowerKind::from_hotkey(3), Some(TowerKind::Fire));
        assert_eq!(TowerKind::from_hotkey(4), None);
    }

    #[test]
    fn session_status_tracks_phase_boundaries() {
        let start = SessionStatus::at_frame(1, 30, 10, false);
        assert_eq!(
            start.phase,
            SessionPhase::Prep {
                seconds_remaining: 10
            }
        );
        assert_eq!(start.to_string(), "Tower Defense - PREP: 10s");

        let survive = SessionStatus::at_frame(30 * 14, 30, 10, false);
        assert_eq!(
            survive.phase,
            SessionPhase::Survive { seconds_elapsed: 4 }
        );
        assert_eq!(survive.to_string(), "Tower Defense - SURVIVE: 4s");

        let won = SessionStatus::at_frame(1800, 30, 10, true);
        assert_eq!(won.phase, SessionPhase::Won);
    }
}
