#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes nearest-target assignments from level snapshots.
//!
//! Ties between equidistant candidates are resolved by slice order: the
//! candidate encountered first keeps the assignment. Callers pass candidates
//! in the level's insertion order, so ties follow the order in which entities
//! entered the level.

use bastion_core::{EnemyTarget, EntityId, Point, TargetCandidate};

/// Nearest candidate found by [`find_nearest`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// Identifier of the nearest candidate.
    pub id: EntityId,
    /// Position of the nearest candidate.
    pub position: Point,
    /// Euclidean distance from the search origin.
    pub distance: f32,
}

/// Finds the candidate closest to `origin`.
///
/// When `range` is provided, candidates farther than `range` are skipped;
/// a candidate exactly at `range` is still eligible.
#[must_use]
pub fn find_nearest(
    origin: Point,
    candidates: &[TargetCandidate],
    range: Option<f32>,
) -> Option<Nearest> {
    let mut best: Option<Nearest> = None;

    for candidate in candidates {
        let distance = origin.distance_to(candidate.position);
        if let Some(range) = range {
            if distance > range {
                continue;
            }
        }

        let closer = match &best {
            Some(existing) => distance < existing.distance,
            None => true,
        };

        if closer {
            best = Some(Nearest {
                id: candidate.id,
                position: candidate.position,
                distance,
            });
        }
    }

    best
}

/// Tower targeting system assigning every enemy the tower it should march on.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    scratch: Vec<EnemyTarget>,
}

impl TowerTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes movement targets for every enemy candidate.
    ///
    /// Each enemy walks toward its nearest tower. Without any standing tower
    /// the enemy walks toward `fallback`. The output buffer is cleared before
    /// populating it with one assignment per enemy, in enemy order.
    pub fn assign_enemy_targets(
        &mut self,
        enemies: &[TargetCandidate],
        towers: &[TargetCandidate],
        fallback: Point,
        out: &mut Vec<EnemyTarget>,
    ) {
        out.clear();
        self.scratch.clear();

        for enemy in enemies {
            let assignment = match find_nearest(enemy.position, towers, None) {
                Some(nearest) => EnemyTarget {
                    enemy: enemy.id,
                    tower: Some(nearest.id),
                    point: nearest.position,
                    distance: nearest.distance,
                },
                None => EnemyTarget {
                    enemy: enemy.id,
                    tower: None,
                    point: fallback,
                    distance: enemy.position.distance_to(fallback),
                },
            };
            self.scratch.push(assignment);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
