#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system owning the shared attack clock and enemy contact strikes.
//!
//! A single clock drives both sides of the fight. Enemies strike on the frame
//! the clock reads zero; towers volley on the frame it wraps around.

use bastion_core::{EnemyTarget, EntityId};

/// Damage dealt by a single enemy contact strike.
pub const CONTACT_DAMAGE: u32 = 1;

/// Contact strike an enemy lands on the tower it is marching on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strike {
    /// Enemy landing the strike.
    pub enemy: EntityId,
    /// Tower receiving the strike.
    pub tower: EntityId,
    /// Damage inflicted.
    pub damage: u32,
}

/// Tower combat system tracking the shared attack clock.
#[derive(Clone, Debug)]
pub struct TowerCombat {
    period: u32,
    contact_distance: f32,
    clock: u32,
    scratch: Vec<Strike>,
}

impl TowerCombat {
    /// Creates a combat system with the provided attack period in frames and
    /// enemy contact distance in world units.
    #[must_use]
    pub fn new(period: u32, contact_distance: f32) -> Self {
        Self {
            period: period.max(1),
            contact_distance,
            clock: 0,
            scratch: Vec::new(),
        }
    }

    /// Current value of the attack clock.
    #[must_use]
    pub const fn clock(&self) -> u32 {
        self.clock
    }

    /// Reports whether enemies may strike during the current frame.
    #[must_use]
    pub const fn enemy_tick(&self) -> bool {
        self.clock == 0
    }

    /// Advances the clock by one frame and reports whether towers volley.
    ///
    /// The clock wraps back to zero on the volley frame, so the enemy tick
    /// falls on the frame after every volley.
    pub fn advance(&mut self) -> bool {
        self.clock += 1;
        if self.clock >= self.period {
            self.clock = 0;
            return true;
        }
        false
    }

    /// Emits a strike for every enemy standing within contact distance of
    /// its target tower. Nothing is emitted outside the enemy tick.
    pub fn contact_strikes(&mut self, targets: &[EnemyTarget], out: &mut Vec<Strike>) {
        if !self.enemy_tick() {
            return;
        }

        self.scratch.clear();
        for target in targets {
            let Some(tower) = target.tower else {
                continue;
            };

            if target.distance < self.contact_distance {
                self.scratch.push(Strike {
                    enemy: target.enemy,
                    tower,
                    damage: CONTACT_DAMAGE,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
