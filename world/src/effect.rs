//! Time-limited status effects attached to enemies.

use crate::{enemy::Enemy, entity::Damageable};

/// Frames between two burn ticks, counted on the effect's own countdown.
pub const BURN_PERIOD: u32 = 30;

/// Behaviour of a status effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    /// Multiplies the enemy speed while active.
    Slow {
        /// Multiplier applied to the enemy speed.
        factor: f32,
    },
    /// Damages the enemy every [`BURN_PERIOD`] frames.
    Burn {
        /// Damage dealt per tick.
        damage_per_tick: u32,
    },
}

/// Lifecycle phase of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectPhase {
    /// Created but not yet attached.
    Pending,
    /// Attached and counting down.
    Active,
    /// Expired; the removal hook already ran.
    Finished,
}

/// Status effect instance. Instances never merge: attaching a second slow
/// adds a second independent countdown.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    kind: EffectKind,
    remaining: u32,
    phase: EffectPhase,
    restore_speed: Option<f32>,
}

impl Effect {
    /// Creates a pending effect lasting `frames` frames.
    #[must_use]
    pub const fn new(kind: EffectKind, frames: u32) -> Self {
        Self {
            kind,
            remaining: frames,
            phase: EffectPhase::Pending,
            restore_speed: None,
        }
    }

    /// Creates a pending slow effect.
    #[must_use]
    pub const fn slow(frames: u32, factor: f32) -> Self {
        Self::new(EffectKind::Slow { factor }, frames)
    }

    /// Creates a pending burn effect.
    #[must_use]
    pub const fn burn(frames: u32, damage_per_tick: u32) -> Self {
        Self::new(EffectKind::Burn { damage_per_tick }, frames)
    }

    /// Behaviour of the effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Frames left before the effect expires.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> EffectPhase {
        self.phase
    }

    /// Reports whether the effect expired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == EffectPhase::Finished
    }

    /// Display name of the effect kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.kind {
            EffectKind::Slow { .. } => "Slow",
            EffectKind::Burn { .. } => "Burn",
        }
    }

    /// Speed multiplier currently imposed on the enemy.
    #[must_use]
    pub fn speed_factor(&self) -> f32 {
        match (self.phase, self.kind) {
            (EffectPhase::Active, EffectKind::Slow { factor }) => factor,
            _ => 1.0,
        }
    }

    /// Attaches the effect to `enemy`. Runs once; later calls are ignored.
    pub(crate) fn apply(&mut self, enemy: &mut Enemy) {
        if self.phase != EffectPhase::Pending {
            return;
        }

        if let EffectKind::Slow { factor } = self.kind {
            let speed = enemy.speed();
            self.restore_speed = Some(speed);
            enemy.set_speed(speed * factor);
        }
        self.phase = EffectPhase::Active;
    }

    /// Advances the countdown by one frame.
    pub(crate) fn update(&mut self, enemy: &mut Enemy) {
        if self.phase != EffectPhase::Active {
            return;
        }

        if self.remaining == 0 {
            self.finish(enemy);
            return;
        }

        self.remaining -= 1;
        if let EffectKind::Burn { damage_per_tick } = self.kind {
            if self.remaining % BURN_PERIOD == 0 {
                enemy.take_damage(damage_per_tick);
            }
        }

        if self.remaining == 0 {
            self.finish(enemy);
        }
    }

    fn finish(&mut self, enemy: &mut Enemy) {
        self.phase = EffectPhase::Finished;
        if let Some(speed) = self.restore_speed.take() {
            enemy.set_speed(speed);
        }
    }
}
