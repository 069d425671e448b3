#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system responsible for emitting cursor, placement and inspection commands.

use bastion_core::{Command, Direction, Event, Point, TowerKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Cursor movement requested on this frame.
    pub direction: Option<Direction>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player requested an upgrade on this frame.
    pub upgrade_action: bool,
    /// Tower kind chosen through the number keys on this frame.
    pub selected_kind: Option<TowerKind>,
    /// Screen position clicked on this frame.
    pub click: Option<Point>,
}

impl BuilderInput {
    /// Reports whether the snapshot carries no action at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Input system that translates per-frame input into level commands.
///
/// Once the session is won every further input is ignored.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    session_over: bool,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_over: false,
        }
    }

    /// Consumes level events and adapter-derived input to emit commands.
    ///
    /// Commands are emitted in a fixed order: tower selection, cursor
    /// movement, placement, upgrade, then click inspection.
    pub fn handle(&mut self, events: &[Event], input: BuilderInput, out: &mut Vec<Command>) {
        if events.iter().any(|event| matches!(event, Event::SessionWon)) {
            self.session_over = true;
        }

        if self.session_over || input.is_idle() {
            return;
        }

        if let Some(kind) = input.selected_kind {
            out.push(Command::SelectTowerKind { kind });
        }

        if let Some(direction) = input.direction {
            out.push(Command::MoveCursor { direction });
        }

        if input.confirm_action {
            out.push(Command::ConfirmPlacement);
        }

        if input.upgrade_action {
            out.push(Command::UpgradeAtCursor);
        }

        if let Some(position) = input.click {
            out.push(Command::Click { position });
        }
    }
}
