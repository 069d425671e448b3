use bastion_core::{Command, Direction, Event, Point, TowerKind};
use bastion_system_builder::{Builder, BuilderInput};

#[test]
fn confirm_emits_placement_command() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::ConfirmPlacement],
        "builder should emit a placement command when confirming",
    );
}

#[test]
fn selection_precedes_movement_and_placement() {
    let mut builder = Builder::new();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        BuilderInput {
            direction: Some(Direction::West),
            confirm_action: true,
            upgrade_action: true,
            selected_kind: Some(TowerKind::Fire),
            click: Some(Point::new(10.0, 20.0)),
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::SelectTowerKind {
                kind: TowerKind::Fire
            },
            Command::MoveCursor {
                direction: Direction::West
            },
            Command::ConfirmPlacement,
            Command::UpgradeAtCursor,
            Command::Click {
                position: Point::new(10.0, 20.0)
            },
        ],
    );
}

#[test]
fn idle_input_emits_nothing() {
    let mut builder = Builder::new();
    let mut commands = Vec::new();

    builder.handle(&[Event::TimeAdvanced { frame: 3 }], BuilderInput::default(), &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn input_is_ignored_after_session_won() {
    let mut builder = Builder::new();
    let mut commands = Vec::new();
    let input = BuilderInput {
        direction: Some(Direction::North),
        confirm_action: true,
        ..BuilderInput::default()
    };

    builder.handle(&[Event::SessionWon], input, &mut commands);
    assert!(commands.is_empty());

    builder.handle(&[], input, &mut commands);
    assert!(commands.is_empty(), "terminal state persists across frames");
}
