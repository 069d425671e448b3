use bastion_core::{
    render::{Rgba, TextureHandle, TextureService},
    Command, Direction, EnemyKind, EntityId, Event, GameError, GridCoord, PlacementError,
    PlacementTarget, Point, ResourceError, SessionPhase, TowerKind,
};
use bastion_rendering::{DrawCall, HeadlessTextures, MissingTextures, RecordingCanvas};
use bastion_world::{
    self as world,
    entity::{Damageable, Entity, Simulated},
    query, Level, LevelConfig,
};

fn new_level(textures: &mut HeadlessTextures) -> Level {
    Level::new(LevelConfig::default(), textures).expect("headless textures always load")
}

fn run(level: &mut Level, textures: &mut HeadlessTextures, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(level, textures, command, &mut events);
    events
}

fn tick(level: &mut Level, textures: &mut HeadlessTextures, frames: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..frames {
        world::apply(level, textures, Command::Tick, &mut events);
    }
    events
}

fn place(level: &mut Level, textures: &mut HeadlessTextures, column: u32, row: u32) -> Vec<Event> {
    run(
        level,
        textures,
        Command::PlaceTower {
            target: PlacementTarget::Grid(GridCoord::new(column, row)),
        },
    )
}

fn rejection(events: &[Event]) -> Option<PlacementError> {
    events.iter().find_map(|event| match event {
        Event::TowerPlacementRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}

fn spawn(level: &mut Level, textures: &mut HeadlessTextures, kind: EnemyKind, x: f32, y: f32) -> EntityId {
    let events = run(
        level,
        textures,
        Command::SpawnEnemy {
            kind,
            position: Point::new(x, y),
        },
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("spawn command emits an event")
}

#[test]
fn placement_cap_rejects_the_fourth_tower() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    for column in 0..3 {
        let events = place(&mut level, &mut textures, column, 0);
        assert!(
            matches!(events.as_slice(), [Event::TowerPlaced { kind: TowerKind::Basic, .. }]),
            "placement {column} should succeed: {events:?}"
        );
        assert_eq!(query::towers_placed(&level), column + 1);
    }

    let events = place(&mut level, &mut textures, 5, 5);
    assert_eq!(rejection(&events), Some(PlacementError::TowerCapReached));
    assert_eq!(query::towers_placed(&level), 3);
    assert_eq!(query::towers(&level).count(), 3);
}

#[test]
fn placement_after_prep_deadline_is_rejected() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let _ = tick(&mut level, &mut textures, 299);
    assert!(rejection(&place(&mut level, &mut textures, 1, 1)).is_none());

    let _ = tick(&mut level, &mut textures, 1);
    let events = place(&mut level, &mut textures, 2, 2);
    assert_eq!(rejection(&events), Some(PlacementError::PrepPhaseOver));
    assert_eq!(query::towers_placed(&level), 1, "count untouched on rejection");
}

#[test]
fn placement_validates_cells() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    assert_eq!(
        rejection(&place(&mut level, &mut textures, 25, 0)),
        Some(PlacementError::OutOfBounds)
    );

    let events = run(
        &mut level,
        &mut textures,
        Command::PlaceTower {
            target: PlacementTarget::Screen(Point::new(400.0, 330.0)),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlaced { cell, .. }] if *cell == GridCoord::new(12, 10)
    ));

    assert_eq!(
        rejection(&place(&mut level, &mut textures, 12, 10)),
        Some(PlacementError::Occupied)
    );
    assert_eq!(query::towers_placed(&level), 1);
}

#[test]
fn out_of_grid_placement_after_deadline_reports_the_deadline() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);
    let _ = tick(&mut level, &mut textures, 300);

    assert_eq!(
        rejection(&place(&mut level, &mut textures, 40, 40)),
        Some(PlacementError::PrepPhaseOver)
    );
    assert_eq!(
        rejection(&place(&mut level, &mut textures, 3, 3)),
        Some(PlacementError::PrepPhaseOver)
    );
}

#[test]
fn raw_coordinates_resolve_through_the_grid_threshold() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let events = run(&mut level, &mut textures, Command::PlaceTowerAt { x: 12, y: 9 });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlaced { cell, .. }] if *cell == GridCoord::new(12, 9)
    ));

    let events = run(&mut level, &mut textures, Command::PlaceTowerAt { x: 400, y: 330 });
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlaced { cell, .. }] if *cell == GridCoord::new(12, 10)
    ));

    let events = run(&mut level, &mut textures, Command::PlaceTowerAt { x: 30, y: 2 });
    assert_eq!(rejection(&events), Some(PlacementError::OutOfBounds));
    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlacementRejected {
            target: PlacementTarget::Grid(cell),
            ..
        }] if *cell == GridCoord::new(30, 2)
    ));
}

#[test]
fn spawned_enemy_targets_the_fallback_point() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let events = tick(&mut level, &mut textures, 300);
    assert!(events.contains(&Event::SpawnPhaseStarted));
    assert_eq!(query::enemies(&level).count(), 0);

    let events = tick(&mut level, &mut textures, 150);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));

    let enemies: Vec<_> = query::enemies(&level).collect();
    assert!(!enemies.is_empty(), "an enemy spawns after the spawn interval");
    for (_, enemy) in enemies {
        assert!(enemy.body().is_active());
        assert_eq!(enemy.target(), Point::new(400.0, 300.0));
    }
}

#[test]
fn prep_countdown_and_status_follow_the_clock() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let events = tick(&mut level, &mut textures, 30);
    assert!(events.contains(&Event::PrepCountdown {
        seconds_remaining: 9
    }));
    assert_eq!(query::status(&level).to_string(), "Tower Defense - PREP: 9s");

    let _ = tick(&mut level, &mut textures, 300);
    assert_eq!(
        query::status(&level).phase,
        SessionPhase::Survive { seconds_elapsed: 1 }
    );
}

#[test]
fn session_is_won_at_the_time_limit_and_freezes() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let events = tick(&mut level, &mut textures, 1799);
    assert!(!events.contains(&Event::SessionWon));
    assert!(!query::is_over(&level));

    let events = tick(&mut level, &mut textures, 1);
    assert!(events.contains(&Event::SessionWon));
    assert_eq!(query::status(&level).phase, SessionPhase::Won);

    assert!(tick(&mut level, &mut textures, 10).is_empty());
    assert_eq!(query::frame(&level), 1800);
    assert!(run(&mut level, &mut textures, Command::ConfirmPlacement).is_empty());
    assert!(run(
        &mut level,
        &mut textures,
        Command::MoveCursor {
            direction: Direction::North
        }
    )
    .is_empty());
}

#[test]
fn cursor_is_clamped_and_drives_placement_and_upgrades() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);
    assert_eq!(query::cursor(&level), GridCoord::new(12, 10));

    let mut moves = 0;
    for _ in 0..20 {
        let events = run(
            &mut level,
            &mut textures,
            Command::MoveCursor {
                direction: Direction::West,
            },
        );
        moves += events.len();
    }
    assert_eq!(moves, 12);
    assert_eq!(query::cursor(&level), GridCoord::new(0, 10));

    let _ = run(
        &mut level,
        &mut textures,
        Command::SelectTowerKind {
            kind: TowerKind::Ice,
        },
    );
    let events = run(&mut level, &mut textures, Command::ConfirmPlacement);
    let tower = match events.as_slice() {
        [Event::TowerPlaced { tower, kind, cell }] => {
            assert_eq!(*kind, TowerKind::Ice);
            assert_eq!(*cell, GridCoord::new(0, 10));
            *tower
        }
        other => panic!("unexpected events: {other:?}"),
    };

    let events = run(&mut level, &mut textures, Command::UpgradeAtCursor);
    assert_eq!(events, vec![Event::TowerUpgraded { tower, level: 2 }]);
    let (_, upgraded) = query::towers(&level).next().expect("tower stands");
    assert_eq!(upgraded.damage(), 7);
    assert_eq!(upgraded.range(), 810.0);
}

#[test]
fn towers_volley_every_attack_period() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let _ = place(&mut level, &mut textures, 12, 10);
    let enemy = spawn(&mut level, &mut textures, EnemyKind::Goblin, 484.0, 320.0);

    let events = tick(&mut level, &mut textures, 29);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TowerFired { .. })));

    let events = tick(&mut level, &mut textures, 1);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TowerFired { enemy: hit, .. } if *hit == enemy)));

    let (health, position) = match query::entity(&level, enemy) {
        Some(Entity::Enemy(goblin)) => (goblin.health(), goblin.body().position()),
        other => panic!("goblin should still stand: {other:?}"),
    };
    assert_eq!(health, 65);

    let shot = query::entities(&level)
        .iter()
        .find_map(|slot| match slot.entity() {
            Entity::Projectile(projectile) => Some(projectile),
            _ => None,
        })
        .expect("volley launches a projectile");
    assert_eq!(shot.target(), position);
    assert_eq!(shot.color(), Rgba::BLACK);

    let projectiles = query::entities(&level)
        .iter()
        .filter(|slot| matches!(slot.entity(), Entity::Projectile(_)))
        .count();
    let explosions = query::entities(&level)
        .iter()
        .filter(|slot| matches!(slot.entity(), Entity::Explosion(_)))
        .count();
    assert_eq!((projectiles, explosions), (1, 1));

    let _ = tick(&mut level, &mut textures, 10);
    let explosions = query::entities(&level)
        .iter()
        .filter(|slot| matches!(slot.entity(), Entity::Explosion(_)))
        .count();
    assert_eq!(explosions, 0, "muzzle flash fades after ten frames");
}

#[test]
fn enemies_strike_adjacent_towers_on_the_enemy_tick() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let events = place(&mut level, &mut textures, 0, 0);
    let tower = match events.as_slice() {
        [Event::TowerPlaced { tower, .. }] => *tower,
        other => panic!("unexpected events: {other:?}"),
    };
    let _ = spawn(&mut level, &mut textures, EnemyKind::Orc, 10.0, 0.0);

    let events = tick(&mut level, &mut textures, 31);
    let damage: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::TowerDamaged { tower: hit, health } if *hit == tower => Some(*health),
            _ => None,
        })
        .collect();
    assert_eq!(damage, vec![99, 98]);
}

#[test]
fn clicks_inspect_enemies_in_the_clicked_cell() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);
    let enemy = spawn(&mut level, &mut textures, EnemyKind::Orc, 100.0, 100.0);

    let events = run(
        &mut level,
        &mut textures,
        Command::Click {
            position: Point::new(110.0, 120.0),
        },
    );
    assert_eq!(
        events,
        vec![Event::EnemyInspected {
            enemy,
            name: "Orc".to_owned(),
            health: 150,
            max_health: 150,
        }]
    );

    let events = run(
        &mut level,
        &mut textures,
        Command::Click {
            position: Point::new(300.0, 300.0),
        },
    );
    assert!(events.is_empty());
}

#[test]
fn missing_mandatory_tiles_abort_construction() {
    let mut textures = MissingTextures;
    let error = Level::new(LevelConfig::default(), &mut textures).expect_err("grass is mandatory");
    assert_eq!(
        error,
        GameError::Resource(ResourceError::Missing {
            path: "assets/map_tile.bmp".to_owned(),
        })
    );
}

#[derive(Default)]
struct WithoutWater {
    inner: HeadlessTextures,
}

impl TextureService for WithoutWater {
    fn load(&mut self, path: &str) -> Result<TextureHandle, ResourceError> {
        if path.contains("water") {
            return Err(ResourceError::Missing {
                path: path.to_owned(),
            });
        }
        self.inner.load(path)
    }

    fn release(&mut self, handle: TextureHandle) {
        self.inner.release(handle);
    }
}

#[test]
fn missing_water_is_tolerated() {
    let mut textures = WithoutWater::default();
    let level = Level::new(LevelConfig::default(), &mut textures);
    assert!(level.is_ok());

    let level = level.expect("water is optional");
    level.shutdown(&mut textures);
    assert_eq!(textures.inner.live_count(), 0);
}

#[test]
fn render_draws_map_entities_then_cursor() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);
    let _ = place(&mut level, &mut textures, 3, 3);
    let _ = tick(&mut level, &mut textures, 1);

    let mut canvas = RecordingCanvas::new();
    level.render(&mut canvas);
    let calls = canvas.calls();

    assert_eq!(calls.len(), 500 + 1 + 1);
    assert!(calls[..500]
        .iter()
        .all(|call| matches!(call, DrawCall::Texture { .. })));
    assert!(matches!(
        calls[500],
        DrawCall::Texture { dest, .. } if dest.x == 96.0 && dest.y == 96.0
    ));
    assert!(matches!(
        calls[501],
        DrawCall::Fill { color, .. } if color == Rgba::from_rgba(200, 200, 255, 150)
    ));
}

#[test]
fn identical_seeds_replay_identically() {
    let replay = || {
        let mut textures = HeadlessTextures::new();
        let mut level = new_level(&mut textures);
        let _ = place(&mut level, &mut textures, 12, 9);
        let _ = run(
            &mut level,
            &mut textures,
            Command::SelectTowerKind {
                kind: TowerKind::Fire,
            },
        );
        let _ = place(&mut level, &mut textures, 12, 11);
        tick(&mut level, &mut textures, 1200)
    };

    assert_eq!(replay(), replay());
}

#[test]
fn loaded_maps_replace_the_default_layout() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);
    assert_eq!(
        query::tile_map(&level).code(GridCoord::new(0, 10)),
        Some(1),
        "default map carries the path row"
    );

    let mut rows = vec![vec!["0"; 25].join(","); 20];
    rows[0] = std::iter::once("2")
        .chain(std::iter::repeat("0").take(24))
        .collect::<Vec<_>>()
        .join(",");
    let source = format!("# pond in the corner\n{}\n", rows.join("\n"));
    let map = bastion_world::TileMap::parse(&source).expect("map parses");
    level.load_map(map);

    let tiles = query::tile_map(&level);
    assert_eq!(tiles.code(GridCoord::new(0, 0)), Some(2));
    assert_eq!(tiles.code(GridCoord::new(0, 10)), Some(0));

    let mut canvas = RecordingCanvas::new();
    level.render(&mut canvas);
    let textured = canvas
        .calls()
        .iter()
        .filter(|call| matches!(call, DrawCall::Texture { .. }))
        .count();
    assert_eq!(textured, 500);
}

#[test]
fn oversized_sessions_fail_initialization() {
    let mut textures = HeadlessTextures::new();
    let config = LevelConfig {
        session_seconds: 200_000_000,
        ..LevelConfig::default()
    };
    let error = Level::new(config, &mut textures).expect_err("session frames overflow");
    assert!(matches!(error, GameError::Initialization(_)), "{error:?}");
    assert_eq!(textures.live_count(), 0, "no tiles loaded before validation");
}

#[test]
fn enemies_spawn_on_a_loaded_map() {
    let mut textures = HeadlessTextures::new();
    let mut level = new_level(&mut textures);

    let mut rows = vec![vec!["0"; 25].join(","); 20];
    rows[4] = vec!["1"; 25].join(",");
    let map = bastion_world::TileMap::parse(&rows.join("\n")).expect("map parses");
    level.load_map(map);

    let events = tick(&mut level, &mut textures, 450);
    assert!(events.contains(&Event::SpawnPhaseStarted));
    let enemies: Vec<_> = query::enemies(&level).collect();
    assert!(!enemies.is_empty(), "spawning runs on a loaded map");
    for (_, enemy) in enemies {
        assert!(enemy.body().is_active());
        assert_eq!(enemy.target(), Point::new(400.0, 300.0));
    }
    assert_eq!(query::tile_map(&level).code(GridCoord::new(0, 4)), Some(1));
}
