#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Bastion.
//!
//! A [`Level`] owns the tile map, every entity and the session clock.
//! Adapters mutate it exclusively through [`apply`] and read it through the
//! [`query`] module and [`Level::render`].

pub mod config;
pub mod effect;
pub mod enemy;
pub mod entity;
pub mod explosion;
pub mod factory;
pub mod map;
pub mod projectile;
pub mod tower;

use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureService},
    Command, Direction, EnemyKind, EnemyTarget, EntityId, Event, GameError, GridCoord,
    PlacementError, PlacementTarget, Point, SessionStatus, TargetCandidate, TowerKind,
};
use bastion_system_spawning::{Config as SpawningConfig, Spawning};
use bastion_system_tower_combat::{Strike, TowerCombat};
use bastion_system_tower_targeting::{find_nearest, TowerTargeting};

pub use self::config::{LevelConfig, SpritePaths};
pub use self::map::{MapParseError, TileMap};

use self::{
    enemy::Enemy,
    entity::{Damageable, Entity, Simulated, Slot, Sprite},
    explosion::Explosion,
    map::TileAtlas,
    projectile::{Projectile, PROJECTILE_SPEED},
    tower::Tower,
};

const CURSOR_COLOR: Rgba = Rgba::from_rgba(200, 200, 255, 150);
const GAME_OVER_OVERLAY: Rgba = Rgba::from_rgba(0, 0, 0, 150);

/// Represents one authoritative play session.
#[derive(Debug)]
pub struct Level {
    config: LevelConfig,
    map: TileMap,
    atlas: TileAtlas,
    entities: Vec<Slot>,
    next_entity_id: u32,
    cursor: GridCoord,
    selected_kind: TowerKind,
    towers_placed: u32,
    frame: u32,
    prep_frames: u32,
    session_frames: u32,
    spawn_phase: bool,
    won: bool,
    status: SessionStatus,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    assignments: Vec<EnemyTarget>,
    strikes: Vec<Strike>,
}

/// Shot queued during a tower volley.
#[derive(Clone, Copy, Debug)]
struct Shot {
    origin: Point,
    target: Point,
    color: Rgba,
}

impl Level {
    /// Creates a level with the default map.
    ///
    /// Fails when the configuration cannot drive a simulation or when a
    /// mandatory tile texture cannot be loaded.
    pub fn new(config: LevelConfig, textures: &mut dyn TextureService) -> Result<Self, GameError> {
        if config.tile_size <= 0.0 {
            return Err(GameError::Initialization(format!(
                "tile size must be positive, got {}",
                config.tile_size
            )));
        }
        if config.frames_per_second == 0 {
            return Err(GameError::Initialization(
                "frames per second must be positive".to_owned(),
            ));
        }
        let prep_frames = config.prep_frames().ok_or_else(|| {
            GameError::Initialization(format!(
                "prep phase of {}s does not fit a frame counter",
                config.prep_seconds
            ))
        })?;
        let session_frames = config.session_frames().ok_or_else(|| {
            GameError::Initialization(format!(
                "session of {}s does not fit a frame counter",
                config.session_seconds
            ))
        })?;

        let atlas = TileAtlas::load(textures, &config.sprites)?;
        let map = TileMap::flat_with_path(config.path_row);
        let spawning = Spawning::new(SpawningConfig::new(
            config.spawn_interval_frames,
            config.arena_width,
            config.arena_height,
            config.seed,
        ));
        let combat = TowerCombat::new(config.attack_period_frames, config.contact_distance);
        let cursor = GridCoord::new(map.columns() / 2, map.rows() / 2);
        let status = SessionStatus::at_frame(0, config.frames_per_second, config.prep_seconds, false);

        log::info!(
            "Level ready: {}x{} tiles, cap of {} towers",
            map.columns(),
            map.rows(),
            config.tower_cap
        );

        Ok(Self {
            config,
            map,
            atlas,
            entities: Vec::new(),
            next_entity_id: 0,
            cursor,
            selected_kind: TowerKind::Basic,
            towers_placed: 0,
            frame: 0,
            prep_frames,
            session_frames,
            spawn_phase: false,
            won: false,
            status,
            spawning,
            targeting: TowerTargeting::new(),
            combat,
            assignments: Vec::new(),
            strikes: Vec::new(),
        })
    }

    /// Replaces the tile map.
    pub fn load_map(&mut self, map: TileMap) {
        self.map = map;
    }

    /// Draws the map, then every entity in insertion order, then the cursor
    /// and the end-of-session overlay.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let tile = self.config.tile_size;
        self.atlas.draw(&self.map, canvas, tile);

        for slot in &self.entities {
            slot.entity().render(canvas);
        }

        let cursor = self.cursor.to_world(tile);
        canvas.fill_rect(Rect::new(cursor.x(), cursor.y(), tile, tile), CURSOR_COLOR);

        if self.won {
            canvas.fill_rect(
                Rect::new(
                    0.0,
                    0.0,
                    self.config.arena_width as f32,
                    self.config.arena_height as f32,
                ),
                GAME_OVER_OVERLAY,
            );
        }
    }

    /// Returns every texture held by the level to `textures`.
    pub fn shutdown(mut self, textures: &mut dyn TextureService) {
        for slot in &mut self.entities {
            slot.entity_mut().release(textures);
        }
        self.atlas.release(textures);
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.allocate_id();
        self.entities.push(Slot::new(id, entity));
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|slot| slot.id() == id)
    }

    fn tower_mut(&mut self, id: EntityId) -> Option<&mut Tower> {
        let index = self.index_of(id)?;
        self.entities[index].entity_mut().as_tower_mut()
    }

    fn cell_of(&self, position: Point) -> Option<GridCoord> {
        GridCoord::from_world(position, self.config.tile_size)
    }

    fn update(&mut self, textures: &mut dyn TextureService, out: &mut Vec<Event>) {
        if self.won {
            return;
        }

        let first_event = out.len();
        self.advance_clock(out);

        let mut commands = Vec::new();
        self.spawning.handle(&out[first_event..], &mut commands);
        for command in commands {
            if let Command::SpawnEnemy { kind, position } = command {
                let _ = self.spawn_enemy(kind, position, textures, out);
            }
        }

        for slot in &mut self.entities {
            slot.entity_mut().update();
        }

        self.enemy_pass(out);
        if self.combat.advance() {
            self.tower_pass(textures, out);
        }
        self.purge(textures, out);

        self.status = SessionStatus::at_frame(
            self.frame,
            self.config.frames_per_second,
            self.config.prep_seconds,
            self.won,
        );
    }

    fn advance_clock(&mut self, out: &mut Vec<Event>) {
        self.frame += 1;
        let frame = self.frame;
        out.push(Event::TimeAdvanced { frame });

        if frame >= self.session_frames {
            self.won = true;
            log::info!("Time is up! You survived!");
            out.push(Event::SessionWon);
        }

        let fps = self.config.frames_per_second;
        if frame < self.prep_frames {
            if frame % fps == 0 {
                let seconds_remaining = self.config.prep_seconds - frame / fps;
                log::info!("Prep Phase: {seconds_remaining}s remaining. Place towers!");
                out.push(Event::PrepCountdown { seconds_remaining });
            }
        } else if !self.spawn_phase {
            self.spawn_phase = true;
            log::info!("Prep phase over. Enemies incoming!");
            out.push(Event::SpawnPhaseStarted);
        }
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        position: Point,
        textures: &mut dyn TextureService,
        out: &mut Vec<Event>,
    ) -> EntityId {
        let mut enemy = factory::create_enemy(kind, position, &self.config.sprites.enemy, textures);
        enemy.set_target(self.config.fallback_point());
        let id = self.insert(Entity::Enemy(enemy));
        log::debug!("Spawned {} at {position}", kind.name());
        out.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
        });
        id
    }

    fn enemy_candidates(&self) -> Vec<TargetCandidate> {
        self.entities
            .iter()
            .filter_map(|slot| {
                let enemy = slot.entity().as_enemy()?;
                (enemy.body().is_active() && enemy.is_alive())
                    .then(|| TargetCandidate::new(slot.id(), enemy.body().position()))
            })
            .collect()
    }

    fn tower_candidates(&self) -> Vec<TargetCandidate> {
        self.entities
            .iter()
            .filter_map(|slot| {
                let tower = slot.entity().as_tower()?;
                tower
                    .body()
                    .is_active()
                    .then(|| TargetCandidate::new(slot.id(), tower.body().position()))
            })
            .collect()
    }

    fn enemy_pass(&mut self, out: &mut Vec<Event>) {
        let enemies = self.enemy_candidates();
        if enemies.is_empty() {
            return;
        }
        let towers = self.tower_candidates();

        let mut assignments = std::mem::take(&mut self.assignments);
        self.targeting.assign_enemy_targets(
            &enemies,
            &towers,
            self.config.fallback_point(),
            &mut assignments,
        );

        for assignment in &assignments {
            let Some(enemy) = enemy_in(&mut self.entities, assignment.enemy) else {
                continue;
            };
            enemy.set_target(assignment.point);
            let baseline = self.config.terrain_speed(enemy.body().position().y());
            enemy.set_terrain_speed(baseline);
        }

        let mut strikes = std::mem::take(&mut self.strikes);
        strikes.clear();
        self.combat.contact_strikes(&assignments, &mut strikes);
        for strike in &strikes {
            if let Some(tower) = self.tower_mut(strike.tower) {
                if !tower.body().is_active() {
                    continue;
                }
                tower.take_damage(strike.damage);
                let health = tower.health();
                out.push(Event::TowerDamaged {
                    tower: strike.tower,
                    health,
                });
            }
        }

        self.assignments = assignments;
        self.strikes = strikes;
    }

    fn tower_pass(&mut self, textures: &mut dyn TextureService, out: &mut Vec<Event>) {
        let towers = self.tower_candidates();
        let mut shots = Vec::new();

        for candidate in towers {
            let Some(tower_index) = self.index_of(candidate.id) else {
                continue;
            };
            let Some(range) = self.entities[tower_index]
                .entity()
                .as_tower()
                .filter(|tower| tower.body().is_active())
                .map(Tower::range)
            else {
                continue;
            };

            let enemies = self.enemy_candidates();
            let Some(nearest) = find_nearest(candidate.position, &enemies, Some(range)) else {
                continue;
            };
            let Some(enemy_index) = self.index_of(nearest.id) else {
                continue;
            };
            let Some((tower, enemy)) = tower_and_enemy(&mut self.entities, tower_index, enemy_index)
            else {
                continue;
            };

            if tower.attack(enemy) {
                log::debug!(
                    "Tower {} hit {} for {}",
                    candidate.id.get(),
                    enemy.name(),
                    tower.damage()
                );
                out.push(Event::TowerFired {
                    tower: candidate.id,
                    enemy: nearest.id,
                });
                shots.push(Shot {
                    origin: candidate.position,
                    target: nearest.position,
                    color: tower.projectile_color(),
                });
            }
        }

        for shot in shots {
            let projectile = Projectile::new(
                shot.origin,
                shot.target,
                PROJECTILE_SPEED,
                shot.color,
                Sprite::load(&self.config.sprites.projectile, textures),
            );
            let _ = self.insert(Entity::Projectile(projectile));
            let explosion = Explosion::new(
                shot.origin,
                Sprite::load(&self.config.sprites.explosion, textures),
            );
            let _ = self.insert(Entity::Explosion(explosion));
        }
    }

    fn purge(&mut self, textures: &mut dyn TextureService, out: &mut Vec<Event>) {
        self.entities.retain_mut(|slot| {
            if slot.entity().is_active() {
                return true;
            }

            match slot.entity() {
                Entity::Enemy(enemy) => out.push(Event::EnemyDefeated {
                    enemy: slot.id(),
                    name: enemy.name().to_owned(),
                }),
                Entity::Tower(_) => {
                    log::info!("Tower {} destroyed", slot.id().get());
                    out.push(Event::TowerDestroyed { tower: slot.id() });
                }
                Entity::Projectile(_) | Entity::Explosion(_) => {}
            }
            slot.entity_mut().release(textures);
            false
        });
    }

    fn move_cursor(&mut self, direction: Direction, out: &mut Vec<Event>) {
        let column = self.cursor.column();
        let row = self.cursor.row();
        let next = match direction {
            Direction::North => GridCoord::new(column, row.saturating_sub(1)),
            Direction::South => GridCoord::new(column, (row + 1).min(self.map.rows() - 1)),
            Direction::West => GridCoord::new(column.saturating_sub(1), row),
            Direction::East => GridCoord::new((column + 1).min(self.map.columns() - 1), row),
        };

        if next != self.cursor {
            self.cursor = next;
            out.push(Event::CursorMoved { cell: next });
        }
    }

    fn place_tower(
        &mut self,
        target: PlacementTarget,
        textures: &mut dyn TextureService,
    ) -> Result<(EntityId, GridCoord), PlacementError> {
        if self.won {
            return Err(PlacementError::SessionOver);
        }

        if self.frame >= self.prep_frames {
            return Err(PlacementError::PrepPhaseOver);
        }

        let cell = target
            .to_grid(self.config.tile_size)
            .filter(|cell| self.map.contains(*cell))
            .ok_or(PlacementError::OutOfBounds)?;

        if self.towers_placed >= self.config.tower_cap {
            return Err(PlacementError::TowerCapReached);
        }

        if self.tower_ids_at(cell).next().is_some() {
            return Err(PlacementError::Occupied);
        }

        let position = cell.to_world(self.config.tile_size);
        let tower = factory::create_tower(
            self.selected_kind,
            position,
            &self.config.sprites.tower,
            textures,
        );
        let id = self.insert(Entity::Tower(tower));
        self.towers_placed += 1;
        log::info!(
            "Placed tower at grid ({}, {})",
            cell.column(),
            cell.row()
        );
        Ok((id, cell))
    }

    fn tower_ids_at(&self, cell: GridCoord) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().filter_map(move |slot| {
            let tower = slot.entity().as_tower()?;
            (tower.body().is_active() && self.cell_of(tower.body().position()) == Some(cell))
                .then(|| slot.id())
        })
    }

    fn upgrade_at_cursor(&mut self, out: &mut Vec<Event>) {
        let ids: Vec<EntityId> = self.tower_ids_at(self.cursor).collect();
        for id in ids {
            if let Some(tower) = self.tower_mut(id) {
                tower.upgrade();
                let level = tower.level();
                out.push(Event::TowerUpgraded { tower: id, level });
            }
        }
    }

    fn click(&self, position: Point, out: &mut Vec<Event>) {
        let Some(cell) = self.cell_of(position) else {
            return;
        };

        for slot in &self.entities {
            let entity = slot.entity();
            if !entity.is_active() || self.cell_of(entity.position()) != Some(cell) {
                continue;
            }

            if let Entity::Enemy(enemy) = entity {
                enemy.on_click();
                out.push(Event::EnemyInspected {
                    enemy: slot.id(),
                    name: enemy.name().to_owned(),
                    health: enemy.health(),
                    max_health: enemy.max_health(),
                });
            }
        }
    }
}

fn enemy_in(slots: &mut [Slot], id: EntityId) -> Option<&mut Enemy> {
    slots
        .iter_mut()
        .find(|slot| slot.id() == id)
        .and_then(|slot| slot.entity_mut().as_enemy_mut())
}

fn tower_and_enemy(
    slots: &mut [Slot],
    tower: usize,
    enemy: usize,
) -> Option<(&Tower, &mut Enemy)> {
    if tower == enemy {
        return None;
    }

    if tower < enemy {
        let (before, after) = slots.split_at_mut(enemy);
        let tower = before[tower].entity().as_tower()?;
        let enemy = after[0].entity_mut().as_enemy_mut()?;
        Some((tower, enemy))
    } else {
        let (before, after) = slots.split_at_mut(tower);
        let tower = after[0].entity().as_tower()?;
        let enemy = before[enemy].entity_mut().as_enemy_mut()?;
        Some((tower, enemy))
    }
}

/// Applies the provided command to the level, mutating state deterministically.
///
/// Once the session is won every command is ignored.
pub fn apply(
    level: &mut Level,
    textures: &mut dyn TextureService,
    command: Command,
    out_events: &mut Vec<Event>,
) {
    if level.won {
        return;
    }

    match command {
        Command::Tick => level.update(textures, out_events),
        Command::MoveCursor { direction } => level.move_cursor(direction, out_events),
        Command::ConfirmPlacement => {
            let target = PlacementTarget::Grid(level.cursor);
            apply(level, textures, Command::PlaceTower { target }, out_events);
        }
        Command::PlaceTower { target } => {
            let kind = level.selected_kind;
            match level.place_tower(target, textures) {
                Ok((tower, cell)) => out_events.push(Event::TowerPlaced { tower, kind, cell }),
                Err(reason) => {
                    match reason {
                        PlacementError::TowerCapReached => log::warn!("Max towers reached!"),
                        _ => log::warn!("Tower placement rejected: {reason}"),
                    }
                    out_events.push(Event::TowerPlacementRejected {
                        kind,
                        target,
                        reason,
                    });
                }
            }
        }
        Command::PlaceTowerAt { x, y } => {
            let target = PlacementTarget::infer(x, y, level.config.grid_threshold);
            apply(level, textures, Command::PlaceTower { target }, out_events);
        }
        Command::SelectTowerKind { kind } => {
            level.selected_kind = kind;
            log::info!("Selected {kind:?} tower");
            out_events.push(Event::TowerKindSelected { kind });
        }
        Command::UpgradeAtCursor => level.upgrade_at_cursor(out_events),
        Command::Click { position } => level.click(position, out_events),
        Command::SpawnEnemy { kind, position } => {
            let _ = level.spawn_enemy(kind, position, textures, out_events);
        }
    }
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use bastion_core::{EntityId, GridCoord, Point, SessionStatus, TargetCandidate, TowerKind};
    use bastion_system_tower_targeting::find_nearest;

    use super::{
        enemy::Enemy,
        entity::{Entity, Simulated, Slot},
        tower::Tower,
        Level, LevelConfig, TileMap,
    };

    /// Externally visible session state refreshed at the end of every frame.
    #[must_use]
    pub fn status(level: &Level) -> SessionStatus {
        level.status
    }

    /// Frames simulated so far.
    #[must_use]
    pub fn frame(level: &Level) -> u32 {
        level.frame
    }

    /// Reports whether the session reached its terminal state.
    #[must_use]
    pub fn is_over(level: &Level) -> bool {
        level.won
    }

    /// Tuning constants the level runs with.
    #[must_use]
    pub fn config(level: &Level) -> &LevelConfig {
        &level.config
    }

    /// Tile map currently loaded.
    #[must_use]
    pub fn tile_map(level: &Level) -> &TileMap {
        &level.map
    }

    /// Tile highlighted by the placement cursor.
    #[must_use]
    pub fn cursor(level: &Level) -> GridCoord {
        level.cursor
    }

    /// Tower kind used by the next placement.
    #[must_use]
    pub fn selected_tower_kind(level: &Level) -> TowerKind {
        level.selected_kind
    }

    /// Number of successful placements so far.
    #[must_use]
    pub fn towers_placed(level: &Level) -> u32 {
        level.towers_placed
    }

    /// Every entity in insertion order.
    #[must_use]
    pub fn entities(level: &Level) -> &[Slot] {
        &level.entities
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn entity(level: &Level, id: EntityId) -> Option<&Entity> {
        level
            .entities
            .iter()
            .find(|slot| slot.id() == id)
            .map(Slot::entity)
    }

    /// Active enemies in insertion order.
    pub fn enemies(level: &Level) -> impl Iterator<Item = (EntityId, &Enemy)> + '_ {
        level.entities.iter().filter_map(|slot| {
            let enemy = slot.entity().as_enemy()?;
            enemy.body().is_active().then(|| (slot.id(), enemy))
        })
    }

    /// Active towers in insertion order.
    pub fn towers(level: &Level) -> impl Iterator<Item = (EntityId, &Tower)> + '_ {
        level.entities.iter().filter_map(|slot| {
            let tower = slot.entity().as_tower()?;
            tower.body().is_active().then(|| (slot.id(), tower))
        })
    }

    /// Snapshot of the active, living enemies offered to targeting.
    #[must_use]
    pub fn enemy_candidates(level: &Level) -> Vec<TargetCandidate> {
        level.enemy_candidates()
    }

    /// Snapshot of the active towers offered to targeting.
    #[must_use]
    pub fn tower_candidates(level: &Level) -> Vec<TargetCandidate> {
        level.tower_candidates()
    }

    /// Nearest living enemy within `range` of `origin`.
    #[must_use]
    pub fn nearest_enemy(level: &Level, origin: Point, range: Option<f32>) -> Option<EntityId> {
        find_nearest(origin, &level.enemy_candidates(), range).map(|nearest| nearest.id)
    }
}
