//! The battle field: tile grid, entity registry and the per-frame update.
//!
//! The field is the single owner of simulation state. Tiles hold entity IDs,
//! entities live in an arena keyed by [`EntityId`], and every cross reference
//! (aggressors, delete watchers, reservations) goes through that arena.
//!
//! Submodules split the field's behavior by concern:
//! - `update`: the frame loop, spawn flushing and end-of-frame deletion
//! - `resolve`: attack resolution through defense chains and damage
//! - `movement`: teleports, slides, drag and ice
//! - `terrain`: tile state and team changes, hazards
//! - `digest`: state hashing for desync detection

mod digest;
mod movement;
mod resolve;
mod terrain;
mod update;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::audio::{AudioEvent, AudioPriority, AudioSink, SilentAudio};
use crate::config::BattleConfig;
use crate::entity::{Entity, EntityBehavior, EntityKind};
use crate::error::FieldError;
use crate::rng::SyncedRng;
use crate::tile::Tile;
use crate::types::{EntityId, Position, Team, Tick};

/// Where a spawned entity ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnStatus {
    /// Placed on its tile immediately.
    Added,
    /// Waiting in the pending queue until the running update finishes.
    Queued,
    /// Dropped because the target tile cannot host it.
    Deleted,
}

/// Result of [`Field::spawn`]. The ID is assigned even when the entity was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnResult {
    pub id: EntityId,
    pub status: SpawnStatus,
}

type DeleteCallback = Box<dyn FnOnce(&mut Field, EntityId, EntityId)>;

struct DeleteWatcher {
    target: EntityId,
    observer: EntityId,
    callback: DeleteCallback,
}

struct PendingSpawn {
    entity: Entity,
    position: Position,
}

/// Tile grid plus everything standing on it.
pub struct Field {
    config: BattleConfig,
    width: i32,
    height: i32,
    tiles: Vec<Tile>,

    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
    pending: Vec<PendingSpawn>,
    updated: BTreeSet<EntityId>,
    deleting: Vec<EntityId>,
    resolved: BTreeSet<(EntityId, EntityId)>,
    watchers: Vec<DeleteWatcher>,

    updating: bool,
    battle_active: bool,
    frame: Tick,
    rng: SyncedRng,
    audio: Box<dyn AudioSink>,
}

impl Field {
    /// Build a field with the default 6x3 layout.
    pub fn new() -> Self {
        Self::build(BattleConfig::new())
    }

    /// Build a field from `config`. Red owns the left half of the columns.
    pub fn from_config(config: BattleConfig) -> Result<Self, FieldError> {
        if config.width < 1 || config.height < 1 {
            return Err(FieldError::InvalidDimensions {
                width: config.width,
                height: config.height,
            });
        }
        Ok(Self::build(config))
    }

    fn build(config: BattleConfig) -> Self {
        let (width, height) = (config.width, config.height);
        let mut tiles = Vec::with_capacity(((width + 2) * (height + 2)) as usize);
        for y in 0..height + 2 {
            for x in 0..width + 2 {
                let edge = x == 0 || y == 0 || x == width + 1 || y == height + 1;
                let team = if edge {
                    Team::Unknown
                } else if x <= width / 2 {
                    Team::Red
                } else {
                    Team::Blue
                };
                tiles.push(Tile::new(Position::new(x, y), team, edge, config.tile.clone()));
            }
        }

        Self {
            rng: SyncedRng::new(config.seed),
            config,
            width,
            height,
            tiles,
            entities: BTreeMap::new(),
            next_id: 1,
            pending: Vec::new(),
            updated: BTreeSet::new(),
            deleting: Vec::new(),
            resolved: BTreeSet::new(),
            watchers: Vec::new(),
            updating: false,
            battle_active: true,
            frame: Tick::ZERO,
            audio: Box::new(SilentAudio),
        }
    }

    // ===== accessors =====

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Playable columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Playable rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> Tick {
        self.frame
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    pub fn is_battle_active(&self) -> bool {
        self.battle_active
    }

    /// Resume attack resolution and terrain hazards.
    pub fn battle_start(&mut self) {
        self.battle_active = true;
    }

    /// Freeze combat. Entities keep updating but nothing connects.
    pub fn battle_stop(&mut self) {
        self.battle_active = false;
    }

    pub fn rng_mut(&mut self) -> &mut SyncedRng {
        &mut self.rng
    }

    pub fn set_audio(&mut self, audio: impl AudioSink + 'static) {
        self.audio = Box::new(audio);
    }

    pub fn play_audio(&self, event: AudioEvent, priority: AudioPriority) {
        self.audio.play(event, priority);
    }

    // ===== tiles =====

    fn tile_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x > self.width + 1 || y > self.height + 1 {
            return None;
        }
        Some((y * (self.width + 2) + x) as usize)
    }

    /// Tile at `(x, y)`, including the edge ring. `None` outside it.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.tile_index(x, y).map(|i| &self.tiles[i])
    }

    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.tile_index(x, y).map(|i| &mut self.tiles[i])
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.tile_at(position.x, position.y)
    }

    pub(crate) fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.tile_at_mut(position.x, position.y)
    }

    /// Every tile in update order: column by column, top to bottom.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        (0..self.width + 2)
            .flat_map(move |x| (0..self.height + 2).filter_map(move |y| self.tile_at(x, y)))
    }

    /// Playable tiles matching `pred`, in update order.
    pub fn find_tiles(&self, pred: impl Fn(&Tile) -> bool) -> Vec<&Tile> {
        self.tiles().filter(|t| !t.is_edge() && pred(t)).collect()
    }

    /// Tile an entity currently stands on.
    pub fn entity_tile(&self, id: EntityId) -> Option<&Tile> {
        self.entity(id)?.position().and_then(|p| self.tile(p))
    }

    // ===== entities =====

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// The entity, only if it is a character.
    pub fn character(&self, id: EntityId) -> Option<&Entity> {
        self.entity(id).filter(|e| e.kind() == EntityKind::Character)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entity_mut(id)
            .filter(|e| e.kind() == EntityKind::Character)
    }

    /// Registered entities in ID order, including ones marked deleted.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Live entities matching `pred`, in ID order.
    pub fn find_entities(&self, pred: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| !e.is_deleted() && pred(e))
            .map(Entity::id)
            .collect()
    }

    pub fn find_characters(&self, pred: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.find_entities(|e| e.kind() == EntityKind::Character && pred(e))
    }

    pub fn find_obstacles(&self, pred: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.find_entities(|e| e.kind() == EntityKind::Obstacle && pred(e))
    }

    /// Characters matching `pred`, closest to `from` first. Ties keep ID order.
    pub fn find_nearest_characters(
        &self,
        from: Position,
        pred: impl Fn(&Entity) -> bool,
    ) -> Vec<EntityId> {
        let mut found: Vec<(u32, EntityId)> = self
            .entities
            .values()
            .filter(|e| !e.is_deleted() && e.kind() == EntityKind::Character && pred(e))
            .filter_map(|e| e.position().map(|p| (p.distance(from), e.id())))
            .collect();
        found.sort();
        found.into_iter().map(|(_, id)| id).collect()
    }

    // ===== lifecycle =====

    /// Register `entity` on tile `(x, y)`.
    ///
    /// The ID is assigned immediately. During an update the entity waits in the
    /// pending queue and joins the field after every tile has been processed.
    pub fn spawn(&mut self, mut entity: Entity, x: i32, y: i32) -> SpawnResult {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;

        let position = Position::new(x, y);
        let hostable = self
            .tile(position)
            .is_some_and(|t| !t.is_edge() && !t.is_hidden());
        if !hostable {
            debug!("spawn of {} {} at {} dropped: no tile", entity.name(), id, position);
            return SpawnResult {
                id,
                status: SpawnStatus::Deleted,
            };
        }

        if self.updating {
            debug!("spawn of {} {} at {} queued", entity.name(), id, position);
            self.pending.push(PendingSpawn { entity, position });
            return SpawnResult {
                id,
                status: SpawnStatus::Queued,
            };
        }

        self.insert(entity, position);
        SpawnResult {
            id,
            status: SpawnStatus::Added,
        }
    }

    fn insert(&mut self, mut entity: Entity, position: Position) {
        let id = entity.id;
        let kind = entity.kind();
        entity.position = Some(position);
        debug!("spawned {} {} at {}", entity.name(), id, position);
        self.entities.insert(id, entity);
        if let Some(tile) = self.tile_mut(position) {
            tile.add_entity(id, kind);
        }
        self.with_behavior(id, |behavior, field| behavior.on_spawn(field, id));
    }

    /// Cancel a pending spawn, or mark a live entity deleted.
    pub fn remove_entity_by_id(&mut self, id: EntityId) -> bool {
        if let Some(index) = self.pending.iter().position(|p| p.entity.id == id) {
            self.pending.remove(index);
            debug!("pending spawn {} cancelled", id);
            return true;
        }
        self.delete_entity(id)
    }

    /// Mark an entity deleted. It leaves its tile at the tile's next cleanup
    /// step and the registry at the end of that frame.
    pub fn delete_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        if entity.deleted {
            return false;
        }
        entity.deleted = true;
        debug!("deleting {} {}", entity.name(), id);
        if entity.position.is_none() && !self.deleting.contains(&id) {
            self.deleting.push(id);
        }
        true
    }

    /// Run `callback(field, target, observer)` when `target` leaves the
    /// registry. The watch is dropped if `observer` leaves first.
    pub fn notify_on_delete(
        &mut self,
        target: EntityId,
        observer: EntityId,
        callback: impl FnOnce(&mut Field, EntityId, EntityId) + 'static,
    ) {
        self.watchers.push(DeleteWatcher {
            target,
            observer,
            callback: Box::new(callback),
        });
    }

    /// Queue `attacker` against everything on the tile at `position` this frame.
    pub fn affect_tile(&mut self, position: Position, attacker: EntityId) -> bool {
        let highlight = self
            .entity(attacker)
            .map(Entity::tile_highlight)
            .unwrap_or_default();
        let Some(tile) = self.tile_mut(position) else {
            return false;
        };
        if tile.is_edge() {
            return false;
        }
        tile.request_highlight(highlight);
        tile.queue_attacker(attacker)
    }

    /// Lend an entity's behavior to `f` together with the field.
    ///
    /// The behavior is taken out of the entity for the duration of the call
    /// and put back afterwards unless the callback installed a new one.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut dyn EntityBehavior, &mut Field) -> R,
    ) -> Option<R> {
        let mut behavior = self.entities.get_mut(&id)?.behavior.take()?;
        let out = f(behavior.as_mut(), self);
        if let Some(entity) = self.entities.get_mut(&id) {
            if entity.behavior.is_none() {
                entity.behavior = Some(behavior);
            }
        }
        Some(out)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame", &self.frame)
            .field("entities", &self.entities.len())
            .field("pending", &self.pending.len())
            .field("battle_active", &self.battle_active)
            .finish_non_exhaustive()
    }
}
