//! The frame loop.

use tracing::{debug, trace};

use super::Field;
use crate::audio::{AudioEvent, AudioPriority};
use crate::entity::StatusResolution;
use crate::hit::HitFlags;
use crate::tile::TileHighlight;
use crate::types::{EntityId, Position};

impl Field {
    /// Advance the simulation by one frame.
    ///
    /// Tiles are processed column by column. Entities spawned during the
    /// frame join after the last tile, and entities deleted during it leave
    /// the registry at the very end.
    pub fn update(&mut self) {
        self.updating = true;
        self.frame = self.frame + 1;
        self.updated.clear();
        self.resolved.clear();
        trace!("frame {} begins", self.frame);

        for x in 0..self.width + 2 {
            for y in 0..self.height + 2 {
                self.update_tile(Position::new(x, y));
            }
        }
        self.resolve_late_attacks();

        self.updating = false;
        self.flush_pending();
        self.restore_stolen_columns();
        self.drain_deleting();
    }

    fn update_tile(&mut self, position: Position) {
        // (a) timers
        let Some(tile) = self.tile_mut(position) else {
            return;
        };
        let tick = tile.advance_timers();
        if tick.regenerated {
            self.play_audio(AudioEvent::PanelReturn, AudioPriority::Low);
        }
        if tick.erupted {
            self.erupt_volcano(position);
        }

        // (b) cleanup
        self.cleanup_tile(position);

        // (c) spells and obstacles
        for id in self.tile_snapshot(position, |t| t.spells().to_vec()) {
            self.update_entity(id);
        }

        // (d) attacks
        if self.battle_active {
            self.execute_all_attacks(position);
        } else if let Some(tile) = self.tile_mut(position) {
            tile.take_queued_attackers();
        }

        // (e) artifacts and characters
        let rest = self.tile_snapshot(position, |t| {
            t.artifacts().iter().chain(t.characters()).copied().collect()
        });
        for id in rest {
            self.update_entity(id);
        }

        // (f) hazards
        if self.battle_active {
            self.apply_terrain_effects(position);
        }

        if let Some(tile) = self.tile_mut(position) {
            tile.finish_scan();
        }
    }

    /// Resolve attacks queued on tiles the scan had already passed, so an
    /// attack lands in the frame it was made whichever way it points.
    fn resolve_late_attacks(&mut self) {
        let late: Vec<Position> = self
            .tiles
            .iter()
            .filter(|t| !t.queued_attackers().is_empty())
            .map(|t| t.position())
            .collect();
        for position in late {
            trace!("late attacks on {}", position);
            if self.battle_active {
                self.execute_all_attacks(position);
            } else if let Some(tile) = self.tile_mut(position) {
                tile.take_queued_attackers();
            }
        }
    }

    fn tile_snapshot(
        &self,
        position: Position,
        f: impl FnOnce(&crate::tile::Tile) -> Vec<EntityId>,
    ) -> Vec<EntityId> {
        self.tile(position).map(f).unwrap_or_default()
    }

    /// Drop deleted entities from the tile's buckets and hand them to the
    /// deleting set.
    fn cleanup_tile(&mut self, position: Position) {
        let ids = self.tile_snapshot(position, |t| t.entities().to_vec());
        for id in ids {
            let deleted = self.entities.get(&id).is_none_or(|e| e.deleted);
            if !deleted {
                continue;
            }
            if let Some(tile) = self.tile_mut(position) {
                tile.remove_entity_by_id(id);
            }
            if self.entities.contains_key(&id) && !self.deleting.contains(&id) {
                self.deleting.push(id);
            }
        }
    }

    /// Update one entity, at most once per frame.
    pub(crate) fn update_entity(&mut self, id: EntityId) {
        if !self.updated.insert(id) {
            return;
        }
        let battle_active = self.battle_active;
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if entity.deleted {
            return;
        }
        entity.frames_alive += 1;

        let hittable = entity.kind().is_hittable();
        if hittable && entity.max_health() > 0 && entity.health() == 0 {
            self.delete_entity(id);
            return;
        }

        let resolution = if hittable {
            let counterable = entity.is_counterable();
            let sliding = entity.is_sliding();
            entity.status.resolve(&self.config.status, counterable, sliding)
        } else {
            StatusResolution::default()
        };
        entity.status.tick();
        entity.intangibility.tick();
        if resolution.applied.contains(HitFlags::RETANGIBLE) {
            entity.intangibility.disable();
        }
        if resolution.counter_aggressor.is_some() {
            entity.set_counter_frame(false);
        }
        let immobilized = entity.status.is_immobilized();

        self.apply_status_resolution(id, resolution);
        self.advance_movement(id);

        if !immobilized {
            self.run_sequence(id);
            self.with_behavior(id, |behavior, field| behavior.on_update(field, id));
        }

        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        let highlight = match entity.tile_highlight() {
            TileHighlight::Automatic if !battle_active => TileHighlight::None,
            highlight => highlight,
        };
        if highlight != TileHighlight::None && !entity.deleted {
            if let Some(position) = entity.position {
                if let Some(tile) = self.tile_mut(position) {
                    tile.request_highlight(highlight);
                }
            }
        }
    }

    fn apply_status_resolution(&mut self, id: EntityId, resolution: StatusResolution) {
        if let Some(aggressor) = resolution.counter_aggressor {
            debug!("{} countered by {}", id, aggressor);
            self.play_audio(AudioEvent::CounterHit, AudioPriority::Highest);
        }
        if let Some(drag) = resolution.drag {
            self.start_drag(id, drag);
        }
        for flag in resolution.applied.iter() {
            self.with_behavior(id, |behavior, field| behavior.on_status(field, id, flag));
        }
    }

    fn run_sequence(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        let Some(sequence) = entity.sequence.as_mut() else {
            return;
        };
        let due = sequence.advance();
        if sequence.is_finished() {
            entity.sequence = None;
        }
        for step in due {
            step.run(self, id);
        }
    }

    /// Move queued spawns onto the field in the order they were requested.
    pub(crate) fn flush_pending(&mut self) {
        for spawn in std::mem::take(&mut self.pending) {
            self.insert(spawn.entity, spawn.position);
        }
    }

    /// Remove every entity in the deleting set from the registry.
    pub(crate) fn drain_deleting(&mut self) {
        while !self.deleting.is_empty() {
            for id in std::mem::take(&mut self.deleting) {
                self.with_behavior(id, |behavior, field| behavior.on_delete(field, id));

                if let Some(entity) = self.entities.remove(&id) {
                    if let Some(position) = entity.position {
                        if let Some(tile) = self.tile_mut(position) {
                            tile.remove_entity_by_id(id);
                        }
                    }
                    if let Some(movement) = entity.movement {
                        if let Some(tile) = self.tile_mut(movement.dest) {
                            tile.remove_reservation(id);
                        }
                    }
                    debug!("removed {} {}", entity.name(), id);
                }

                let (fire, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.watchers)
                    .into_iter()
                    .filter(|w| w.observer != id || w.target == id)
                    .partition(|w| w.target == id);
                self.watchers = keep;
                for watcher in fire {
                    (watcher.callback)(self, watcher.target, watcher.observer);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::entity::{ActionSequence, Entity, EntityBehavior};
    use crate::field::{Field, SpawnStatus};
    use crate::types::{EntityId, Team};

    type UpdateLog = Rc<RefCell<Vec<(u64, EntityId)>>>;

    /// Records `(frame, id)` on every update.
    struct Logger {
        log: UpdateLog,
    }

    impl EntityBehavior for Logger {
        fn on_update(&mut self, field: &mut Field, me: EntityId) {
            self.log.borrow_mut().push((field.frame().0, me));
        }
    }

    struct Spawner {
        spawned: Rc<RefCell<Vec<EntityId>>>,
        log: UpdateLog,
        done: bool,
    }

    impl EntityBehavior for Spawner {
        fn on_update(&mut self, field: &mut Field, _me: EntityId) {
            if self.done {
                return;
            }
            self.done = true;
            for name in ["a", "b", "c"] {
                let logger = Logger {
                    log: self.log.clone(),
                };
                let result = field.spawn(Entity::artifact(name).with_behavior(logger), 2, 2);
                assert_eq!(result.status, SpawnStatus::Queued);
                self.spawned.borrow_mut().push(result.id);
            }
        }
    }

    #[test]
    fn spawns_during_update_join_after_the_frame() {
        let spawned = Rc::new(RefCell::new(Vec::new()));
        let log = UpdateLog::default();
        let mut field = Field::new();
        field.spawn(
            Entity::artifact("spawner").with_behavior(Spawner {
                spawned: spawned.clone(),
                log: log.clone(),
                done: false,
            }),
            1,
            1,
        );

        field.update();
        assert!(log.borrow().is_empty());
        let ids = spawned.borrow().clone();
        assert_eq!(ids.len(), 3);
        for id in &ids {
            assert_eq!(field.entity(*id).map(|e| e.frames_alive()), Some(0));
        }
        let tile = field.tile_at(2, 2).map(|t| t.artifacts().to_vec());
        assert_eq!(tile, Some(ids.clone()));

        field.update();
        let expected: Vec<(u64, EntityId)> = ids.iter().map(|id| (2, *id)).collect();
        assert_eq!(*log.borrow(), expected);
        for id in &ids {
            assert_eq!(field.entity(*id).map(|e| e.frames_alive()), Some(1));
        }
    }

    #[test]
    fn deleted_entity_leaves_after_its_tile_cleanup() {
        let mut field = Field::new();
        let id = field.spawn(Entity::character("met", Team::Blue, 40), 5, 2).id;
        assert!(field.delete_entity(id));
        assert!(!field.delete_entity(id));

        field.update();
        assert!(field.entity(id).is_none());
        assert!(!field.tile_at(5, 2).is_some_and(|t| t.contains_entity(id)));
    }

    #[test]
    fn delete_watchers_fire_once_with_target_and_observer() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut field = Field::new();
        let target = field.spawn(Entity::character("met", Team::Blue, 40), 5, 2).id;
        let observer = field.spawn(Entity::character("mega", Team::Red, 100), 2, 2).id;

        let log = fired.clone();
        field.notify_on_delete(target, observer, move |_, t, o| log.borrow_mut().push((t, o)));
        field.delete_entity(target);
        field.update();
        field.update();

        assert_eq!(*fired.borrow(), vec![(target, observer)]);
    }

    #[test]
    fn watch_is_dropped_when_observer_leaves_first() {
        let fired = Rc::new(RefCell::new(0));
        let mut field = Field::new();
        let target = field.spawn(Entity::character("met", Team::Blue, 40), 5, 2).id;
        let observer = field.spawn(Entity::character("mega", Team::Red, 100), 2, 2).id;

        let count = fired.clone();
        field.notify_on_delete(target, observer, move |_, _, _| *count.borrow_mut() += 1);
        field.delete_entity(observer);
        field.update();
        field.delete_entity(target);
        field.update();

        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn sequence_steps_run_on_their_frames() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (log.clone(), log.clone());
        let sequence = ActionSequence::new()
            .step(1, move |field, _| first.borrow_mut().push(field.frame().0))
            .step(3, move |field, _| second.borrow_mut().push(field.frame().0));

        let mut field = Field::new();
        let id = field
            .spawn(Entity::artifact("caster").with_sequence(sequence), 1, 1)
            .id;
        for _ in 0..4 {
            field.update();
        }

        assert_eq!(*log.borrow(), vec![1, 3]);
        assert!(field.entity(id).is_some_and(|e| e.sequence().is_none()));
    }

    #[test]
    fn cancelled_pending_spawn_never_arrives() {
        struct Canceller;
        impl EntityBehavior for Canceller {
            fn on_update(&mut self, field: &mut Field, me: EntityId) {
                let queued = field.spawn(Entity::artifact("ghost"), 3, 3);
                assert!(field.remove_entity_by_id(queued.id));
                field.delete_entity(me);
            }
        }

        let mut field = Field::new();
        field.spawn(Entity::artifact("canceller").with_behavior(Canceller), 1, 1);
        field.update();
        assert_eq!(field.pending_count(), 0);
        assert!(field.tile_at(3, 3).is_some_and(|t| t.entities().is_empty()));
    }
}
