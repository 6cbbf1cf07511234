//! Movement: teleports, slides, drag and ice.
//!
//! A move is two-phase. The destination is checked and reserved first; the
//! entity changes tiles only when the move completes. Teleports complete at
//! once, slides after their duration has elapsed in the entity's updates.

use tracing::trace;

use super::Field;
use crate::audio::{AudioEvent, AudioPriority};
use crate::entity::{EntityKind, MoveKind, Movement};
use crate::hit::Drag;
use crate::tile::TileState;
use crate::types::{Direction, EntityId, Position, Team};

impl Field {
    /// Returns true if `id` may enter the tile at `dest`.
    ///
    /// Spells and artifacts may enter any playable tile. Hittable entities need
    /// a walkable tile (holes only with an air shoe) that nobody else stands
    /// on or has reserved; characters additionally stay on their own team's
    /// tiles.
    pub fn can_move_to(&self, id: EntityId, dest: Position) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let Some(tile) = self.tile(dest) else {
            return false;
        };
        if entity.is_deleted() || tile.is_edge() || tile.is_hidden() {
            return false;
        }
        if !entity.kind().is_hittable() {
            return true;
        }
        if tile.is_hole() && !entity.has_air_shoe() {
            return false;
        }
        if entity.kind() == EntityKind::Character
            && entity.team() != Team::Unknown
            && tile.team() != entity.team()
        {
            return false;
        }

        let blocked = tile
            .characters()
            .iter()
            .copied()
            .chain(tile.reservations())
            .filter(|other| *other != id)
            .any(|other| {
                self.entity(other)
                    .is_some_and(|o| !o.is_deleted() && !o.shares_tile() && !entity.shares_tile())
            });
        !blocked
    }

    /// Move `id` straight to `dest`. Rooted or immobilized entities cannot.
    pub fn teleport(&mut self, id: EntityId, dest: Position) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        if entity.is_moving() || !self.may_move_voluntarily(id) || !self.can_move_to(id, dest) {
            return false;
        }
        let from = entity.position();
        let hittable = entity.kind().is_hittable();

        if hittable {
            if let Some(tile) = self.tile_mut(dest) {
                tile.reserve_entity_by_id(id);
            }
        }
        self.complete_move(id, from, dest);
        true
    }

    /// Start a voluntary one-tile slide lasting `frames`.
    pub fn slide(&mut self, id: EntityId, direction: Direction, frames: u32) -> bool {
        if !self.may_move_voluntarily(id) {
            return false;
        }
        self.begin_slide(id, direction, frames, false, 0)
    }

    fn may_move_voluntarily(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|e| {
            let status = e.status();
            !status.is_rooted() && !status.is_immobilized()
        })
    }

    /// Push `id` up to `drag.count` tiles. Stops early at the first blocked tile.
    pub(crate) fn start_drag(&mut self, id: EntityId, drag: Drag) -> bool {
        if drag.count == 0 {
            return false;
        }
        let frames = self.config.status.slide_frames;
        self.begin_slide(id, drag.direction, frames, true, drag.count - 1)
    }

    pub(crate) fn begin_slide(
        &mut self,
        id: EntityId,
        direction: Direction,
        frames: u32,
        forced: bool,
        remaining: u32,
    ) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let Some(from) = entity.position() else {
            return false;
        };
        if entity.is_moving() || direction == Direction::None {
            return false;
        }
        let dest = from.offset(direction, 1);
        if !self.can_move_to(id, dest) {
            trace!("{} cannot slide {} into {}", id, direction, dest);
            return false;
        }

        if entity.kind().is_hittable() {
            if let Some(tile) = self.tile_mut(dest) {
                tile.reserve_entity_by_id(id);
            }
        }
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.movement = Some(Movement {
                from,
                dest,
                direction,
                kind: MoveKind::Slide,
                elapsed: 0,
                duration: frames.max(1),
                forced,
                remaining,
            });
        }
        true
    }

    /// Progress a slide by one frame and land it when its time is up.
    pub(crate) fn advance_movement(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        let Some(mut movement) = entity.movement else {
            return;
        };
        movement.elapsed += 1;
        if !movement.is_complete() {
            entity.movement = Some(movement);
            return;
        }
        entity.movement = None;
        self.complete_move(id, Some(movement.from), movement.dest);

        if movement.remaining > 0 {
            self.begin_slide(
                id,
                movement.direction,
                movement.duration,
                movement.forced,
                movement.remaining - 1,
            );
        } else if self.slides_on_ice(id, movement.dest) {
            self.begin_slide(id, movement.direction, movement.duration, true, 0);
        }
    }

    fn slides_on_ice(&self, id: EntityId, position: Position) -> bool {
        let on_ice = self
            .tile(position)
            .is_some_and(|t| t.state() == TileState::Ice);
        on_ice
            && self
                .entity(id)
                .is_some_and(|e| e.kind().is_hittable() && !e.has_float_shoe())
    }

    /// Leave `from`, breaking it if it was cracked, and join `dest`.
    fn complete_move(&mut self, id: EntityId, from: Option<Position>, dest: Position) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        let kind = entity.kind();
        let grounded = kind.is_hittable() && !entity.has_float_shoe() && !entity.has_air_shoe();
        entity.position = Some(dest);
        entity.terrain_timer = 0;

        if let Some(from) = from {
            let mut broke = false;
            if let Some(tile) = self.tile_mut(from) {
                tile.remove_entity_by_id(id);
                if grounded && tile.is_cracked() {
                    broke = tile.set_state(TileState::Broken);
                }
            }
            if broke {
                self.play_audio(AudioEvent::PanelBreak, AudioPriority::Low);
            }
        }
        if let Some(tile) = self.tile_mut(dest) {
            tile.remove_reservation(id);
            tile.add_entity(id, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::Entity;
    use crate::field::Field;
    use crate::hit::{Drag, HitFlags, HitProperties};
    use crate::tile::TileState;
    use crate::types::{Direction, Position, Team};

    fn position_of(field: &Field, id: crate::types::EntityId) -> Option<Position> {
        field.entity(id).and_then(Entity::position)
    }

    #[test]
    fn characters_stay_on_their_side() {
        let mut field = Field::new();
        let met = field.spawn(Entity::character("met", Team::Blue, 40), 4, 2).id;
        let rock = field
            .spawn(Entity::obstacle("rock", Team::Blue, 100, HitProperties::NONE), 4, 1)
            .id;

        assert!(!field.can_move_to(met, Position::new(3, 2)));
        assert!(field.can_move_to(rock, Position::new(3, 1)));
        assert!(!field.can_move_to(met, Position::new(4, 1)));
        assert!(!field.can_move_to(met, Position::new(7, 2)));
        assert!(field.teleport(met, Position::new(6, 3)));
        assert_eq!(position_of(&field, met), Some(Position::new(6, 3)));
    }

    #[test]
    fn holes_need_an_air_shoe() {
        let mut field = Field::new();
        assert!(field.tile_at_mut(5, 2).is_some_and(|t| t.set_state(TileState::Broken)));
        let walker = field.spawn(Entity::character("walker", Team::Blue, 40), 4, 2).id;
        let flyer = field
            .spawn(Entity::character("flyer", Team::Blue, 40).with_air_shoe(true), 4, 3)
            .id;

        assert!(!field.can_move_to(walker, Position::new(5, 2)));
        assert!(field.can_move_to(flyer, Position::new(5, 2)));
    }

    #[test]
    fn leaving_cracked_tile_breaks_it_unless_floating() {
        let mut field = Field::new();
        assert!(field.tile_at_mut(5, 2).is_some_and(|t| t.set_state(TileState::Cracked)));
        assert!(field.tile_at_mut(5, 3).is_some_and(|t| t.set_state(TileState::Cracked)));
        let walker = field.spawn(Entity::character("walker", Team::Blue, 40), 5, 2).id;
        let floater = field
            .spawn(Entity::character("floater", Team::Blue, 40).with_float_shoe(true), 5, 3)
            .id;

        assert!(field.teleport(walker, Position::new(6, 2)));
        assert!(field.teleport(floater, Position::new(6, 3)));
        assert_eq!(field.tile_at(5, 2).map(|t| t.state()), Some(TileState::Broken));
        assert_eq!(field.tile_at(5, 3).map(|t| t.state()), Some(TileState::Cracked));
    }

    #[test]
    fn slide_reserves_destination_until_it_lands() {
        let mut field = Field::new();
        let met = field.spawn(Entity::character("met", Team::Blue, 40), 4, 2).id;
        assert!(field.slide(met, Direction::Right, 2));
        assert!(field.tile_at(5, 2).is_some_and(|t| t.is_reserved()));
        assert!(field.tile_at_mut(5, 2).is_some_and(|t| !t.set_state(TileState::Broken)));

        field.update();
        assert_eq!(position_of(&field, met), Some(Position::new(4, 2)));
        field.update();
        assert_eq!(position_of(&field, met), Some(Position::new(5, 2)));
        assert!(field.tile_at(5, 2).is_some_and(|t| !t.is_reserved() && t.contains_entity(met)));
    }

    #[test]
    fn drag_pushes_several_tiles() {
        let mut field = Field::new();
        let met = field.spawn(Entity::character("met", Team::Blue, 40), 4, 2).id;
        field.hit(met, HitProperties::new(0, HitFlags::empty()).with_drag(Drag::new(Direction::Right, 2)));

        for _ in 0..10 {
            field.update();
        }
        assert_eq!(position_of(&field, met), Some(Position::new(6, 2)));
    }

    #[test]
    fn ice_carries_a_slide_onward() {
        let mut field = Field::new();
        assert!(field.tile_at_mut(5, 2).is_some_and(|t| t.set_state(TileState::Ice)));
        let met = field.spawn(Entity::character("met", Team::Blue, 40), 4, 2).id;
        assert!(field.slide(met, Direction::Right, 1));

        for _ in 0..3 {
            field.update();
        }
        assert_eq!(position_of(&field, met), Some(Position::new(6, 2)));
    }

    #[test]
    fn rooted_entities_cannot_move_on_their_own() {
        let mut field = Field::new();
        let met = field.spawn(Entity::character("met", Team::Blue, 40), 4, 2).id;
        field.hit(met, HitProperties::new(0, HitFlags::ROOT));
        field.update();

        assert!(!field.teleport(met, Position::new(5, 2)));
        assert!(!field.slide(met, Direction::Right, 4));
    }
}
