//! Stock spells used by scripted stages.

use battle_core::{
    Direction, Entity, EntityBehavior, EntityId, Field, HitProperties, Team, TileHighlight,
};
use tracing::trace;

/// A shot that strikes each tile along a row until it hits something or
/// leaves the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    direction: Direction,
    frames_per_tile: u32,
    elapsed: u32,
}

impl Projectile {
    pub fn new(direction: Direction, frames_per_tile: u32) -> Self {
        Self {
            direction,
            frames_per_tile: frames_per_tile.max(1),
            elapsed: 0,
        }
    }

    /// Build a projectile spell flying in `direction`.
    pub fn entity(
        team: Team,
        props: HitProperties,
        direction: Direction,
        frames_per_tile: u32,
    ) -> Entity {
        Entity::spell("projectile", team, props)
            .with_facing(direction)
            .with_tile_highlight(TileHighlight::Solid)
            .with_behavior(Self::new(direction, frames_per_tile))
    }
}

impl EntityBehavior for Projectile {
    fn on_update(&mut self, field: &mut Field, me: EntityId) {
        let Some(position) = field.entity(me).and_then(Entity::position) else {
            return;
        };
        field.affect_tile(position, me);

        self.elapsed += 1;
        if self.elapsed < self.frames_per_tile {
            return;
        }
        self.elapsed = 0;

        let next = position.offset(self.direction, 1);
        if !field.teleport(me, next) {
            trace!("{} left the field at {:?}", me, position);
            field.delete_entity(me);
        }
    }

    fn on_collision(&mut self, field: &mut Field, me: EntityId, _other: EntityId) {
        field.delete_entity(me);
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{HitFlags, SpawnStatus};

    use super::*;

    #[test]
    fn travels_and_hits_the_first_target() {
        let mut field = Field::new();
        let target = field.spawn(Entity::character("met", Team::Blue, 100), 5, 2).id;
        let shot = Projectile::entity(
            Team::Red,
            HitProperties::new(10, HitFlags::IMPACT),
            Direction::Right,
            1,
        );
        let shot = field.spawn(shot, 2, 2);
        assert_eq!(shot.status, SpawnStatus::Added);

        for _ in 0..6 {
            field.update();
        }

        assert_eq!(field.entity(target).map(Entity::health), Some(90));
        assert!(field.entity(shot.id).is_none());
    }

    #[test]
    fn leaves_the_field_past_the_last_column() {
        let mut field = Field::new();
        let shot = Projectile::entity(
            Team::Red,
            HitProperties::new(10, HitFlags::IMPACT),
            Direction::Right,
            1,
        );
        let id = field.spawn(shot, 6, 1).id;

        field.update();
        field.update();
        assert!(field.entity(id).is_none());
    }

    #[test]
    fn zero_speed_is_clamped() {
        assert_eq!(Projectile::new(Direction::Left, 0).frames_per_tile, 1);
    }
}
