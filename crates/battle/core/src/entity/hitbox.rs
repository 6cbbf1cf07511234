use super::{Entity, EntityBehavior};
use crate::field::Field;
use crate::hit::HitProperties;
use crate::types::{EntityId, Team};

/// A one-frame attack on the tile it is spawned on.
///
/// The hitbox affects its tile on its first update and then deletes itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hitbox;

impl Hitbox {
    /// Build a spell entity that strikes its tile once with `props`.
    pub fn entity(team: Team, props: HitProperties) -> Entity {
        Entity::spell("hitbox", team, props).with_behavior(Hitbox)
    }
}

impl EntityBehavior for Hitbox {
    fn on_update(&mut self, field: &mut Field, me: EntityId) {
        let Some(position) = field.entity(me).and_then(Entity::position) else {
            return;
        };
        field.affect_tile(position, me);
        field.delete_entity(me);
    }
}
