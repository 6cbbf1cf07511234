use crate::field::Field;
use crate::hit::{HitFlags, HitProperties};
use crate::types::EntityId;

/// Content logic attached to an entity: AI, projectile motion, card actions.
///
/// The field takes the behavior out of its entity for the duration of each
/// call, so implementations get full `&mut Field` access and address their own
/// entity through `me`.
pub trait EntityBehavior {
    /// Called once when the entity enters the field.
    fn on_spawn(&mut self, _field: &mut Field, _me: EntityId) {}

    /// Called once per frame while the entity can act.
    fn on_update(&mut self, _field: &mut Field, _me: EntityId) {}

    /// The entity's attack physically reached `other`.
    fn on_collision(&mut self, _field: &mut Field, _me: EntityId, _other: EntityId) {}

    /// Deliver `props` to `target`. Only called when no defense blocked damage.
    fn attack(&mut self, field: &mut Field, _me: EntityId, target: EntityId, props: HitProperties) {
        field.hit(target, props);
    }

    /// A status from `flag` was applied to the entity this frame.
    fn on_status(&mut self, _field: &mut Field, _me: EntityId, _flag: HitFlags) {}

    /// The entity is leaving the registry.
    fn on_delete(&mut self, _field: &mut Field, _me: EntityId) {}
}
