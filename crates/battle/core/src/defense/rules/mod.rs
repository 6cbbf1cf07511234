//! Stock defense rules.

mod anti_damage;
mod aura;
mod body;
mod bubble_wrap;
mod guard;
mod indestructable;

pub use anti_damage::DefenseAntiDamage;
pub use aura::DefenseAura;
pub use body::{DefenseObstacleBody, DefenseStatusGuard, DefenseSuperArmor, DefenseVirusBody};
pub use bubble_wrap::DefenseBubbleWrap;
pub use guard::{DefenseCallback, DefenseGuard};
pub use indestructable::DefenseIndestructable;

use crate::defense::DefenseFrameStateJudge;
use crate::types::EntityId;

/// Queue a trigger that detaches the rule currently under evaluation from `owner`.
pub(crate) fn remove_self_on_trigger(judge: &mut DefenseFrameStateJudge, owner: EntityId) {
    let Some(rule) = judge.defense_context() else {
        return;
    };
    judge.add_trigger(move |field| {
        if let Some(entity) = field.entity_mut(owner) {
            entity.defenses_mut().remove(rule);
        }
    });
}
