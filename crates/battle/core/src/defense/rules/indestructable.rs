use crate::defense::{DefenseFrameStateJudge, DefenseOrder, DefensePriority, DefenseRule};
use crate::entity::Entity;

/// A body nothing can hurt or push.
///
/// With `break_colliding_object_on_hit`, anything that strikes it with damage
/// is destroyed.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefenseIndestructable {
    break_colliding_object_on_hit: bool,
}

impl DefenseIndestructable {
    pub fn new(break_colliding_object_on_hit: bool) -> Self {
        Self {
            break_colliding_object_on_hit,
        }
    }

    pub fn breaks_colliding_objects(&self) -> bool {
        self.break_colliding_object_on_hit
    }
}

impl DefenseRule for DefenseIndestructable {
    fn priority(&self) -> DefensePriority {
        DefensePriority::INTERNAL
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::CollisionOnly
    }

    fn name(&self) -> &'static str {
        "indestructable"
    }

    fn can_block(&self, judge: &mut DefenseFrameStateJudge, attacker: &Entity, _owner: &Entity) {
        if self.break_colliding_object_on_hit && attacker.hitbox_properties().damage > 0 {
            let attacker = attacker.id();
            judge.add_trigger(move |field| {
                field.delete_entity(attacker);
            });
        }

        judge.block_damage();
        judge.block_impact();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{HitFlags, HitProperties};
    use crate::types::Team;

    #[test]
    fn blocks_damage_and_impact_and_queues_break() {
        let rule = DefenseIndestructable::new(true);
        let attacker = Entity::spell("cannon", Team::Red, HitProperties::new(40, HitFlags::IMPACT));
        let owner = Entity::obstacle("rock", Team::Unknown, 100, HitProperties::NONE);

        let mut judge = DefenseFrameStateJudge::new();
        judge.set_defense_context(crate::defense::DefenseRuleId(0));
        rule.can_block(&mut judge, &attacker, &owner);

        assert!(judge.is_damage_blocked());
        assert!(judge.is_impact_blocked());
        assert_eq!(judge.pending_triggers(), 1);
    }

    #[test]
    fn harmless_attacks_are_not_broken() {
        let rule = DefenseIndestructable::new(true);
        let attacker = Entity::spell("wind", Team::Red, HitProperties::new(0, HitFlags::DRAG));
        let owner = Entity::obstacle("rock", Team::Unknown, 100, HitProperties::NONE);

        let mut judge = DefenseFrameStateJudge::new();
        judge.set_defense_context(crate::defense::DefenseRuleId(0));
        rule.can_block(&mut judge, &attacker, &owner);

        assert!(judge.is_impact_blocked());
        assert_eq!(judge.pending_triggers(), 0);
    }
}
