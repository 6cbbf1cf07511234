use std::cell::Cell;

use super::remove_self_on_trigger;
use crate::defense::{DefenseFrameStateJudge, DefenseOrder, DefensePriority, DefenseRule};
use crate::entity::Entity;
use crate::hit::Element;

/// Field of energy that nullifies weak attacks.
///
/// Attacks below `threshold` damage are blocked outright. A single attack at or
/// above the threshold is still absorbed but dispels the aura. Wind attacks
/// blow it away without being blocked.
#[derive(Debug)]
pub struct DefenseAura {
    threshold: i32,
    dispelled: Cell<bool>,
}

impl DefenseAura {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold,
            dispelled: Cell::new(false),
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn is_dispelled(&self) -> bool {
        self.dispelled.get()
    }
}

impl DefenseRule for DefenseAura {
    fn priority(&self) -> DefensePriority {
        DefensePriority::BARRIER
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::Always
    }

    fn name(&self) -> &'static str {
        "aura"
    }

    fn can_block(&self, judge: &mut DefenseFrameStateJudge, attacker: &Entity, owner: &Entity) {
        if self.dispelled.get() {
            return;
        }

        let props = attacker.hitbox_properties();
        if props.element == Element::Wind || props.secondary_element == Element::Wind {
            self.dispelled.set(true);
            judge.signal_defense_was_pierced();
            return;
        }

        judge.block_damage();
        judge.block_impact();

        if props.damage >= self.threshold {
            self.dispelled.set(true);
            remove_self_on_trigger(judge, owner.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defense::DefenseRuleId;
    use crate::hit::{HitFlags, HitProperties};
    use crate::types::Team;

    fn evaluate(rule: &DefenseAura, damage: i32, element: Element) -> DefenseFrameStateJudge {
        let attacker = Entity::spell(
            "shot",
            Team::Red,
            HitProperties::new(damage, HitFlags::IMPACT).with_element(element),
        );
        let owner = Entity::character("aura", Team::Blue, 100);
        let mut judge = DefenseFrameStateJudge::new();
        judge.set_defense_context(DefenseRuleId(4));
        rule.can_block(&mut judge, &attacker, &owner);
        judge
    }

    #[test]
    fn weak_hits_are_blocked_and_aura_holds() {
        let aura = DefenseAura::new(100);
        let judge = evaluate(&aura, 40, Element::None);
        assert!(judge.is_damage_blocked());
        assert!(!aura.is_dispelled());
    }

    #[test]
    fn strong_hit_is_absorbed_but_dispels() {
        let aura = DefenseAura::new(100);
        let judge = evaluate(&aura, 120, Element::None);
        assert!(judge.is_damage_blocked());
        assert!(aura.is_dispelled());
        assert_eq!(judge.pending_triggers(), 1);
    }

    #[test]
    fn wind_blows_the_aura_away() {
        let aura = DefenseAura::new(100);
        let judge = evaluate(&aura, 10, Element::Wind);
        assert!(!judge.is_damage_blocked());
        assert!(aura.is_dispelled());
        assert!(judge.is_pierced(DefenseRuleId(4)));
    }
}
