use std::cell::Cell;

use super::remove_self_on_trigger;
use crate::audio::{AudioEvent, AudioPriority};
use crate::defense::{DefenseFrameStateJudge, DefenseOrder, DefensePriority, DefenseRule};
use crate::entity::Entity;
use crate::hit::Element;

/// A water bubble that absorbs one hit and then pops.
///
/// Electric attacks pass straight through it.
#[derive(Debug, Default)]
pub struct DefenseBubbleWrap {
    popped: Cell<bool>,
}

impl DefenseBubbleWrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_popped(&self) -> bool {
        self.popped.get()
    }
}

impl DefenseRule for DefenseBubbleWrap {
    fn priority(&self) -> DefensePriority {
        DefensePriority::BARRIER
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::CollisionOnly
    }

    fn name(&self) -> &'static str {
        "bubble_wrap"
    }

    fn can_block(&self, judge: &mut DefenseFrameStateJudge, attacker: &Entity, owner: &Entity) {
        if self.popped.get() {
            return;
        }

        let props = attacker.hitbox_properties();
        if props.element == Element::Elec || props.secondary_element == Element::Elec {
            judge.signal_defense_was_pierced();
            return;
        }

        judge.block_damage();
        judge.block_impact();
        self.popped.set(true);

        judge.add_trigger(|field| field.play_audio(AudioEvent::BubblePop, AudioPriority::High));
        remove_self_on_trigger(judge, owner.id());
    }
}
