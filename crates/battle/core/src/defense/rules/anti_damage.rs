use std::cell::Cell;
use std::rc::Rc;

use super::{DefenseCallback, remove_self_on_trigger};
use crate::defense::{DefenseFrameStateJudge, DefenseOrder, DefensePriority, DefenseRule};
use crate::entity::Entity;
use crate::field::Field;
use crate::hit::HitFlags;
use crate::types::EntityId;

/// A one-shot trap: the first solid hit is nullified and springs the callback.
pub struct DefenseAntiDamage {
    on_trigger: Option<DefenseCallback>,
    sprung: Cell<bool>,
}

impl DefenseAntiDamage {
    /// Smallest damage that springs the trap.
    pub const MIN_DAMAGE: i32 = 10;

    pub fn new() -> Self {
        Self {
            on_trigger: None,
            sprung: Cell::new(false),
        }
    }

    /// Run `callback(field, owner, attacker)` when the trap springs.
    pub fn with_callback(callback: impl Fn(&mut Field, EntityId, EntityId) + 'static) -> Self {
        Self {
            on_trigger: Some(Rc::new(callback)),
            sprung: Cell::new(false),
        }
    }

    pub fn is_sprung(&self) -> bool {
        self.sprung.get()
    }
}

impl Default for DefenseAntiDamage {
    fn default() -> Self {
        Self::new()
    }
}

impl DefenseRule for DefenseAntiDamage {
    fn priority(&self) -> DefensePriority {
        DefensePriority::TRAP
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::CollisionOnly
    }

    fn name(&self) -> &'static str {
        "anti_damage"
    }

    fn can_block(&self, judge: &mut DefenseFrameStateJudge, attacker: &Entity, owner: &Entity) {
        let props = attacker.hitbox_properties();
        if self.sprung.get()
            || props.damage < Self::MIN_DAMAGE
            || !props.flags.contains(HitFlags::IMPACT)
        {
            return;
        }

        judge.block_damage();
        judge.block_impact();
        self.sprung.set(true);

        if let Some(callback) = self.on_trigger.clone() {
            let (owner, attacker) = (owner.id(), attacker.id());
            judge.add_trigger(move |field| callback(field, owner, attacker));
        }
        remove_self_on_trigger(judge, owner.id());
    }
}

impl std::fmt::Debug for DefenseAntiDamage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefenseAntiDamage")
            .field("sprung", &self.sprung.get())
            .finish()
    }
}
