use std::rc::Rc;

use crate::audio::{AudioEvent, AudioPriority};
use crate::defense::{DefenseFrameStateJudge, DefenseOrder, DefensePriority, DefenseRule};
use crate::entity::Entity;
use crate::field::Field;
use crate::hit::HitFlags;
use crate::types::{Direction, EntityId};

/// Callback run by a rule's trigger: `(field, owner, attacker)`.
pub type DefenseCallback = Rc<dyn Fn(&mut Field, EntityId, EntityId)>;

/// A raised shield. Blocks hits that meet its front; `BREAKING` attacks
/// pierce it and a hit travelling the way the owner faces lands in its back.
#[derive(Default)]
pub struct DefenseGuard {
    on_guard: Option<DefenseCallback>,
}

impl DefenseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` whenever the guard stops a hit, e.g. to reflect it.
    pub fn with_callback(callback: impl Fn(&mut Field, EntityId, EntityId) + 'static) -> Self {
        Self {
            on_guard: Some(Rc::new(callback)),
        }
    }
}

impl DefenseRule for DefenseGuard {
    fn priority(&self) -> DefensePriority {
        DefensePriority::ACTION
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::CollisionOnly
    }

    fn name(&self) -> &'static str {
        "guard"
    }

    fn can_block(&self, judge: &mut DefenseFrameStateJudge, attacker: &Entity, owner: &Entity) {
        if attacker.hitbox_properties().flags.contains(HitFlags::BREAKING) {
            judge.signal_defense_was_pierced();
            return;
        }
        if !faces_attacker(owner, attacker) {
            return;
        }

        judge.block_damage();
        judge.block_impact();

        let callback = self.on_guard.clone();
        let (owner, attacker) = (owner.id(), attacker.id());
        judge.add_trigger(move |field| {
            field.play_audio(AudioEvent::Guard, AudioPriority::Low);
            if let Some(callback) = callback {
                callback(field, owner, attacker);
            }
        });
    }
}

/// Undirected attackers and owners count as frontal.
fn faces_attacker(owner: &Entity, attacker: &Entity) -> bool {
    let facing = owner.facing();
    facing == Direction::None || attacker.facing() != facing
}

impl std::fmt::Debug for DefenseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefenseGuard")
            .field("has_callback", &self.on_guard.is_some())
            .finish()
    }
}
