use std::collections::BTreeSet;
use std::fmt;

use tracing::{trace, warn};

use super::DefenseRuleId;
use crate::field::Field;

/// Deferred side effect registered by a rule, run once the tile's attacks are resolved.
pub type Trigger = Box<dyn FnOnce(&mut Field)>;

struct PendingTrigger {
    rule: DefenseRuleId,
    attack: u32,
    run: Trigger,
}

/// Arbitration state for the attacks landing on one defender during one tile pass.
///
/// The field creates one judge per defender when it resolves a tile and calls
/// [`prepare_for_next_attack`](Self::prepare_for_next_attack) before each
/// attacker. Block flags reset between attackers; surviving triggers are kept
/// until [`execute_all_triggers`](Self::execute_all_triggers).
#[derive(Default)]
pub struct DefenseFrameStateJudge {
    blocked_damage: bool,
    blocked_impact: bool,
    context: Option<DefenseRuleId>,
    attack: u32,
    triggers: Vec<PendingTrigger>,
    pierced: BTreeSet<DefenseRuleId>,
}

impl DefenseFrameStateJudge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_damage(&mut self) {
        self.blocked_damage = true;
    }

    pub fn block_impact(&mut self) {
        self.blocked_impact = true;
    }

    pub fn is_damage_blocked(&self) -> bool {
        self.blocked_damage
    }

    pub fn is_impact_blocked(&self) -> bool {
        self.blocked_impact
    }

    /// Attribute following triggers and pierce signals to `rule`.
    pub fn set_defense_context(&mut self, rule: DefenseRuleId) {
        self.context = Some(rule);
    }

    pub fn clear_defense_context(&mut self) {
        self.context = None;
    }

    /// Rule currently being evaluated.
    pub fn defense_context(&self) -> Option<DefenseRuleId> {
        self.context
    }

    /// Queue a side effect for the current rule.
    ///
    /// Ignored without a context, or when the current rule was already pierced
    /// by this attack. Returns true if the trigger was queued.
    pub fn add_trigger(&mut self, trigger: impl FnOnce(&mut Field) + 'static) -> bool {
        let Some(rule) = self.context else {
            warn!("defense trigger added without a rule context; ignored");
            return false;
        };
        if self.pierced.contains(&rule) {
            return false;
        }
        self.triggers.push(PendingTrigger {
            rule,
            attack: self.attack,
            run: Box::new(trigger),
        });
        true
    }

    /// Mark the current rule as bypassed and drop the triggers it queued for this attack.
    pub fn signal_defense_was_pierced(&mut self) {
        let Some(rule) = self.context else {
            return;
        };
        self.pierced.insert(rule);
        let attack = self.attack;
        self.triggers
            .retain(|t| !(t.rule == rule && t.attack == attack));
        trace!("defense {} pierced", rule);
    }

    /// True if `rule` was pierced by the current attack.
    pub fn is_pierced(&self, rule: DefenseRuleId) -> bool {
        self.pierced.contains(&rule)
    }

    /// Reset the block flags for the next attacker on the same defender.
    pub fn prepare_for_next_attack(&mut self) {
        self.blocked_damage = false;
        self.blocked_impact = false;
        self.context = None;
        self.pierced.clear();
        self.attack += 1;
    }

    pub fn pending_triggers(&self) -> usize {
        self.triggers.len()
    }

    /// Run every surviving trigger in the order they were queued.
    pub fn execute_all_triggers(self, field: &mut Field) {
        for trigger in self.triggers {
            (trigger.run)(field);
        }
    }
}

impl fmt::Debug for DefenseFrameStateJudge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefenseFrameStateJudge")
            .field("blocked_damage", &self.blocked_damage)
            .field("blocked_impact", &self.blocked_impact)
            .field("context", &self.context)
            .field("triggers", &self.triggers.len())
            .field("pierced", &self.pierced)
            .finish()
    }
}
