//! Defense rules and the per-attack arbitration that threads through them.
//!
//! An entity owns a [`DefenseChain`]. When an attack reaches it, the field runs
//! the chain's rules in priority order against a [`DefenseFrameStateJudge`],
//! which collects the block decisions and deferred triggers for that attack.

mod chain;
mod judge;
pub mod rules;

pub use chain::{DefenseChain, DefenseEntry, run_defense_check};
pub use judge::{DefenseFrameStateJudge, Trigger};
pub use rules::{
    DefenseAntiDamage, DefenseAura, DefenseBubbleWrap, DefenseCallback, DefenseGuard,
    DefenseIndestructable, DefenseObstacleBody, DefenseStatusGuard, DefenseSuperArmor,
    DefenseVirusBody,
};

use std::fmt;

use crate::entity::Entity;
use crate::hit::HitProperties;

/// Evaluation priority of a rule. Lower values run first.
///
/// Two rules of the same priority cannot coexist on one chain; the newer one
/// replaces the older. [`DefensePriority::LAST`] is the exception and stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefensePriority(pub u8);

impl DefensePriority {
    /// Engine-owned rules such as indestructible bodies.
    pub const INTERNAL: Self = Self(0);
    pub const INTANGIBLE: Self = Self(1);
    /// Shields that sit in front of the body: auras, bubble wrap.
    pub const BARRIER: Self = Self(2);
    /// Rules granted by an action in progress, like a raised guard.
    pub const ACTION: Self = Self(3);
    pub const TRAP: Self = Self(4);
    pub const BODY: Self = Self(5);
    pub const LAST: Self = Self(u8::MAX);
}

impl fmt::Display for DefensePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When a rule takes part in evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefenseOrder {
    /// Only after the attack has physically collided with the owner.
    CollisionOnly,
    /// Every time the attacker/owner pair is considered.
    Always,
}

/// Identity of a rule within its owner's chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefenseRuleId(pub u32);

impl fmt::Display for DefenseRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

/// A policy attached to an entity that can block or reshape incoming attacks.
///
/// Rules are shared as `Rc<dyn DefenseRule>` so the code that attached one can
/// keep a handle to it. Any state a rule mutates during evaluation lives in
/// `Cell`s.
pub trait DefenseRule {
    fn priority(&self) -> DefensePriority;

    fn order(&self) -> DefenseOrder;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Reshape the hit before it is applied. Runs whether or not damage was blocked.
    fn filter_statuses(&self, props: HitProperties) -> HitProperties {
        props
    }

    /// Vote on the attack through `judge`. The default never blocks.
    fn can_block(&self, _judge: &mut DefenseFrameStateJudge, _attacker: &Entity, _owner: &Entity) {}

    /// Called when a same-priority rule takes this rule's place.
    fn on_replace(&self) {}
}
