//! Status-filter rules. None of these vote on blocking.

use crate::defense::{DefenseOrder, DefensePriority, DefenseRule};
use crate::hit::{HitFlags, HitProperties};

/// Ignores flinch.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefenseSuperArmor;

impl DefenseRule for DefenseSuperArmor {
    fn priority(&self) -> DefensePriority {
        DefensePriority::LAST
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::Always
    }

    fn name(&self) -> &'static str {
        "super_armor"
    }

    fn filter_statuses(&self, mut props: HitProperties) -> HitProperties {
        props.flags.remove(HitFlags::FLINCH);
        props
    }
}

/// Viruses neither flinch nor flash when hit.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefenseVirusBody;

impl DefenseRule for DefenseVirusBody {
    fn priority(&self) -> DefensePriority {
        DefensePriority::BODY
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::Always
    }

    fn name(&self) -> &'static str {
        "virus_body"
    }

    fn filter_statuses(&self, mut props: HitProperties) -> HitProperties {
        props.flags.remove(HitFlags::FLASH | HitFlags::FLINCH);
        props
    }
}

/// Immune to immobilizing statuses.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefenseStatusGuard;

impl DefenseRule for DefenseStatusGuard {
    fn priority(&self) -> DefensePriority {
        DefensePriority::LAST
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::Always
    }

    fn name(&self) -> &'static str {
        "status_guard"
    }

    fn filter_statuses(&self, mut props: HitProperties) -> HitProperties {
        props.flags.remove(HitFlags::BUBBLE | HitFlags::FREEZE | HitFlags::STUN);
        props
    }
}

/// Inanimate bodies take no status except being pushed.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefenseObstacleBody;

impl DefenseRule for DefenseObstacleBody {
    fn priority(&self) -> DefensePriority {
        DefensePriority::BODY
    }

    fn order(&self) -> DefenseOrder {
        DefenseOrder::CollisionOnly
    }

    fn name(&self) -> &'static str {
        "obstacle_body"
    }

    fn filter_statuses(&self, mut props: HitProperties) -> HitProperties {
        props.flags.remove(HitFlags::STATUSES.difference(HitFlags::DRAG));
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(flags: HitFlags) -> HitProperties {
        HitProperties::new(10, flags)
    }

    #[test]
    fn super_armor_strips_only_flinch() {
        let props = DefenseSuperArmor.filter_statuses(hit(HitFlags::FLINCH | HitFlags::STUN));
        assert_eq!(props.flags, HitFlags::STUN);
        assert_eq!(props.damage, 10);
    }

    #[test]
    fn super_armor_then_virus_body_leaves_impact() {
        let props = hit(HitFlags::FLINCH | HitFlags::FLASH | HitFlags::IMPACT);
        let props = DefenseVirusBody.filter_statuses(DefenseSuperArmor.filter_statuses(props));
        assert_eq!(props.flags, HitFlags::IMPACT);
    }

    #[test]
    fn status_guard_strips_immobilizers() {
        let props = DefenseStatusGuard.filter_statuses(hit(
            HitFlags::BUBBLE | HitFlags::FREEZE | HitFlags::STUN | HitFlags::FLINCH,
        ));
        assert_eq!(props.flags, HitFlags::FLINCH);
    }

    #[test]
    fn obstacle_body_keeps_drag_and_impact() {
        let props = DefenseObstacleBody.filter_statuses(hit(
            HitFlags::DRAG | HitFlags::IMPACT | HitFlags::FLINCH | HitFlags::FREEZE,
        ));
        assert_eq!(props.flags, HitFlags::DRAG | HitFlags::IMPACT);
    }
}
