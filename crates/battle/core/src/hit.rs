//! Hit properties: the value describing one attack instance.
//!
//! A [`HitProperties`] is copied from [`HitProperties::DEFAULT`], specialized by
//! the attack that creates it, and consumed when it lands on a target.

use bitflags::bitflags;

use crate::types::{Direction, EntityId};

bitflags! {
    /// Status and behavior flags carried by an attack.
    ///
    /// Bit assignment is part of the observable contract and must stay stable:
    /// `FLINCH < SHAKE < STUN < FLASH < BREAKING < IMPACT < DRAG < BUBBLE`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct HitFlags: u32 {
        const RETANGIBLE    = 1 << 0;
        const FREEZE        = 1 << 1;
        /// Ignores intangibility and flash invincibility.
        const PIERCE        = 1 << 2;
        const FLINCH        = 1 << 3;
        const SHAKE         = 1 << 4;
        const STUN          = 1 << 5;
        const FLASH         = 1 << 6;
        /// Breaks guards.
        const BREAKING      = 1 << 7;
        const IMPACT        = 1 << 8;
        const DRAG          = 1 << 9;
        const BUBBLE        = 1 << 10;
        const NO_COUNTER    = 1 << 11;
        const ROOT          = 1 << 12;
        const BLIND         = 1 << 13;
        const CONFUSE       = 1 << 14;
        const PIERCE_GROUND = 1 << 15;
    }
}

impl HitFlags {
    /// Flags suppressed when a defense blocks impact.
    pub const IMPACT_EFFECTS: Self = Self::IMPACT.union(Self::FLINCH).union(Self::DRAG);

    /// Flags that become status transitions on the target.
    pub const STATUSES: Self = Self::FREEZE
        .union(Self::FLINCH)
        .union(Self::SHAKE)
        .union(Self::STUN)
        .union(Self::FLASH)
        .union(Self::DRAG)
        .union(Self::BUBBLE)
        .union(Self::ROOT)
        .union(Self::BLIND)
        .union(Self::CONFUSE);
}

/// Elemental affinity of an attack or an entity.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    #[default]
    None,
    Fire,
    Aqua,
    Elec,
    Wood,
    Sword,
    Wind,
    Cursor,
    Summon,
    Plus,
    Breaker,
}

impl Element {
    /// The element that deals double damage to `self`, if any.
    pub const fn weakness(self) -> Option<Element> {
        match self {
            Element::Aqua => Some(Element::Elec),
            Element::Fire => Some(Element::Aqua),
            Element::Wood => Some(Element::Fire),
            Element::Elec => Some(Element::Wood),
            Element::Sword => Some(Element::Breaker),
            Element::Wind => Some(Element::Sword),
            Element::Cursor => Some(Element::Wind),
            Element::Breaker => Some(Element::Cursor),
            Element::None | Element::Summon | Element::Plus => None,
        }
    }

    /// Returns true if an attack of element `attack` is super effective against `self`.
    pub fn is_weak_to(self, attack: Element) -> bool {
        attack != Element::None && self.weakness() == Some(attack)
    }
}

/// Forced movement applied by a `DRAG` hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drag {
    pub direction: Direction,
    pub count: u32,
}

impl Drag {
    pub const NONE: Self = Self {
        direction: Direction::None,
        count: 0,
    };

    pub const fn new(direction: Direction, count: u32) -> Self {
        Self { direction, count }
    }
}

/// Properties of a single attack instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitProperties {
    pub damage: i32,
    pub flags: HitFlags,
    pub element: Element,
    pub secondary_element: Element,
    /// Entity credited with the hit. Resolved through the field registry.
    pub aggressor: Option<EntityId>,
    drag: Drag,
}

impl HitProperties {
    /// Canonical template every attack starts from.
    pub const DEFAULT: Self = Self {
        damage: 0,
        flags: HitFlags::FLINCH.union(HitFlags::IMPACT),
        element: Element::None,
        secondary_element: Element::None,
        aggressor: None,
        drag: Drag::NONE,
    };

    /// Properties that never hurt or stagger anything.
    pub const NONE: Self = Self {
        damage: 0,
        flags: HitFlags::empty(),
        ..Self::DEFAULT
    };

    pub const fn new(damage: i32, flags: HitFlags) -> Self {
        Self {
            damage,
            flags,
            ..Self::DEFAULT
        }
    }

    #[must_use]
    pub const fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub const fn with_secondary_element(mut self, element: Element) -> Self {
        self.secondary_element = element;
        self
    }

    #[must_use]
    pub const fn with_aggressor(mut self, aggressor: EntityId) -> Self {
        self.aggressor = Some(aggressor);
        self
    }

    /// Sets the drag vector and the `DRAG` flag together.
    #[must_use]
    pub fn with_drag(mut self, drag: Drag) -> Self {
        self.drag = drag;
        self.flags |= HitFlags::DRAG;
        self
    }

    /// Drag vector, only when the `DRAG` flag is set.
    pub fn drag(&self) -> Option<Drag> {
        self.flags.contains(HitFlags::DRAG).then_some(self.drag)
    }

    /// Returns true if this hit can land a counter.
    pub fn counters(&self) -> bool {
        !self.flags.contains(HitFlags::NO_COUNTER)
    }

    /// Returns true if either element is super effective against `defender`.
    pub fn is_super_effective_against(&self, defender: Element) -> bool {
        defender.is_weak_to(self.element) || defender.is_weak_to(self.secondary_element)
    }
}

impl Default for HitProperties {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits_follow_priority_order() {
        let ordered = [
            HitFlags::FLINCH,
            HitFlags::SHAKE,
            HitFlags::STUN,
            HitFlags::FLASH,
            HitFlags::BREAKING,
            HitFlags::IMPACT,
            HitFlags::DRAG,
            HitFlags::BUBBLE,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].bits() < pair[1].bits(), "{:?} >= {:?}", pair[0], pair[1]);
        }
        assert_eq!(HitFlags::RETANGIBLE.bits(), 1);
        assert_eq!(HitFlags::PIERCE_GROUND.bits(), 1 << 15);
    }

    #[test]
    fn default_template_flinches_and_impacts() {
        let props = HitProperties::DEFAULT;
        assert_eq!(props.damage, 0);
        assert_eq!(props.flags, HitFlags::FLINCH | HitFlags::IMPACT);
        assert!(props.counters());
    }

    #[test]
    fn flags_combine_and_clear_bitwise() {
        let mut props = HitProperties::new(10, HitFlags::IMPACT);
        props.flags |= HitFlags::STUN;
        props.flags &= !HitFlags::IMPACT;
        assert_eq!(props.flags, HitFlags::STUN);
    }

    #[test]
    fn drag_is_hidden_without_flag() {
        let mut props = HitProperties::DEFAULT.with_drag(Drag::new(Direction::Right, 2));
        assert_eq!(props.drag(), Some(Drag::new(Direction::Right, 2)));

        props.flags.remove(HitFlags::DRAG);
        assert_eq!(props.drag(), None);
    }

    #[test]
    fn weakness_table_checks_both_elements() {
        assert!(Element::Aqua.is_weak_to(Element::Elec));
        assert!(Element::Wood.is_weak_to(Element::Fire));
        assert!(!Element::Fire.is_weak_to(Element::Elec));
        assert!(!Element::None.is_weak_to(Element::None));

        let props = HitProperties::DEFAULT
            .with_element(Element::Sword)
            .with_secondary_element(Element::Elec);
        assert!(props.is_super_effective_against(Element::Aqua));
        assert!(props.is_super_effective_against(Element::Wind));
        assert!(!props.is_super_effective_against(Element::Fire));
    }

    #[test]
    fn no_counter_disables_counters() {
        let props = HitProperties::new(5, HitFlags::IMPACT | HitFlags::NO_COUNTER);
        assert!(!props.counters());
    }
}
