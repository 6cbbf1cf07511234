use crate::hit::{HitFlags, HitProperties};

/// Temporary immunity to collisions.
///
/// While active, only `PIERCE` attacks reach the entity. A piercing hit ends
/// the effect unless it was enabled with `retain_on_pierce`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intangibility {
    remaining: u32,
    retain_on_pierce: bool,
}

impl Intangibility {
    pub fn enable(&mut self, frames: u32, retain_on_pierce: bool) {
        self.remaining = frames;
        self.retain_on_pierce = retain_on_pierce;
    }

    pub fn disable(&mut self) {
        self.remaining = 0;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns true if an attack with `props` gets through.
    pub fn allows(&self, props: &HitProperties) -> bool {
        !self.is_active() || props.flags.contains(HitFlags::PIERCE)
    }

    /// Record that `props` collided with the owner.
    pub(crate) fn on_collision(&mut self, props: &HitProperties) {
        if self.is_active() && props.flags.contains(HitFlags::PIERCE) && !self.retain_on_pierce {
            self.disable();
        }
    }

    pub(crate) fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pierce_breaks_intangibility_unless_retained() {
        let pierce = HitProperties::new(10, HitFlags::PIERCE);
        let plain = HitProperties::new(10, HitFlags::IMPACT);

        let mut fragile = Intangibility::default();
        fragile.enable(60, false);
        assert!(!fragile.allows(&plain));
        assert!(fragile.allows(&pierce));
        fragile.on_collision(&pierce);
        assert!(!fragile.is_active());

        let mut sturdy = Intangibility::default();
        sturdy.enable(60, true);
        sturdy.on_collision(&pierce);
        assert!(sturdy.is_active());
    }

    #[test]
    fn expires_after_its_duration() {
        let mut intangible = Intangibility::default();
        intangible.enable(2, false);
        intangible.tick();
        assert!(intangible.is_active());
        intangible.tick();
        assert!(!intangible.is_active());
    }
}
