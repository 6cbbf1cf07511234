use std::collections::VecDeque;

use crate::config::StatusTimings;
use crate::hit::{Drag, HitFlags, HitProperties};
use crate::types::EntityId;

/// What one call to [`StatusState::resolve`] changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusResolution {
    /// Every status that took effect, one bit per status.
    pub applied: HitFlags,
    /// Set when a hit landed as a counter, to the entity credited with it.
    pub counter_aggressor: Option<EntityId>,
    /// Forced movement the field must start.
    pub drag: Option<Drag>,
}

impl StatusResolution {
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.counter_aggressor.is_none() && self.drag.is_none()
    }
}

/// Queued hits and the running status timers of one hittable entity.
///
/// Hits are queued when damage lands and turned into timers at the start of
/// the entity's next update. All timers count frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusState {
    queue: VecDeque<HitProperties>,
    flinch: u32,
    stun: u32,
    freeze: u32,
    invincible: u32,
    bubble: u32,
    root: u32,
    shake: u32,
    blind: u32,
    confuse: u32,
}

impl StatusState {
    pub fn queue_hit(&mut self, props: HitProperties) {
        self.queue.push_back(props);
    }

    pub fn queued_hits(&self) -> usize {
        self.queue.len()
    }

    pub fn is_flinching(&self) -> bool {
        self.flinch > 0
    }

    pub fn is_stunned(&self) -> bool {
        self.stun > 0
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze > 0
    }

    /// Flash invincibility.
    pub fn is_invincible(&self) -> bool {
        self.invincible > 0
    }

    pub fn is_bubbled(&self) -> bool {
        self.bubble > 0
    }

    pub fn is_rooted(&self) -> bool {
        self.root > 0
    }

    pub fn is_shaking(&self) -> bool {
        self.shake > 0
    }

    pub fn is_blind(&self) -> bool {
        self.blind > 0
    }

    pub fn is_confused(&self) -> bool {
        self.confuse > 0
    }

    /// Stunned, frozen or bubbled: the entity's behavior does not run.
    pub fn is_immobilized(&self) -> bool {
        self.is_stunned() || self.is_frozen() || self.is_bubbled()
    }

    pub fn set_invincible(&mut self, frames: u32) {
        self.invincible = frames;
    }

    pub fn clear_invincible(&mut self) {
        self.invincible = 0;
    }

    /// Turn queued hits into timers.
    ///
    /// Nothing resolves while `sliding`. A hit that drags stops resolution for
    /// this frame; its other statuses are put back and apply once the slide
    /// ends.
    pub fn resolve(
        &mut self,
        timings: &StatusTimings,
        counterable: bool,
        sliding: bool,
    ) -> StatusResolution {
        let mut out = StatusResolution::default();
        if sliding {
            return out;
        }

        while let Some(mut props) = self.queue.pop_front() {
            let flags = props.flags;

            if flags.contains(HitFlags::IMPACT) && counterable && props.counters() {
                if let Some(aggressor) = props.aggressor {
                    out.counter_aggressor = Some(aggressor);
                    self.stun = self.stun.max(timings.counter_stun_frames);
                    out.applied |= HitFlags::STUN;
                }
            }

            if let Some(drag) = props.drag().filter(|d| d.count > 0) {
                out.drag = Some(drag);
                out.applied |= HitFlags::DRAG;
                props.flags.remove(HitFlags::DRAG | HitFlags::IMPACT);
                if props.flags.intersects(HitFlags::STATUSES | HitFlags::RETANGIBLE) {
                    self.queue.push_front(props);
                }
                break;
            }

            self.apply(timings, flags, &mut out.applied);
        }

        out
    }

    fn apply(&mut self, timings: &StatusTimings, mut flags: HitFlags, applied: &mut HitFlags) {
        if flags.contains(HitFlags::FREEZE) {
            flags.remove(HitFlags::FLASH);
        }

        if flags.contains(HitFlags::STUN) {
            self.stun = self.stun.max(timings.stun_frames);
            *applied |= HitFlags::STUN;
        }
        if flags.contains(HitFlags::FREEZE) {
            self.freeze = timings.freeze_frames;
            *applied |= HitFlags::FREEZE;
        }
        if flags.contains(HitFlags::FLASH) {
            self.invincible = timings.flash_frames;
            *applied |= HitFlags::FLASH;
        }
        if flags.contains(HitFlags::RETANGIBLE) {
            self.invincible = 0;
            *applied |= HitFlags::RETANGIBLE;
        }
        if flags.contains(HitFlags::BUBBLE) {
            self.bubble = timings.bubble_frames;
            *applied |= HitFlags::BUBBLE;
        }
        if flags.contains(HitFlags::ROOT) {
            self.root = timings.root_frames;
            *applied |= HitFlags::ROOT;
        }
        if flags.contains(HitFlags::SHAKE) {
            self.shake = timings.shake_frames;
            *applied |= HitFlags::SHAKE;
        }
        if flags.contains(HitFlags::BLIND) {
            self.blind = timings.blind_frames;
            *applied |= HitFlags::BLIND;
        }
        if flags.contains(HitFlags::CONFUSE) {
            self.confuse = timings.confuse_frames;
            *applied |= HitFlags::CONFUSE;
        }
        if flags.contains(HitFlags::FLINCH) {
            self.flinch = timings.flinch_frames;
            *applied |= HitFlags::FLINCH;
        }
    }

    /// Count every timer down by one frame.
    pub(crate) fn tick(&mut self) {
        for timer in [
            &mut self.flinch,
            &mut self.stun,
            &mut self.freeze,
            &mut self.invincible,
            &mut self.bubble,
            &mut self.root,
            &mut self.shake,
            &mut self.blind,
            &mut self.confuse,
        ] {
            *timer = timer.saturating_sub(1);
        }
    }

    /// Drop every timer and queued hit.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn timings() -> StatusTimings {
        StatusTimings::default()
    }

    #[test]
    fn flinch_lasts_its_configured_frames() {
        let mut status = StatusState::default();
        status.queue_hit(HitProperties::new(10, HitFlags::FLINCH | HitFlags::IMPACT));

        let out = status.resolve(&timings(), false, false);
        assert_eq!(out.applied, HitFlags::FLINCH);
        assert!(status.is_flinching());

        for _ in 0..timings().flinch_frames {
            status.tick();
        }
        assert!(!status.is_flinching());
    }

    #[test]
    fn counter_hit_stuns_and_credits_aggressor() {
        let mut status = StatusState::default();
        let props = HitProperties::new(10, HitFlags::IMPACT).with_aggressor(EntityId(7));
        status.queue_hit(props);

        let out = status.resolve(&timings(), true, false);
        assert_eq!(out.counter_aggressor, Some(EntityId(7)));
        assert!(status.is_stunned());
        assert!(status.is_immobilized());
    }

    #[test]
    fn no_counter_prevents_counter_hit() {
        let mut status = StatusState::default();
        let props = HitProperties::new(10, HitFlags::IMPACT | HitFlags::NO_COUNTER)
            .with_aggressor(EntityId(7));
        status.queue_hit(props);

        let out = status.resolve(&timings(), true, false);
        assert_eq!(out.counter_aggressor, None);
        assert!(!status.is_stunned());
    }

    #[test]
    fn freeze_cancels_flash_from_same_hit() {
        let mut status = StatusState::default();
        status.queue_hit(HitProperties::new(0, HitFlags::FREEZE | HitFlags::FLASH));
        status.resolve(&timings(), false, false);
        assert!(status.is_frozen());
        assert!(!status.is_invincible());
    }

    #[test]
    fn retangible_clears_invincibility() {
        let mut status = StatusState::default();
        status.set_invincible(60);
        status.queue_hit(HitProperties::new(0, HitFlags::RETANGIBLE));
        let out = status.resolve(&timings(), false, false);
        assert!(out.applied.contains(HitFlags::RETANGIBLE));
        assert!(!status.is_invincible());
    }

    #[test]
    fn drag_defers_remaining_statuses_until_slide_ends() {
        let mut status = StatusState::default();
        let props = HitProperties::new(10, HitFlags::IMPACT | HitFlags::STUN)
            .with_drag(Drag::new(Direction::Right, 1));
        status.queue_hit(props);

        let out = status.resolve(&timings(), false, false);
        assert_eq!(out.drag, Some(Drag::new(Direction::Right, 1)));
        assert!(!status.is_stunned());
        assert_eq!(status.queued_hits(), 1);

        let paused = status.resolve(&timings(), false, true);
        assert!(paused.is_empty());

        let resumed = status.resolve(&timings(), false, false);
        assert_eq!(resumed.drag, None);
        assert!(status.is_stunned());
    }
}
