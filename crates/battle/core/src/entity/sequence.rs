use std::collections::VecDeque;
use std::fmt;

use crate::field::Field;
use crate::types::EntityId;

type StepAction = Box<dyn FnOnce(&mut Field, EntityId)>;

/// One scheduled action.
pub struct SequenceStep {
    pub frame: u32,
    action: StepAction,
}

/// Ordered list of `{frame, action}` steps for multi-step attacks.
///
/// The owning entity advances the sequence by one frame per update and runs
/// every step whose frame has been reached, in order.
#[derive(Default)]
pub struct ActionSequence {
    elapsed: u32,
    steps: VecDeque<SequenceStep>,
}

impl ActionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` at `frame`. Steps are kept sorted; equal frames run in
    /// the order they were added.
    #[must_use]
    pub fn step(mut self, frame: u32, action: impl FnOnce(&mut Field, EntityId) + 'static) -> Self {
        let index = self.steps.partition_point(|s| s.frame <= frame);
        self.steps.insert(
            index,
            SequenceStep {
                frame,
                action: Box::new(action),
            },
        );
        self
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    /// Frames at which the remaining steps fire.
    pub fn frames(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.iter().map(|s| s.frame)
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// Advance one frame and pop the steps that are now due.
    pub(crate) fn advance(&mut self) -> Vec<SequenceStep> {
        self.elapsed += 1;
        let due = self.steps.partition_point(|s| s.frame <= self.elapsed);
        self.steps.drain(..due).collect()
    }
}

impl SequenceStep {
    pub(crate) fn run(self, field: &mut Field, me: EntityId) {
        (self.action)(field, me);
    }
}

impl fmt::Debug for ActionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSequence")
            .field("elapsed", &self.elapsed)
            .field("frames", &self.frames().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered_by_frame() {
        let sequence = ActionSequence::new()
            .step(5, |_, _| {})
            .step(1, |_, _| {})
            .step(5, |_, _| {})
            .step(3, |_, _| {});
        assert_eq!(sequence.frames().collect::<Vec<_>>(), vec![1, 3, 5, 5]);
    }

    #[test]
    fn advance_pops_due_steps() {
        let mut sequence = ActionSequence::new().step(1, |_, _| {}).step(3, |_, _| {});
        assert_eq!(sequence.advance().len(), 1);
        assert_eq!(sequence.advance().len(), 0);
        assert_eq!(sequence.advance().len(), 1);
        assert!(sequence.is_finished());
    }
}
