use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use super::{
    DefenseFrameStateJudge, DefenseOrder, DefensePriority, DefenseRule, DefenseRuleId,
};
use crate::entity::Entity;
use crate::hit::HitProperties;

/// One attached rule.
#[derive(Clone)]
pub struct DefenseEntry {
    id: DefenseRuleId,
    rule: Rc<dyn DefenseRule>,
    replaced: Rc<Cell<bool>>,
}

impl DefenseEntry {
    pub fn id(&self) -> DefenseRuleId {
        self.id
    }

    pub fn rule(&self) -> &dyn DefenseRule {
        self.rule.as_ref()
    }

    pub fn priority(&self) -> DefensePriority {
        self.rule.priority()
    }

    /// True once a same-priority rule has superseded this one.
    pub fn is_replaced(&self) -> bool {
        self.replaced.get()
    }
}

impl std::fmt::Debug for DefenseEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefenseEntry")
            .field("id", &self.id)
            .field("rule", &self.rule.name())
            .field("priority", &self.rule.priority())
            .field("replaced", &self.replaced.get())
            .finish()
    }
}

/// Ordered defense rules owned by one entity.
///
/// Entries stay sorted by ascending priority; equal priorities (only possible
/// for [`DefensePriority::LAST`]) keep attachment order.
#[derive(Clone, Debug, Default)]
pub struct DefenseChain {
    entries: Vec<DefenseEntry>,
    next_id: u32,
}

impl DefenseChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a rule, replacing any existing rule of the same priority.
    pub fn add(&mut self, rule: Rc<dyn DefenseRule>) -> DefenseRuleId {
        let id = DefenseRuleId(self.next_id);
        self.next_id += 1;

        let priority = rule.priority();
        let mut entry = DefenseEntry {
            id,
            rule,
            replaced: Rc::new(Cell::new(false)),
        };

        if priority == DefensePriority::LAST {
            self.entries.push(entry);
            return id;
        }

        match self.entries.iter().position(|e| e.priority() >= priority) {
            Some(index) if self.entries[index].priority() == priority => {
                std::mem::swap(&mut self.entries[index], &mut entry);
                entry.replaced.set(true);
                trace!(
                    "defense {} replaced {} at priority {}",
                    self.entries[index].rule.name(),
                    entry.rule.name(),
                    priority
                );
                entry.rule.on_replace();
            }
            Some(index) => self.entries.insert(index, entry),
            None => self.entries.push(entry),
        }

        id
    }

    /// Attach an owned rule. Returns the id and a handle to it.
    pub fn add_rule<R: DefenseRule + 'static>(&mut self, rule: R) -> (DefenseRuleId, Rc<R>) {
        let rule = Rc::new(rule);
        let id = self.add(rule.clone());
        (id, rule)
    }

    /// Detach a rule by id.
    pub fn remove(&mut self, id: DefenseRuleId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Detach the first rule with `priority`, running its replace hook.
    pub fn remove_priority(&mut self, priority: DefensePriority) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.priority() == priority) else {
            return false;
        };
        let entry = self.entries.remove(index);
        entry.replaced.set(true);
        entry.rule.on_replace();
        true
    }

    pub fn has_priority(&self, priority: DefensePriority) -> bool {
        self.entries.iter().any(|e| e.priority() == priority)
    }

    pub fn contains(&self, id: DefenseRuleId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DefenseEntry> {
        self.entries.iter()
    }

    /// Copy of the entries for evaluation, so the chain itself can change
    /// while an attack is being resolved.
    pub fn snapshot(&self) -> Vec<DefenseEntry> {
        self.entries.clone()
    }

    /// Apply every rule's status filter in priority order.
    pub fn filter_statuses(&self, props: HitProperties) -> HitProperties {
        self.entries
            .iter()
            .filter(|e| !e.is_replaced())
            .fold(props, |props, e| e.rule.filter_statuses(props))
    }
}

/// Run the rules of `order` from `rules` against one attack.
///
/// Each rule is given the judge with its own context set, so triggers it adds
/// are attributed to it.
pub fn run_defense_check(
    rules: &[DefenseEntry],
    judge: &mut DefenseFrameStateJudge,
    attacker: &Entity,
    owner: &Entity,
    order: DefenseOrder,
) {
    for entry in rules {
        if entry.is_replaced() || entry.rule.order() != order {
            continue;
        }
        judge.set_defense_context(entry.id);
        entry.rule.can_block(judge, attacker, owner);
    }
    judge.clear_defense_context();
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::defense::{DefenseSuperArmor, DefenseVirusBody};
    use crate::hit::HitFlags;
    use crate::types::Team;

    struct Recorder {
        priority: DefensePriority,
        order: DefenseOrder,
        log: Rc<RefCell<Vec<u8>>>,
    }

    impl DefenseRule for Recorder {
        fn priority(&self) -> DefensePriority {
            self.priority
        }

        fn order(&self) -> DefenseOrder {
            self.order
        }

        fn name(&self) -> &'static str {
            "recorder"
        }

        fn can_block(&self, _judge: &mut DefenseFrameStateJudge, _: &Entity, _: &Entity) {
            self.log.borrow_mut().push(self.priority.0);
        }
    }

    fn recorder(priority: u8, order: DefenseOrder, log: &Rc<RefCell<Vec<u8>>>) -> Rc<Recorder> {
        Rc::new(Recorder {
            priority: DefensePriority(priority),
            order,
            log: log.clone(),
        })
    }

    #[test]
    fn rules_run_in_ascending_priority() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = DefenseChain::new();
        for priority in [2, 0, 1] {
            chain.add(recorder(priority, DefenseOrder::Always, &log));
        }

        let attacker = Entity::spell("buster", Team::Red, HitProperties::DEFAULT);
        let owner = Entity::character("met", Team::Blue, 40);
        let mut judge = DefenseFrameStateJudge::new();
        run_defense_check(&chain.snapshot(), &mut judge, &attacker, &owner, DefenseOrder::Always);

        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn order_filters_which_rules_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = DefenseChain::new();
        chain.add(recorder(3, DefenseOrder::CollisionOnly, &log));
        chain.add(recorder(4, DefenseOrder::Always, &log));

        let attacker = Entity::spell("buster", Team::Red, HitProperties::DEFAULT);
        let owner = Entity::character("met", Team::Blue, 40);
        let mut judge = DefenseFrameStateJudge::new();
        let rules = chain.snapshot();

        run_defense_check(&rules, &mut judge, &attacker, &owner, DefenseOrder::Always);
        assert_eq!(*log.borrow(), vec![4]);

        run_defense_check(&rules, &mut judge, &attacker, &owner, DefenseOrder::CollisionOnly);
        assert_eq!(*log.borrow(), vec![4, 3]);
    }

    #[test]
    fn same_priority_replaces_and_marks_old_rule() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = DefenseChain::new();
        let first = chain.add(recorder(2, DefenseOrder::Always, &log));
        let stale = chain.snapshot();
        let second = chain.add(recorder(2, DefenseOrder::Always, &log));

        assert_eq!(chain.len(), 1);
        assert!(!chain.contains(first));
        assert!(chain.contains(second));
        assert!(stale[0].is_replaced());

        // A snapshot taken before the swap skips the superseded rule.
        let attacker = Entity::spell("buster", Team::Red, HitProperties::DEFAULT);
        let owner = Entity::character("met", Team::Blue, 40);
        let mut judge = DefenseFrameStateJudge::new();
        run_defense_check(&stale, &mut judge, &attacker, &owner, DefenseOrder::Always);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn last_priority_stacks_in_attachment_order() {
        let mut chain = DefenseChain::new();
        let a = chain.add(Rc::new(DefenseSuperArmor));
        let b = chain.add(Rc::new(DefenseSuperArmor));
        let ids: Vec<_> = chain.iter().map(DefenseEntry::id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn remove_and_remove_priority_detach_rules() {
        let mut chain = DefenseChain::new();
        let armor = chain.add(Rc::new(DefenseSuperArmor));
        chain.add(Rc::new(DefenseVirusBody));

        assert!(chain.has_priority(DefensePriority::BODY));
        assert!(chain.remove_priority(DefensePriority::BODY));
        assert!(!chain.has_priority(DefensePriority::BODY));

        assert!(chain.remove(armor));
        assert!(!chain.remove(armor));
        assert!(chain.is_empty());
    }

    #[test]
    fn filters_compose_in_priority_order() {
        let mut chain = DefenseChain::new();
        chain.add(Rc::new(DefenseSuperArmor));
        chain.add(Rc::new(DefenseVirusBody));

        let props =
            HitProperties::new(30, HitFlags::FLINCH | HitFlags::FLASH | HitFlags::IMPACT);
        assert_eq!(chain.filter_statuses(props).flags, HitFlags::IMPACT);
    }
}
