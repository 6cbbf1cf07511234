//! Attack resolution and damage application.

use tracing::debug;

use super::Field;
use crate::audio::{AudioEvent, AudioPriority};
use crate::defense::{DefenseFrameStateJudge, DefenseOrder, run_defense_check};
use crate::hit::{Element, HitFlags, HitProperties};
use crate::tile::{Tile, TileState};
use crate::types::{EntityId, Position};

impl Field {
    /// Resolve every attacker queued on the tile against every hittable
    /// occupant, then run the surviving defense triggers.
    ///
    /// Each defender gets one judge for the whole pass; it is reset between
    /// attackers so triggers from earlier attacks survive until the end.
    pub(crate) fn execute_all_attacks(&mut self, position: Position) {
        let Some(tile) = self.tile_mut(position) else {
            return;
        };
        let attackers = tile.take_queued_attackers();
        if attackers.is_empty() {
            return;
        }
        let defenders = tile.characters().to_vec();
        let mut judges: Vec<DefenseFrameStateJudge> =
            defenders.iter().map(|_| DefenseFrameStateJudge::new()).collect();

        for (n, attacker) in attackers.iter().enumerate() {
            for (defender, judge) in defenders.iter().zip(judges.iter_mut()) {
                if n > 0 {
                    judge.prepare_for_next_attack();
                }
                self.resolve_attack(*attacker, *defender, judge, position);
            }
        }

        for judge in judges {
            judge.execute_all_triggers(self);
        }
    }

    fn resolve_attack(
        &mut self,
        attacker_id: EntityId,
        defender_id: EntityId,
        judge: &mut DefenseFrameStateJudge,
        position: Position,
    ) {
        if attacker_id == defender_id || self.resolved.contains(&(attacker_id, defender_id)) {
            return;
        }
        let (Some(attacker), Some(defender)) = (
            self.entities.get(&attacker_id),
            self.entities.get(&defender_id),
        ) else {
            return;
        };
        if defender.deleted || !defender.kind().is_hittable() || !attacker.kind().can_attack() {
            return;
        }
        if !attacker.team().is_hostile_to(defender.team()) {
            return;
        }

        let props = attacker.hitbox_properties();
        let rules = defender.defenses().snapshot();
        run_defense_check(&rules, judge, attacker, defender, DefenseOrder::Always);
        if !defender.has_collision(&props) {
            return;
        }
        run_defense_check(&rules, judge, attacker, defender, DefenseOrder::CollisionOnly);

        self.resolved.insert((attacker_id, defender_id));
        if let Some(tile) = self.tile_mut(position) {
            tile.tag(attacker_id);
        }
        if let Some(defender) = self.entities.get_mut(&defender_id) {
            defender.intangibility.on_collision(&props);
        }
        self.with_behavior(attacker_id, |behavior, field| {
            behavior.on_collision(field, attacker_id, defender_id)
        });

        if judge.is_damage_blocked() {
            debug!("{} blocked {}", defender_id, attacker_id);
            return;
        }

        let mut props = props;
        if judge.is_impact_blocked() {
            props.flags.remove(HitFlags::IMPACT_EFFECTS);
        }
        let delivered = self.with_behavior(attacker_id, |behavior, field| {
            behavior.attack(field, attacker_id, defender_id, props)
        });
        if delivered.is_none() {
            self.hit(defender_id, props);
        }
    }

    /// Apply `props` to `target` and return the damage dealt.
    ///
    /// The target's defense filters reshape the statuses first. Element
    /// weakness doubles the damage, fire on grass doubles it again and burns
    /// the grass away, and holy ground halves it.
    pub fn hit(&mut self, target: EntityId, props: HitProperties) -> i32 {
        let Some(entity) = self.entities.get(&target) else {
            return 0;
        };
        if !entity.kind().is_hittable() {
            return 0;
        }

        let mut filtered = entity.defenses().filter_statuses(props);
        if props.flags.contains(HitFlags::NO_COUNTER) {
            filtered.flags |= HitFlags::NO_COUNTER;
        }

        let mut damage = filtered.damage.max(0);
        if filtered.is_super_effective_against(entity.element()) {
            damage = damage.saturating_mul(2);
        }
        let fire = filtered.element == Element::Fire || filtered.secondary_element == Element::Fire;
        if let Some(position) = entity.position() {
            match self.tile(position).map(Tile::state) {
                Some(TileState::Grass) if fire => {
                    damage = damage.saturating_mul(2);
                    if let Some(tile) = self.tile_mut(position) {
                        tile.set_state(TileState::Normal);
                    }
                }
                Some(TileState::Holy) => damage /= 2,
                _ => {}
            }
        }
        filtered.damage = damage;

        let Some(entity) = self.entities.get_mut(&target) else {
            return 0;
        };
        let health = entity.health();
        entity.set_health(health.saturating_sub(damage));
        entity.status.queue_hit(filtered);
        debug!(
            "{} took {} damage ({} -> {})",
            target,
            damage,
            health,
            entity.health()
        );

        if damage > 0 {
            self.play_audio(AudioEvent::Hurt, AudioPriority::Low);
        }
        damage
    }
}
