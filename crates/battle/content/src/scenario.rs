//! Scripted battles: a stage plus its attack schedule, stepped frame by frame.

use battle_core::{
    BattleConfig, Entity, EntityId, EntityKind, Field, Hitbox, Position, Team,
};
use tracing::{debug, info};

use crate::error::StageError;
use crate::spells::Projectile;
use crate::stage::{AttackKind, ScheduledAttack, StageBuilder, StageSpec};

/// A character still standing when a scenario stops.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Survivor {
    pub id: EntityId,
    pub name: String,
    pub team: Team,
    pub health: i32,
    pub position: Option<Position>,
}

/// Result of [`Scenario::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScenarioOutcome {
    pub frames: u64,
    pub finished: bool,
    pub winner: Option<Team>,
    pub survivors: Vec<Survivor>,
    pub digest: [u8; 32],
}

/// Drives a field through a list of scheduled attacks.
pub struct Scenario {
    field: Field,
    attacks: Vec<ScheduledAttack>,
    cursor: usize,
}

impl Scenario {
    pub fn new(field: Field, mut attacks: Vec<ScheduledAttack>) -> Self {
        attacks.sort_by_key(|a| a.frame);
        Self {
            field,
            attacks,
            cursor: 0,
        }
    }

    /// Build the stage's field and take over its attack schedule.
    pub fn from_stage(spec: &StageSpec, config: BattleConfig) -> Result<Self, StageError> {
        let field = StageBuilder::build(spec, config)?;
        Ok(Self::new(field, spec.attacks.clone()))
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    /// Attacks not yet launched.
    pub fn remaining_attacks(&self) -> usize {
        self.attacks.len() - self.cursor
    }

    /// Launch the attacks due on the next frame, then advance one frame.
    pub fn step(&mut self) {
        let next = self.field.frame().0 + 1;
        while let Some(attack) = self.attacks.get(self.cursor) {
            if attack.frame > next {
                break;
            }
            self.cursor += 1;
            let attack = attack.clone();
            let result = self.field.spawn(Self::spell(&attack), attack.x, attack.y);
            debug!(
                "frame {}: launched {:?} as {} ({:?})",
                next, attack.kind, result.id, result.status
            );
        }
        self.field.update();
    }

    /// True once every attack has launched and no spell is left on the field.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.attacks.len()
            && self.field.pending_count() == 0
            && self
                .field
                .find_entities(|e| e.kind() == EntityKind::Spell)
                .is_empty()
    }

    /// The only team with characters left, if exactly one remains.
    pub fn winner(&self) -> Option<Team> {
        let mut teams = self
            .field
            .entities()
            .filter(|e| e.kind() == EntityKind::Character && !e.is_deleted())
            .map(Entity::team);
        let first = teams.next()?;
        teams.all(|t| t == first).then_some(first)
    }

    /// Step until finished or `max_frames` have run.
    pub fn run(&mut self, max_frames: u64) -> ScenarioOutcome {
        let start = self.field.frame().0;
        while !self.is_finished() && self.field.frame().0 - start < max_frames {
            self.step();
        }
        let outcome = self.outcome();
        info!(
            "scenario stopped at frame {} (finished: {}, winner: {:?})",
            outcome.frames, outcome.finished, outcome.winner
        );
        outcome
    }

    /// Snapshot of the current state.
    pub fn outcome(&self) -> ScenarioOutcome {
        let survivors = self
            .field
            .entities()
            .filter(|e| e.kind() == EntityKind::Character && !e.is_deleted())
            .map(|e| Survivor {
                id: e.id(),
                name: e.name().to_string(),
                team: e.team(),
                health: e.health(),
                position: e.position(),
            })
            .collect();

        ScenarioOutcome {
            frames: self.field.frame().0,
            finished: self.is_finished(),
            winner: self.winner(),
            survivors,
            digest: self.field.state_digest(),
        }
    }

    fn spell(attack: &ScheduledAttack) -> Entity {
        match attack.kind {
            AttackKind::Hitbox => Hitbox::entity(attack.team, attack.props()),
            AttackKind::Projectile {
                direction,
                frames_per_tile,
            } => Projectile::entity(attack.team, attack.props(), direction, frames_per_tile),
        }
    }
}

#[cfg(test)]
mod tests {
    use battle_core::HitFlags;

    use super::*;
    use crate::stage::EntitySpec;

    fn duel() -> StageSpec {
        let fighter = |name: &str, team, x| EntitySpec {
            name: name.into(),
            kind: EntityKind::Character,
            team,
            x,
            y: 2,
            health: 30,
            element: Default::default(),
            defenses: Vec::new(),
            float_shoe: false,
            air_shoe: false,
        };
        let strike = |frame| ScheduledAttack {
            frame,
            x: 5,
            y: 2,
            team: Team::Red,
            damage: 20,
            flags: HitFlags::IMPACT,
            element: Default::default(),
            kind: AttackKind::Hitbox,
        };
        StageSpec {
            name: "duel".into(),
            entities: vec![fighter("red", Team::Red, 2), fighter("blue", Team::Blue, 5)],
            attacks: vec![strike(3), strike(1)],
            ..StageSpec::default()
        }
    }

    #[test]
    fn attacks_launch_on_their_frame() {
        let mut scenario = Scenario::from_stage(&duel(), BattleConfig::new()).unwrap();
        assert_eq!(scenario.remaining_attacks(), 2);

        scenario.step();
        assert_eq!(scenario.remaining_attacks(), 1);
        let blue = scenario.field().find_characters(|e| e.team() == Team::Blue);
        assert_eq!(scenario.field().entity(blue[0]).map(Entity::health), Some(10));

        scenario.step();
        assert_eq!(scenario.remaining_attacks(), 1);
    }

    #[test]
    fn run_reports_winner_and_survivors() {
        let mut scenario = Scenario::from_stage(&duel(), BattleConfig::new()).unwrap();
        let outcome = scenario.run(60);

        assert!(outcome.finished);
        assert_eq!(outcome.winner, Some(Team::Red));
        assert_eq!(outcome.survivors.len(), 1);
        assert_eq!(outcome.survivors[0].name, "red");
        assert!(outcome.frames < 60);
    }

    #[test]
    fn run_stops_at_the_frame_limit() {
        let mut scenario = Scenario::from_stage(&duel(), BattleConfig::new()).unwrap();
        let outcome = scenario.run(2);
        assert_eq!(outcome.frames, 2);
        assert!(!outcome.finished);
    }
}
