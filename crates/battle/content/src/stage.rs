//! Stage descriptions and the builder that lays them out on a field.

use std::rc::Rc;

use battle_core::{
    BattleConfig, DefenseAntiDamage, DefenseAura, DefenseBubbleWrap, DefenseGuard,
    DefenseIndestructable, DefenseObstacleBody, DefenseRule, DefenseStatusGuard,
    DefenseSuperArmor, DefenseVirusBody, Direction, Element, Entity, EntityKind, Field,
    FieldError, HitFlags, HitProperties, Position, Team, TileState,
};
use tracing::debug;

use crate::error::StageError;

/// A battle layout: grid size, terrain, combatants and a script of attacks.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StageSpec {
    pub name: String,
    /// Overrides the configured width when set.
    pub width: Option<i32>,
    /// Overrides the configured height when set.
    pub height: Option<i32>,
    pub tiles: Vec<TileOverride>,
    pub entities: Vec<EntitySpec>,
    pub attacks: Vec<ScheduledAttack>,
}

impl StageSpec {
    /// Apply the stage's size overrides to `config`.
    pub fn config(&self, mut config: BattleConfig) -> BattleConfig {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        config
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileOverride {
    pub x: i32,
    pub y: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: Option<TileState>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub team: Option<Team>,
}

/// A character or obstacle placed when the stage is built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitySpec {
    pub name: String,
    pub kind: EntityKind,
    pub team: Team,
    pub x: i32,
    pub y: i32,
    pub health: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Element,
    #[cfg_attr(feature = "serde", serde(default))]
    pub defenses: Vec<DefenseSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub float_shoe: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub air_shoe: bool,
}

/// A defense rule by name, with its optional numeric parameter.
///
/// `value` is the aura threshold for `aura` and a non-zero flag for
/// `indestructable` (break colliding objects). Other rules ignore it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseSpec {
    pub rule: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: i32,
}

impl DefenseSpec {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            value: 0,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }
}

/// Stock rules a stage may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DefenseKind {
    SuperArmor,
    VirusBody,
    StatusGuard,
    ObstacleBody,
    Indestructable,
    BubbleWrap,
    Aura,
    Guard,
    AntiDamage,
}

impl DefenseKind {
    fn build(self, value: i32) -> Rc<dyn DefenseRule> {
        match self {
            DefenseKind::SuperArmor => Rc::new(DefenseSuperArmor),
            DefenseKind::VirusBody => Rc::new(DefenseVirusBody),
            DefenseKind::StatusGuard => Rc::new(DefenseStatusGuard),
            DefenseKind::ObstacleBody => Rc::new(DefenseObstacleBody),
            DefenseKind::Indestructable => Rc::new(DefenseIndestructable::new(value != 0)),
            DefenseKind::BubbleWrap => Rc::new(DefenseBubbleWrap::new()),
            DefenseKind::Aura => Rc::new(DefenseAura::new(value)),
            DefenseKind::Guard => Rc::new(DefenseGuard::new()),
            DefenseKind::AntiDamage => Rc::new(DefenseAntiDamage::new()),
        }
    }
}

/// How a scheduled attack is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackKind {
    /// Strikes its tile once.
    #[default]
    Hitbox,
    /// Travels across the field, one tile every `frames_per_tile` frames.
    Projectile {
        direction: Direction,
        frames_per_tile: u32,
    },
}

/// An attack the scenario spawns on a given frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledAttack {
    pub frame: u64,
    pub x: i32,
    pub y: i32,
    pub team: Team,
    pub damage: i32,
    #[cfg_attr(feature = "serde", serde(default = "ScheduledAttack::default_flags"))]
    pub flags: HitFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Element,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: AttackKind,
}

impl ScheduledAttack {
    /// Flags used when a stage leaves them out.
    pub fn default_flags() -> HitFlags {
        HitProperties::DEFAULT.flags
    }

    pub fn props(&self) -> HitProperties {
        HitProperties::new(self.damage, self.flags).with_element(self.element)
    }
}

/// Lays a [`StageSpec`] out on a new field.
pub struct StageBuilder;

impl StageBuilder {
    /// Build the field described by `spec`.
    ///
    /// Tile overrides apply before entities are placed, so a stage can put a
    /// character on ice or poison but not on a hole. A team override counts as
    /// a stolen tile and reverts once the team cooldown has passed.
    pub fn build(spec: &StageSpec, config: BattleConfig) -> Result<Field, StageError> {
        let mut field = Field::from_config(spec.config(config))?;

        for tile in &spec.tiles {
            let position = Position::new(tile.x, tile.y);
            check_bounds(&field, position)?;
            if let Some(state) = tile.state {
                if !field.set_tile_state(position, state) {
                    return Err(StageError::TileRejected { position, state });
                }
            }
            if let Some(team) = tile.team {
                if !field.set_tile_team(position, team) {
                    return Err(StageError::TeamRejected { position, team });
                }
            }
        }

        for entity in &spec.entities {
            let position = Position::new(entity.x, entity.y);
            check_bounds(&field, position)?;
            let built = build_entity(entity)?;
            let result = field.spawn(built, position.x, position.y);
            debug!("stage '{}': placed {} as {}", spec.name, entity.name, result.id);
        }

        Ok(field)
    }
}

fn check_bounds(field: &Field, position: Position) -> Result<(), StageError> {
    let inside = position.x >= 1
        && position.y >= 1
        && position.x <= field.width()
        && position.y <= field.height();
    if inside {
        Ok(())
    } else {
        Err(FieldError::OutOfBounds {
            position,
            width: field.width(),
            height: field.height(),
        }
        .into())
    }
}

fn build_entity(spec: &EntitySpec) -> Result<Entity, StageError> {
    let invalid = |reason| StageError::InvalidEntity {
        name: spec.name.clone(),
        reason,
    };
    if spec.health <= 0 {
        return Err(invalid("health must be positive"));
    }

    let mut entity = match spec.kind {
        EntityKind::Character => Entity::character(&spec.name, spec.team, spec.health),
        EntityKind::Obstacle => {
            Entity::obstacle(&spec.name, spec.team, spec.health, HitProperties::NONE)
        }
        EntityKind::Spell | EntityKind::Artifact => {
            return Err(invalid("only characters and obstacles can be placed"));
        }
    }
    .with_element(spec.element)
    .with_float_shoe(spec.float_shoe)
    .with_air_shoe(spec.air_shoe);

    for defense in &spec.defenses {
        let kind: DefenseKind =
            defense
                .rule
                .parse()
                .map_err(|_| StageError::UnknownDefense {
                    name: spec.name.clone(),
                    rule: defense.rule.clone(),
                })?;
        entity = entity.with_defense(kind.build(defense.value));
    }

    Ok(entity)
}
