//! Entity records: the data every occupant of the field shares.
//!
//! There is no class hierarchy. An [`Entity`] carries an [`EntityKind`] that says
//! which roles it plays (hittable, attacking, visual), and an optional boxed
//! [`EntityBehavior`] that holds the content-specific logic.

mod behavior;
mod hitbox;
mod intangible;
mod movement;
mod sequence;
mod status;

pub use behavior::EntityBehavior;
pub use hitbox::Hitbox;
pub use intangible::Intangibility;
pub use movement::{MoveKind, Movement};
pub use sequence::{ActionSequence, SequenceStep};
pub use status::{StatusResolution, StatusState};

use std::fmt;
use std::rc::Rc;

use crate::defense::{DefenseChain, DefenseRule, DefenseRuleId};
use crate::hit::{Element, HitFlags, HitProperties};
use crate::tile::TileHighlight;
use crate::types::{Direction, EntityId, Position, Team};

/// Role an entity plays in combat.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    /// Can be hit; owns health and defenses.
    Character,
    /// Attacks the tiles it affects.
    Spell,
    /// Both hittable and attacking, like a rock cube.
    Obstacle,
    /// Visual only; never takes part in combat.
    Artifact,
}

impl EntityKind {
    /// Lives in a tile's character bucket and can take hits.
    pub const fn is_hittable(self) -> bool {
        matches!(self, EntityKind::Character | EntityKind::Obstacle)
    }

    /// Lives in a tile's spell bucket and can deliver hits.
    pub const fn can_attack(self) -> bool {
        matches!(self, EntityKind::Spell | EntityKind::Obstacle)
    }

    pub const fn is_artifact(self) -> bool {
        matches!(self, EntityKind::Artifact)
    }
}

/// One occupant of the field.
pub struct Entity {
    pub(crate) id: EntityId,
    kind: EntityKind,
    name: String,
    team: Team,
    facing: Direction,
    pub(crate) position: Option<Position>,
    element: Element,
    health: i32,
    max_health: i32,
    hitbox: HitProperties,
    hitbox_enabled: bool,
    counterable: bool,
    passthrough: bool,
    float_shoe: bool,
    air_shoe: bool,
    share_tile: bool,
    pub(crate) deleted: bool,
    highlight: TileHighlight,
    animation: Option<String>,
    pub(crate) frames_alive: u64,
    pub(crate) terrain_timer: u32,
    defenses: DefenseChain,
    pub(crate) intangibility: Intangibility,
    pub(crate) status: StatusState,
    pub(crate) movement: Option<Movement>,
    pub(crate) sequence: Option<ActionSequence>,
    pub(crate) behavior: Option<Box<dyn EntityBehavior>>,
}

impl Entity {
    fn new(kind: EntityKind, name: impl Into<String>, team: Team) -> Self {
        Self {
            id: EntityId(0),
            kind,
            name: name.into(),
            team,
            facing: team.default_facing(),
            position: None,
            element: Element::None,
            health: 0,
            max_health: 0,
            hitbox: HitProperties::NONE,
            hitbox_enabled: true,
            counterable: false,
            passthrough: false,
            float_shoe: false,
            air_shoe: false,
            share_tile: false,
            deleted: false,
            highlight: TileHighlight::None,
            animation: None,
            frames_alive: 0,
            terrain_timer: 0,
            defenses: DefenseChain::new(),
            intangibility: Intangibility::default(),
            status: StatusState::default(),
            movement: None,
            sequence: None,
            behavior: None,
        }
    }

    pub fn character(name: impl Into<String>, team: Team, health: i32) -> Self {
        let mut entity = Self::new(EntityKind::Character, name, team);
        entity.health = health;
        entity.max_health = health;
        entity
    }

    pub fn spell(name: impl Into<String>, team: Team, props: HitProperties) -> Self {
        let mut entity = Self::new(EntityKind::Spell, name, team);
        entity.hitbox = props;
        entity
    }

    pub fn obstacle(name: impl Into<String>, team: Team, health: i32, props: HitProperties) -> Self {
        let mut entity = Self::new(EntityKind::Obstacle, name, team);
        entity.health = health;
        entity.max_health = health;
        entity.hitbox = props;
        entity
    }

    pub fn artifact(name: impl Into<String>) -> Self {
        let mut entity = Self::new(EntityKind::Artifact, name, Team::Unknown);
        entity.hitbox_enabled = false;
        entity
    }

    // ===== builders =====

    #[must_use]
    pub fn with_behavior(mut self, behavior: impl EntityBehavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    #[must_use]
    pub fn with_float_shoe(mut self, enabled: bool) -> Self {
        self.float_shoe = enabled;
        self
    }

    #[must_use]
    pub fn with_air_shoe(mut self, enabled: bool) -> Self {
        self.air_shoe = enabled;
        self
    }

    #[must_use]
    pub fn with_passthrough(mut self, enabled: bool) -> Self {
        self.passthrough = enabled;
        self
    }

    #[must_use]
    pub fn with_tile_highlight(mut self, highlight: TileHighlight) -> Self {
        self.highlight = highlight;
        self
    }

    #[must_use]
    pub fn with_sequence(mut self, sequence: ActionSequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Attach a defense rule before spawning.
    #[must_use]
    pub fn with_defense(mut self, rule: Rc<dyn DefenseRule>) -> Self {
        self.defenses.add(rule);
        self
    }

    // ===== identity =====

    /// Registry id. Zero until the entity is spawned.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn set_team(&mut self, team: Team) {
        self.team = team;
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Tile the entity currently occupies.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn set_element(&mut self, element: Element) {
        self.element = element;
    }

    // ===== health =====

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Set health, clamped to `0..=max_health`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    // ===== combat =====

    /// Properties this entity attacks with.
    pub fn hitbox_properties(&self) -> HitProperties {
        self.hitbox
    }

    pub fn set_hitbox_properties(&mut self, props: HitProperties) {
        self.hitbox = props;
    }

    pub fn hitbox_enabled(&self) -> bool {
        self.hitbox_enabled
    }

    pub fn enable_hitbox(&mut self, enabled: bool) {
        self.hitbox_enabled = enabled;
    }

    pub fn is_counterable(&self) -> bool {
        self.counterable
    }

    /// Open or close the counter window.
    pub fn set_counter_frame(&mut self, open: bool) {
        self.counterable = open;
    }

    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    pub fn set_passthrough(&mut self, enabled: bool) {
        self.passthrough = enabled;
    }

    pub fn has_float_shoe(&self) -> bool {
        self.float_shoe
    }

    pub fn set_float_shoe(&mut self, enabled: bool) {
        self.float_shoe = enabled;
    }

    pub fn has_air_shoe(&self) -> bool {
        self.air_shoe
    }

    pub fn set_air_shoe(&mut self, enabled: bool) {
        self.air_shoe = enabled;
    }

    /// Whether other hittable entities may stand on the same tile.
    pub fn shares_tile(&self) -> bool {
        self.share_tile
    }

    pub fn set_share_tile(&mut self, enabled: bool) {
        self.share_tile = enabled;
    }

    /// Returns true if an attack with `props` physically reaches this entity.
    pub fn has_collision(&self, props: &HitProperties) -> bool {
        if !self.hitbox_enabled || self.passthrough {
            return false;
        }
        let pierces = props.flags.contains(HitFlags::PIERCE);
        if self.status.is_invincible() && !pierces {
            return false;
        }
        self.intangibility.allows(props)
    }

    pub fn defenses(&self) -> &DefenseChain {
        &self.defenses
    }

    pub fn defenses_mut(&mut self) -> &mut DefenseChain {
        &mut self.defenses
    }

    /// Attach a rule. Shorthand for `defenses_mut().add(rule)`.
    pub fn add_defense_rule(&mut self, rule: Rc<dyn DefenseRule>) -> DefenseRuleId {
        self.defenses.add(rule)
    }

    pub fn remove_defense_rule(&mut self, id: DefenseRuleId) -> bool {
        self.defenses.remove(id)
    }

    pub fn intangibility(&self) -> &Intangibility {
        &self.intangibility
    }

    pub fn intangibility_mut(&mut self) -> &mut Intangibility {
        &mut self.intangibility
    }

    pub fn status(&self) -> &StatusState {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusState {
        &mut self.status
    }

    // ===== lifecycle & presentation =====

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn movement(&self) -> Option<&Movement> {
        self.movement.as_ref()
    }

    pub fn is_moving(&self) -> bool {
        self.movement.is_some()
    }

    pub fn is_sliding(&self) -> bool {
        self.movement
            .as_ref()
            .is_some_and(|m| m.kind == MoveKind::Slide)
    }

    /// Frames this entity has been updated for.
    pub fn frames_alive(&self) -> u64 {
        self.frames_alive
    }

    pub fn tile_highlight(&self) -> TileHighlight {
        self.highlight
    }

    pub fn set_tile_highlight(&mut self, highlight: TileHighlight) {
        self.highlight = highlight;
    }

    /// Name of the animation the renderer should be playing.
    pub fn animation(&self) -> Option<&str> {
        self.animation.as_deref()
    }

    pub fn set_animation(&mut self, animation: impl Into<String>) {
        self.animation = Some(animation.into());
    }

    pub fn sequence(&self) -> Option<&ActionSequence> {
        self.sequence.as_ref()
    }

    /// Replace the running action sequence.
    pub fn set_sequence(&mut self, sequence: ActionSequence) {
        self.sequence = Some(sequence);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("team", &self.team)
            .field("position", &self.position)
            .field("health", &self.health)
            .field("deleted", &self.deleted)
            .field("defenses", &self.defenses.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_capabilities() {
        assert!(EntityKind::Obstacle.is_hittable());
        assert!(EntityKind::Obstacle.can_attack());
        assert!(!EntityKind::Spell.is_hittable());
        assert!(!EntityKind::Character.can_attack());
        assert!(EntityKind::Artifact.is_artifact());
    }

    #[test]
    fn health_is_clamped() {
        let mut met = Entity::character("met", Team::Blue, 40);
        met.set_health(-5);
        assert_eq!(met.health(), 0);
        met.set_health(500);
        assert_eq!(met.health(), 40);
    }

    #[test]
    fn passthrough_and_invincibility_prevent_collision() {
        let props = HitProperties::new(10, HitFlags::IMPACT);
        let mut target = Entity::character("target", Team::Blue, 100);
        assert!(target.has_collision(&props));

        target.set_passthrough(true);
        assert!(!target.has_collision(&props));
        target.set_passthrough(false);

        target.status_mut().set_invincible(30);
        assert!(!target.has_collision(&props));

        let piercing = HitProperties::new(10, HitFlags::IMPACT | HitFlags::PIERCE);
        assert!(target.has_collision(&piercing));
    }
}
