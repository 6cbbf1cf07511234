//! A single grid cell: occupancy buckets, terrain, team and the per-frame
//! attack queue.
//!
//! Tiles hold entity IDs only. The [`crate::Field`] owns the entities and
//! drives the per-frame update through the tile's buckets.

mod state;

pub use state::{TileHighlight, TileState};

use std::collections::BTreeSet;

use tracing::trace;

use crate::config::TileTimings;
use crate::entity::EntityKind;
use crate::types::{Direction, EntityId, Position, Team};

/// Timer events raised by [`Tile::advance_timers`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TileTick {
    pub regenerated: bool,
    pub erupted: bool,
}

/// One cell of the field.
#[derive(Clone, Debug)]
pub struct Tile {
    position: Position,
    team: Team,
    original_team: Team,
    facing: Direction,
    state: TileState,
    edge: bool,
    highlight: TileHighlight,
    /// Requests made after this tile's pass; shown through its next pass.
    carried_highlight: TileHighlight,
    scanned: bool,

    characters: Vec<EntityId>,
    spells: Vec<EntityId>,
    artifacts: Vec<EntityId>,
    entities: Vec<EntityId>,
    reserved: BTreeSet<EntityId>,

    queued_attackers: Vec<EntityId>,
    tagged: Vec<EntityId>,

    broken_timer: u32,
    team_timer: u32,
    flicker: u32,
    volcano_timer: u32,
    timings: TileTimings,
}

impl Tile {
    pub(crate) fn new(position: Position, team: Team, edge: bool, timings: TileTimings) -> Self {
        Self {
            position,
            team,
            original_team: team,
            facing: team.default_facing(),
            state: if edge { TileState::Hidden } else { TileState::Normal },
            edge,
            highlight: TileHighlight::None,
            carried_highlight: TileHighlight::None,
            scanned: false,
            characters: Vec::new(),
            spells: Vec::new(),
            artifacts: Vec::new(),
            entities: Vec::new(),
            reserved: BTreeSet::new(),
            queued_attackers: Vec::new(),
            tagged: Vec::new(),
            broken_timer: 0,
            team_timer: 0,
            flicker: 0,
            volcano_timer: 0,
            timings,
        }
    }

    // ===== geometry =====

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn x(&self) -> i32 {
        self.position.x
    }

    pub fn y(&self) -> i32 {
        self.position.y
    }

    pub fn is_edge(&self) -> bool {
        self.edge
    }

    pub fn distance_to(&self, other: &Tile) -> u32 {
        self.position.distance(other.position)
    }

    // ===== terrain =====

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn is_hidden(&self) -> bool {
        self.state == TileState::Hidden
    }

    pub fn is_hole(&self) -> bool {
        self.state.is_hole()
    }

    pub fn is_cracked(&self) -> bool {
        self.state == TileState::Cracked
    }

    /// A character without shoes may stand here.
    pub fn is_walkable(&self) -> bool {
        !self.edge && self.state.is_walkable()
    }

    /// Change the terrain. Returns false and leaves the tile untouched when the
    /// transition is not allowed.
    pub fn set_state(&mut self, state: TileState) -> bool {
        if self.edge || self.is_hidden() || state == TileState::Hidden {
            trace!("tile {}: {} rejected on edge or hidden tile", self.position, state);
            return false;
        }
        if state.is_hole() && (!self.characters.is_empty() || !self.reserved.is_empty()) {
            trace!("tile {}: {} rejected while occupied", self.position, state);
            return false;
        }
        if state == TileState::Cracked && self.state.is_hole() {
            trace!("tile {}: cannot crack a {} tile", self.position, self.state);
            return false;
        }

        if state == TileState::Broken {
            self.broken_timer = self.timings.broken_cooldown_frames;
        }
        if state != TileState::Volcano {
            self.volcano_timer = 0;
        }
        self.state = state;
        true
    }

    // ===== team =====

    pub fn team(&self) -> Team {
        self.team
    }

    /// Team the tile had when the battle was built.
    pub fn original_team(&self) -> Team {
        self.original_team
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Frames left before a stolen tile may revert.
    pub fn team_cooldown(&self) -> u32 {
        self.team_timer
    }

    pub fn is_flickering(&self) -> bool {
        self.flicker > 0
    }

    /// Assign a team without occupancy checks; the field validates first.
    pub(crate) fn assign_team(&mut self, team: Team) {
        if team == self.team {
            return;
        }
        self.team = team;
        self.facing = team.default_facing();
        if team == self.original_team {
            self.team_timer = 0;
            self.flicker = 0;
        } else {
            self.team_timer = self.timings.team_cooldown_frames;
            self.flicker = self.timings.flicker_frames;
        }
    }

    // ===== highlight =====

    pub fn highlight(&self) -> TileHighlight {
        self.highlight
    }

    /// Raise the highlight for this frame. A request arriving after the
    /// tile's own pass also survives the next timer reset.
    pub fn request_highlight(&mut self, highlight: TileHighlight) {
        self.highlight = self.highlight.max(highlight);
        if self.scanned {
            self.carried_highlight = self.carried_highlight.max(highlight);
        }
    }

    // ===== occupancy =====

    /// Put an entity into the buckets for its kind. Obstacles land in both the
    /// character and the spell bucket.
    pub fn add_entity(&mut self, id: EntityId, kind: EntityKind) {
        if self.entities.contains(&id) {
            return;
        }
        if kind.is_hittable() {
            self.characters.push(id);
        }
        if kind.can_attack() {
            self.spells.push(id);
        }
        if kind.is_artifact() {
            self.artifacts.push(id);
        }
        self.entities.push(id);
    }

    /// Take an entity out of every bucket. Returns true if it was here.
    pub fn remove_entity_by_id(&mut self, id: EntityId) -> bool {
        let present = self.entities.contains(&id);
        self.characters.retain(|e| *e != id);
        self.spells.retain(|e| *e != id);
        self.artifacts.retain(|e| *e != id);
        self.entities.retain(|e| *e != id);
        self.queued_attackers.retain(|e| *e != id);
        self.reserved.remove(&id);
        present
    }

    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    pub fn reserve_entity_by_id(&mut self, id: EntityId) {
        self.reserved.insert(id);
    }

    pub fn remove_reservation(&mut self, id: EntityId) -> bool {
        self.reserved.remove(&id)
    }

    pub fn is_reserved(&self) -> bool {
        !self.reserved.is_empty()
    }

    pub fn reservations(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.reserved.iter().copied()
    }

    /// Characters and obstacles, in arrival order.
    pub fn characters(&self) -> &[EntityId] {
        &self.characters
    }

    /// Spells and obstacles, in arrival order.
    pub fn spells(&self) -> &[EntityId] {
        &self.spells
    }

    pub fn artifacts(&self) -> &[EntityId] {
        &self.artifacts
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    // ===== attack queue =====

    /// Queue `attacker` for resolution this frame. Ignored once the attacker
    /// has been tagged or is already queued.
    pub fn queue_attacker(&mut self, attacker: EntityId) -> bool {
        if self.is_tagged(attacker) || self.queued_attackers.contains(&attacker) {
            return false;
        }
        self.queued_attackers.push(attacker);
        true
    }

    pub fn queued_attackers(&self) -> &[EntityId] {
        &self.queued_attackers
    }

    pub(crate) fn take_queued_attackers(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.queued_attackers)
    }

    /// Record that `spell` hit something on this tile this frame.
    pub fn tag(&mut self, spell: EntityId) {
        if !self.tagged.contains(&spell) {
            self.tagged.push(spell);
        }
    }

    pub fn is_tagged(&self, spell: EntityId) -> bool {
        self.tagged.contains(&spell)
    }

    pub fn tagged(&self) -> &[EntityId] {
        &self.tagged
    }

    // ===== frame =====

    /// Step (a) of the tile update.
    pub(crate) fn advance_timers(&mut self) -> TileTick {
        let mut tick = TileTick::default();
        self.highlight = std::mem::take(&mut self.carried_highlight);
        self.scanned = false;
        self.tagged.clear();

        if self.state == TileState::Broken && self.broken_timer > 0 {
            self.broken_timer -= 1;
            if self.broken_timer == 0 {
                self.state = TileState::Normal;
                tick.regenerated = true;
            }
        }

        self.team_timer = self.team_timer.saturating_sub(1);
        self.flicker = self.flicker.saturating_sub(1);

        if self.state == TileState::Volcano {
            self.volcano_timer += 1;
            if self.volcano_timer >= self.timings.volcano_eruption_frames.max(1) {
                self.volcano_timer = 0;
                tick.erupted = true;
            }
        }

        tick
    }

    /// Mark the end of this tile's pass for the frame.
    pub(crate) fn finish_scan(&mut self) {
        self.scanned = true;
    }

    pub(crate) fn reset_team_timer(&mut self) {
        self.team_timer = self.timings.team_cooldown_frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> Tile {
        Tile::new(Position::new(2, 2), Team::Red, false, TileTimings::default())
    }

    #[test]
    fn add_then_remove_restores_buckets() {
        let mut tile = tile();
        tile.add_entity(EntityId(1), EntityKind::Character);
        tile.add_entity(EntityId(2), EntityKind::Spell);
        tile.add_entity(EntityId(3), EntityKind::Artifact);
        let before = (
            tile.characters().to_vec(),
            tile.spells().to_vec(),
            tile.artifacts().to_vec(),
            tile.entities().to_vec(),
        );

        tile.add_entity(EntityId(9), EntityKind::Obstacle);
        assert!(tile.characters().contains(&EntityId(9)));
        assert!(tile.spells().contains(&EntityId(9)));
        assert!(tile.remove_entity_by_id(EntityId(9)));

        let after = (
            tile.characters().to_vec(),
            tile.spells().to_vec(),
            tile.artifacts().to_vec(),
            tile.entities().to_vec(),
        );
        assert_eq!(before, after);
        assert!(!tile.remove_entity_by_id(EntityId(9)));
    }

    #[test]
    fn occupied_or_reserved_tile_cannot_break() {
        let mut tile = tile();
        tile.add_entity(EntityId(1), EntityKind::Character);
        assert!(!tile.set_state(TileState::Broken));
        assert!(!tile.set_state(TileState::Empty));
        assert_eq!(tile.state(), TileState::Normal);

        tile.remove_entity_by_id(EntityId(1));
        tile.reserve_entity_by_id(EntityId(2));
        assert!(!tile.set_state(TileState::Broken));

        tile.remove_reservation(EntityId(2));
        assert!(tile.set_state(TileState::Broken));
    }

    #[test]
    fn holes_cannot_crack_and_hidden_is_final() {
        let mut tile = tile();
        assert!(tile.set_state(TileState::Empty));
        assert!(!tile.set_state(TileState::Cracked));
        assert!(!tile.set_state(TileState::Hidden));

        let mut edge = Tile::new(Position::new(0, 0), Team::Red, true, TileTimings::default());
        assert!(edge.is_hidden());
        assert!(!edge.set_state(TileState::Normal));
    }

    #[test]
    fn broken_tile_regenerates() {
        let timings = TileTimings {
            broken_cooldown_frames: 3,
            ..TileTimings::default()
        };
        let mut tile = Tile::new(Position::new(1, 1), Team::Red, false, timings);
        assert!(tile.set_state(TileState::Broken));
        assert!(!tile.advance_timers().regenerated);
        assert!(!tile.advance_timers().regenerated);
        assert!(tile.advance_timers().regenerated);
        assert_eq!(tile.state(), TileState::Normal);
    }

    #[test]
    fn tagged_spells_are_not_queued_again() {
        let mut tile = tile();
        assert!(tile.queue_attacker(EntityId(5)));
        assert!(!tile.queue_attacker(EntityId(5)));
        tile.take_queued_attackers();
        tile.tag(EntityId(5));
        assert!(!tile.queue_attacker(EntityId(5)));

        tile.advance_timers();
        assert!(tile.tagged().is_empty());
    }

    #[test]
    fn highlight_keeps_strongest_request_until_next_frame() {
        let mut tile = tile();
        tile.request_highlight(TileHighlight::Solid);
        tile.request_highlight(TileHighlight::Flash);
        assert_eq!(tile.highlight(), TileHighlight::Solid);
        tile.advance_timers();
        assert_eq!(tile.highlight(), TileHighlight::None);
    }

    #[test]
    fn highlight_requested_after_the_pass_shows_next_frame() {
        let mut tile = tile();
        tile.advance_timers();
        tile.finish_scan();
        tile.request_highlight(TileHighlight::Solid);

        tile.advance_timers();
        assert_eq!(tile.highlight(), TileHighlight::Solid);
        tile.finish_scan();

        tile.advance_timers();
        assert_eq!(tile.highlight(), TileHighlight::None);
    }
}
