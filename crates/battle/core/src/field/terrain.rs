//! Tile state and team changes, stolen-column recovery and terrain hazards.

use tracing::{debug, trace};

use super::Field;
use crate::audio::{AudioEvent, AudioPriority};
use crate::entity::{EntityKind, Hitbox};
use crate::hit::{Element, HitFlags, HitProperties};
use crate::tile::TileState;
use crate::types::{Position, Team};

impl Field {
    /// Change a tile's terrain. See [`crate::Tile::set_state`] for the rules.
    pub fn set_tile_state(&mut self, position: Position, state: TileState) -> bool {
        let Some(tile) = self.tile_mut(position) else {
            return false;
        };
        if !tile.set_state(state) {
            return false;
        }
        match state {
            TileState::Cracked => self.play_audio(AudioEvent::PanelCrack, AudioPriority::Low),
            TileState::Broken => self.play_audio(AudioEvent::PanelBreak, AudioPriority::Low),
            _ => {}
        }
        true
    }

    /// Hand a tile to `team`.
    ///
    /// Rejected on edge and hidden tiles, on each side's outermost column,
    /// and while a character of another team stands on or reserves the tile.
    pub fn set_tile_team(&mut self, position: Position, team: Team) -> bool {
        let Some(tile) = self.tile(position) else {
            return false;
        };
        if tile.is_edge() || tile.is_hidden() {
            return false;
        }
        if position.x == 1 || position.x == self.width {
            trace!("tile {}: home column is protected", position);
            return false;
        }
        let contested = tile
            .characters()
            .iter()
            .copied()
            .chain(tile.reservations())
            .filter_map(|id| self.entity(id))
            .any(|e| e.kind() == EntityKind::Character && !e.is_deleted() && e.team() != team);
        if contested {
            trace!("tile {}: team change to {} rejected while contested", position, team);
            return false;
        }

        if let Some(tile) = self.tile_mut(position) {
            tile.assign_team(team);
        }
        true
    }

    /// Return at most one stolen column per frame to its owner.
    ///
    /// A column reverts once every stolen tile in it has cooled down and no
    /// character of the thief's team stands at or beyond it.
    pub(crate) fn restore_stolen_columns(&mut self) {
        for x in 1..=self.width {
            let stolen: Vec<(Position, Team)> = (1..=self.height)
                .filter_map(|y| self.tile_at(x, y))
                .filter(|t| t.team() != t.original_team())
                .map(|t| (t.position(), t.team()))
                .collect();
            if stolen.is_empty() {
                continue;
            }
            let cooling = stolen
                .iter()
                .any(|(p, _)| self.tile(*p).is_some_and(|t| t.team_cooldown() > 0));
            if cooling || stolen.iter().any(|(_, thief)| self.thief_holds_column(*thief, x)) {
                continue;
            }

            for (position, _) in &stolen {
                if let Some(tile) = self.tile_mut(*position) {
                    let original = tile.original_team();
                    tile.assign_team(original);
                }
            }
            debug!("column {} returned to its owner", x);
            self.play_audio(AudioEvent::PanelReturn, AudioPriority::Low);
            return;
        }
    }

    fn thief_holds_column(&self, thief: Team, column: i32) -> bool {
        self.entities.values().any(|e| {
            e.kind() == EntityKind::Character
                && !e.is_deleted()
                && e.team() == thief
                && e.position().is_some_and(|p| match thief {
                    Team::Red => p.x >= column,
                    Team::Blue => p.x <= column,
                    Team::Unknown => p.x == column,
                })
        })
    }

    /// Restart the cooldown on every stolen tile of `column`.
    pub fn extend_stolen_column(&mut self, column: i32) {
        for y in 1..=self.height {
            if let Some(tile) = self.tile_at_mut(column, y) {
                if tile.team() != tile.original_team() {
                    tile.reset_team_timer();
                }
            }
        }
    }

    pub(crate) fn erupt_volcano(&mut self, position: Position) {
        let damage = self.config.hazard.volcano_damage;
        let props = HitProperties::new(damage, HitFlags::FLINCH | HitFlags::IMPACT)
            .with_element(Element::Fire);
        self.spawn(Hitbox::entity(Team::Unknown, props), position.x, position.y);
        self.play_audio(AudioEvent::Volcano, AudioPriority::Low);
    }

    /// Step (f): terrain side effects on the characters standing here.
    pub(crate) fn apply_terrain_effects(&mut self, position: Position) {
        let Some(tile) = self.tile(position) else {
            return;
        };
        let state = tile.state();
        let occupants = tile.characters().to_vec();
        let hazard = self.config.hazard.clone();
        let slide_frames = self.config.status.slide_frames;

        for id in occupants {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            if entity.deleted
                || entity.kind() != EntityKind::Character
                || entity.has_float_shoe()
                || entity.is_moving()
            {
                continue;
            }
            entity.terrain_timer += 1;
            let timer = entity.terrain_timer;
            let element = entity.element();

            match state {
                TileState::Poison => {
                    if timer % hazard.poison_interval_frames.max(1) == 0 {
                        let health = entity.health();
                        entity.set_health(health - hazard.poison_damage);
                    }
                }
                TileState::Grass => {
                    let interval = hazard.grass_heal_interval_frames.max(1);
                    if element == Element::Wood && timer % interval == 0 {
                        let health = entity.health();
                        entity.set_health(health + 1);
                    }
                }
                TileState::Lava => {
                    if element != Element::Fire {
                        // Burns through a hitbox so defenses get their say.
                        let props =
                            HitProperties::new(hazard.lava_damage, HitFlags::FLINCH | HitFlags::IMPACT)
                                .with_element(Element::Fire);
                        self.spawn(Hitbox::entity(Team::Unknown, props), position.x, position.y);
                        self.set_tile_state(position, TileState::Normal);
                        return;
                    }
                }
                _ => {
                    if let Some(direction) = state.conveyor_direction() {
                        if timer >= hazard.conveyor_delay_frames {
                            entity.terrain_timer = 0;
                            self.begin_slide(id, direction, slide_frames, true, 0);
                        }
                    }
                }
            }
        }
    }
}
