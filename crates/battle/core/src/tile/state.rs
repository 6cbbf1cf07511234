use crate::types::Direction;

/// Terrain of a tile.
///
/// `Normal`, `Cracked`, `Broken` and `Empty` form the crack/break chain. The
/// other states are special terrain with their own side effects.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TileState {
    #[default]
    Normal,
    Cracked,
    Broken,
    Empty,
    Poison,
    Lava,
    Ice,
    Grass,
    DirectionUp,
    DirectionDown,
    DirectionLeft,
    DirectionRight,
    Volcano,
    Holy,
    Hidden,
}

impl TileState {
    /// Nothing can stand here without an air shoe.
    pub const fn is_hole(self) -> bool {
        matches!(self, TileState::Broken | TileState::Empty)
    }

    pub const fn is_walkable(self) -> bool {
        !self.is_hole() && !matches!(self, TileState::Hidden)
    }

    /// Direction a conveyor tile pushes its occupants.
    pub const fn conveyor_direction(self) -> Option<Direction> {
        match self {
            TileState::DirectionUp => Some(Direction::Up),
            TileState::DirectionDown => Some(Direction::Down),
            TileState::DirectionLeft => Some(Direction::Left),
            TileState::DirectionRight => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Highlight requested for a tile this frame.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TileHighlight {
    #[default]
    None,
    Flash,
    Solid,
    /// Solid, but only while the battle is running.
    Automatic,
}
