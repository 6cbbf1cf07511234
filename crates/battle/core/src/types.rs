//! Shared value types: identifiers, teams, directions, grid positions and frame counters.

use std::fmt;

/// Unique identifier for any entity registered with a [`crate::Field`].
///
/// Identifiers are handed out by the field in spawn order and never reused
/// within a battle, so a stale ID simply fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side an entity or tile belongs to.
///
/// `Unknown` entities attack everything, including other `Unknown` entities.
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
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Team {
    Red,
    Blue,
    #[default]
    Unknown,
}

impl Team {
    /// Returns true if an attack from `self` may connect with an entity of `other`.
    pub fn is_hostile_to(self, other: Team) -> bool {
        self != other || (self == Team::Unknown && other == Team::Unknown)
    }

    /// Direction entities of this team face by default.
    pub fn default_facing(self) -> Direction {
        match self {
            Team::Red => Direction::Right,
            Team::Blue => Direction::Left,
            Team::Unknown => Direction::None,
        }
    }
}

/// Grid direction, including diagonals.
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
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Unit offset on the grid. `Up` decreases `y`.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::DownRight => (1, 1),
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Tile coordinate on the field grid.
///
/// Playable tiles are 1-based; column 0, row 0 and the last column/row form the
/// hidden edge ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position `count` steps away in `direction`.
    pub const fn offset(self, direction: Direction, count: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx * count,
            y: self.y + dy * count,
        }
    }

    /// Manhattan distance between two tiles.
    pub const fn distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Simulation frame counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_team_is_hostile_to_itself() {
        assert!(Team::Unknown.is_hostile_to(Team::Unknown));
        assert!(Team::Red.is_hostile_to(Team::Blue));
        assert!(!Team::Red.is_hostile_to(Team::Red));
    }

    #[test]
    fn position_offset_follows_screen_axes() {
        let origin = Position::new(3, 2);
        assert_eq!(origin.offset(Direction::Up, 1), Position::new(3, 1));
        assert_eq!(origin.offset(Direction::Right, 2), Position::new(5, 2));
        assert_eq!(origin.offset(Direction::DownLeft, 1), Position::new(2, 3));
        assert_eq!(origin.distance(Position::new(1, 3)), 3);
    }
}
