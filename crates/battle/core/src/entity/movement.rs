use crate::types::{Direction, Position};

/// How an entity travels between tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Vanishes from one tile and appears on the other.
    Teleport,
    /// Glides across, visible on both tiles' boundary.
    Slide,
}

/// A move in progress. The destination stays reserved until it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Movement {
    pub from: Position,
    pub dest: Position,
    pub direction: Direction,
    pub kind: MoveKind,
    pub elapsed: u32,
    pub duration: u32,
    /// Imposed by drag, conveyors or ice rather than chosen.
    pub forced: bool,
    /// Tiles still to travel in `direction` once this step lands.
    pub remaining: u32,
}

impl Movement {
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration.max(1)
    }
}
