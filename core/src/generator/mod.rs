use crate::*;
pub use random::*;

mod random;

/// Produces a fully populated grid around the player's first move.
pub trait GridGenerator {
    /// Places `mine_count` mines outside the safe zone of `start` (the start
    /// cell and its neighbors) and numbers every other cell. All cells come
    /// back unrevealed and unflagged.
    fn generate(&self, size: GridSize, start: Position, mine_count: CellCount) -> Result<Grid>;
}

/// `start` plus its neighbors, clipped to the grid.
pub fn safe_zone(size: GridSize, start: Position) -> impl Iterator<Item = Position> {
    core::iter::once(start).chain(start.iter_neighbors(size))
}
