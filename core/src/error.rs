use thiserror::Error;

use crate::{CellCount, GridSize, Position};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position {position} is outside of the {size} grid")]
    OutOfBounds { position: Position, size: GridSize },
    #[error("Cannot place {requested} mines, only {available} cells are outside the safe zone")]
    InsufficientSpace {
        requested: CellCount,
        available: CellCount,
    },
    #[error("Grid shape does not match declared size")]
    InvalidGridShape,
    #[error("Grid declares {declared} mines but holds {found}")]
    MineCountMismatch { declared: CellCount, found: CellCount },
    #[error("A {size} grid needs at least one cell without a mine")]
    NoSafeCell { size: GridSize },
}

pub type Result<T> = core::result::Result<T, GameError>;
