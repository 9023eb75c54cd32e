use serde::{Deserialize, Serialize};

pub use cell::*;
pub use controller::*;
pub use error::*;
pub use feedback::*;
pub use generator::*;
pub use grid::*;
pub use sequencer::*;
pub use state::*;
pub use types::*;
pub use watch::*;

mod cell;
mod controller;
mod error;
mod feedback;
mod generator;
mod grid;
mod sequencer;
mod state;
mod types;
mod watch;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: GridSize,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: GridSize, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Clamps both axes to at least one cell and leaves at least one cell free
    /// of mines. Whether the mines fit around the first click is only known
    /// at generation time.
    pub fn new(size: GridSize, mines: CellCount) -> Self {
        let rows = size.rows.clamp(1, Coord::MAX);
        let columns = size.columns.clamp(1, Coord::MAX);
        let mines = mines.min(mult(rows, columns) - 1);
        Self::new_unchecked(GridSize::new(rows, columns), mines)
    }

    pub const fn total_cells(&self) -> CellCount {
        self.size.total_cells()
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::default().config()
    }
}

/// Classic presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Beginner => GameConfig::new_unchecked(GridSize::square(9), 10),
            Intermediate => GameConfig::new_unchecked(GridSize::square(16), 40),
            Expert => GameConfig::new_unchecked(GridSize::new(16, 30), 99),
        }
    }
}
