use core::fmt;
use std::sync::Arc;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::*;

type Row = Arc<Array1<RawCell>>;

/// Immutable snapshot of a field of cells.
///
/// Every row lives behind its own `Arc`, updates go through
/// [`Grid::with_cell`] and [`Grid::with_cells`] which hand back a new grid.
/// Writing a cell copies only its row, and only while another snapshot still
/// shares that row, so readers holding an older grid never observe a change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: GridSize,
    total_mines: CellCount,
    rows: Vec<Row>,
}

fn split_rows(cells: Array2<RawCell>) -> Vec<Row> {
    cells.outer_iter().map(|row| Arc::new(row.to_owned())).collect()
}

fn check_safe_cell(size: GridSize, total_mines: CellCount) -> Result<()> {
    if total_mines >= size.total_cells() {
        return Err(GameError::NoSafeCell { size });
    }
    Ok(())
}

impl Grid {
    /// Wraps fully built cells. `total_mines` has to match the mines among
    /// `cells` and leave at least one safe cell.
    pub fn from_cells(size: GridSize, total_mines: CellCount, cells: Array2<RawCell>) -> Result<Self> {
        let (rows, columns) = cells.dim();
        if rows != usize::from(size.rows) || columns != usize::from(size.columns) {
            return Err(GameError::InvalidGridShape);
        }
        let found = cells.iter().filter(|cell| cell.content().is_mine()).count() as CellCount;
        if found != total_mines {
            return Err(GameError::MineCountMismatch {
                declared: total_mines,
                found,
            });
        }
        check_safe_cell(size, total_mines)?;
        Ok(Self {
            size,
            total_mines,
            rows: split_rows(cells),
        })
    }

    /// All-unrevealed grid used before the mines are placed.
    pub fn placeholder(size: GridSize, total_mines: CellCount) -> Self {
        let row: Row = Arc::new(Array1::default(usize::from(size.columns)));
        Self {
            size,
            total_mines,
            rows: vec![row; usize::from(size.rows)],
        }
    }

    /// Builds an unrevealed grid with mines at exactly `mine_positions` and every
    /// other cell numbered accordingly.
    pub fn from_mine_positions(size: GridSize, mine_positions: &[Position]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &position in mine_positions {
            if !size.contains(position) {
                return Err(GameError::OutOfBounds { position, size });
            }
            mine_mask[position.to_nd_index()] = true;
        }
        let grid = Self::from_mine_mask(size, &mine_mask);
        check_safe_cell(size, grid.total_mines)?;
        Ok(grid)
    }

    pub(crate) fn from_mine_mask(size: GridSize, mine_mask: &Array2<bool>) -> Self {
        let mut total_mines: CellCount = 0;
        let cells = Array2::from_shape_fn(size.to_nd_index(), |(row, column)| {
            let position = Position::new(row as Coord, column as Coord);
            if mine_mask[position.to_nd_index()] {
                total_mines += 1;
                return RawCell::unflagged(MineCell::Mine);
            }
            let count = position
                .iter_neighbors(size)
                .filter(|neighbor| mine_mask[neighbor.to_nd_index()])
                .count() as u8;
            RawCell::unflagged(MineCell::from_adjacent_mines(count))
        });

        Self {
            size,
            total_mines,
            rows: split_rows(cells),
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.total_mines
    }

    pub fn total_cells(&self) -> CellCount {
        self.size.total_cells()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.total_mines)
    }

    pub fn validate_position(&self, position: Position) -> Result<Position> {
        if self.size.contains(position) {
            Ok(position)
        } else {
            Err(GameError::OutOfBounds {
                position,
                size: self.size,
            })
        }
    }

    fn cell(&self, position: Position) -> RawCell {
        self.rows[usize::from(position.row)][usize::from(position.column)]
    }

    fn cells(&self) -> impl Iterator<Item = &RawCell> + '_ {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn get(&self, position: Position) -> Result<RawCell> {
        let position = self.validate_position(position)?;
        Ok(self.cell(position))
    }

    /// Like [`Grid::get`] but returns `None` outside of the grid.
    pub fn get_or_null(&self, position: Position) -> Option<RawCell> {
        self.size.contains(position).then(|| self.cell(position))
    }

    pub fn iter_neighbors(&self, position: Position) -> NeighborIter {
        position.iter_neighbors(self.size)
    }

    /// All cells with their positions in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, RawCell)> + '_ {
        self.size
            .positions()
            .map(|position| (position, self.cell(position)))
    }

    pub fn adjacent_mine_count(&self, position: Position) -> u8 {
        self.iter_neighbors(position)
            .filter_map(|neighbor| self.get_or_null(neighbor))
            .filter(|cell| cell.content().is_mine())
            .count() as u8
    }

    pub fn revealed_count(&self) -> CellCount {
        self.cells().filter(|cell| cell.is_revealed()).count() as CellCount
    }

    pub fn flagged_count(&self) -> CellCount {
        self.cells().filter(|cell| cell.is_flagged()).count() as CellCount
    }

    /// Whether every non-mine cell is revealed.
    pub fn is_cleared(&self) -> bool {
        self.revealed_count() == self.safe_cell_count()
    }

    pub fn with_cell(self, position: Position, cell: RawCell) -> Result<Self> {
        self.with_cells([(position, cell)])
    }

    pub fn with_cells(mut self, updates: impl IntoIterator<Item = (Position, RawCell)>) -> Result<Self> {
        for (position, cell) in updates {
            self.replace_cell(position, cell)?;
        }
        Ok(self)
    }

    /// Swaps one cell in place and returns the previous value. Other snapshots
    /// sharing the row keep their copy.
    pub(crate) fn replace_cell(&mut self, position: Position, cell: RawCell) -> Result<RawCell> {
        let position = self.validate_position(position)?;
        let row = Arc::make_mut(&mut self.rows[usize::from(position.row)]);
        Ok(core::mem::replace(&mut row[usize::from(position.column)], cell))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row.iter() {
                let symbol = match cell {
                    RawCell::Unrevealed(UnrevealedCell::UnFlagged(_)) => '#',
                    RawCell::Unrevealed(UnrevealedCell::Flagged(_)) => 'F',
                    RawCell::Revealed(MineCell::Empty) => '.',
                    RawCell::Revealed(MineCell::Numbered(count)) => char::from(b'0' + count),
                    RawCell::Revealed(MineCell::Mine) => '*',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
