use core::fmt;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for row/column counts and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Identifies a cell by `(row, column)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: Coord,
    pub column: Coord,
}

impl Position {
    pub const fn new(row: Coord, column: Coord) -> Self {
        Self { row, column }
    }

    pub fn to_nd_index(self) -> [usize; 2] {
        [self.row.into(), self.column.into()]
    }

    /// Iterates the up-to-8 neighbors of this position clipped to `size`.
    pub fn iter_neighbors(self, size: GridSize) -> NeighborIter {
        NeighborIter::new(self, size)
    }
}

impl From<(Coord, Coord)> for Position {
    fn from((row, column): (Coord, Coord)) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Dimensions of a grid, both axes are positive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: Coord,
    pub columns: Coord,
}

impl GridSize {
    pub const fn new(rows: Coord, columns: Coord) -> Self {
        Self { rows, columns }
    }

    pub const fn square(size: Coord) -> Self {
        Self::new(size, size)
    }

    pub const fn total_cells(self) -> CellCount {
        mult(self.rows, self.columns)
    }

    pub const fn contains(self, position: Position) -> bool {
        position.row < self.rows && position.column < self.columns
    }

    pub fn to_nd_index(self) -> [usize; 2] {
        [self.rows.into(), self.columns.into()]
    }

    /// All positions of the grid in row-major order.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| Position { row, column }))
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `position`, returning a value only when it remains in bounds.
fn apply_delta(position: Position, delta: (i8, i8), bounds: GridSize) -> Option<Position> {
    let (dr, dc) = delta;

    let row = position.row.checked_add_signed(dr)?;
    if row >= bounds.rows {
        return None;
    }

    let column = position.column.checked_add_signed(dc)?;
    if column >= bounds.columns {
        return None;
    }

    Some(Position { row, column })
}

#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Position,
    bounds: GridSize,
    index: u8,
}

impl NeighborIter {
    fn new(center: Position, bounds: GridSize) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
