use serde::{Deserialize, Serialize};

/// What a cell holds once it is revealed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineCell {
    /// No mines among the neighbors.
    Empty,
    /// Number of mines among the neighbors, `1..=8`.
    Numbered(u8),
    Mine,
}

impl MineCell {
    /// Content for a safe cell with `count` adjacent mines.
    pub const fn from_adjacent_mines(count: u8) -> Self {
        if count == 0 { Self::Empty } else { Self::Numbered(count) }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Adjacent mine count, `None` for a mine.
    pub const fn adjacent_mines(self) -> Option<u8> {
        match self {
            Self::Empty => Some(0),
            Self::Numbered(count) => Some(count),
            Self::Mine => None,
        }
    }
}

impl Default for MineCell {
    fn default() -> Self {
        Self::Empty
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnrevealedCell {
    UnFlagged(MineCell),
    Flagged(MineCell),
}

impl UnrevealedCell {
    pub const fn content(self) -> MineCell {
        match self {
            Self::UnFlagged(content) | Self::Flagged(content) => content,
        }
    }

    pub const fn toggle_flag(self) -> Self {
        match self {
            Self::UnFlagged(content) => Self::Flagged(content),
            Self::Flagged(content) => Self::UnFlagged(content),
        }
    }

    pub const fn reveal(self) -> RawCell {
        RawCell::Revealed(self.content())
    }
}

/// Cell as stored in a grid.
///
/// `Unrevealed` becomes `Revealed` at most once and never goes back.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawCell {
    Unrevealed(UnrevealedCell),
    Revealed(MineCell),
}

impl RawCell {
    pub const fn unflagged(content: MineCell) -> Self {
        Self::Unrevealed(UnrevealedCell::UnFlagged(content))
    }

    pub const fn content(self) -> MineCell {
        match self {
            Self::Unrevealed(cell) => cell.content(),
            Self::Revealed(content) => content,
        }
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Unrevealed(UnrevealedCell::Flagged(_)))
    }
}

impl Default for RawCell {
    fn default() -> Self {
        Self::unflagged(MineCell::Empty)
    }
}
