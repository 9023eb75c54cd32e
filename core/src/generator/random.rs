use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniform generation: every position outside the safe zone is equally likely to
/// hold a mine.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RandomGridGenerator {
    seed: Option<u64>,
}

impl RandomGridGenerator {
    /// A `None` seed draws a fresh one per generated grid.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl GridGenerator for RandomGridGenerator {
    fn generate(&self, size: GridSize, start: Position, mine_count: CellCount) -> Result<Grid> {
        if !size.contains(start) {
            return Err(GameError::OutOfBounds {
                position: start,
                size,
            });
        }

        let mut reserved: Array2<bool> = Array2::default(size.to_nd_index());
        for position in safe_zone(size, start) {
            reserved[position.to_nd_index()] = true;
        }

        let mut candidates: Vec<Position> = size
            .positions()
            .filter(|position| !reserved[position.to_nd_index()])
            .collect();
        let available = candidates.len() as CellCount;
        if mine_count > available {
            return Err(GameError::InsufficientSpace {
                requested: mine_count,
                available,
            });
        }

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        log::debug!(
            "Generating {} grid with {} mines around {}, seed: {}",
            size,
            mine_count,
            start,
            seed
        );
        let mut rng = SmallRng::seed_from_u64(seed);

        // partial shuffle, the first `mine_count` candidates become mines
        let mine_count = usize::from(mine_count);
        for i in 0..mine_count {
            let j = rng.random_range(i..candidates.len());
            candidates.swap(i, j);
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for position in &candidates[..mine_count] {
            mine_mask[position.to_nd_index()] = true;
        }

        let grid = Grid::from_mine_mask(size, &mine_mask);

        // double check mine count
        if usize::from(grid.total_mines()) != mine_count {
            log::warn!(
                "Generated grid count mismatch, actual: {}, requested: {}",
                grid.total_mines(),
                mine_count
            );
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_many(size: GridSize, start: Position, mines: CellCount) -> impl Iterator<Item = Grid> {
        (0..64u64).map(move |seed| {
            RandomGridGenerator::seeded(seed)
                .generate(size, start, mines)
                .unwrap()
        })
    }

    #[test]
    fn safe_zone_never_holds_mines() {
        let size = GridSize::new(9, 12);
        for start in [Position::new(0, 0), Position::new(4, 5), Position::new(8, 11)] {
            for grid in generate_many(size, start, 30) {
                for position in safe_zone(size, start) {
                    assert!(!grid.get(position).unwrap().content().is_mine());
                }
            }
        }
    }

    #[test]
    fn mine_count_is_conserved() {
        let size = GridSize::square(8);
        for grid in generate_many(size, Position::new(3, 3), 20) {
            let mines = grid.iter().filter(|(_, cell)| cell.content().is_mine()).count();
            assert_eq!(mines, 20);
            assert_eq!(grid.total_mines(), 20);
        }
    }

    #[test]
    fn numbers_match_adjacent_mines() {
        let size = GridSize::new(7, 10);
        for grid in generate_many(size, Position::new(6, 0), 25) {
            for (position, cell) in grid.iter() {
                let expected = position
                    .iter_neighbors(size)
                    .filter(|&neighbor| grid.get(neighbor).unwrap().content().is_mine())
                    .count() as u8;
                match cell.content() {
                    MineCell::Mine => {}
                    MineCell::Empty => assert_eq!(expected, 0),
                    MineCell::Numbered(count) => assert_eq!(count, expected),
                }
            }
        }
    }

    #[test]
    fn cells_start_unrevealed_and_unflagged() {
        let grid = RandomGridGenerator::seeded(7)
            .generate(GridSize::square(5), Position::new(2, 2), 5)
            .unwrap();

        assert!(grid
            .iter()
            .all(|(_, cell)| matches!(cell, RawCell::Unrevealed(UnrevealedCell::UnFlagged(_)))));
    }

    #[test]
    fn same_seed_gives_same_grid() {
        let generator = RandomGridGenerator::seeded(42);
        let size = GridSize::square(10);

        let a = generator.generate(size, Position::new(5, 5), 15).unwrap();
        let b = generator.generate(size, Position::new(5, 5), 15).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn fills_every_cell_outside_safe_zone() {
        let grid = RandomGridGenerator::seeded(1)
            .generate(GridSize::square(4), Position::new(0, 0), 12)
            .unwrap();

        assert_eq!(grid.total_mines(), 12);
        assert_eq!(grid.get(Position::new(0, 0)).unwrap().content(), MineCell::Empty);
        assert_eq!(grid.get(Position::new(1, 1)).unwrap().content(), MineCell::Numbered(5));
    }

    #[test]
    fn too_many_mines_is_insufficient_space() {
        let result = RandomGridGenerator::seeded(1).generate(GridSize::square(3), Position::new(1, 1), 1);

        assert_eq!(
            result,
            Err(GameError::InsufficientSpace {
                requested: 1,
                available: 0,
            })
        );
    }

    #[test]
    fn start_outside_grid_is_out_of_bounds() {
        let result = RandomGridGenerator::default().generate(GridSize::square(3), Position::new(3, 1), 1);

        assert!(matches!(result, Err(GameError::OutOfBounds { .. })));
    }
}
