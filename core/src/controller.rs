use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::*;

/// Ordered cell replacements, applied one after another.
pub type CellChanges = Vec<(Position, RawCell)>;

/// Player intent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinefieldAction {
    CellClicked(Position),
    /// Long press or secondary click.
    CellFlagToggled(Position),
}

impl MinefieldAction {
    pub const fn position(self) -> Position {
        match self {
            Self::CellClicked(position) | Self::CellFlagToggled(position) => position,
        }
    }
}

/// What an action changed and whether the round ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinefieldEvent {
    CellsUpdated(CellChanges),
    GameOver {
        revealed_empty_cells: CellChanges,
        revealed_numbered_cells: CellChanges,
        revealed_mine_cells: CellChanges,
    },
    GameCompleted(CellChanges),
}

impl MinefieldEvent {
    pub const fn no_change() -> Self {
        Self::CellsUpdated(Vec::new())
    }

    pub fn is_no_change(&self) -> bool {
        matches!(self, Self::CellsUpdated(cells) if cells.is_empty())
    }

    /// The event's cell lists in application order. `GameOver` splits into
    /// three stages so empties land before numbers and numbers before mines.
    pub fn batches(&self) -> Vec<(BatchStage, &[(Position, RawCell)])> {
        match self {
            Self::CellsUpdated(cells) => vec![(BatchStage::CellsUpdated, cells.as_slice())],
            Self::GameOver {
                revealed_empty_cells,
                revealed_numbered_cells,
                revealed_mine_cells,
            } => vec![
                (BatchStage::RevealEmpty, revealed_empty_cells.as_slice()),
                (BatchStage::RevealNumbered, revealed_numbered_cells.as_slice()),
                (BatchStage::RevealMines, revealed_mine_cells.as_slice()),
            ],
            Self::GameCompleted(cells) => vec![(BatchStage::GameCompleted, cells.as_slice())],
        }
    }

    /// Every change carried by the event in application order.
    pub fn changes(&self) -> impl Iterator<Item = &(Position, RawCell)> + '_ {
        self.batches().into_iter().flat_map(|(_, cells)| cells.iter())
    }
}

/// Which part of an event a batch of cell updates belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStage {
    CellsUpdated,
    RevealEmpty,
    RevealNumbered,
    RevealMines,
    GameCompleted,
}

/// Maps an action and the current grid to the event describing its outcome.
///
/// Holds no state, all context comes from the grid it is given.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MinefieldController;

impl MinefieldController {
    pub const fn new() -> Self {
        Self
    }

    pub fn on_action(&self, action: MinefieldAction, grid: &Grid) -> Result<MinefieldEvent> {
        match action {
            MinefieldAction::CellFlagToggled(position) => self.toggle_flag(position, grid),
            MinefieldAction::CellClicked(position) => self.click(position, grid),
        }
    }

    fn toggle_flag(&self, position: Position, grid: &Grid) -> Result<MinefieldEvent> {
        Ok(match grid.get(position)? {
            RawCell::Unrevealed(cell) => {
                MinefieldEvent::CellsUpdated(vec![(position, RawCell::Unrevealed(cell.toggle_flag()))])
            }
            RawCell::Revealed(_) => MinefieldEvent::no_change(),
        })
    }

    fn click(&self, position: Position, grid: &Grid) -> Result<MinefieldEvent> {
        let cell = match grid.get(position)? {
            RawCell::Unrevealed(cell @ UnrevealedCell::UnFlagged(_)) => cell,
            RawCell::Unrevealed(UnrevealedCell::Flagged(_)) | RawCell::Revealed(_) => {
                return Ok(MinefieldEvent::no_change());
            }
        };

        let revealed = match cell.content() {
            MineCell::Mine => return Ok(self.detonate(position, grid)),
            MineCell::Numbered(_) => vec![(position, cell.reveal())],
            MineCell::Empty => self.flood_fill(position, grid),
        };
        log::debug!("Click at {} revealed {} cells", position, revealed.len());

        let revealed_total = usize::from(grid.revealed_count()) + revealed.len();
        Ok(if revealed_total == usize::from(grid.safe_cell_count()) {
            MinefieldEvent::GameCompleted(revealed)
        } else {
            MinefieldEvent::CellsUpdated(revealed)
        })
    }

    /// Reveals every unrevealed cell, flags included, grouped by content. The
    /// clicked mine leads the mine list, the rest follow in row-major order.
    fn detonate(&self, clicked: Position, grid: &Grid) -> MinefieldEvent {
        let mut revealed_empty_cells = Vec::new();
        let mut revealed_numbered_cells = Vec::new();
        let mut revealed_mine_cells = vec![(clicked, RawCell::Revealed(MineCell::Mine))];

        for (position, cell) in grid.iter() {
            let RawCell::Unrevealed(cell) = cell else {
                continue;
            };
            if position == clicked {
                continue;
            }
            let change = (position, cell.reveal());
            match cell.content() {
                MineCell::Empty => revealed_empty_cells.push(change),
                MineCell::Numbered(_) => revealed_numbered_cells.push(change),
                MineCell::Mine => revealed_mine_cells.push(change),
            }
        }
        log::debug!(
            "Mine hit at {}, revealing {} empty, {} numbered and {} mine cells",
            clicked,
            revealed_empty_cells.len(),
            revealed_numbered_cells.len(),
            revealed_mine_cells.len()
        );

        MinefieldEvent::GameOver {
            revealed_empty_cells,
            revealed_numbered_cells,
            revealed_mine_cells,
        }
    }

    /// Breadth-first reveal from an empty cell. Empty cells spread to their
    /// unrevealed neighbors, numbered cells are revealed but stop the spread.
    fn flood_fill(&self, start: Position, grid: &Grid) -> CellChanges {
        let mut revealed = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(position) = to_visit.pop_front() {
            let Some(RawCell::Unrevealed(cell)) = grid.get_or_null(position) else {
                continue;
            };

            let content = cell.content();
            if content.is_mine() {
                continue;
            }
            revealed.push((position, cell.reveal()));
            log::trace!("Flood revealed {} as {:?}", position, content);

            if content == MineCell::Empty {
                for neighbor in grid.iter_neighbors(position) {
                    let unrevealed = grid
                        .get_or_null(neighbor)
                        .is_some_and(|cell| !cell.is_revealed());
                    if unrevealed && visited.insert(neighbor) {
                        to_visit.push_back(neighbor);
                    }
                }
            }
        }

        revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLLER: MinefieldController = MinefieldController::new();

    fn grid(size: GridSize, mines: &[Position]) -> Grid {
        Grid::from_mine_positions(size, mines).unwrap()
    }

    fn apply(grid: Grid, event: &MinefieldEvent) -> Grid {
        grid.with_cells(event.changes().copied()).unwrap()
    }

    fn click(position: Position, grid: &Grid) -> MinefieldEvent {
        CONTROLLER
            .on_action(MinefieldAction::CellClicked(position), grid)
            .unwrap()
    }

    fn toggle(position: Position, grid: &Grid) -> MinefieldEvent {
        CONTROLLER
            .on_action(MinefieldAction::CellFlagToggled(position), grid)
            .unwrap()
    }

    fn positions(cells: &CellChanges) -> Vec<Position> {
        cells.iter().map(|&(position, _)| position).collect()
    }

    #[test]
    fn clicking_numbered_cell_reveals_only_it() {
        let grid = grid(GridSize::square(3), &[Position::new(0, 0)]);

        let event = click(Position::new(1, 1), &grid);

        assert_eq!(
            event,
            MinefieldEvent::CellsUpdated(vec![(Position::new(1, 1), RawCell::Revealed(MineCell::Numbered(1)))])
        );
    }

    #[test]
    fn clicking_empty_cell_floods_and_completes() {
        let grid = grid(GridSize::square(3), &[Position::new(0, 0)]);

        let event = click(Position::new(2, 2), &grid);

        let MinefieldEvent::GameCompleted(cells) = &event else {
            panic!("expected completion, got {event:?}");
        };
        assert_eq!(cells.len(), 8);
        assert!(!positions(cells).contains(&Position::new(0, 0)));
        assert!(apply(grid, &event).is_cleared());
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        // mine in the middle column separates the left and right halves
        let mines = [Position::new(0, 2), Position::new(1, 2), Position::new(2, 2), Position::new(3, 2)];
        let grid = grid(GridSize::new(4, 5), &mines);

        let event = click(Position::new(0, 0), &grid);

        let MinefieldEvent::CellsUpdated(cells) = &event else {
            panic!("expected update, got {event:?}");
        };
        let mut revealed = positions(cells);
        revealed.sort();
        let mut expected: Vec<_> = (0..4)
            .flat_map(|row| [Position::new(row, 0), Position::new(row, 1)])
            .collect();
        expected.sort();
        assert_eq!(revealed, expected);
        assert!(cells.iter().all(|(_, cell)| !cell.content().is_mine()));
    }

    #[test]
    fn flood_fill_emits_shared_border_cell_once() {
        // (3, 3) borders the zero region from several directions
        let grid = grid(GridSize::square(5), &[Position::new(4, 4)]);

        let event = click(Position::new(0, 0), &grid);

        let cells: Vec<_> = event.changes().map(|&(position, _)| position).collect();
        let unique: HashSet<_> = cells.iter().copied().collect();
        assert_eq!(cells.len(), unique.len());
        assert_eq!(cells.iter().filter(|&&p| p == Position::new(3, 3)).count(), 1);
        assert_eq!(cells.len(), 24);
        assert!(matches!(event, MinefieldEvent::GameCompleted(_)));
    }

    #[test]
    fn flood_fill_skips_already_revealed_cells() {
        let grid = grid(GridSize::square(5), &[Position::new(4, 4)]);
        let first = click(Position::new(3, 4), &grid);
        let grid = apply(grid, &first);

        let event = click(Position::new(0, 0), &grid);

        assert!(!positions(&match event {
            MinefieldEvent::CellsUpdated(cells) | MinefieldEvent::GameCompleted(cells) => cells,
            other => panic!("unexpected {other:?}"),
        })
        .contains(&Position::new(3, 4)));
    }

    #[test]
    fn flood_fill_reveals_flagged_safe_cells() {
        let grid = grid(GridSize::square(4), &[Position::new(3, 3)]);
        let grid = apply(grid.clone(), &toggle(Position::new(0, 3), &grid));

        let event = click(Position::new(0, 0), &grid);

        assert!(event
            .changes()
            .any(|&(position, cell)| position == Position::new(0, 3) && cell.is_revealed()));
    }

    #[test]
    fn clicking_mine_reveals_everything_partitioned() {
        let grid = grid(GridSize::square(3), &[Position::new(0, 0)]);
        let grid = apply(grid.clone(), &toggle(Position::new(2, 2), &grid));

        let event = click(Position::new(0, 0), &grid);

        let MinefieldEvent::GameOver {
            revealed_empty_cells,
            revealed_numbered_cells,
            revealed_mine_cells,
        } = &event
        else {
            panic!("expected game over, got {event:?}");
        };
        assert_eq!(
            positions(revealed_mine_cells),
            vec![Position::new(0, 0)]
        );
        assert_eq!(
            positions(revealed_numbered_cells),
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
        );
        assert_eq!(
            positions(revealed_empty_cells),
            vec![
                Position::new(0, 2),
                Position::new(1, 2),
                Position::new(2, 0),
                Position::new(2, 1),
                Position::new(2, 2),
            ]
        );

        let grid = apply(grid, &event);
        assert!(grid.iter().all(|(_, cell)| cell.is_revealed()));
    }

    #[test]
    fn clicked_mine_leads_mine_list() {
        let mines = [Position::new(0, 0), Position::new(2, 2)];
        let grid = grid(GridSize::square(3), &mines);

        let event = click(Position::new(2, 2), &grid);

        let MinefieldEvent::GameOver { revealed_mine_cells, .. } = event else {
            panic!("expected game over");
        };
        assert_eq!(
            positions(&revealed_mine_cells),
            vec![Position::new(2, 2), Position::new(0, 0)]
        );
    }

    #[test]
    fn game_over_is_deterministic() {
        let grid = RandomGridGenerator::seeded(3)
            .generate(GridSize::square(9), Position::new(4, 4), 10)
            .unwrap();
        let (mine, _) = grid.iter().find(|(_, cell)| cell.content().is_mine()).unwrap();

        assert_eq!(click(mine, &grid), click(mine, &grid));
    }

    #[test]
    fn flagged_and_revealed_cells_are_not_clickable() {
        let grid = grid(GridSize::square(3), &[Position::new(0, 0)]);
        let flagged = apply(grid.clone(), &toggle(Position::new(0, 0), &grid));

        assert!(click(Position::new(0, 0), &flagged).is_no_change());

        let revealed = apply(grid.clone(), &click(Position::new(1, 1), &grid));
        assert!(click(Position::new(1, 1), &revealed).is_no_change());
        assert!(toggle(Position::new(1, 1), &revealed).is_no_change());
    }

    #[test]
    fn toggling_flag_twice_restores_cell() {
        let grid = grid(GridSize::square(3), &[Position::new(0, 0)]);
        let original = grid.get(Position::new(2, 0)).unwrap();

        let once = apply(grid.clone(), &toggle(Position::new(2, 0), &grid));
        assert!(once.get(Position::new(2, 0)).unwrap().is_flagged());

        let twice = apply(once.clone(), &toggle(Position::new(2, 0), &once));
        assert_eq!(twice.get(Position::new(2, 0)).unwrap(), original);
    }

    #[test]
    fn last_numbered_cell_completes_round() {
        let grid = grid(GridSize::new(1, 2), &[Position::new(0, 0)]);

        let event = click(Position::new(0, 1), &grid);

        assert_eq!(
            event,
            MinefieldEvent::GameCompleted(vec![(Position::new(0, 1), RawCell::Revealed(MineCell::Numbered(1)))])
        );
    }

    #[test]
    fn completion_only_when_every_safe_cell_revealed() {
        for seed in 0..32 {
            let mut grid = RandomGridGenerator::seeded(seed)
                .generate(GridSize::new(6, 7), Position::new(0, 0), 8)
                .unwrap();
            let safe: Vec<_> = grid
                .iter()
                .filter(|(_, cell)| !cell.content().is_mine())
                .map(|(position, _)| position)
                .collect();

            for position in safe {
                if grid.get(position).unwrap().is_revealed() {
                    continue;
                }
                let before: Vec<_> = grid.iter().collect();
                let event = click(position, &grid);
                grid = apply(grid, &event);

                // revealed cells stay revealed
                for (position, cell) in before {
                    if cell.is_revealed() {
                        assert_eq!(grid.get(position).unwrap(), cell);
                    }
                }
                assert_eq!(
                    matches!(event, MinefieldEvent::GameCompleted(_)),
                    grid.revealed_count() == grid.safe_cell_count()
                );
            }
            assert!(grid.is_cleared());
        }
    }

    #[test]
    fn out_of_bounds_action_fails() {
        let grid = grid(GridSize::square(3), &[Position::new(0, 0)]);

        let result = CONTROLLER.on_action(MinefieldAction::CellClicked(Position::new(5, 5)), &grid);

        assert!(matches!(result, Err(GameError::OutOfBounds { .. })));
    }
}
