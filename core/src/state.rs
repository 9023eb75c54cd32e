use core::future::Future;

use serde::{Deserialize, Serialize};

use crate::*;

/// One cell replacement as seen by a [`CellUpdateHook`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub stage: BatchStage,
    pub position: Position,
    pub old: RawCell,
    pub new: RawCell,
}

/// Side effect awaited after every applied cell, before the next one is
/// written. Used to pace animations and play feedback.
pub trait CellUpdateHook {
    fn on_cell_updated(&mut self, update: CellUpdate) -> impl Future<Output = ()>;
}

impl<F, Fut> CellUpdateHook for F
where
    F: FnMut(CellUpdate) -> Fut,
    Fut: Future<Output = ()>,
{
    fn on_cell_updated(&mut self, update: CellUpdate) -> impl Future<Output = ()> {
        self(update)
    }
}

/// Hook that returns immediately.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHook;

impl CellUpdateHook for NoHook {
    async fn on_cell_updated(&mut self, _update: CellUpdate) {}
}

/// Mutable holder of the current grid snapshot of a round.
#[derive(Debug)]
pub struct StatefulGrid {
    grid: Grid,
    watch: Watch<Grid>,
}

impl StatefulGrid {
    pub fn new(grid: Grid) -> Self {
        let watch = Watch::new(grid.clone());
        Self { grid, watch }
    }

    pub fn current_grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.grid.total_mines()
    }

    /// Observes every snapshot this holder publishes.
    pub fn watch(&self) -> Watch<Grid> {
        self.watch.clone()
    }

    /// Installs a whole new grid at once, publishing a single snapshot.
    pub fn replace(&mut self, grid: Grid) {
        self.grid = grid;
        self.watch.publish(self.grid.clone());
    }

    /// Applies `cells` in order. Each cell is written and published, then
    /// `hook` runs to completion before the next cell is touched. Dropping the
    /// returned future skips whatever is left of the batch.
    pub async fn update_cells_with<H: CellUpdateHook>(
        &mut self,
        stage: BatchStage,
        cells: &[(Position, RawCell)],
        hook: &mut H,
    ) -> Result<()> {
        for &(position, new) in cells {
            let old = self.grid.replace_cell(position, new)?;
            debug_assert!(
                !old.is_revealed() || new.is_revealed(),
                "revealed cell at {position} cannot be hidden again"
            );
            log::trace!("{:?} {} {:?} -> {:?}", stage, position, old, new);
            self.watch.publish(self.grid.clone());

            hook.on_cell_updated(CellUpdate {
                stage,
                position,
                old,
                new,
            })
            .await;
        }
        Ok(())
    }
}
