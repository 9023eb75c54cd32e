use chrono::prelude::*;
use chrono::TimeDelta;
use futures_util::lock::Mutex;
use serde::{Deserialize, Serialize};

use crate::*;

/// How a round ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndedState {
    GameOver {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
    GameCompleted {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
}

impl EndedState {
    pub fn started_at(self) -> DateTime<Utc> {
        match self {
            Self::GameOver { started_at, .. } | Self::GameCompleted { started_at, .. } => started_at,
        }
    }

    pub fn ended_at(self) -> DateTime<Utc> {
        match self {
            Self::GameOver { ended_at, .. } | Self::GameCompleted { ended_at, .. } => ended_at,
        }
    }
}

/// Valid transitions:
/// - Idle -> Started
/// - Started -> Ended(GameOver)
/// - Started -> Ended(GameCompleted)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// No mines placed yet, waiting for the first click
    Idle,
    Started { started_at: DateTime<Utc> },
    Ended(EndedState),
}

impl GameState {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn is_started(self) -> bool {
        matches!(self, Self::Started { .. })
    }

    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended(_))
    }

    pub fn started_at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Idle => None,
            Self::Started { started_at } => Some(started_at),
            Self::Ended(ended) => Some(ended.started_at()),
        }
    }

    /// Time spent in the round, frozen once it ends.
    pub fn elapsed(self, now: DateTime<Utc>) -> TimeDelta {
        match self {
            Self::Idle => TimeDelta::zero(),
            Self::Started { started_at } => now - started_at,
            Self::Ended(ended) => ended.ended_at() - ended.started_at(),
        }
    }

    /// How many seconds have passed since the round started, 0 if it hasn't
    pub fn elapsed_secs(self, now: DateTime<Utc>) -> u32 {
        self.elapsed(now).num_seconds().max(0) as u32
    }

    fn start(self, now: DateTime<Utc>) -> Self {
        match self {
            Self::Idle => Self::Started { started_at: now },
            other => other,
        }
    }

    /// State after `event` was applied.
    ///
    /// # Panics
    ///
    /// When a `GameCompleted` event arrives outside of a started round.
    pub fn on_event(self, event: &MinefieldEvent, now: DateTime<Utc>) -> Self {
        use GameState::*;
        match (self, event) {
            (Idle | Ended(_), MinefieldEvent::GameCompleted(_)) => {
                panic!("Game cannot complete without being in started state, was {self:?}")
            }
            (Ended(_), _) => self,
            (Idle, MinefieldEvent::CellsUpdated(_)) => Started { started_at: now },
            (Started { .. }, MinefieldEvent::CellsUpdated(_)) => self,
            (Idle, MinefieldEvent::GameOver { .. }) => Ended(EndedState::GameOver {
                started_at: now,
                ended_at: now,
            }),
            (Started { started_at }, MinefieldEvent::GameOver { .. }) => Ended(EndedState::GameOver {
                started_at,
                ended_at: now,
            }),
            (Started { started_at }, MinefieldEvent::GameCompleted(_)) => {
                Ended(EndedState::GameCompleted {
                    started_at,
                    ended_at: now,
                })
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    pub total_mines: CellCount,
    /// Flagged cells, whether or not they hold a mine.
    pub flagged_cells: CellCount,
}

impl GameProgress {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            total_mines: grid.total_mines(),
            flagged_cells: grid.flagged_count(),
        }
    }

    /// How many mines have not been flagged yet, negative when over-flagged
    pub fn mines_left(self) -> isize {
        (self.total_mines as isize) - (self.flagged_cells as isize)
    }
}

/// Round state published after every processed action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStatus {
    pub state: GameState,
    pub progress: GameProgress,
}

struct Round {
    grid: StatefulGrid,
    state: GameState,
}

/// Drives one round: serializes actions, places mines on the first click and
/// applies every event to the round's [`StatefulGrid`].
///
/// Actions run one at a time; a call to [`ActionSequencer::handle_action`]
/// waits for the previous one to finish applying its cells. A new round is a
/// new sequencer.
pub struct ActionSequencer<G = RandomGridGenerator> {
    config: GameConfig,
    generator: G,
    controller: MinefieldController,
    round: Mutex<Round>,
    grid_watch: Watch<Grid>,
    status_watch: Watch<RoundStatus>,
}

impl<G: GridGenerator> ActionSequencer<G> {
    pub fn new(config: GameConfig, generator: G) -> Self {
        let grid = StatefulGrid::new(Grid::placeholder(config.size, config.mines));
        let status = RoundStatus {
            state: GameState::Idle,
            progress: GameProgress::from_grid(grid.current_grid()),
        };
        Self {
            config,
            generator,
            controller: MinefieldController::new(),
            grid_watch: grid.watch(),
            status_watch: Watch::new(status),
            round: Mutex::new(Round {
                grid,
                state: GameState::Idle,
            }),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Latest published grid snapshot.
    pub fn grid(&self) -> Grid {
        self.grid_watch.latest()
    }

    /// Latest published round status.
    pub fn status(&self) -> RoundStatus {
        self.status_watch.latest()
    }

    pub fn grid_watch(&self) -> Watch<Grid> {
        self.grid_watch.clone()
    }

    pub fn status_watch(&self) -> Watch<RoundStatus> {
        self.status_watch.clone()
    }

    /// Whether an action is currently being applied.
    pub fn is_busy(&self) -> bool {
        self.round.try_lock().is_none()
    }

    /// Processes one action to completion, awaiting `hook` after every applied
    /// cell. Returns the applied event, or `None` when the action was ignored
    /// (flagging before the first click, anything after the round ended).
    pub async fn handle_action<H: CellUpdateHook>(
        &self,
        action: MinefieldAction,
        hook: &mut H,
    ) -> Result<Option<MinefieldEvent>> {
        let mut round = self.round.lock().await;
        let round = &mut *round;

        let event = match (round.state, action) {
            (GameState::Ended(_), _) => {
                log::warn!("Ignoring {:?}, round already ended", action);
                return Ok(None);
            }
            (GameState::Idle, MinefieldAction::CellFlagToggled(_)) => {
                log::warn!("Ignoring {:?}, no mines placed yet", action);
                return Ok(None);
            }
            (GameState::Idle, MinefieldAction::CellClicked(position)) => {
                let grid = self
                    .generator
                    .generate(self.config.size, position, self.config.mines)?;
                round.grid.replace(grid);

                let now = Utc::now();
                log::debug!("started at {}", now);
                round.state = round.state.start(now);
                self.controller.on_action(action, round.grid.current_grid())?
            }
            (GameState::Started { .. }, _) => {
                self.controller.on_action(action, round.grid.current_grid())?
            }
        };

        for (stage, cells) in event.batches() {
            round.grid.update_cells_with(stage, cells, hook).await?;
        }

        round.state = round.state.on_event(&event, Utc::now());
        if let GameState::Ended(ended) = round.state {
            log::debug!("ended at {}: {:?}", ended.ended_at(), ended);
        }

        self.status_watch.publish(RoundStatus {
            state: round.state,
            progress: GameProgress::from_grid(round.grid.current_grid()),
        });
        Ok(Some(event))
    }
}
