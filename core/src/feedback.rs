use serde::{Deserialize, Serialize};

use crate::*;

/// Feedback a presentation layer plays for a single cell update.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellFeedback {
    /// A numbered cell was revealed by the player.
    Pop,
    /// A flag was placed.
    Affirmative,
    /// A flag was removed.
    Cancel,
    /// A mine was revealed.
    Detonation,
    Silent,
}

impl CellFeedback {
    /// Mines go off in every stage. Everything else only makes noise while the
    /// player is acting, end-of-round disclosure is silent.
    pub fn for_update(update: &CellUpdate) -> Self {
        use CellFeedback::*;
        use UnrevealedCell::*;

        if update.new == RawCell::Revealed(MineCell::Mine) {
            return Detonation;
        }
        if update.stage != BatchStage::CellsUpdated {
            return Silent;
        }

        match (update.old, update.new) {
            (_, RawCell::Revealed(MineCell::Numbered(_))) => Pop,
            (_, RawCell::Revealed(_)) => Silent,
            (RawCell::Unrevealed(UnFlagged(_)), RawCell::Unrevealed(Flagged(_))) => Affirmative,
            (RawCell::Unrevealed(Flagged(_)), RawCell::Unrevealed(UnFlagged(_))) => Cancel,
            (_, RawCell::Unrevealed(_)) => Silent,
        }
    }
}

/// Round-level cue, played once when a round ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundCue {
    Success,
    Failure,
}

impl RoundCue {
    /// Cue for moving from `previous` to `current`, if the round just ended.
    pub fn for_transition(previous: GameState, current: GameState) -> Option<Self> {
        if previous.is_ended() {
            return None;
        }
        match current {
            GameState::Ended(EndedState::GameCompleted { .. }) => Some(Self::Success),
            GameState::Ended(EndedState::GameOver { .. }) => Some(Self::Failure),
            GameState::Idle | GameState::Started { .. } => None,
        }
    }
}
