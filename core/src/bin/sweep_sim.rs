//! Plays one round in the terminal with a simple deducing player.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use sweepflow_core::*;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DifficultyArg {
    Beginner,
    Intermediate,
    Expert,
}

impl From<DifficultyArg> for Difficulty {
    fn from(other: DifficultyArg) -> Self {
        match other {
            DifficultyArg::Beginner => Difficulty::Beginner,
            DifficultyArg::Intermediate => Difficulty::Intermediate,
            DifficultyArg::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Preset to start from, individual options override it
    #[arg(short, long, value_enum, default_value_t = DifficultyArg::Beginner)]
    difficulty: DifficultyArg,

    #[arg(long)]
    rows: Option<Coord>,

    #[arg(long)]
    columns: Option<Coord>,

    #[arg(long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Delay after every applied cell
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        let preset = Difficulty::from(self.difficulty).config();
        let size = GridSize::new(
            self.rows.unwrap_or(preset.size.rows),
            self.columns.unwrap_or(preset.size.columns),
        );
        GameConfig::new(size, self.mines.unwrap_or(preset.mines))
    }
}

/// Picks a move that follows from the revealed numbers, if there is one.
fn deduce(grid: &Grid) -> Option<MinefieldAction> {
    for (position, cell) in grid.iter() {
        let RawCell::Revealed(MineCell::Numbered(count)) = cell else {
            continue;
        };

        let mut hidden = Vec::new();
        let mut flagged = 0;
        for neighbor in grid.iter_neighbors(position) {
            match grid.get_or_null(neighbor) {
                Some(RawCell::Unrevealed(UnrevealedCell::UnFlagged(_))) => hidden.push(neighbor),
                Some(RawCell::Unrevealed(UnrevealedCell::Flagged(_))) => flagged += 1,
                Some(RawCell::Revealed(_)) | None => {}
            }
        }

        let Some(&target) = hidden.first() else {
            continue;
        };
        if usize::from(count) == flagged {
            return Some(MinefieldAction::CellClicked(target));
        }
        if usize::from(count) == flagged + hidden.len() {
            return Some(MinefieldAction::CellFlagToggled(target));
        }
    }
    None
}

fn guess(grid: &Grid, rng: &mut SmallRng) -> Option<MinefieldAction> {
    let hidden: Vec<_> = grid
        .iter()
        .filter(|(_, cell)| matches!(cell, RawCell::Unrevealed(UnrevealedCell::UnFlagged(_))))
        .map(|(position, _)| position)
        .collect();
    if hidden.is_empty() {
        return None;
    }
    let position = hidden[rng.random_range(0..hidden.len())];
    log::info!("Guessing {}", position);
    Some(MinefieldAction::CellClicked(position))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    TermLogger::init(
        args.verbose.log_level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let config = args.game_config();
    log::info!("Playing {} with {} mines", config.size, config.mines);

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let sequencer = ActionSequencer::new(config, RandomGridGenerator::seeded(seed));
    let mut rng = SmallRng::seed_from_u64(seed);

    let pace = Duration::from_millis(args.pace_ms);
    let mut hook = move |update: CellUpdate| async move {
        match CellFeedback::for_update(&update) {
            CellFeedback::Silent => {}
            feedback => log::debug!("{:?} at {}", feedback, update.position),
        }
        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    };

    let start = Position::new(config.size.rows / 2, config.size.columns / 2);
    let mut next = Some(MinefieldAction::CellClicked(start));
    while let Some(action) = next {
        let previous = sequencer.status().state;
        sequencer.handle_action(action, &mut hook).await?;

        let status = sequencer.status();
        if let Some(cue) = RoundCue::for_transition(previous, status.state) {
            log::info!("{:?} after {}s", cue, status.state.elapsed_secs(chrono::Utc::now()));
        }
        if status.state.is_ended() {
            break;
        }

        let grid = sequencer.grid();
        next = deduce(&grid).or_else(|| guess(&grid, &mut rng));
    }

    let status = sequencer.status();
    print!("{}", sequencer.grid());
    println!(
        "{:?}, {} of {} mines flagged",
        status.state, status.progress.flagged_cells, status.progress.total_mines
    );
    Ok(())
}
