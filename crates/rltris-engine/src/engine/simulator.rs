use rand::Rng as _;
use rand_pcg::Pcg32;
use tracing::debug;

use crate::core::{
    board::Board,
    piece::{ActivePiece, PieceKind},
};

use super::{
    episode_stats::EpisodeStats,
    placement::{self, Action, ILLEGAL_ACTION_REWARD, NextStates},
    seed::Seed,
};

/// Result of a [`Simulator::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub terminal: bool,
    pub lines_cleared: usize,
}

/// Episode state of the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EpisodeState {
    Playing,
    /// A piece topped out or an illegal action was played. Only
    /// [`Simulator::reset`] leaves this state.
    Terminal,
}

/// Single-player environment: one board, one active piece, one episode at a time.
///
/// The simulator exclusively owns its board. Pieces are drawn uniformly at
/// random from the seven shapes using a generator seeded by [`Seed`].
#[derive(Debug, Clone)]
pub struct Simulator {
    board: Board,
    active_piece: ActivePiece,
    stats: EpisodeStats,
    state: EpisodeState,
    rng: Pcg32,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Creates a simulator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece draws.
    #[must_use]
    pub fn with_seed(seed: Seed) -> Self {
        let mut rng = seed.rng();
        let active_piece = ActivePiece::new(rng.random());
        Self {
            board: Board::EMPTY,
            active_piece,
            stats: EpisodeStats::new(),
            state: EpisodeState::Playing,
            rng,
        }
    }

    /// Starts a new episode: empty board, zero score and a fresh random piece.
    pub fn reset(&mut self) -> &Board {
        self.board = Board::EMPTY;
        self.stats = EpisodeStats::new();
        self.state = EpisodeState::Playing;
        self.draw_piece();
        &self.board
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> ActivePiece {
        self.active_piece
    }

    /// Replaces the active piece, for scripted scenarios.
    pub fn set_active_piece(&mut self, kind: PieceKind) {
        self.active_piece = ActivePiece::new(kind);
    }

    #[must_use]
    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Accumulated reward of the current episode.
    #[must_use]
    pub fn score(&self) -> f32 {
        self.stats.score()
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Enumerates every legal placement of the active piece on the current board.
    ///
    /// An empty result means the active piece has nowhere to go, which callers
    /// treat as the natural end of the episode.
    #[must_use]
    pub fn enumerate_next_states(&self) -> NextStates {
        placement::enumerate_next_states(&self.board, self.active_piece)
    }

    /// Plays `action` with the active piece.
    ///
    /// A legal action adopts the enumerated outcome, adds its reward to the
    /// score and draws the next piece. An action that is not currently legal,
    /// or any action after the episode ended, forces the terminal state with a
    /// fixed penalty and leaves the board and piece untouched.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        let outcome = if self.state.is_playing() {
            self.enumerate_next_states().take(action)
        } else {
            None
        };

        let Some(outcome) = outcome else {
            debug!(?action, piece = ?self.active_piece.kind(), "illegal action");
            self.state = EpisodeState::Terminal;
            return StepOutcome {
                reward: ILLEGAL_ACTION_REWARD,
                terminal: true,
                lines_cleared: 0,
            };
        };

        self.board = outcome.board;
        self.stats
            .complete_placement(outcome.lines_cleared, outcome.reward);
        if outcome.terminal {
            self.state = EpisodeState::Terminal;
        }
        self.draw_piece();

        StepOutcome {
            reward: outcome.reward,
            terminal: outcome.terminal,
            lines_cleared: outcome.lines_cleared,
        }
    }

    fn draw_piece(&mut self) {
        self.active_piece = ActivePiece::new(self.rng.random());
    }
}
