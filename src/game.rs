//! A single 2048 episode: the live board, its running score and the RNG that
//! drives tile spawns.
//!
//! `Game` is the stateful wrapper around the pure [`Board`] operations. Every
//! mutation is all-or-nothing: an illegal move, a merge or score past `u64`,
//! or a spawn on a full board returns an error and leaves board and score
//! untouched. Trial evaluation (`trial_move`, `is_terminal`, `legal_moves`)
//! runs on copies of the board.
//!
//! ```
//! use gym_2048::engine::Move;
//! use gym_2048::game::Game;
//!
//! let mut game = Game::seeded(42);
//! assert_eq!(game.board().count_empty(), 14);
//! for dir in Move::ALL {
//!     if game.make_move(dir).is_ok() {
//!         game.spawn_tile().unwrap();
//!         break;
//!     }
//! }
//! ```

use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::engine::{Board, EngineError, Move, Score, Spawn, Tile, CELLS};

/// Spawn parameters. Defaults match the classic game.
///
/// - `four_probability`: chance that a spawned tile is a 4 rather than a 2.
/// - `initial_tiles`: tiles placed by `reset` (capped at the number of cells).
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub four_probability: f64,
    pub initial_tiles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { four_probability: 0.2, initial_tiles: 2 }
    }
}

/// One episode of 2048 with an owned, injectable random source.
#[derive(Debug, Clone)]
pub struct Game<R = StdRng> {
    board: Board,
    score: Score,
    rng: R,
    config: GameConfig,
}

impl Game<StdRng> {
    /// A freshly reset game driven by `StdRng::seed_from_u64(seed)`.
    pub fn seeded(seed: u64) -> Self { Self::new(StdRng::seed_from_u64(seed)) }
}

impl<R: Rng> Game<R> {
    /// A freshly reset game with the default configuration.
    pub fn new(rng: R) -> Self { Self::with_config(rng, GameConfig::default()) }

    /// A freshly reset game with a custom configuration.
    pub fn with_config(rng: R, config: GameConfig) -> Self {
        let mut game = Self { board: Board::EMPTY, score: 0, rng, config };
        game.reset();
        game
    }

    /// Clear the board, zero the score and spawn the initial tiles.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        debug!("adding tiles");
        for _ in 0..self.config.initial_tiles.min(CELLS) {
            if self.spawn_tile().is_err() {
                break;
            }
        }
    }

    /// Place a 2 (or, rarely, a 4) into a uniformly chosen empty cell.
    ///
    /// Fails with `NoEmptyCell` on a full board; only call after a legal move.
    pub fn spawn_tile(&mut self) -> Result<Spawn, EngineError> {
        let (board, spawn) = self.board.with_random_tile(&mut self.rng, self.config.four_probability)?;
        debug!("adding {} at ({}, {})", spawn.value, spawn.row, spawn.col);
        self.board = board;
        Ok(spawn)
    }

    /// Slide/merge toward `dir`, commit the result and return the score earned.
    pub fn make_move(&mut self, dir: Move) -> Result<Score, EngineError> {
        match self.board.try_shift(dir) {
            Ok((board, delta)) => {
                self.score = self.score.checked_add(delta).ok_or(EngineError::ScoreOverflow)?;
                debug!("{dir:?} for {delta}");
                self.board = board;
                Ok(delta)
            }
            Err(e) => {
                debug!("{dir:?} rejected: {e}");
                Err(e)
            }
        }
    }

    /// Score `dir` would earn, without touching the board or score.
    pub fn trial_move(&self, dir: Move) -> Result<Score, EngineError> {
        self.board.try_shift(dir).map(|(_, score)| score)
    }
}

impl<R> Game<R> {
    /// Directions that would change the board, in index order.
    pub fn legal_moves(&self) -> Vec<Move> { self.board.legal_moves() }

    /// True when no direction is legal.
    pub fn is_terminal(&self) -> bool {
        let legal = self.legal_moves().len();
        trace!("legal moves {legal}");
        legal == 0
    }

    #[inline]
    pub fn board(&self) -> Board { self.board }

    /// Replace the board (test seam). Score is left as is.
    pub fn set_board(&mut self, board: Board) { self.board = board; }

    /// Replace the board from 16 row-major cells; nothing is written on error.
    pub fn set_board_flat(&mut self, cells: &[Tile]) -> Result<(), EngineError> {
        self.board = Board::from_flat(cells)?;
        Ok(())
    }

    #[inline]
    pub fn score(&self) -> Score { self.score }

    pub fn highest_tile(&self) -> Tile { self.board.highest_tile() }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> { self.board.empty_cells() }

    pub fn config(&self) -> &GameConfig { &self.config }
}
