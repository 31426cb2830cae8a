//! Step/reset/observe adapter for external training loops.
//!
//! Actions are indices in the engine's clockwise encoding (0 = up, 1 = right,
//! 2 = down, 3 = left). Observations are the 16 tile values, row-major.

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::engine::{EngineError, Move, Score, Tile, CELLS};
use crate::game::{Game, GameConfig};

pub const ACTION_SPACE_SIZE: usize = 4;
pub const OBSERVATION_SIZE: usize = CELLS;

pub type Observation = [Tile; OBSERVATION_SIZE];

/// Generic environment interface for RL.
pub trait Environment {
    type Observation;
    type Action;

    /// Start a fresh episode and return its first observation.
    fn reset(&mut self) -> Self::Observation;

    /// Apply `action` and advance the environment by one step.
    fn step(&mut self, action: Self::Action) -> Result<EnvStep<Self::Observation>, EnvError>;
}

/// Diagnostics returned alongside each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub illegal_move: bool,
    pub score: Score,
    pub highest_tile: Tile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvStep<O> {
    pub observation: O,
    /// Score earned by the move; 0 for an illegal move.
    pub reward: Score,
    /// Set after an illegal move or when the post-spawn board is terminal.
    pub done: bool,
    pub info: StepInfo,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("action {0} outside 0..=3")]
    InvalidAction(u8),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// 2048 as an RL environment.
#[derive(Debug, Clone)]
pub struct Game2048Env<R = StdRng> {
    game: Game<R>,
}

impl Game2048Env<StdRng> {
    pub fn seeded(seed: u64) -> Self { Self::new(StdRng::seed_from_u64(seed)) }
}

impl<R: Rng> Game2048Env<R> {
    pub fn new(rng: R) -> Self { Self { game: Game::new(rng) } }

    pub fn with_config(rng: R, config: GameConfig) -> Self { Self { game: Game::with_config(rng, config) } }

    /// Move, then spawn a tile if the move was legal.
    pub fn step_move(&mut self, dir: Move) -> Result<EnvStep<Observation>, EnvError> {
        let (reward, done, illegal_move) = match self.game.make_move(dir) {
            Ok(reward) => {
                self.game.spawn_tile()?;
                (reward, self.game.is_terminal(), false)
            }
            Err(EngineError::IllegalMove(_)) => {
                debug!("illegal move, done");
                (0, true, true)
            }
            Err(e) => return Err(e.into()),
        };
        Ok(EnvStep {
            observation: self.observation(),
            reward,
            done,
            info: StepInfo { illegal_move, score: self.game.score(), highest_tile: self.game.highest_tile() },
        })
    }
}

impl<R> Game2048Env<R> {
    pub fn observation(&self) -> Observation { self.game.board().to_flat() }

    pub fn game(&self) -> &Game<R> { &self.game }

    pub fn game_mut(&mut self) -> &mut Game<R> { &mut self.game }

    /// Human-readable summary: score, highest tile and the grid.
    pub fn render(&self) -> String {
        format!("Score: {}\nHighest: {}\n{}", self.game.score(), self.game.highest_tile(), self.game.board())
    }
}

impl<R: Rng> Environment for Game2048Env<R> {
    type Observation = Observation;
    type Action = u8;

    fn reset(&mut self) -> Observation {
        self.game.reset();
        self.observation()
    }

    fn step(&mut self, action: u8) -> Result<EnvStep<Observation>, EnvError> {
        let dir = Move::from_index(action).ok_or(EnvError::InvalidAction(action))?;
        debug!("action {action}");
        self.step_move(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;

    fn env_with(rows: [[Tile; 4]; 4]) -> Game2048Env {
        let mut env = Game2048Env::seeded(0);
        env.game_mut().set_board(Board::from_rows(rows).unwrap());
        env
    }

    #[test]
    fn reset_returns_two_tile_observation() {
        let mut env = Game2048Env::seeded(8);
        let obs = env.reset();
        assert_eq!(obs.iter().filter(|&&v| v != 0).count(), 2);
        assert_eq!(obs, env.observation());
        assert_eq!(env.game().score(), 0);
    }

    #[test]
    fn legal_step_rewards_and_spawns() {
        let mut env = env_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let step = env.step(3).unwrap();
        assert_eq!(step.reward, 4);
        assert!(!step.done);
        assert!(!step.info.illegal_move);
        assert_eq!(step.info.score, 4);
        assert_eq!(step.observation[0], 4);
        assert_eq!(step.observation.iter().filter(|&&v| v != 0).count(), 2);
    }

    #[test]
    fn illegal_step_is_done_with_zero_reward() {
        let mut env = env_with([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]);
        let before = env.observation();
        let step = env.step(0).unwrap();
        assert_eq!(step.reward, 0);
        assert!(step.done);
        assert!(step.info.illegal_move);
        assert_eq!(step.observation, before);
    }

    #[test]
    fn out_of_range_action_rejected() {
        let mut env = Game2048Env::seeded(0);
        assert_eq!(env.step(4), Err(EnvError::InvalidAction(4)));
    }

    #[test]
    fn step_into_terminal_board_is_done() {
        // Whether the spawn leaves a move depends on the RNG; `done` must agree with the engine.
        let mut env = env_with([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [8, 16, 4, 4]]);
        let step = env.step(1).unwrap();
        assert_eq!(step.reward, 8);
        assert_eq!(step.done, env.game().is_terminal());
    }

    #[test]
    fn render_mentions_score_and_highest() {
        let env = env_with([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 64]]);
        let s = env.render();
        assert!(s.starts_with("Score: 0\nHighest: 64\n"));
        assert!(s.contains("64"));
    }
}
