//! gym-2048: a deterministic 2048 engine + symmetry-augmented training data
//!
//! This crate provides:
//! - A `Copy` 4x4 `Board` with the exact slide/merge rules (`engine` module)
//! - `Game`, one episode with its score and an injected RNG (`game` module)
//! - The 8 board symmetries with consistent action relabeling (`symmetry` module)
//! - `TrainingData`, an ordered (board, action[, reward]) dataset (`dataset` module)
//! - A step/reset/observe adapter for RL loops (`env` module)
//!
//! Actions use a clockwise encoding: 0 = up, 1 = right, 2 = down, 3 = left.
//!
//! Quick start:
//! ```
//! use gym_2048::dataset::TrainingData;
//! use gym_2048::engine::Move;
//! use gym_2048::game::Game;
//!
//! // Deterministic episode with a seeded RNG
//! let mut game = Game::seeded(42);
//! let mut data = TrainingData::new();
//!
//! // Record a few transitions
//! for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
//!     let before = game.board();
//!     if let Ok(reward) = game.make_move(dir) {
//!         data.add(before, dir, Some(reward)).unwrap();
//!         game.spawn_tile().unwrap();
//!     }
//!     if game.is_terminal() { break; }
//! }
//!
//! // 8 symmetric copies of every sample
//! let n = data.len();
//! data.augment();
//! assert_eq!(data.len(), 8 * n);
//! ```
//!
//! Episodes are independent: run one `Game` (and one `TrainingData` fragment)
//! per thread and combine fragments with `TrainingData::merge_all` once every
//! worker has finished.
//!
pub mod dataset;
pub mod engine;
pub mod env;
pub mod game;
pub mod symmetry;
