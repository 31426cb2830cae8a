//! In-memory training data: an ordered list of (board, action[, reward]) samples.
//!
//! Reward presence is dataset-wide: either every sample carries a reward or
//! none does. An empty dataset has no mode yet; the first sample added (or the
//! first non-empty dataset merged in) fixes it. Every mutating operation checks
//! the mode before writing anything, so a failed call leaves the dataset as it
//! was.
//!
//! Typical flow:
//! ```
//! use gym_2048::dataset::TrainingData;
//! use gym_2048::engine::{Board, Move};
//!
//! let board = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let mut td = TrainingData::new();
//! td.add(board, Move::Right, Some(4)).unwrap();
//! assert!(td.add(board, Move::Left, None).is_err());
//! td.augment();
//! assert_eq!(td.len(), 8);
//! assert_eq!(td.rewards(), vec![4; 8]);
//! ```

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Move, Tile, SIZE};
use crate::symmetry::{augmented_variants, Symmetry};

pub type Reward = u64;

/// One recorded observation. Owns a copy of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sample {
    pub board: Board,
    pub action: Move,
    pub reward: Option<Reward>,
}

impl Sample {
    pub fn new(board: Board, action: Move, reward: Option<Reward>) -> Self {
        Self { board, action, reward }
    }

    /// This sample seen through `symmetry`; the reward is unchanged.
    pub fn transformed(self, symmetry: Symmetry) -> Self {
        let (board, action) = symmetry.apply(self.board, self.action);
        Self { board, action, reward: self.reward }
    }
}

/// Whether samples carry a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardMode {
    WithReward,
    WithoutReward,
}

impl RewardMode {
    fn of(reward: Option<Reward>) -> Self {
        if reward.is_some() { RewardMode::WithReward } else { RewardMode::WithoutReward }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("reward mode mismatch: dataset is {expected:?}, got {found:?}")]
    RewardModeMismatch { expected: RewardMode, found: RewardMode },
    #[error("index {index} out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("split fraction {0} outside [0, 1]")]
    InvalidFraction(f64),
}

/// Ordered, index-addressable collection of samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct TrainingData {
    samples: Vec<Sample>,
}

impl TrainingData {
    pub fn new() -> Self { Self::default() }

    /// Fold fragments (e.g. one per episode) into one dataset, in order.
    pub fn merge_all<I: IntoIterator<Item = TrainingData>>(fragments: I) -> Result<Self, DatasetError> {
        let mut out = Self::new();
        for fragment in fragments {
            out.merge_owned(fragment)?;
        }
        Ok(out)
    }

    #[inline]
    pub fn len(&self) -> usize { self.samples.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// `None` while empty.
    pub fn reward_mode(&self) -> Option<RewardMode> { self.samples.first().map(|s| RewardMode::of(s.reward)) }

    fn check_mode(&self, found: RewardMode) -> Result<(), DatasetError> {
        match self.reward_mode() {
            Some(expected) if expected != found => Err(DatasetError::RewardModeMismatch { expected, found }),
            _ => Ok(()),
        }
    }

    /// Append one sample.
    pub fn add(&mut self, board: Board, action: Move, reward: Option<Reward>) -> Result<(), DatasetError> {
        self.check_mode(RewardMode::of(reward))?;
        self.samples.push(Sample::new(board, action, reward));
        Ok(())
    }

    /// Append several boards that share one action and reward.
    pub fn add_batch(&mut self, boards: &[Board], action: Move, reward: Option<Reward>) -> Result<(), DatasetError> {
        self.check_mode(RewardMode::of(reward))?;
        self.samples
            .extend(boards.iter().map(|&board| Sample::new(board, action, reward)));
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        self.samples
            .get(index)
            .copied()
            .ok_or(DatasetError::IndexOutOfRange { index, len: self.len() })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> { self.samples.iter() }

    pub fn samples(&self) -> &[Sample] { &self.samples }

    /// Apply `symmetry` to every sample in place.
    pub fn transform(&mut self, symmetry: Symmetry) {
        for s in &mut self.samples {
            *s = s.transformed(symmetry);
        }
    }

    /// Mirror every board left-right and relabel its action.
    pub fn hflip(&mut self) { self.transform(Symmetry::MIRROR) }

    /// Rotate every board clockwise by `k` quarter turns and relabel its action.
    pub fn rotate(&mut self, k: u8) { self.transform(Symmetry::rotation(k)) }

    /// Replace each sample with its 8 symmetric variants (original first).
    pub fn augment(&mut self) {
        let mut out = Vec::with_capacity(self.samples.len() * 8);
        for s in &self.samples {
            out.extend(
                augmented_variants(s.board, s.action)
                    .into_iter()
                    .map(|(board, action)| Sample::new(board, action, s.reward)),
            );
        }
        debug!("augmented {} samples to {}", self.samples.len(), out.len());
        self.samples = out;
    }

    /// Append a copy of `other`'s samples.
    pub fn merge(&mut self, other: &TrainingData) -> Result<(), DatasetError> {
        if let Some(found) = other.reward_mode() {
            self.check_mode(found)?;
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Like [`TrainingData::merge`], reusing `other`'s allocation when `self` is empty.
    pub fn merge_owned(&mut self, other: TrainingData) -> Result<(), DatasetError> {
        if let Some(found) = other.reward_mode() {
            self.check_mode(found)?;
        }
        if self.samples.is_empty() {
            self.samples = other.samples;
        } else {
            self.samples.extend(other.samples);
        }
        Ok(())
    }

    /// Split into `[0, index)` and `[index, len)`, preserving order.
    pub fn split_at(&self, index: usize) -> Result<(TrainingData, TrainingData), DatasetError> {
        if index > self.len() {
            return Err(DatasetError::IndexOutOfRange { index, len: self.len() });
        }
        let (a, b) = self.samples.split_at(index);
        Ok((Self { samples: a.to_vec() }, Self { samples: b.to_vec() }))
    }

    /// Split after the first `floor(len * fraction)` samples.
    pub fn split(&self, fraction: f64) -> Result<(TrainingData, TrainingData), DatasetError> {
        self.split_at(self.split_index(fraction)?)
    }

    /// Boundary `split(fraction)` would cut at, without copying anything.
    pub fn split_index(&self, fraction: f64) -> Result<usize, DatasetError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(DatasetError::InvalidFraction(fraction));
        }
        Ok((self.len() as f64 * fraction).floor() as usize)
    }

    pub fn split_half(&self) -> (TrainingData, TrainingData) {
        // len / 2 is always in range
        self.split_at(self.len() / 2).unwrap_or_default()
    }

    /// Permute samples in place; each board keeps its action and reward.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) { self.samples.shuffle(rng) }

    /// All boards as an N x 4 x 4 grid.
    pub fn boards(&self) -> Vec<[[Tile; SIZE]; SIZE]> { self.samples.iter().map(|s| s.board.into_rows()).collect() }

    /// All action indices, one per sample.
    pub fn actions(&self) -> Vec<u8> { self.samples.iter().map(|s| s.action.index()).collect() }

    /// All rewards, one per sample; empty when the dataset carries none.
    pub fn rewards(&self) -> Vec<Reward> { self.samples.iter().filter_map(|s| s.reward).collect() }
}

impl TryFrom<Vec<Sample>> for TrainingData {
    type Error = DatasetError;

    fn try_from(samples: Vec<Sample>) -> Result<Self, Self::Error> {
        let mut out = Self::new();
        for s in samples {
            out.add(s.board, s.action, s.reward)?;
        }
        Ok(out)
    }
}

impl From<TrainingData> for Vec<Sample> {
    fn from(td: TrainingData) -> Self { td.samples }
}

impl<'a> IntoIterator for &'a TrainingData {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter { self.samples.iter() }
}
