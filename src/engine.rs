use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the (fixed) square board.
pub const SIZE: usize = 4;
/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;

pub type Tile = u64;
pub type Score = u64;
type Grid = [[Tile; SIZE]; SIZE];

/// A direction to move/merge tiles.
///
/// Discriminants run clockwise from `Up`, so a quarter turn of the board
/// clockwise maps direction `d` to `(d + 1) % 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Move {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Move {
    /// All directions in index order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Action index of this direction (0..=3).
    #[inline]
    pub fn index(self) -> u8 { self as u8 }

    /// Direction for an action index; `None` outside 0..=3.
    #[inline]
    pub fn from_index(idx: u8) -> Option<Move> { Self::ALL.get(idx as usize).copied() }

    /// Unit vector of this direction in (row, col) space; rows grow downwards.
    #[inline]
    pub fn vector(self) -> (i8, i8) {
        match self {
            Move::Up => (-1, 0),
            Move::Right => (0, 1),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
        }
    }

    /// Direction pointing along `v`, if `v` is one of the four unit vectors.
    pub fn from_vector(v: (i8, i8)) -> Option<Move> {
        Self::ALL.into_iter().find(|m| m.vector() == v)
    }

    /// Whether this move slides rows (`Left`/`Right`) or columns (`Up`/`Down`).
    #[inline]
    pub(crate) fn along_rows(self) -> bool { matches!(self, Move::Left | Move::Right) }

    /// Whether tiles travel toward the high-index end of each line.
    #[inline]
    pub(crate) fn toward_tail(self) -> bool { matches!(self, Move::Right | Move::Down) }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("illegal move: {0:?} leaves the board unchanged")]
    IllegalMove(Move),
    #[error("no empty cell to spawn a tile into")]
    NoEmptyCell,
    #[error("invalid board shape: {0}")]
    InvalidBoardShape(String),
    #[error("merging toward {0:?} overflows u64")]
    TileOverflow(Move),
    #[error("score overflow")]
    ScoreOverflow,
}

/// Where a spawned tile landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: Tile,
}

/// A 4x4 2048 board, row-major (`row 0` is the top, `col 0` the left).
///
/// Tile values are stored as-is (0, 2, 4, 8, ...), so there is no upper bound
/// on the largest tile. The board is `Copy`: every transformation returns a new
/// board and never touches the input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Grid", into = "Grid")]
pub struct Board(Grid);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Build a board from rows, validating every cell.
    pub fn from_rows(rows: Grid) -> Result<Self, EngineError> {
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if !is_tile_value(v) {
                    return Err(EngineError::InvalidBoardShape(format!(
                        "cell ({r}, {c}) holds {v}, not 0 or a power of two"
                    )));
                }
            }
        }
        Ok(Board(rows))
    }

    /// Build a board from 16 row-major cells.
    pub fn from_flat(cells: &[Tile]) -> Result<Self, EngineError> {
        if cells.len() != CELLS {
            return Err(EngineError::InvalidBoardShape(format!(
                "expected {CELLS} cells, got {}",
                cells.len()
            )));
        }
        let mut rows = [[0; SIZE]; SIZE];
        for (idx, &v) in cells.iter().enumerate() {
            rows[idx / SIZE][idx % SIZE] = v;
        }
        Self::from_rows(rows)
    }

    /// Build a board from a dynamically sized grid (e.g. nested `Vec`s).
    pub fn from_grid<T: AsRef<[Tile]>>(grid: &[T]) -> Result<Self, EngineError> {
        if grid.len() != SIZE {
            return Err(EngineError::InvalidBoardShape(format!(
                "expected {SIZE} rows, got {}",
                grid.len()
            )));
        }
        let mut rows = [[0; SIZE]; SIZE];
        for (r, row) in grid.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != SIZE {
                return Err(EngineError::InvalidBoardShape(format!(
                    "row {r} has {} cells, expected {SIZE}",
                    row.len()
                )));
            }
            rows[r].copy_from_slice(row);
        }
        Self::from_rows(rows)
    }

    /// Wrap a grid produced by a value-preserving transform of a valid board.
    #[inline]
    pub(crate) fn from_rows_unchecked(rows: Grid) -> Self { Board(rows) }

    /// Borrow the rows.
    #[inline]
    pub fn rows(&self) -> &Grid { &self.0 }

    /// Consume this `Board`, returning its rows.
    #[inline]
    pub fn into_rows(self) -> Grid { self.0 }

    /// Value at (`row`, `col`), 0 if empty.
    #[inline]
    pub fn tile(&self, row: usize, col: usize) -> Tile { self.0[row][col] }

    /// Flatten row-major into 16 cells.
    pub fn to_flat(self) -> [Tile; CELLS] {
        let mut out = [0; CELLS];
        for (idx, v) in self.0.iter().flatten().enumerate() {
            out[idx] = *v;
        }
        out
    }

    /// Slide/merge tiles in `dir`, returning the resulting board and the score
    /// the merges earn. No randomness; an unchanged board means the move is illegal.
    ///
    /// Fails with `TileOverflow` when a merged tile or the score would exceed `u64`.
    ///
    /// ```
    /// use gym_2048::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let (moved, score) = b.shift(Move::Left).unwrap();
    /// assert_eq!(moved.rows()[0], [4, 4, 0, 0]);
    /// assert_eq!(score, 8);
    /// ```
    pub fn shift(self, dir: Move) -> Result<(Board, Score), EngineError> {
        let shifted = if dir.along_rows() {
            shift_rows(self, dir.toward_tail())
        } else {
            shift_cols(self, dir.toward_tail())
        };
        shifted.ok_or(EngineError::TileOverflow(dir))
    }

    /// Like [`Board::shift`] but also fails with `IllegalMove` when nothing moves.
    pub fn try_shift(self, dir: Move) -> Result<(Board, Score), EngineError> {
        let (moved, score) = self.shift(dir)?;
        if moved == self {
            Err(EngineError::IllegalMove(dir))
        } else {
            Ok((moved, score))
        }
    }

    /// True if `dir` would change the board. A move whose merge overflows is not legal.
    #[inline]
    pub fn is_legal(self, dir: Move) -> bool { matches!(self.shift(dir), Ok((moved, _)) if moved != self) }

    /// Directions that change the board, in index order.
    pub fn legal_moves(self) -> Vec<Move> {
        Move::ALL.into_iter().filter(|&m| self.is_legal(m)).collect()
    }

    /// Return true if no legal moves remain.
    ///
    /// ```
    /// use gym_2048::engine::Board;
    /// let full = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
    /// assert!(full.is_game_over());
    /// ```
    pub fn is_game_over(self) -> bool { Move::ALL.into_iter().all(|m| !self.is_legal(m)) }

    /// Insert a 2, or a 4 with probability `four_probability`, into a uniformly
    /// chosen empty cell.
    ///
    /// ```
    /// use gym_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let (b, _) = Board::EMPTY.with_random_tile(&mut rng, 0.2).unwrap();
    /// let (b, _) = b.with_random_tile(&mut rng, 0.2).unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        four_probability: f64,
    ) -> Result<(Board, Spawn), EngineError> {
        let empties = self.empty_cells();
        if empties.is_empty() {
            return Err(EngineError::NoEmptyCell);
        }
        let (row, col) = empties[rng.gen_range(0..empties.len())];
        let value = generate_random_tile(rng, four_probability);
        let mut cells = self.0;
        cells[row][col] = value;
        Ok((Board(cells), Spawn { row, col, value }))
    }

    /// Return the highest tile value present (0 on an empty board).
    pub fn highest_tile(self) -> Tile { self.0.iter().flatten().copied().max().unwrap_or(0) }

    /// Count the number of empty cells on the board.
    pub fn count_empty(self) -> usize { self.0.iter().flatten().filter(|&&v| v == 0).count() }

    /// Coordinates of empty cells, row-major.
    pub fn empty_cells(self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(CELLS);
        for (r, row) in self.0.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v == 0 {
                    out.push((r, c));
                }
            }
        }
        out
    }

    /// Sum of all tile values; widened since sixteen large tiles exceed `u64`.
    pub fn tile_sum(self) -> u128 { self.0.iter().flatten().map(|&v| u128::from(v)).sum() }

    fn transpose(self) -> Board {
        let mut out = [[0; SIZE]; SIZE];
        for (r, row) in self.0.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                out[c][r] = v;
            }
        }
        Board(out)
    }
}

impl TryFrom<Grid> for Board {
    type Error = EngineError;
    fn try_from(rows: Grid) -> Result<Self, Self::Error> { Board::from_rows(rows) }
}

impl From<Board> for Grid {
    fn from(b: Board) -> Self { b.into_rows() }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "--------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(format_val).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

#[inline]
fn is_tile_value(v: Tile) -> bool { v == 0 || (v >= 2 && v.is_power_of_two()) }

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R, four_probability: f64) -> Tile {
    if rng.gen::<f64>() < four_probability { 4 } else { 2 }
}

fn shift_rows(board: Board, toward_tail: bool) -> Option<(Board, Score)> {
    let mut out = [[0; SIZE]; SIZE];
    let mut score: Score = 0;
    for (r, row) in board.0.iter().enumerate() {
        let (line, line_score) = shift_line(*row, toward_tail)?;
        out[r] = line;
        score = score.checked_add(line_score)?;
    }
    Some((Board(out), score))
}

fn shift_cols(board: Board, toward_tail: bool) -> Option<(Board, Score)> {
    let (moved, score) = shift_rows(board.transpose(), toward_tail)?;
    Some((moved.transpose(), score))
}

fn shift_line(line: [Tile; SIZE], toward_tail: bool) -> Option<([Tile; SIZE], Score)> {
    if toward_tail {
        let mut reversed = line;
        reversed.reverse();
        let (mut merged, score) = shift_line_left(reversed)?;
        merged.reverse();
        Some((merged, score))
    } else {
        shift_line_left(line)
    }
}

/// Compact then merge one line toward index 0.
///
/// Pairs are scanned left to right; once a pair merges, the next pair is
/// consumed without output so no tile merges twice in one move.
/// `None` if a merged tile or the line score does not fit in `u64`.
fn shift_line_left(line: [Tile; SIZE]) -> Option<([Tile; SIZE], Score)> {
    let mut compacted = [0; SIZE];
    for (slot, v) in line.iter().filter(|&&v| v != 0).enumerate() {
        compacted[slot] = *v;
    }

    let mut merged = [0; SIZE];
    let mut score: Score = 0;
    let mut out = 0;
    let mut skip = false;
    for pair in compacted.windows(2) {
        if skip {
            skip = false;
            continue;
        }
        merged[out] = pair[0];
        if pair[0] == pair[1] {
            let tile = pair[0].checked_add(pair[1])?;
            merged[out] = tile;
            score = score.checked_add(tile)?;
            skip = true;
        }
        out += 1;
    }
    if !skip {
        merged[out] = compacted[SIZE - 1];
    }
    Some((merged, score))
}

fn format_val(val: &Tile) -> String {
    match val {
        0 => String::from("       "),
        x => format!("{x:^7}"),
    }
}
