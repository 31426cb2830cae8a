//! The 8 symmetries of the square board (4 rotations x {identity, mirror}).
//!
//! A [`Symmetry`] is applied as "rotate clockwise `quarter_turns` times, then
//! mirror left-right if `mirrored`". Board cells and move directions are both
//! pushed through the same linear map on centred coordinates, so the relabeled
//! action always points where the transformed board says it should:
//!
//! - rotation by `k`: `action' = (action + k) mod 4`
//! - mirror: `action' = (4 - action) mod 4`
//!
//! ```
//! use gym_2048::engine::{Board, Move};
//! use gym_2048::symmetry::{augmented_variants, rotate};
//!
//! let b = Board::from_rows([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! assert_eq!(rotate(rotate(b, 1), 3), b);
//! let variants = augmented_variants(b, Move::Right);
//! assert_eq!(variants[0], (b, Move::Right));
//! assert_eq!(variants[1].1, Move::Left);
//! ```

use crate::engine::{Board, Move, SIZE};

/// One element of the square's symmetry group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symmetry {
    quarter_turns: u8,
    mirrored: bool,
}

impl Symmetry {
    pub const IDENTITY: Symmetry = Symmetry { quarter_turns: 0, mirrored: false };
    pub const MIRROR: Symmetry = Symmetry { quarter_turns: 0, mirrored: true };

    /// Every element, ordered as rotation `k` alone then rotation `k` followed
    /// by the mirror, for `k` in 0..4.
    pub const ALL: [Symmetry; 8] = [
        Symmetry { quarter_turns: 0, mirrored: false },
        Symmetry { quarter_turns: 0, mirrored: true },
        Symmetry { quarter_turns: 1, mirrored: false },
        Symmetry { quarter_turns: 1, mirrored: true },
        Symmetry { quarter_turns: 2, mirrored: false },
        Symmetry { quarter_turns: 2, mirrored: true },
        Symmetry { quarter_turns: 3, mirrored: false },
        Symmetry { quarter_turns: 3, mirrored: true },
    ];

    /// `quarter_turns` is taken mod 4.
    pub fn new(quarter_turns: u8, mirrored: bool) -> Self {
        Symmetry { quarter_turns: quarter_turns % 4, mirrored }
    }

    pub fn rotation(quarter_turns: u8) -> Self { Self::new(quarter_turns, false) }

    pub fn quarter_turns(self) -> u8 { self.quarter_turns }

    pub fn is_mirrored(self) -> bool { self.mirrored }

    /// The element that undoes this one. Mirrored elements are involutions.
    pub fn inverse(self) -> Symmetry {
        if self.mirrored {
            self
        } else {
            Self::rotation(4 - self.quarter_turns)
        }
    }

    /// The linear part of the transform, on centred coordinates.
    fn transform(self, (mut x, mut y): (i8, i8)) -> (i8, i8) {
        for _ in 0..self.quarter_turns {
            (x, y) = (y, -x);
        }
        if self.mirrored {
            y = -y;
        }
        (x, y)
    }

    pub fn apply_board(self, board: Board) -> Board {
        let mut out = [[0; SIZE]; SIZE];
        for (r, row) in board.rows().iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                let (x, y) = self.transform((centre(r), centre(c)));
                out[uncentre(x)][uncentre(y)] = v;
            }
        }
        Board::from_rows_unchecked(out)
    }

    pub fn apply_move(self, action: Move) -> Move {
        // Unit vectors map onto unit vectors, so the lookup always hits.
        Move::from_vector(self.transform(action.vector())).unwrap_or(action)
    }

    pub fn apply(self, board: Board, action: Move) -> (Board, Move) {
        (self.apply_board(board), self.apply_move(action))
    }
}

// Cell index -> odd coordinate centred on the board middle: 0..4 -> -3, -1, 1, 3.
#[inline]
fn centre(i: usize) -> i8 { 2 * i as i8 - (SIZE as i8 - 1) }

#[inline]
fn uncentre(v: i8) -> usize { ((v + SIZE as i8 - 1) / 2) as usize }

/// Rotate `board` clockwise by `k` quarter turns.
pub fn rotate(board: Board, k: u8) -> Board { Symmetry::rotation(k).apply_board(board) }

/// Relabel `action` for a board rotated clockwise by `k` quarter turns.
pub fn rotate_action(action: Move, k: u8) -> Move { Symmetry::rotation(k).apply_move(action) }

/// Reflect `board` left-right.
pub fn mirror_horizontal(board: Board) -> Board { Symmetry::MIRROR.apply_board(board) }

/// Relabel `action` for a board reflected left-right.
pub fn mirror_action(action: Move) -> Move { Symmetry::MIRROR.apply_move(action) }

/// All 8 symmetric (board, action) pairs, in [`Symmetry::ALL`] order. The
/// first entry is the input itself.
pub fn augmented_variants(board: Board, action: Move) -> [(Board, Move); 8] {
    Symmetry::ALL.map(|s| s.apply(board, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [[u64; 4]; 4]) -> Board { Board::from_rows(rows).unwrap() }

    fn sample_board() -> Board { board([[2, 4, 0, 0], [0, 0, 8, 0], [0; 4], [16, 0, 0, 32]]) }

    #[test]
    fn rotate_quarter_turn_clockwise() {
        let b = board([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(rotate(b, 1), board([[0, 0, 0, 2], [0, 0, 0, 4], [0; 4], [0; 4]]));
        assert_eq!(rotate(b, 2), board([[0; 4], [0; 4], [0; 4], [0, 0, 4, 2]]));
        assert_eq!(rotate(b, 3), board([[0; 4], [0; 4], [4, 0, 0, 0], [2, 0, 0, 0]]));
        assert_eq!(rotate(b, 4), b);
    }

    #[test]
    fn mirror_reflects_columns() {
        let b = board([[2, 4, 0, 0], [0, 8, 0, 16], [0; 4], [0; 4]]);
        assert_eq!(mirror_horizontal(b), board([[0, 0, 4, 2], [16, 0, 8, 0], [0; 4], [0; 4]]));
        assert_eq!(mirror_horizontal(mirror_horizontal(b)), b);
    }

    #[test]
    fn rotation_roundtrip() {
        let b = sample_board();
        for k in 0..4 {
            assert_eq!(rotate(rotate(b, k), 4 - k), b);
            for a in Move::ALL {
                assert_eq!(rotate_action(rotate_action(a, k), 4 - k), a);
            }
        }
        assert_eq!(rotate(rotate(b, 1), 3), b);
    }

    #[test]
    fn action_relabeling_matches_closed_form() {
        for s in Symmetry::ALL {
            let k = s.quarter_turns();
            for a in Move::ALL {
                let rotated = (a.index() + k) % 4;
                let expected = if s.is_mirrored() { (4 - rotated) % 4 } else { rotated };
                assert_eq!(s.apply_move(a).index(), expected, "{s:?} {a:?}");
            }
        }
        assert_eq!(mirror_action(Move::Right), Move::Left);
        assert_eq!(mirror_action(Move::Up), Move::Up);
        assert_eq!(mirror_action(Move::Down), Move::Down);
        assert_eq!(rotate_action(Move::Right, 3), Move::Up);
    }

    #[test]
    fn relabeled_move_commutes_with_board_transform() {
        // Moving then transforming equals transforming then moving the relabeled way.
        let b = sample_board();
        for s in Symmetry::ALL {
            for a in Move::ALL {
                let (moved, score) = b.shift(a).unwrap();
                let (tb, ta) = s.apply(b, a);
                let (moved_t, score_t) = tb.shift(ta).unwrap();
                assert_eq!(s.apply_board(moved), moved_t, "{s:?} {a:?}");
                assert_eq!(score, score_t);
            }
        }
    }

    #[test]
    fn inverse_undoes() {
        let b = sample_board();
        for s in Symmetry::ALL {
            let (tb, ta) = s.apply(b, Move::Right);
            assert_eq!(s.inverse().apply(tb, ta), (b, Move::Right));
        }
    }

    #[test]
    fn eight_distinct_variants() {
        let variants = augmented_variants(sample_board(), Move::Up);
        for (i, a) in variants.iter().enumerate() {
            for b in &variants[i + 1..] {
                assert_ne!(a.0, b.0);
            }
        }
        assert_eq!(variants[0], (sample_board(), Move::Up));
        assert_eq!(variants[3].0, mirror_horizontal(rotate(sample_board(), 1)));
        assert_eq!(variants[3].1, Move::Left);
    }
}
