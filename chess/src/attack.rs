//! Attack maps for individual pieces

use crate::bitboard::Bitboard;
use crate::types::{Color, Coord};

const KING_DELTAS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const KNIGHT_DELTAS: [(isize, isize); 8] = [
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
    (-2, 1),
    (-1, 2),
    (1, 2),
    (2, 1),
];

// Ranks are indexed from the top, so White pawns attack towards negative rank deltas
const WHITE_PAWN_DELTAS: [(isize, isize); 2] = [(-1, -1), (1, -1)];
const BLACK_PAWN_DELTAS: [(isize, isize); 2] = [(-1, 1), (1, 1)];

const DIAG_DIRS: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const LINE_DIRS: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

const fn leaper_table(deltas: &[(isize, isize)]) -> [Bitboard; 64] {
    let mut res = [Bitboard::EMPTY; 64];
    let mut i = 0;
    while i < 64 {
        let src = Coord::from_index(i);
        let mut bb = Bitboard::EMPTY;
        let mut j = 0;
        while j < deltas.len() {
            if let Some(dst) = src.shift(deltas[j].0, deltas[j].1) {
                bb = bb.with(dst);
            }
            j += 1;
        }
        res[i] = bb;
        i += 1;
    }
    res
}

static KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_DELTAS);
static KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_DELTAS);
static WHITE_PAWN_ATTACKS: [Bitboard; 64] = leaper_table(&WHITE_PAWN_DELTAS);
static BLACK_PAWN_ATTACKS: [Bitboard; 64] = leaper_table(&BLACK_PAWN_DELTAS);

fn slide(coord: Coord, occupied: Bitboard, dirs: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(delta_file, delta_rank) in dirs {
        let mut cur = coord;
        while let Some(next) = cur.shift(delta_file, delta_rank) {
            res.set(next);
            if occupied.has(next) {
                break;
            }
            cur = next;
        }
    }
    res
}

#[inline]
pub fn king(coord: Coord) -> Bitboard {
    KING_ATTACKS[coord.index()]
}

#[inline]
pub fn knight(coord: Coord) -> Bitboard {
    KNIGHT_ATTACKS[coord.index()]
}

/// Squares attacked by a pawn of color `color` standing on `coord`
#[inline]
pub fn pawn(color: Color, coord: Coord) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[coord.index()],
        Color::Black => BLACK_PAWN_ATTACKS[coord.index()],
    }
}

/// Squares reachable by a rook on `coord`, including the first blocker in each direction
#[inline]
pub fn rook(coord: Coord, occupied: Bitboard) -> Bitboard {
    slide(coord, occupied, &LINE_DIRS)
}

/// Squares reachable by a bishop on `coord`, including the first blocker in each direction
#[inline]
pub fn bishop(coord: Coord, occupied: Bitboard) -> Bitboard {
    slide(coord, occupied, &DIAG_DIRS)
}

#[inline]
pub fn queen(coord: Coord, occupied: Bitboard) -> Bitboard {
    rook(coord, occupied) | bishop(coord, occupied)
}
