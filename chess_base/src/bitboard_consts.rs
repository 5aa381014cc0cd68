use crate::bitboard::Bitboard;
use crate::types::{File, Rank};

const RANK: [Bitboard; 8] = [
    Bitboard::from_raw(0x00000000000000ff),
    Bitboard::from_raw(0x000000000000ff00),
    Bitboard::from_raw(0x0000000000ff0000),
    Bitboard::from_raw(0x00000000ff000000),
    Bitboard::from_raw(0x000000ff00000000),
    Bitboard::from_raw(0x0000ff0000000000),
    Bitboard::from_raw(0x00ff000000000000),
    Bitboard::from_raw(0xff00000000000000),
];

pub const fn rank(r: Rank) -> Bitboard {
    RANK[r.index()]
}

pub const fn file(f: File) -> Bitboard {
    Bitboard::from_raw(0x0101010101010101 << f.index())
}

/// Light squares (a8 is light)
pub const CELLS_WHITE: Bitboard = Bitboard::from_raw(0xaa55aa55aa55aa55);
/// Dark squares (a1 is dark)
pub const CELLS_BLACK: Bitboard = Bitboard::from_raw(0x55aa55aa55aa55aa);
