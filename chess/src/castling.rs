//! Castling geometry

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{CastlingSide, Color, Coord, File};

/// Squares between the king and the rook, which must be empty to castle
#[inline]
pub const fn pass(c: Color, s: CastlingSide) -> Bitboard {
    let x = match s {
        CastlingSide::King => 0x60,
        CastlingSide::Queen => 0x0e,
    };
    Bitboard::from_raw(match c {
        Color::White => x << 56,
        Color::Black => x,
    })
}

#[inline]
pub const fn king_src(c: Color) -> Coord {
    Coord::from_parts(File::E, geometry::castling_rank(c))
}

#[inline]
pub const fn king_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

/// Square the king crosses on its way to [`king_dst()`]
#[inline]
pub const fn king_transit(c: Color, s: CastlingSide) -> Coord {
    rook_dst(c, s)
}

#[inline]
pub const fn rook_src(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::H,
        CastlingSide::Queen => File::A,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

#[inline]
pub const fn rook_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

/// Returns the castling right lost when a piece leaves or enters the square `c`
pub fn corner_right(c: Coord) -> Option<(Color, CastlingSide)> {
    [Color::White, Color::Black]
        .into_iter()
        .flat_map(|color| CastlingSide::BOTH.map(|side| (color, side)))
        .find(|&(color, side)| rook_src(color, side) == c)
}

/// Returns the castling side if a king move from `src` to `dst` is a two-file step along the rank
pub fn king_step_side(src: Coord, dst: Coord) -> Option<CastlingSide> {
    if src.rank() != dst.rank() {
        return None;
    }
    match dst.file().index() as isize - src.file().index() as isize {
        2 => Some(CastlingSide::King),
        -2 => Some(CastlingSide::Queen),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rank;

    #[test]
    fn test_pass() {
        let pass_squares: Vec<_> = pass(Color::White, CastlingSide::Queen)
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(pass_squares, vec!["b1", "c1", "d1"]);
        let pass_squares: Vec<_> = pass(Color::Black, CastlingSide::King)
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(pass_squares, vec!["f8", "g8"]);
    }

    #[test]
    fn test_corners() {
        assert_eq!(
            corner_right(Coord::from_parts(File::A, Rank::R8)),
            Some((Color::Black, CastlingSide::Queen))
        );
        assert_eq!(
            corner_right(Coord::from_parts(File::H, Rank::R1)),
            Some((Color::White, CastlingSide::King))
        );
        assert_eq!(corner_right(Coord::from_parts(File::E, Rank::R1)), None);
    }

    #[test]
    fn test_king_step() {
        let e1 = king_src(Color::White);
        assert_eq!(
            king_step_side(e1, king_dst(Color::White, CastlingSide::King)),
            Some(CastlingSide::King)
        );
        assert_eq!(
            king_step_side(e1, king_dst(Color::White, CastlingSide::Queen)),
            Some(CastlingSide::Queen)
        );
        assert_eq!(king_step_side(e1, Coord::from_parts(File::F, Rank::R1)), None);
        assert_eq!(king_step_side(e1, Coord::from_parts(File::G, Rank::R3)), None);
    }
}
