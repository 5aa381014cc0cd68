use crate::types::{Color, Rank};

/// Rank where the king and rooks of color `c` start
pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// First rank searched when a surviving piece of color `c` is relocated
pub const fn back_rank(c: Color) -> Rank {
    castling_rank(c)
}

/// Second rank searched when a surviving piece of color `c` is relocated
pub const fn front_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn double_move_src_rank(c: Color) -> Rank {
    front_rank(c)
}

pub const fn promote_dst_rank(c: Color) -> Rank {
    castling_rank(c.inv())
}

pub const fn enpassant_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R5,
        Color::Black => Rank::R4,
    }
}

pub const fn enpassant_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    }
}

/// Rank delta of a single pawn step for color `c`
///
/// Ranks are indexed from the top, so White pawns move towards smaller indices.
pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => -1,
        Color::Black => 1,
    }
}
