//! Standard chess moves and how they are applied to a [`Position`]

use crate::movegen;
use crate::position::Position;
use crate::types::{CastlingSide, Cell, Color, Coord, CoordParseError, Piece};
use crate::{castling, geometry};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Non-pawn move or capture (except castling)
    Simple,
    /// Kingside castling
    CastlingKingside,
    /// Queenside castling
    CastlingQueenside,
    /// Single pawn move (either non-capture or capture)
    PawnSimple,
    /// Double pawn move
    PawnDouble,
    /// Enpassant
    Enpassant,
    /// Pawn promote to knight (either non-capture or capture)
    PromoteKnight,
    /// Pawn promote to bishop (either non-capture or capture)
    PromoteBishop,
    /// Pawn promote to rook (either non-capture or capture)
    PromoteRook,
    /// Pawn promote to queen (either non-capture or capture)
    PromoteQueen,
}

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PromotePiece {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl PromotePiece {
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Knight,
        PromotePiece::Bishop,
        PromotePiece::Rook,
        PromotePiece::Queen,
    ];

    #[inline]
    pub fn as_char(&self) -> char {
        match self {
            PromotePiece::Knight => 'n',
            PromotePiece::Bishop => 'b',
            PromotePiece::Rook => 'r',
            PromotePiece::Queen => 'q',
        }
    }

    #[inline]
    pub fn from_char(c: char) -> Option<PromotePiece> {
        match c {
            'n' => Some(PromotePiece::Knight),
            'b' => Some(PromotePiece::Bishop),
            'r' => Some(PromotePiece::Rook),
            'q' => Some(PromotePiece::Queen),
            _ => None,
        }
    }
}

impl From<PromotePiece> for Piece {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => Piece::Knight,
            PromotePiece::Bishop => Piece::Bishop,
            PromotePiece::Rook => Piece::Rook,
            PromotePiece::Queen => Piece::Queen,
        }
    }
}

impl From<CastlingSide> for MoveKind {
    #[inline]
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => Self::CastlingKingside,
            CastlingSide::Queen => Self::CastlingQueenside,
        }
    }
}

impl From<PromotePiece> for MoveKind {
    #[inline]
    fn from(kind: PromotePiece) -> Self {
        match kind {
            PromotePiece::Knight => Self::PromoteKnight,
            PromotePiece::Bishop => Self::PromoteBishop,
            PromotePiece::Rook => Self::PromoteRook,
            PromotePiece::Queen => Self::PromoteQueen,
        }
    }
}

impl MoveKind {
    /// Returns the castling side if this move kind represents castling
    #[inline]
    pub fn castling(self) -> Option<CastlingSide> {
        match self {
            MoveKind::CastlingKingside => Some(CastlingSide::King),
            MoveKind::CastlingQueenside => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    /// Returns the promotion target if this move kind represents a promote
    #[inline]
    pub fn promote(self) -> Option<PromotePiece> {
        match self {
            MoveKind::PromoteKnight => Some(PromotePiece::Knight),
            MoveKind::PromoteBishop => Some(PromotePiece::Bishop),
            MoveKind::PromoteRook => Some(PromotePiece::Rook),
            MoveKind::PromoteQueen => Some(PromotePiece::Queen),
            _ => None,
        }
    }
}

/// Standard chess move
///
/// Moves are only created by the move generator, so every `Move` is at least semilegal in the
/// position it was generated from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    src: Coord,
    dst: Coord,
    side: Color,
}

impl Move {
    #[inline]
    pub(crate) const fn new(kind: MoveKind, src: Coord, dst: Coord, side: Color) -> Move {
        Move {
            kind,
            src,
            dst,
            side,
        }
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub const fn side(&self) -> Color {
        self.side
    }

    /// Returns the move in UCI notation
    #[inline]
    pub fn uci(&self) -> UciMove {
        UciMove {
            src: self.src,
            dst: self.dst,
            promote: self.kind.promote(),
        }
    }

    /// Formats the move in short algebraic notation, `pos` being the position before the move
    ///
    /// Disambiguation and check marks are not added.
    pub fn notation(&self, pos: &Position) -> String {
        if let Some(side) = self.kind.castling() {
            return castling_notation(side).to_string();
        }
        let capture = pos.get(self.dst).is_occupied() || self.kind == MoveKind::Enpassant;
        let mut res = String::new();
        match pos.get(self.src).piece() {
            Some(Piece::Pawn) | None => {
                if capture {
                    res.push(self.src.file().as_char());
                }
            }
            Some(piece) => res.push(piece.as_char().to_ascii_uppercase()),
        }
        if capture {
            res.push('x');
        }
        res += &self.dst.to_string();
        if let Some(promote) = self.kind.promote() {
            res.push('=');
            res.push(promote.as_char().to_ascii_uppercase());
        }
        res
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.uci())
    }
}

pub fn castling_notation(side: CastlingSide) -> &'static str {
    match side {
        CastlingSide::King => "O-O",
        CastlingSide::Queen => "O-O-O",
    }
}

/// Move given as a pair of squares, as in UCI notation
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub src: Coord,
    pub dst: Coord,
    pub promote: Option<PromotePiece>,
}

/// Error parsing [`UciMove`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum UciParseError {
    #[error("bad string length")]
    BadLength,
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.promote {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = UciParseError;

    fn from_str(s: &str) -> Result<UciMove, Self::Err> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(UciParseError::BadLength);
        }
        let src = Coord::from_str(&s[0..2]).map_err(UciParseError::BadSrc)?;
        let dst = Coord::from_str(&s[2..4]).map_err(UciParseError::BadDst)?;
        let promote = match s[4..].chars().next() {
            Some(c) => Some(PromotePiece::from_char(c).ok_or(UciParseError::BadPromote(c))?),
            None => None,
        };
        Ok(UciMove { src, dst, promote })
    }
}

/// Error applying a standard move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    NoPiece(Coord),
    #[error("piece on {0} does not belong to the side to move")]
    WrongSide(Coord),
    #[error("move {src}{dst} is not legal")]
    Illegal { src: Coord, dst: Coord },
}

fn update_castling(pos: &mut Position, c: Coord) {
    if let Some((color, side)) = castling::corner_right(c) {
        pos.castling.unset(color, side);
    }
}

/// Applies the move `mv` to `pos` without checking its legality
///
/// The move must be semilegal in `pos`, otherwise the resulting position is unspecified (but
/// still a valid value).
pub fn make_move_unchecked(pos: &mut Position, mv: Move) {
    let src_cell = pos.remove(mv.src);
    let dst_cell = pos.get(mv.dst);
    let is_pawn = src_cell.piece() == Some(Piece::Pawn);

    pos.ep_source = None;
    match mv.kind {
        MoveKind::Simple | MoveKind::PawnSimple => pos.put(mv.dst, src_cell),
        MoveKind::PawnDouble => {
            pos.put(mv.dst, src_cell);
            pos.ep_source = Some(mv.dst);
        }
        MoveKind::Enpassant => {
            pos.put(mv.dst, src_cell);
            if let Some(taken) = mv.dst.shift(0, -geometry::pawn_forward_delta(mv.side)) {
                pos.remove(taken);
            }
        }
        MoveKind::CastlingKingside | MoveKind::CastlingQueenside => {
            pos.put(mv.dst, src_cell);
            if let Some(side) = mv.kind.castling() {
                let rook = pos.remove(castling::rook_src(mv.side, side));
                pos.put(castling::rook_dst(mv.side, side), rook);
            }
        }
        MoveKind::PromoteKnight
        | MoveKind::PromoteBishop
        | MoveKind::PromoteRook
        | MoveKind::PromoteQueen => {
            let piece = mv.kind.promote().map_or(Piece::Queen, Piece::from);
            pos.put(mv.dst, Cell::from_parts(mv.side, piece));
        }
    }

    if src_cell.piece() == Some(Piece::King) {
        pos.castling.unset_color(mv.side);
    }
    update_castling(pos, mv.src);
    update_castling(pos, mv.dst);

    if is_pawn || dst_cell.is_occupied() {
        pos.move_counter = 0;
    } else {
        pos.move_counter = pos.move_counter.saturating_add(1);
    }
    if mv.side == Color::Black {
        pos.move_number = pos.move_number.saturating_add(1);
    }
    pos.side = mv.side.inv();
}

/// Finds the legal move from `src` to `dst` in `pos`
///
/// If the move is a promotion and `promote` is `None`, the pawn is promoted to a queen.
pub fn find_legal(
    pos: &Position,
    src: Coord,
    dst: Coord,
    promote: Option<PromotePiece>,
) -> Result<Move, MoveError> {
    let color = pos.get(src).color().ok_or(MoveError::NoPiece(src))?;
    if color != pos.side {
        return Err(MoveError::WrongSide(src));
    }
    let promote = promote.unwrap_or(PromotePiece::Queen);
    movegen::legal_moves_from(pos, src)
        .iter()
        .copied()
        .find(|mv| mv.dst == dst && mv.kind.promote().map_or(true, |p| p == promote))
        .ok_or(MoveError::Illegal { src, dst })
}

/// Applies the legal move from `src` to `dst` to `pos`
///
/// On error, `pos` is left unchanged.
pub fn make_move(
    pos: &mut Position,
    src: Coord,
    dst: Coord,
    promote: Option<PromotePiece>,
) -> Result<Move, MoveError> {
    let mv = find_legal(pos, src, dst, promote)?;
    make_move_unchecked(pos, mv);
    Ok(mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CastlingRights, File, Rank};

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_simple() {
        let mut pos = Position::initial();
        let mv = make_move(&mut pos, sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(mv.kind(), MoveKind::PawnDouble);
        assert_eq!(
            pos.as_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        make_move(&mut pos, sq("g8"), sq("f6"), None).unwrap();
        assert_eq!(
            pos.as_fen(),
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2"
        );
    }

    #[test]
    fn test_illegal() {
        let mut pos = Position::initial();
        let before = pos;
        assert_eq!(
            make_move(&mut pos, sq("e2"), sq("e5"), None),
            Err(MoveError::Illegal {
                src: sq("e2"),
                dst: sq("e5")
            })
        );
        assert_eq!(
            make_move(&mut pos, sq("e7"), sq("e5"), None),
            Err(MoveError::WrongSide(sq("e7")))
        );
        assert_eq!(
            make_move(&mut pos, sq("e4"), sq("e5"), None),
            Err(MoveError::NoPiece(sq("e4")))
        );
        assert_eq!(pos, before);
    }

    #[test]
    fn test_castling() {
        let start = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mut pos = start;
        let mv = make_move(&mut pos, sq("e1"), sq("g1"), None).unwrap();
        assert_eq!(mv.kind(), MoveKind::CastlingKingside);
        assert_eq!(mv.notation(&start), "O-O");
        assert_eq!(pos.as_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        make_move(&mut pos, sq("a8"), sq("a1"), None).unwrap();
        assert_eq!(pos.castling, CastlingRights::EMPTY.with(Color::Black, CastlingSide::King));
    }

    #[test]
    fn test_enpassant_and_promote() {
        let mut pos = Position::from_fen("4k3/1P6/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let mv = make_move(&mut pos, sq("e5"), sq("d6"), None).unwrap();
        assert_eq!(mv.kind(), MoveKind::Enpassant);
        assert!(pos.get2(File::D, Rank::R5).is_free());
        pos.side = Color::White;
        let before = pos;
        let mv = make_move(&mut pos, sq("b7"), sq("b8"), None).unwrap();
        assert_eq!(mv.kind(), MoveKind::PromoteQueen);
        assert_eq!(mv.notation(&before), "b8=Q");
        assert_eq!(mv.to_string(), "b7b8q");
        assert_eq!(
            pos.get2(File::B, Rank::R8),
            Cell::from_parts(Color::White, Piece::Queen)
        );
        let mut pos = before;
        let mv = make_move(&mut pos, sq("b7"), sq("b8"), Some(PromotePiece::Knight)).unwrap();
        assert_eq!(mv.kind(), MoveKind::PromoteKnight);
    }

    #[test]
    fn test_notation() {
        let pos = Position::from_fen("4k3/8/8/3p4/4P3/5N2/8/4K3 w - - 0 1").unwrap();
        let mv = find_legal(&pos, sq("e4"), sq("d5"), None).unwrap();
        assert_eq!(mv.notation(&pos), "exd5");
        let mv = find_legal(&pos, sq("f3"), sq("d4"), None).unwrap();
        assert_eq!(mv.notation(&pos), "Nd4");
        let mv = find_legal(&pos, sq("e1"), sq("e2"), None).unwrap();
        assert_eq!(mv.notation(&pos), "Ke2");
    }

    #[test]
    fn test_uci() {
        let mv = UciMove::from_str("e7e8q").unwrap();
        assert_eq!(mv.src, sq("e7"));
        assert_eq!(mv.promote, Some(PromotePiece::Queen));
        assert_eq!(mv.to_string(), "e7e8q");
        assert_eq!(UciMove::from_str("e2e4").unwrap().promote, None);
        assert_eq!(UciMove::from_str("e2"), Err(UciParseError::BadLength));
        assert_eq!(UciMove::from_str("e2e4k"), Err(UciParseError::BadPromote('k')));
    }
}
