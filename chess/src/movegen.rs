//! Standard chess move generation and position outcome
//!
//! The generator tolerates positions which can't appear in a standard game: a side may have no
//! king, in which case its moves are never filtered for king safety, and a king may be captured
//! like any other piece.

use crate::bitboard::Bitboard;
use crate::moves::{self, Move, MoveKind, PromotePiece};
use crate::position::Position;
use crate::types::{CastlingSide, Cell, Color, Coord, DrawReason, Outcome, Piece, WinReason};
use crate::{attack, bitboard_consts, castling, geometry};

use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Returns `true` if the square `coord` is attacked by any piece of color `color`
pub fn is_cell_attacked(pos: &Position, coord: Coord, color: Color) -> bool {
    let boards = pos.piece_boards();
    let piece = |p| boards[Cell::from_parts(color, p).index()];

    // Here, we use the opposite color's pawn map, as we trace the attack back from the target
    let pawn_attacks = attack::pawn(color.inv(), coord);

    // Near attacks
    if (piece(Piece::Pawn) & pawn_attacks).is_nonempty()
        || (piece(Piece::King) & attack::king(coord)).is_nonempty()
        || (piece(Piece::Knight) & attack::knight(coord)).is_nonempty()
    {
        return true;
    }

    // Far attacks
    let all = boards[1..]
        .iter()
        .fold(Bitboard::EMPTY, |acc, b| acc | *b);
    let diag = piece(Piece::Bishop) | piece(Piece::Queen);
    let line = piece(Piece::Rook) | piece(Piece::Queen);
    (attack::bishop(coord, all) & diag).is_nonempty()
        || (attack::rook(coord, all) & line).is_nonempty()
}

/// Returns `true` if the king of the side to move is attacked
///
/// Always `false` if that side has no king.
pub fn is_check(pos: &Position) -> bool {
    match pos.king_pos(pos.side) {
        Some(king) => is_cell_attacked(pos, king, pos.side.inv()),
        None => false,
    }
}

struct MoveGen<'a> {
    pos: &'a Position,
    color: Color,
    src: Coord,
    ours: Bitboard,
    theirs: Bitboard,
    dst: &'a mut MoveList,
}

impl<'a> MoveGen<'a> {
    fn add(&mut self, kind: MoveKind, dst: Coord) {
        self.dst.push(Move::new(kind, self.src, dst, self.color));
    }

    fn add_many(&mut self, kind: MoveKind, targets: Bitboard) {
        for dst in targets {
            self.add(kind, dst);
        }
    }

    fn add_pawn(&mut self, dst: Coord) {
        if dst.rank() == geometry::promote_dst_rank(self.color) {
            for p in PromotePiece::ALL {
                self.add(MoveKind::from(p), dst);
            }
        } else {
            self.add(MoveKind::PawnSimple, dst);
        }
    }

    fn gen_pawn(&mut self) {
        let forward = geometry::pawn_forward_delta(self.color);
        if let Some(single) = self.src.shift(0, forward) {
            if self.pos.get(single).is_free() {
                self.add_pawn(single);
                if self.src.rank() == geometry::double_move_src_rank(self.color) {
                    if let Some(double) = single.shift(0, forward) {
                        if self.pos.get(double).is_free() {
                            self.add(MoveKind::PawnDouble, double);
                        }
                    }
                }
            }
        }

        let attacks = attack::pawn(self.color, self.src);
        for dst in attacks & self.theirs {
            self.add_pawn(dst);
        }

        if self.color != self.pos.side {
            return;
        }
        let ep_pawn = Cell::from_parts(self.color.inv(), Piece::Pawn);
        if let (Some(src), Some(dst)) = (self.pos.ep_source, self.pos.ep_dest()) {
            if attacks.has(dst) && self.pos.get(src) == ep_pawn && self.pos.get(dst).is_free() {
                self.add(MoveKind::Enpassant, dst);
            }
        }
    }

    fn gen_castling(&mut self) {
        if self.src != castling::king_src(self.color) {
            return;
        }
        let all = self.ours | self.theirs;
        let rook = Cell::from_parts(self.color, Piece::Rook);
        let enemy = self.color.inv();
        for side in CastlingSide::BOTH {
            if !self.pos.castling.has(self.color, side)
                || (castling::pass(self.color, side) & all).is_nonempty()
                || self.pos.get(castling::rook_src(self.color, side)) != rook
            {
                continue;
            }
            // The destination square is checked by the legality filter
            if is_cell_attacked(self.pos, self.src, enemy)
                || is_cell_attacked(self.pos, castling::king_transit(self.color, side), enemy)
            {
                continue;
            }
            self.add(MoveKind::from(side), castling::king_dst(self.color, side));
        }
    }

    fn gen_piece(&mut self, piece: Piece) {
        let free = !self.ours;
        let all = self.ours | self.theirs;
        match piece {
            Piece::Pawn => self.gen_pawn(),
            Piece::King => {
                self.add_many(MoveKind::Simple, attack::king(self.src) & free);
                self.gen_castling();
            }
            Piece::Knight => self.add_many(MoveKind::Simple, attack::knight(self.src) & free),
            Piece::Bishop => self.add_many(MoveKind::Simple, attack::bishop(self.src, all) & free),
            Piece::Rook => self.add_many(MoveKind::Simple, attack::rook(self.src, all) & free),
            Piece::Queen => self.add_many(MoveKind::Simple, attack::queen(self.src, all) & free),
        }
    }
}

/// Generates the semilegal moves of the piece on `src`, appending them to `dst`
///
/// Semilegal moves obey the rules of chess except that the moving side's king may remain under
/// attack. Does nothing if `src` is empty.
pub fn semilegal_moves_from(pos: &Position, src: Coord, dst: &mut MoveList) {
    let Some((color, piece)) = pos.get(src).parts() else {
        return;
    };
    MoveGen {
        pos,
        color,
        src,
        ours: pos.color(color),
        theirs: pos.color(color.inv()),
        dst,
    }
    .gen_piece(piece);
}

/// Returns `true` if the semilegal move `mv` doesn't leave its side's king under attack
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    let mut after = *pos;
    moves::make_move_unchecked(&mut after, mv);
    match after.king_pos(mv.side()) {
        Some(king) => !is_cell_attacked(&after, king, mv.side().inv()),
        None => true,
    }
}

/// Generates the legal moves of the piece on `src`
///
/// The list is empty if `src` is empty or holds a piece of the side not to move.
pub fn legal_moves_from(pos: &Position, src: Coord) -> MoveList {
    let mut res = MoveList::new();
    if pos.get(src).color() != Some(pos.side) {
        return res;
    }
    semilegal_moves_from(pos, src, &mut res);
    res.retain(|mv| is_legal(pos, *mv));
    res
}

/// Generates all the legal moves of the side to move
pub fn legal_moves(pos: &Position) -> MoveList {
    let mut res = MoveList::new();
    for src in pos.color(pos.side) {
        semilegal_moves_from(pos, src, &mut res);
    }
    res.retain(|mv| is_legal(pos, *mv));
    res
}

/// Returns `true` if the side to move has at least one legal move
pub fn has_legal_moves(pos: &Position) -> bool {
    let mut buf = MoveList::new();
    pos.color(pos.side).into_iter().any(|src| {
        buf.clear();
        semilegal_moves_from(pos, src, &mut buf);
        buf.iter().any(|mv| is_legal(pos, *mv))
    })
}

/// Returns `true` if the position is drawn because of insufficient material, regardless of the
/// players' moves
///
/// Such positions include:
///
/// - king vs king
/// - king + knight vs king
/// - kings and bishops of the same color
pub fn is_insufficient_material(pos: &Position) -> bool {
    let all_without_kings = pos.occupied()
        ^ (pos.piece2(Color::White, Piece::King) | pos.piece2(Color::Black, Piece::King));

    // If we have pieces on both white and black squares, then no draw occurs
    if (all_without_kings & bitboard_consts::CELLS_WHITE).is_nonempty()
        && (all_without_kings & bitboard_consts::CELLS_BLACK).is_nonempty()
    {
        return false;
    }

    if all_without_kings.is_empty() {
        return true;
    }

    let knights = pos.piece2(Color::White, Piece::Knight) | pos.piece2(Color::Black, Piece::Knight);
    if all_without_kings == knights && knights.len() == 1 {
        return true;
    }

    // All the pieces stand on the same square color, so we only need them to be bishops
    let bishops = pos.piece2(Color::White, Piece::Bishop) | pos.piece2(Color::Black, Piece::Bishop);
    all_without_kings == bishops
}

/// Calculates the standard chess outcome of the position
///
/// Draws by repetition are not detected, as a position doesn't remember the previous ones.
/// Checkmate and stalemate take precedence over the other outcomes.
pub fn calc_outcome(pos: &Position) -> Option<Outcome> {
    if !has_legal_moves(pos) {
        return if is_check(pos) {
            Some(Outcome::Win {
                side: pos.side.inv(),
                reason: WinReason::Checkmate,
            })
        } else {
            Some(Outcome::Draw(DrawReason::Stalemate))
        };
    }

    if is_insufficient_material(pos) {
        return Some(Outcome::Draw(DrawReason::InsufficientMaterial));
    }

    // This must come last, as the rule is non-strict
    if pos.move_counter >= 100 {
        return Some(Outcome::Draw(DrawReason::Moves50));
    }

    None
}
