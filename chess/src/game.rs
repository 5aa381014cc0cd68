//! Hit point chess rules engine

use crate::hp::{CapturedPiece, Hp, HpLedger};
use crate::moves::{self, MoveKind, PromotePiece};
use crate::position::{FenParseError, Position};
use crate::types::{CastlingSide, Cell, Color, Coord, File, Outcome, Piece, Rank, WinReason};
use crate::{attack, castling, geometry, movegen};

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

/// Kind of a generated move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveFlag {
    Normal,
    Capture,
    CastleKingside,
    CastleQueenside,
}

impl From<CastlingSide> for MoveFlag {
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => MoveFlag::CastleKingside,
            CastlingSide::Queen => MoveFlag::CastleQueenside,
        }
    }
}

/// Move offered by [`HpChess::valid_moves()`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveDescriptor {
    pub src: Coord,
    pub dst: Coord,
    pub color: Color,
    pub piece: Piece,
    pub flag: MoveFlag,
    /// Short algebraic notation, without disambiguation
    pub notation: String,
}

/// Piece as seen by [`HpChess::board()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BoardPiece {
    pub color: Color,
    pub piece: Piece,
    pub hp: Hp,
}

/// What happened during [`HpChess::make_move()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The destination was empty
    Moved,
    /// The defender lost all its hit points
    Killed { victim: CapturedPiece },
    /// The defender survived and was moved to `square`
    Relocated {
        color: Color,
        piece: Piece,
        square: Coord,
        hp: Hp,
    },
    /// The defender survived, but there was no free square to put it on
    Eliminated { victim: CapturedPiece },
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum EngineError {
    #[error("no piece on {0}")]
    EmptySource(Coord),
}

/// Hit point chess game
///
/// Owns the position together with the hit point ledger and the captured pieces. Move generation
/// ignores pins and lets the king walk into attacked squares, captures are resolved as damage,
/// and the game ends when a king runs out of hit points.
///
/// # Example
///
/// ```
/// # use hpchess::{HpChess, Resolution, Color, Coord};
/// # use std::str::FromStr;
/// #
/// let mut game = HpChess::new();
/// let e2 = Coord::from_str("e2").unwrap();
/// let e4 = Coord::from_str("e4").unwrap();
/// assert!(game.destinations(e2).contains(&e4));
/// assert_eq!(game.make_move(e2, e4), Ok(Resolution::Moved));
/// assert_eq!(game.turn(), Color::Black);
/// assert_eq!(game.hp(e4).map(|hp| hp.current), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpChess {
    pos: Position,
    ledger: HpLedger,
    captured: [Vec<CapturedPiece>; 2],
}

impl HpChess {
    /// Starts a new game from the standard initial position
    pub fn new() -> HpChess {
        HpChess::from_position(Position::initial())
    }

    /// Starts a game from the given position, with every piece at full hit points
    pub fn from_position(mut pos: Position) -> HpChess {
        pos.sanitize_castling();
        HpChess {
            ledger: HpLedger::from_position(&pos),
            pos,
            captured: [Vec::new(), Vec::new()],
        }
    }

    pub fn from_fen(fen: &str) -> Result<HpChess, FenParseError> {
        Ok(HpChess::from_position(Position::from_fen(fen)?))
    }

    /// Discards the whole game and starts a new one
    pub fn reset(&mut self) {
        *self = HpChess::new();
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.pos.side
    }

    #[inline]
    pub fn hp(&self, c: Coord) -> Option<Hp> {
        self.ledger.get(c)
    }

    #[inline]
    pub fn ledger(&self) -> &HpLedger {
        &self.ledger
    }

    /// Pieces of color `c` taken off the board, in order of removal
    #[inline]
    pub fn captured(&self, c: Color) -> &[CapturedPiece] {
        &self.captured[c.index()]
    }

    /// Returns the board as rows from rank 8 to rank 1, each row from file a to file h
    pub fn board(&self) -> [[Option<BoardPiece>; 8]; 8] {
        let mut res = [[None; 8]; 8];
        for (row, rank) in res.iter_mut().zip(Rank::iter()) {
            for (item, file) in row.iter_mut().zip(File::iter()) {
                let c = Coord::from_parts(file, rank);
                *item = self.pos.get(c).parts().map(|(color, piece)| BoardPiece {
                    color,
                    piece,
                    hp: self.ledger.get(c).unwrap_or(Hp::UNKNOWN),
                });
            }
        }
        res
    }

    /// Places `cell` on `c`, leaving the ledger as is
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.pos.put(c, cell);
        self.pos.sanitize_castling();
    }

    /// Clears `c`, leaving the ledger as is
    pub fn remove(&mut self, c: Coord) -> Cell {
        let cell = self.pos.remove(c);
        self.pos.sanitize_castling();
        cell
    }

    pub fn set_hp(&mut self, c: Coord, hp: Hp) {
        self.ledger.set(c, hp);
    }

    /// Restores full hit points for every piece on the board and drops all other entries
    pub fn reset_hp(&mut self) {
        self.ledger = HpLedger::from_position(&self.pos);
    }

    fn describe(&self, src: Coord, dst: Coord, color: Color, piece: Piece) -> MoveDescriptor {
        let flag = match self.pos.get(dst).is_occupied() {
            true => MoveFlag::Capture,
            false => MoveFlag::Normal,
        };
        MoveDescriptor {
            src,
            dst,
            color,
            piece,
            flag,
            notation: String::new(),
        }
    }

    fn king_moves(&self, src: Coord, color: Color) -> Vec<MoveDescriptor> {
        let mut res: Vec<_> = attack::king(src)
            .into_iter()
            .filter(|dst| self.pos.get(*dst).color() != Some(color))
            .map(|dst| {
                let mut desc = self.describe(src, dst, color, Piece::King);
                desc.notation = match desc.flag {
                    MoveFlag::Capture => format!("Kx{}", dst),
                    _ => format!("K{}", dst),
                };
                desc
            })
            .collect();

        if src != castling::king_src(color) {
            return res;
        }
        let occupied = self.pos.occupied();
        for side in CastlingSide::BOTH {
            if !self.pos.castling.has(color, side)
                || (castling::pass(color, side) & occupied).is_nonempty()
            {
                continue;
            }
            res.push(MoveDescriptor {
                src,
                dst: castling::king_dst(color, side),
                color,
                piece: Piece::King,
                flag: MoveFlag::from(side),
                notation: moves::castling_notation(side).to_string(),
            });
        }
        res
    }

    /// Returns the moves of the piece on `src`
    ///
    /// The king may step onto any adjacent square not occupied by a friendly piece, attacked or
    /// not, and may castle whenever the rights are kept and the path is empty. Other pieces follow
    /// the standard rules, except that pins are ignored. Pawns always promote to a queen, and en
    /// passant is never offered.
    ///
    /// Non-king pieces only move on their side's turn. The result is empty if `src` is empty.
    pub fn valid_moves(&self, src: Coord) -> Vec<MoveDescriptor> {
        let Some((color, piece)) = self.pos.get(src).parts() else {
            return Vec::new();
        };
        if piece == Piece::King {
            return self.king_moves(src, color);
        }

        let mut probe = self.pos;
        if let Some(king) = probe.king_pos(color) {
            // The king's square stays blocked for sliders, but nothing can be pinned to it
            probe.put(king, Cell::from_parts(color, Piece::Pawn));
        }
        movegen::legal_moves_from(&probe, src)
            .iter()
            .filter(|mv| {
                mv.kind() != MoveKind::Enpassant
                    && mv.kind().promote().map_or(true, |p| p == PromotePiece::Queen)
            })
            .map(|mv| {
                let mut desc = self.describe(src, mv.dst(), color, piece);
                desc.notation = mv.notation(&self.pos);
                desc
            })
            .collect()
    }

    /// Returns the distinct destination squares of [`HpChess::valid_moves()`]
    pub fn destinations(&self, src: Coord) -> Vec<Coord> {
        let mut res: Vec<Coord> = Vec::new();
        for desc in self.valid_moves(src) {
            if !res.contains(&desc.dst) {
                res.push(desc.dst);
            }
        }
        res
    }

    /// Returns the first free square for a surviving piece of color `c`
    ///
    /// The back rank is scanned from file a to file h, then the rank in front of it.
    pub fn relocation_square(&self, c: Color) -> Option<Coord> {
        [geometry::back_rank(c), geometry::front_rank(c)]
            .into_iter()
            .flat_map(|rank| File::iter().map(move |file| Coord::from_parts(file, rank)))
            .find(|sq| self.pos.get(*sq).is_free())
    }

    fn backfill(&mut self, c: Coord, piece: Piece) -> Hp {
        if let Some(hp) = self.ledger.get(c) {
            return hp;
        }
        let hp = Hp::full(piece);
        warn!(square = %c, %hp, "no hit points recorded, using the table value");
        self.ledger.set(c, hp);
        hp
    }

    fn move_manually(&mut self, src: Coord, dst: Coord) {
        let Some((color, piece)) = self.pos.remove(src).parts() else {
            return;
        };
        let was_capture = self.pos.get(dst).is_occupied();
        let landed = match piece {
            Piece::Pawn if dst.rank() == geometry::promote_dst_rank(color) => Piece::Queen,
            _ => piece,
        };
        self.pos.put(dst, Cell::from_parts(color, landed));

        if piece == Piece::King {
            if let Some(side) = castling::king_step_side(src, dst) {
                let rook_src = Coord::from_parts(castling::rook_src(color, side).file(), src.rank());
                let rook_dst = Coord::from_parts(castling::rook_dst(color, side).file(), src.rank());
                let rook = Cell::from_parts(color, Piece::Rook);
                if self.pos.get(rook_src) == rook {
                    self.pos.remove(rook_src);
                    self.pos.put(rook_dst, rook);
                    self.ledger.migrate(rook_src, rook_dst);
                }
            }
            self.pos.castling.unset_color(color);
        }

        self.pos.ep_source = None;
        if piece == Piece::Pawn || was_capture {
            self.pos.move_counter = 0;
        } else {
            self.pos.move_counter = self.pos.move_counter.saturating_add(1);
        }
        // the mover may be a king moving out of turn, so the flag flips regardless of its color
        if self.pos.side == Color::Black {
            self.pos.move_number = self.pos.move_number.saturating_add(1);
        }
        self.pos.side = self.pos.side.inv();
    }

    /// Moves the piece from `src` to `dst` on the position, whether the move is legal or not
    fn force_move(&mut self, src: Coord, dst: Coord) {
        let cell = self.pos.get(src);
        let pawn_steps_aside = cell.piece() == Some(Piece::Pawn)
            && src.file() != dst.file()
            && self.pos.get(dst).is_free();
        if pawn_steps_aside {
            // Would be en passant for the standard rules
            debug!(%src, %dst, "moving pawn diagonally without capture");
        } else {
            match moves::make_move(&mut self.pos, src, dst, Some(PromotePiece::Queen)) {
                Ok(mv) => {
                    if let Some(side) = mv.kind().castling() {
                        self.ledger.migrate(
                            castling::rook_src(mv.side(), side),
                            castling::rook_dst(mv.side(), side),
                        );
                    }
                    return;
                }
                Err(err) => warn!(%src, %dst, %err, "standard move rejected, forcing it"),
            }
        }
        self.move_manually(src, dst);
    }

    /// Makes the move from `src` to `dst`
    ///
    /// The move is not checked against [`HpChess::valid_moves()`]. If `dst` holds a piece, the
    /// attacker deals damage equal to its current hit points. A defender left without hit points
    /// is captured. Otherwise it is relocated with [`HpChess::relocation_square()`], or captured
    /// if no square is free.
    ///
    /// Fails only if `src` is empty, in which case nothing changes.
    pub fn make_move(&mut self, src: Coord, dst: Coord) -> Result<Resolution, EngineError> {
        let (_, piece) = self
            .pos
            .get(src)
            .parts()
            .ok_or(EngineError::EmptySource(src))?;
        let res = match self.pos.get(dst).parts() {
            None => {
                self.force_move(src, dst);
                self.ledger.migrate(src, dst);
                Resolution::Moved
            }
            Some((def_color, def_piece)) => {
                let attacker = self.backfill(src, piece);
                let defender = self.backfill(dst, def_piece);
                let remaining = defender.damaged(attacker.current);
                debug!(
                    %src,
                    %dst,
                    damage = attacker.current,
                    before = %defender,
                    after = %remaining,
                    "combat"
                );

                self.ledger.take(dst);
                self.force_move(src, dst);
                self.ledger.migrate(src, dst);
                if remaining.is_alive() {
                    self.relocate(def_color, def_piece, remaining)
                } else {
                    let victim = CapturedPiece {
                        color: def_color,
                        piece: def_piece,
                        hp: remaining,
                    };
                    self.captured[def_color.index()].push(victim);
                    Resolution::Killed { victim }
                }
            }
        };
        self.pos.sanitize_castling();
        Ok(res)
    }

    fn relocate(&mut self, color: Color, piece: Piece, hp: Hp) -> Resolution {
        match self.relocation_square(color) {
            Some(square) => {
                debug!(%square, piece = piece.name(), %hp, "relocating survivor");
                self.pos.put(square, Cell::from_parts(color, piece));
                self.ledger.set(square, hp);
                Resolution::Relocated {
                    color,
                    piece,
                    square,
                    hp,
                }
            }
            None => {
                warn!(piece = piece.name(), %hp, "no free square to relocate, piece is lost");
                let victim = CapturedPiece { color, piece, hp };
                self.captured[color.index()].push(victim);
                Resolution::Eliminated { victim }
            }
        }
    }

    /// Returns `true` if some enemy piece can reach the king of color `c` on the next move and
    /// deal at least as much damage as the king has hit points
    ///
    /// Returns `false` if the king is not on the board, or if the position doesn't allow the
    /// opponent to move.
    ///
    /// Attackers are taken from standard legal moves, so an enemy piece that would leave its own
    /// king in check is not counted.
    pub fn is_king_in_lethal_danger(&self, c: Color) -> bool {
        let Some(king) = self.pos.king_pos(c) else {
            return false;
        };
        let king_hp = self.ledger.get(king).unwrap_or(Hp::UNKNOWN).current;

        let enemy = c.inv();
        let mut probe = self.pos;
        if probe.side != enemy {
            probe.side = enemy;
            probe.ep_source = None;
            if let Err(err) = probe.validate() {
                warn!(%err, "cannot pass the move to {}", enemy.name());
                return false;
            }
        }

        let max_damage = probe
            .color(enemy)
            .into_iter()
            .filter(|src| {
                movegen::legal_moves_from(&probe, *src)
                    .iter()
                    .any(|mv| mv.dst() == king)
            })
            .map(|src| self.ledger.get(src).unwrap_or(Hp::UNKNOWN).current)
            .max();
        max_damage.map_or(false, |damage| damage >= king_hp)
    }

    fn slain_king(&self) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|c| self.captured(*c).iter().any(|p| p.piece == Piece::King))
    }

    /// Returns the game outcome, or `None` if the game goes on
    ///
    /// A captured king ends the game. While both kings are on the board, standard checkmate,
    /// stalemate and draw rules apply to the current position.
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(loser) = self.slain_king() {
            return Some(Outcome::Win {
                side: loser.inv(),
                reason: WinReason::KingSlain,
            });
        }
        if self.pos.king_pos(Color::White).is_none() || self.pos.king_pos(Color::Black).is_none() {
            return None;
        }
        movegen::calc_outcome(&self.pos)
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    #[inline]
    pub fn winner(&self) -> Option<Color> {
        self.outcome().and_then(|o| o.winner())
    }
}

impl Default for HpChess {
    fn default() -> HpChess {
        HpChess::new()
    }
}

impl fmt::Display for HpChess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (row, rank) in self.board().iter().zip(Rank::iter()) {
            write!(f, "{}|", rank)?;
            for item in row {
                match item {
                    Some(p) => {
                        let cell = Cell::from_parts(p.color, p.piece);
                        write!(f, " {}{:<2}", cell.as_char(), p.hp.current)?;
                    }
                    None => write!(f, " .  ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "-+")?;
        for _ in File::iter() {
            write!(f, "----")?;
        }
        writeln!(f)?;
        write!(f, "{}|", self.turn().as_char().to_ascii_uppercase())?;
        for file in File::iter() {
            write!(f, " {}  ", file)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CastlingRights;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn game(fen: &str) -> HpChess {
        HpChess::from_fen(fen).unwrap()
    }

    fn dsts(g: &HpChess, src: &str) -> Vec<String> {
        let mut res: Vec<_> = g
            .destinations(sq(src))
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        res.sort();
        res
    }

    #[test]
    fn test_initial() {
        let g = HpChess::new();
        assert_eq!(g.turn(), Color::White);
        assert_eq!(g.hp(sq("d1")), Some(Hp::new(9, 9)));
        assert_eq!(g.hp(sq("e8")), Some(Hp::new(10, 10)));
        assert_eq!(g.hp(sq("e4")), None);
        assert_eq!(dsts(&g, "b1"), vec!["a3", "c3"]);
        assert_eq!(dsts(&g, "e2"), vec!["e3", "e4"]);
        assert!(g.valid_moves(sq("e7")).is_empty());
        assert!(g.valid_moves(sq("e4")).is_empty());
        assert!(!g.is_game_over());
        assert_eq!(g.winner(), None);

        let board = g.board();
        assert_eq!(
            board[0][4],
            Some(BoardPiece {
                color: Color::Black,
                piece: Piece::King,
                hp: Hp::new(10, 10)
            })
        );
        assert_eq!(board[7][0].map(|p| p.piece), Some(Piece::Rook));
        assert_eq!(board[4][4], None);
    }

    #[test]
    fn test_descriptors() {
        let g = game("4k3/8/8/3p4/4P3/5N2/8/4K3 w - - 0 1");
        let moves = g.valid_moves(sq("e4"));
        let capture = moves.iter().find(|m| m.dst == sq("d5")).unwrap();
        assert_eq!(capture.flag, MoveFlag::Capture);
        assert_eq!(capture.notation, "exd5");
        assert_eq!(capture.piece, Piece::Pawn);
        assert_eq!(capture.color, Color::White);
        let knight = g.valid_moves(sq("f3"));
        assert!(knight
            .iter()
            .any(|m| m.notation == "Nd4" && m.flag == MoveFlag::Normal));
    }

    #[test]
    fn test_pins_ignored() {
        let g = game("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        assert_eq!(
            dsts(&g, "e2"),
            vec!["a2", "b2", "c2", "d2", "e3", "e4", "e5", "e6", "e7", "e8", "f2", "g2", "h2"]
        );
    }

    #[test]
    fn test_king_square_blocks() {
        let g = game("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert_eq!(
            dsts(&g, "a1"),
            vec!["a2", "a3", "a4", "a5", "a6", "a7", "a8", "b1", "c1", "d1"]
        );
    }

    #[test]
    fn test_king_walks_into_danger() {
        let g = game("3rk3/8/8/4P3/4K3/8/8/8 w - - 0 1");
        assert_eq!(
            dsts(&g, "e4"),
            vec!["d3", "d4", "d5", "e3", "f3", "f4", "f5"]
        );
        // kings move out of turn too
        assert_eq!(dsts(&g, "e8"), vec!["d7", "e7", "f7", "f8"]);
    }

    #[test]
    fn test_castling_offered() {
        let g = game("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = g.valid_moves(sq("e1"));
        let flags: Vec<_> = moves
            .iter()
            .filter(|m| m.flag != MoveFlag::Normal)
            .map(|m| (m.dst.to_string(), m.flag, m.notation.clone()))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("g1".to_string(), MoveFlag::CastleKingside, "O-O".to_string()),
                ("c1".to_string(), MoveFlag::CastleQueenside, "O-O-O".to_string()),
            ]
        );

        // attacked squares don't matter, blocked ones do
        let g = game("r3kr2/8/8/8/8/8/8/RN2K2R w KQq - 0 1");
        let targets = dsts(&g, "e1");
        assert!(targets.contains(&"g1".to_string()));
        assert!(!targets.contains(&"c1".to_string()));

        // king already attacked
        let g = game("4r1k1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(dsts(&g, "e1").contains(&"g1".to_string()));
        // destination attacked
        let g = game("4k1r1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(dsts(&g, "e1").contains(&"g1".to_string()));
    }

    #[test]
    fn test_forced_castling() {
        let mut g = game("4kr2/8/8/8/8/8/8/4K2R w K - 0 1");
        assert_eq!(g.make_move(sq("e1"), sq("g1")), Ok(Resolution::Moved));
        let pos = g.position();
        assert_eq!(pos.get(sq("g1")), Cell::from_parts(Color::White, Piece::King));
        assert_eq!(pos.get(sq("f1")), Cell::from_parts(Color::White, Piece::Rook));
        assert!(pos.get(sq("h1")).is_free());
        assert_eq!(g.hp(sq("f1")), Some(Hp::new(5, 5)));
        assert_eq!(g.hp(sq("g1")), Some(Hp::new(10, 10)));
        assert_eq!(g.hp(sq("h1")), None);
        assert_eq!(pos.castling, CastlingRights::EMPTY);
        assert_eq!(pos.side, Color::Black);
    }

    #[test]
    fn test_king_step_leaves_other_pieces() {
        let mut g = game("4k3/8/8/8/8/8/8/4K2n w - - 0 1");
        assert_eq!(g.make_move(sq("e1"), sq("g1")), Ok(Resolution::Moved));
        let pos = g.position();
        assert_eq!(pos.get(sq("g1")), Cell::from_parts(Color::White, Piece::King));
        assert_eq!(pos.get(sq("h1")), Cell::from_parts(Color::Black, Piece::Knight));
        assert!(pos.get(sq("f1")).is_free());
        assert_eq!(g.hp(sq("h1")), Some(Hp::new(3, 3)));
        assert_eq!(g.hp(sq("f1")), None);
    }

    #[test]
    fn test_king_moves_out_of_turn() {
        let mut g = game("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(g.destinations(sq("e8")).contains(&sq("d8")));
        assert_eq!(g.make_move(sq("e8"), sq("d8")), Ok(Resolution::Moved));
        assert_eq!(g.turn(), Color::Black);
        assert_eq!(g.position().move_number, 1);
        assert_eq!(
            g.position().get(sq("d8")),
            Cell::from_parts(Color::Black, Piece::King)
        );
    }

    #[test]
    fn test_standard_castling() {
        let mut g = game("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        assert_eq!(g.make_move(sq("e8"), sq("c8")), Ok(Resolution::Moved));
        assert_eq!(g.hp(sq("d8")), Some(Hp::new(5, 5)));
        assert_eq!(g.hp(sq("a8")), None);
        assert_eq!(g.position().castling.to_string(), "KQ");
        assert_eq!(g.turn(), Color::White);
    }

    #[test]
    fn test_pinned_move() {
        let mut g = game("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        assert_eq!(g.make_move(sq("e2"), sq("a2")), Ok(Resolution::Moved));
        assert_eq!(g.position().get(sq("a2")), Cell::from_parts(Color::White, Piece::Rook));
        assert_eq!(g.hp(sq("a2")), Some(Hp::new(5, 5)));
        assert_eq!(g.turn(), Color::Black);
        assert!(!g.is_king_in_lethal_danger(Color::White));
    }

    #[test]
    fn test_empty_source() {
        let mut g = HpChess::new();
        let before = g.clone();
        assert_eq!(
            g.make_move(sq("e4"), sq("e5")),
            Err(EngineError::EmptySource(sq("e4")))
        );
        assert_eq!(g, before);
    }

    #[test]
    fn test_kill() {
        let mut g = game("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let res = g.make_move(sq("e4"), sq("d5")).unwrap();
        let victim = CapturedPiece {
            color: Color::Black,
            piece: Piece::Pawn,
            hp: Hp::new(0, 1),
        };
        assert_eq!(res, Resolution::Killed { victim });
        assert_eq!(g.captured(Color::Black), &[victim]);
        assert_eq!(g.hp(sq("d5")), Some(Hp::new(1, 1)));
        assert_eq!(g.hp(sq("e4")), None);
        assert_eq!(g.position().get(sq("d5")), Cell::from_parts(Color::White, Piece::Pawn));
    }

    #[test]
    fn test_even_trade() {
        let mut g = game("r3k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let res = g.make_move(sq("a1"), sq("a8")).unwrap();
        let victim = CapturedPiece {
            color: Color::Black,
            piece: Piece::Rook,
            hp: Hp::new(0, 5),
        };
        assert_eq!(res, Resolution::Killed { victim });
        assert_eq!(g.hp(sq("a8")), Some(Hp::new(5, 5)));
        assert_eq!(g.position().castling, CastlingRights::EMPTY);
    }

    #[test]
    fn test_weakened_attacker() {
        let mut g = game("r3k3/8/8/8/8/8/8/Q3K3 w - - 0 1");
        g.set_hp(sq("a1"), Hp::new(2, 9));
        let res = g.make_move(sq("a1"), sq("a8")).unwrap();
        assert_eq!(
            res,
            Resolution::Relocated {
                color: Color::Black,
                piece: Piece::Rook,
                square: sq("b8"),
                hp: Hp::new(3, 5),
            }
        );
        assert_eq!(g.hp(sq("a8")), Some(Hp::new(2, 9)));
        assert_eq!(g.hp(sq("b8")), Some(Hp::new(3, 5)));
        assert_eq!(g.position().get(sq("b8")), Cell::from_parts(Color::Black, Piece::Rook));
    }

    #[test]
    fn test_relocation_order() {
        let g = game("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(g.relocation_square(Color::White), None);
        let g = game("rnbqkbnr/p1pppppp/8/8/8/8/PPPPPPPP/RNBQKB1R w KQkq - 0 1");
        assert_eq!(g.relocation_square(Color::White), Some(sq("g1")));
        assert_eq!(g.relocation_square(Color::Black), Some(sq("b7")));
    }

    #[test]
    fn test_no_relocation_square() {
        let mut g = game("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        g.put(sq("e5"), Cell::from_parts(Color::Black, Piece::Queen));
        g.put(sq("d4"), Cell::from_parts(Color::White, Piece::Pawn));
        g.set_hp(sq("d4"), Hp::new(1, 1));
        // the queen is missing from the ledger, so it's backfilled
        let res = g.make_move(sq("d4"), sq("e5")).unwrap();
        let victim = CapturedPiece {
            color: Color::Black,
            piece: Piece::Queen,
            hp: Hp::new(8, 9),
        };
        assert_eq!(res, Resolution::Eliminated { victim });
        assert_eq!(g.captured(Color::Black), &[victim]);
        assert_eq!(g.hp(sq("e5")), Some(Hp::new(1, 1)));
    }

    #[test]
    fn test_scenario_king_slain() {
        let mut g = game("8/3Qk3/8/8/8/8/8/8 w - - 0 1");
        g.set_hp(sq("d7"), Hp::new(10, 10));
        g.set_hp(sq("e7"), Hp::new(1, 10));
        let res = g.make_move(sq("d7"), sq("e7")).unwrap();
        assert!(matches!(res, Resolution::Killed { .. }));
        assert!(g.is_game_over());
        assert_eq!(g.winner(), Some(Color::White));
        assert_eq!(
            g.outcome(),
            Some(Outcome::Win {
                side: Color::White,
                reason: WinReason::KingSlain
            })
        );
        assert_eq!(g.captured(Color::Black)[0].hp, Hp::new(0, 10));
        assert!(!g.is_king_in_lethal_danger(Color::Black));
    }

    #[test]
    fn test_scenario_king_relocated() {
        let mut g = game("8/3Qk3/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(g.hp(sq("d7")), Some(Hp::new(9, 9)));
        let res = g.make_move(sq("d7"), sq("e7")).unwrap();
        let Resolution::Relocated { square, hp, .. } = res else {
            panic!("unexpected resolution {:?}", res);
        };
        assert!(matches!(square.rank(), Rank::R7 | Rank::R8));
        assert_eq!(hp, Hp::new(1, 10));
        assert_eq!(g.hp(square), Some(Hp::new(1, 10)));
        assert_eq!(
            g.position().get(square),
            Cell::from_parts(Color::Black, Piece::King)
        );
        assert_eq!(g.position().get(sq("e7")), Cell::from_parts(Color::White, Piece::Queen));
        assert!(g.captured(Color::Black).is_empty());
        assert!(!g.is_game_over());
        assert_eq!(g.winner(), None);
    }

    #[test]
    fn test_scenario_lethal_danger() {
        let mut g = game("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1");
        assert!(!g.is_king_in_lethal_danger(Color::White));
        g.remove(sq("d2"));
        g.put(sq("e2"), Cell::from_parts(Color::Black, Piece::Queen));
        g.set_hp(sq("e2"), Hp::new(10, 10));
        assert!(g.is_king_in_lethal_danger(Color::White));
        assert!(!g.is_king_in_lethal_danger(Color::Black));

        // a weakened king is in danger from a pawn
        let mut g = game("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1");
        g.set_hp(sq("e1"), Hp::new(1, 10));
        assert!(g.is_king_in_lethal_danger(Color::White));
    }

    #[test]
    fn test_danger_defaults() {
        // missing entries count as 1 hit point on both sides
        let mut g = game("4k3/8/8/8/8/8/3p4/4K3 b - - 0 1");
        g.ledger = HpLedger::empty();
        assert!(g.is_king_in_lethal_danger(Color::White));

        // no king, no danger
        let g = game("4k3/8/8/8/8/8/4q3/8 w - - 0 1");
        assert!(!g.is_king_in_lethal_danger(Color::White));

        // the opponent can't be given the move
        let mut g = game("8/8/8/8/8/8/4q3/4K3 w - - 0 1");
        g.set_hp(sq("e1"), Hp::new(1, 10));
        assert!(!g.is_king_in_lethal_danger(Color::White));
    }

    #[test]
    fn test_board_defaults() {
        let mut g = HpChess::new();
        g.put(sq("e4"), Cell::from_parts(Color::White, Piece::Queen));
        assert_eq!(g.hp(sq("e4")), None);
        assert_eq!(g.board()[4][4].map(|p| p.hp), Some(Hp::new(1, 1)));
        assert_eq!(g.hp(sq("e4")), None);
        g.reset_hp();
        assert_eq!(g.hp(sq("e4")), Some(Hp::new(9, 9)));
    }

    #[test]
    fn test_promotion() {
        let mut g = game("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        g.set_hp(sq("b7"), Hp::new(1, 1));
        let moves = g.valid_moves(sq("b7"));
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].notation, "b8=Q");
        g.make_move(sq("b7"), sq("b8")).unwrap();
        assert_eq!(g.position().get(sq("b8")), Cell::from_parts(Color::White, Piece::Queen));
        assert_eq!(g.hp(sq("b8")), Some(Hp::new(1, 1)));
    }

    #[test]
    fn test_no_enpassant() {
        let g = game("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        assert_eq!(dsts(&g, "e5"), vec!["e6"]);
    }

    #[test]
    fn test_reset() {
        let mut g = game("8/3Qk3/8/8/8/8/8/8 w - - 0 1");
        g.set_hp(sq("e7"), Hp::new(1, 10));
        g.make_move(sq("d7"), sq("e7")).unwrap();
        assert!(g.is_game_over());
        g.reset();
        assert_eq!(g, HpChess::new());
    }

    #[test]
    fn test_display() {
        let g = HpChess::new();
        let text = g.to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "8| r5  n3  b3  q9  k10 b3  n3  r5 ");
        assert_eq!(text.lines().last().unwrap(), "W| a   b   c   d   e   f   g   h  ");
    }

    #[test]
    fn test_probes_keep_state() {
        let g = game("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = g.clone();
        for src in Coord::iter() {
            let _ = g.valid_moves(src);
        }
        let _ = g.is_king_in_lethal_danger(Color::White);
        let _ = g.is_king_in_lethal_danger(Color::Black);
        assert_eq!(g, before);
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(0x5eed_c0de);
        for _ in 0..10 {
            let mut g = HpChess::new();
            for _ in 0..200 {
                if g.is_game_over() {
                    break;
                }
                let side = g.turn();
                let moves: Vec<_> = g
                    .position()
                    .color(side)
                    .into_iter()
                    .flat_map(|src| g.valid_moves(src))
                    .collect();
                let Some(mv) = moves.choose(&mut rng) else {
                    break;
                };

                let before = g.clone();
                let _ = g.is_king_in_lethal_danger(Color::White);
                let _ = g.is_king_in_lethal_danger(Color::Black);
                assert_eq!(g, before);

                g.make_move(mv.src, mv.dst).unwrap();
                assert_eq!(g.turn(), side.inv());
                let pos = *g.position();
                assert_eq!(g.ledger().missing(&pos).count(), 0, "{}", pos);
                for (c, hp) in g.ledger().iter() {
                    assert!(pos.get(c).is_occupied(), "stale entry on {} in {}", c, pos);
                    assert!(hp.is_alive());
                    assert!(hp.current <= hp.max);
                }
                let captured = g.captured(Color::White).len() + g.captured(Color::Black).len();
                assert_eq!(pos.occupied().len() as usize + captured, 32);
            }
        }
    }
}
