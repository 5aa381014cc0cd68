//! Hit points and the per-square ledger

use crate::position::Position;
use crate::types::{Color, Coord, Piece};

use std::fmt;

/// Maximum hit points of a freshly placed piece
pub const fn max_hp(p: Piece) -> u8 {
    match p {
        Piece::Pawn => 1,
        Piece::Knight => 3,
        Piece::Bishop => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 10,
    }
}

/// Hit points of a single piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Hp {
    pub current: u8,
    pub max: u8,
}

impl Hp {
    /// Placeholder shown for pieces without a ledger entry
    pub const UNKNOWN: Hp = Hp::new(1, 1);

    #[inline]
    pub const fn new(current: u8, max: u8) -> Hp {
        Hp { current, max }
    }

    /// Full hit points of a new piece
    #[inline]
    pub const fn full(p: Piece) -> Hp {
        Hp::new(max_hp(p), max_hp(p))
    }

    #[inline]
    pub const fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Returns the hit points left after taking `damage`
    #[inline]
    pub const fn damaged(self, damage: u8) -> Hp {
        Hp::new(self.current.saturating_sub(damage), self.max)
    }
}

impl fmt::Display for Hp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// Hit points of the pieces on the board, keyed by square
///
/// The ledger is kept in sync with the position by the game engine. Raw position edits may leave
/// occupied squares without entries, or entries on empty squares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HpLedger([Option<Hp>; 64]);

impl HpLedger {
    pub const fn empty() -> HpLedger {
        HpLedger([None; 64])
    }

    /// Creates a ledger with full hit points for every piece in `pos`
    pub fn from_position(pos: &Position) -> HpLedger {
        let mut res = HpLedger::empty();
        for c in pos.occupied() {
            if let Some(p) = pos.get(c).piece() {
                res.set(c, Hp::full(p));
            }
        }
        res
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Option<Hp> {
        self.0[c.index()]
    }

    #[inline]
    pub fn set(&mut self, c: Coord, hp: Hp) {
        self.0[c.index()] = Some(hp);
    }

    /// Removes the entry on `c` and returns it
    #[inline]
    pub fn take(&mut self, c: Coord) -> Option<Hp> {
        self.0[c.index()].take()
    }

    /// Moves the entry from `src` to `dst`
    ///
    /// Whatever was on `dst` is overwritten. If `src` has no entry, `dst` ends up without one.
    #[inline]
    pub fn migrate(&mut self, src: Coord, dst: Coord) {
        self.0[dst.index()] = self.0[src.index()].take();
    }

    /// Squares occupied in `pos` that have no entry
    pub fn missing(&self, pos: &Position) -> impl Iterator<Item = Coord> + '_ {
        pos.occupied().into_iter().filter(|c| self.get(*c).is_none())
    }

    /// Iterates over all the entries
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Hp)> + '_ {
        Coord::iter().filter_map(|c| Some((c, self.get(c)?)))
    }
}

impl Default for HpLedger {
    fn default() -> HpLedger {
        HpLedger::empty()
    }
}

/// Piece taken off the board
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CapturedPiece {
    pub color: Color,
    pub piece: Piece,
    /// Hit points at the moment of removal
    ///
    /// Zero for killed pieces, and the remaining hit points for pieces that survived but had
    /// nowhere to go.
    pub hp: Hp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_table() {
        let table: Vec<_> = Piece::ALL.iter().map(|p| max_hp(*p)).collect();
        assert_eq!(table, vec![1, 10, 3, 3, 5, 9]);
        assert_eq!(Hp::full(Piece::Rook).to_string(), "5/5");
        assert_eq!(Hp::new(3, 9).damaged(5), Hp::new(0, 9));
        assert!(!Hp::new(3, 9).damaged(3).is_alive());
        assert_eq!(Hp::new(10, 10).damaged(9), Hp::new(1, 10));
    }

    #[test]
    fn test_ledger() {
        let pos = Position::initial();
        let mut ledger = HpLedger::from_position(&pos);
        assert_eq!(ledger.iter().count(), 32);
        assert_eq!(ledger.missing(&pos).count(), 0);

        let e1 = Coord::from_str("e1").unwrap();
        let e4 = Coord::from_str("e4").unwrap();
        let e5 = Coord::from_str("e5").unwrap();
        assert_eq!(ledger.get(e1), Some(Hp::new(10, 10)));
        ledger.migrate(e1, e4);
        assert_eq!(ledger.get(e1), None);
        assert_eq!(ledger.get(e4), Some(Hp::new(10, 10)));
        assert_eq!(ledger.missing(&pos).collect::<Vec<_>>(), vec![e1]);

        ledger.migrate(e5, e4);
        assert_eq!(ledger.get(e4), None);
        assert_eq!(ledger.take(e1), None);
    }
}
