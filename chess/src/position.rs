//! Chess position and its textual forms

use crate::bitboard::Bitboard;
use crate::castling;
use crate::geometry;
use crate::types::{
    self, CastlingRights, CastlingSide, Cell, Color, Coord, File, Piece, Rank,
};

use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Position validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
}

/// Error parsing the first part of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    #[error("too many ranks")]
    Overflow,
    #[error("not enough ranks")]
    Underflow,
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing [`Position`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    #[error("non-ASCII data in FEN")]
    NonAscii,
    #[error("board not specified")]
    NoBoard,
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    #[error("no move side")]
    NoMoveSide,
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    #[error("no castling rights")]
    NoCastling,
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    #[error("no enpassant")]
    NoEnpassant,
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] types::CoordParseError),
    #[error("invalid enpassant rank {0}")]
    InvalidEnpassantRank(Rank),
    #[error("bad move counter: {0}")]
    MoveCounter(ParseIntError),
    #[error("bad move number: {0}")]
    MoveNumber(ParseIntError),
    #[error("extra data in FEN")]
    ExtraData,
}

/// Chess position
///
/// This is a plain value: piece placement, side to move, castling rights, en passant source and
/// move counters. Edits via [`Position::put()`] and [`Position::remove()`] are never validated,
/// so the position may temporarily lack a king or hold pawns on the edge ranks. Move generation
/// copes with such positions, and [`Position::validate()`] reports the ones a standard game can't
/// contain.
///
/// Since `Position` is `Copy`, any what-if computation can work on a copy and simply drop it.
///
/// # Example
///
/// ```
/// # use hpchess::{Position, File, Rank, Color, Piece, Cell};
/// #
/// let mut pos = Position::empty();
/// pos.put(hpchess::Coord::from_parts(File::B, Rank::R2), Cell::from_parts(Color::White, Piece::King));
/// pos.put(hpchess::Coord::from_parts(File::D, Rank::R5), Cell::from_parts(Color::Black, Piece::King));
/// assert_eq!(pos.as_fen(), "8/8/8/3k4/8/8/1K6/8 w - - 0 1");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    /// Contents of the board, indexed by [`Coord::index()`]
    pub cells: [Cell; 64],
    /// Side to move
    pub side: Color,
    /// Castling rights
    pub castling: CastlingRights,
    /// Square of the pawn which can be captured en passant, if any
    pub ep_source: Option<Coord>,
    /// Number of half-moves without pawn moves or captures
    pub move_counter: u16,
    /// Move number, incremented after each move by Black
    pub move_number: u16,
}

impl Position {
    /// Returns a position with no pieces and White to move
    pub const fn empty() -> Position {
        Position {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep_source: None,
            move_counter: 0,
            move_number: 1,
        }
    }

    /// Returns the standard starting position
    pub fn initial() -> Position {
        let mut res = Position {
            castling: CastlingRights::FULL,
            ..Position::empty()
        };
        for file in File::iter() {
            res.put2(file, Rank::R2, Cell::from_parts(Color::White, Piece::Pawn));
            res.put2(file, Rank::R7, Cell::from_parts(Color::Black, Piece::Pawn));
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            for (file, piece) in File::iter().zip([
                Piece::Rook,
                Piece::Knight,
                Piece::Bishop,
                Piece::Queen,
                Piece::King,
                Piece::Bishop,
                Piece::Knight,
                Piece::Rook,
            ]) {
                res.put2(file, rank, Cell::from_parts(color, piece));
            }
        }
        res
    }

    /// Parses a position from FEN
    #[inline]
    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        Position::from_str(fen)
    }

    /// Converts the position into a FEN string
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
    }

    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Clears the square and returns what was standing there
    #[inline]
    pub fn remove(&mut self, c: Coord) -> Cell {
        std::mem::take(&mut self.cells[c.index()])
    }

    /// Returns the bitboards for each cell kind, indexed by [`Cell::index()`]
    pub fn piece_boards(&self) -> [Bitboard; Cell::COUNT] {
        let mut res = [Bitboard::EMPTY; Cell::COUNT];
        for c in Coord::iter() {
            res[self.get(c).index()].set(c);
        }
        res
    }

    /// Returns the bitboard over all the squares equal to `cell`
    pub fn piece(&self, cell: Cell) -> Bitboard {
        Coord::iter().filter(|c| self.get(*c) == cell).collect()
    }

    #[inline]
    pub fn piece2(&self, c: Color, p: Piece) -> Bitboard {
        self.piece(Cell::from_parts(c, p))
    }

    /// Returns the bitboard over all the pieces of color `c`
    pub fn color(&self, c: Color) -> Bitboard {
        Coord::iter()
            .filter(|sq| self.get(*sq).color() == Some(c))
            .collect()
    }

    /// Returns the bitboard over all the occupied squares
    pub fn occupied(&self) -> Bitboard {
        Coord::iter().filter(|c| self.get(*c).is_occupied()).collect()
    }

    /// Returns the position of the king of color `c`, or `None` if it's not on the board
    pub fn king_pos(&self, c: Color) -> Option<Coord> {
        self.piece2(c, Piece::King).first()
    }

    /// Returns `None` if no enpassant is allowed. Otherwise, returns the destination
    /// square for the possible enpassant.
    #[inline]
    pub fn ep_dest(&self) -> Option<Coord> {
        let p = self.ep_source?;
        Some(Coord::from_parts(
            p.file(),
            geometry::enpassant_dst_rank(self.side),
        ))
    }

    /// Clears the castling rights which can't be used anymore because the king or the rook
    /// left its initial square
    pub fn sanitize_castling(&mut self) {
        for color in [Color::White, Color::Black] {
            if self.get(castling::king_src(color)) != Cell::from_parts(color, Piece::King) {
                self.castling.unset_color(color);
            }
            for side in CastlingSide::BOTH {
                if self.get(castling::rook_src(color, side)) != Cell::from_parts(color, Piece::Rook)
                {
                    self.castling.unset(color, side);
                }
            }
        }
    }

    /// Checks whether the position can appear in a standard game
    ///
    /// Unlike the standard chess rules, pawns on the first and the last rank are accepted.
    pub fn validate(&self) -> Result<(), ValidateError> {
        for color in [Color::White, Color::Black] {
            if self.color(color).len() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            match self.piece2(color, Piece::King).len() {
                0 => return Err(ValidateError::NoKing(color)),
                1 => {}
                _ => return Err(ValidateError::TooManyKings(color)),
            }
        }
        Ok(())
    }

    /// Wraps the position to allow pretty-printing with the given style
    ///
    /// ```
    /// # use hpchess::{Position, position::PrettyStyle};
    /// #
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// let pos = Position::initial();
    /// assert_eq!(pos.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { pos: self, style }
    }
}

impl Default for Position {
    #[inline]
    fn default() -> Position {
        Position::empty()
    }
}

/// Style for [`Position::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the position
pub struct Pretty<'a> {
    pos: &'a Position,
    style: PrettyStyle,
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let (horz, vert, angle) = match self.style {
            PrettyStyle::Ascii => ('-', '|', '+'),
            PrettyStyle::Utf8 => ('─', '│', '┼'),
        };
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, vert)?;
            for file in File::iter() {
                let cell = self.pos.get2(file, rank);
                let ch = match self.style {
                    PrettyStyle::Ascii => cell.as_char(),
                    PrettyStyle::Utf8 => cell.as_utf8_char(),
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", horz, angle)?;
        for _ in File::iter() {
            write!(f, "{}", horz)?;
        }
        writeln!(f)?;
        let indicator = match (self.style, self.pos.side) {
            (PrettyStyle::Ascii, Color::White) => 'W',
            (PrettyStyle::Ascii, Color::Black) => 'B',
            (PrettyStyle::Utf8, Color::White) => '○',
            (PrettyStyle::Utf8, Color::Black) => '●',
        };
        write!(f, "{}{}", indicator, vert)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)
    }
}

fn parse_cells(s: &str) -> Result<[Cell; 64], CellsParseError> {
    type Error = CellsParseError;

    let mut file = 0_usize;
    let mut rank = 0_usize;
    let mut pos = 0_usize;
    let mut cells = [Cell::EMPTY; 64];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                file += add;
                pos += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(Rank::from_index(rank)));
                }
                rank += 1;
                file = 0;
                if rank >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                cells[pos] = Cell::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?;
                file += 1;
                pos += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(Rank::from_index(rank)));
    }
    if rank < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

fn parse_ep_source(s: &str, side: Color) -> Result<Option<Coord>, FenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let enpassant = Coord::from_str(s)?;
    if enpassant.rank() != geometry::enpassant_dst_rank(side) {
        return Err(FenParseError::InvalidEnpassantRank(enpassant.rank()));
    }
    Ok(Some(Coord::from_parts(
        enpassant.file(),
        geometry::enpassant_src_rank(side),
    )))
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        type Error = FenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split_ascii_whitespace().fuse();

        let cells = parse_cells(iter.next().ok_or(Error::NoBoard)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        let castling = CastlingRights::from_str(iter.next().ok_or(Error::NoCastling)?)?;
        let ep_source = parse_ep_source(iter.next().ok_or(Error::NoEnpassant)?, side)?;
        let move_counter = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveCounter)?,
            None => 0,
        };
        let move_number = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::MoveNumber)?,
            None => 1,
        };

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(Position {
            cells,
            side,
            castling,
            ep_source,
            move_counter,
            move_number,
        })
    }
}

fn format_cells(cells: &[Cell; 64], f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    for rank in Rank::iter() {
        if rank.index() != 0 {
            write!(f, "/")?;
        }
        let mut empty = 0;
        for file in File::iter() {
            let cell = cells[Coord::from_parts(file, rank).index()];
            if cell.is_free() {
                empty += 1;
                continue;
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
                empty = 0;
            }
            write!(f, "{}", cell)?;
        }
        if empty != 0 {
            write!(f, "{}", empty)?;
        }
    }
    Ok(())
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        format_cells(&self.cells, f)?;
        write!(f, " {} {}", self.side, self.castling)?;
        match self.ep_dest() {
            Some(p) => write!(f, " {}", p)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.move_counter, self.move_number)
    }
}
