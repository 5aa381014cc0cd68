//! # Hit point chess
//!
//! A chess variant where every piece has hit points. A capture is an attack: the defender loses
//! as many hit points as the attacker currently has. A defender that survives is moved to a free
//! square on its own back ranks, and the game is won by taking all the hit points of the enemy
//! king. Kings may step into attacked squares and pins don't restrict anything.
//!
//! The crate consists of two layers:
//!
//! - a small standard chess substrate: [`Position`], [`movegen`] and [`moves`]
//! - the rules engine [`HpChess`], which bends the substrate to the variant rules
//!
//! The [`relay`] module holds the wire protocol used to keep two players' games in sync.
//!
//! # Example
//!
//! ```
//! use hpchess::{Cell, Color, Coord, Hp, HpChess, Piece, Resolution};
//! use std::str::FromStr;
//!
//! let mut game = HpChess::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
//! let a1 = Coord::from_str("a1").unwrap();
//! let e8 = Coord::from_str("e8").unwrap();
//! let a8 = Coord::from_str("a8").unwrap();
//! game.make_move(a1, a8).unwrap();
//! assert!(!game.is_king_in_lethal_danger(Color::Black));
//!
//! // A rook deals 5 damage, so the king survives and is moved away
//! game.make_move(e8, Coord::from_str("e7").unwrap()).unwrap();
//! game.make_move(a8, Coord::from_str("a7").unwrap()).unwrap();
//! game.make_move(Coord::from_str("e7").unwrap(), Coord::from_str("d7").unwrap()).unwrap();
//! let res = game.make_move(Coord::from_str("a7").unwrap(), Coord::from_str("d7").unwrap());
//! assert_eq!(
//!     res,
//!     Ok(Resolution::Relocated {
//!         color: Color::Black,
//!         piece: Piece::King,
//!         square: Coord::from_str("a8").unwrap(),
//!         hp: Hp::new(5, 10),
//!     })
//! );
//! assert_eq!(game.position().get(a8), Cell::from_parts(Color::Black, Piece::King));
//! assert!(!game.is_game_over());
//! ```

pub mod attack;
pub mod castling;
pub mod game;
pub mod hp;
pub mod movegen;
pub mod moves;
pub mod position;
pub mod relay;

pub use hpchess_base::{bitboard, bitboard_consts, geometry, types};

pub use bitboard::Bitboard;
pub use game::{BoardPiece, EngineError, HpChess, MoveDescriptor, MoveFlag, Resolution};
pub use hp::{CapturedPiece, Hp, HpLedger};
pub use moves::{Move, MoveKind, PromotePiece, UciMove};
pub use position::Position;
pub use types::{
    CastlingRights, CastlingSide, Cell, Color, Coord, DrawReason, File, Outcome, Piece, Rank,
    WinReason,
};
