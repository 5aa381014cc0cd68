//! # Base types for hpchess
//!
//! This is an auxiliary crate for `hpchess`, which contains the board vocabulary: squares, colors,
//! pieces, castling rights and bitboards. Everything here is independent of the hit point rules.
//!
//! Normally you don't want to use this crate directly. Use `hpchess` instead.

pub mod bitboard;
pub mod bitboard_consts;
pub mod geometry;
pub mod types;
