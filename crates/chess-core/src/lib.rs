//! Core value types for chess.
//!
//! This crate provides the fundamental types shared by the rules engine and
//! the match orchestrator:
//! - [`Color`], [`PieceKind`] and [`Piece`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`], [`CellChange`] and the wire form [`UciMove`]
//! - FEN parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenCastling, FenError};
pub use mov::{CellChange, Move, MoveParseError, UciMove};
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square};
