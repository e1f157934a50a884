//! Resolving UCI long-algebraic strings against a position.
//!
//! A [`UciMove`] names only origin, destination and promotion. The legal
//! move it stands for may carry incidental changes (the castling rook, the
//! pawn taken en passant), so strings from players are matched against the
//! legal move list instead of being turned into a [`Move`] directly.

use crate::movegen::{legal_moves, IllegalMoveError};
use crate::Position;
use chess_core::{Move, MoveParseError, UciMove};
use thiserror::Error;

/// Why a move string could not be played.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The string is not well-formed UCI notation.
    #[error(transparent)]
    Malformed(#[from] MoveParseError),

    /// The string is well-formed but names no legal move.
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
}

/// Finds the legal move of `position` that `uci` describes.
pub fn find_move(position: &Position, uci: UciMove) -> Result<Move, IllegalMoveError> {
    legal_moves(position)
        .iter()
        .copied()
        .find(|m| m.uci() == uci)
        .ok_or_else(|| IllegalMoveError {
            uci: uci.to_string(),
        })
}

/// Parses `text` as UCI notation and resolves it to a legal move.
///
/// ```
/// use chess_rules::{notation, Position};
///
/// let position = Position::startpos();
/// let m = notation::parse_move(&position, "g1f3").unwrap();
/// assert_eq!(m.to_uci(), "g1f3");
/// assert!(notation::parse_move(&position, "g1g3").is_err());
/// ```
pub fn parse_move(position: &Position, text: &str) -> Result<Move, RulesError> {
    let uci: UciMove = text.trim().parse()?;
    Ok(find_move(position, uci)?)
}
