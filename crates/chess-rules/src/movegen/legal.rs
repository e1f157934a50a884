//! Legality filtering and the checked move applier.

use super::{is_castling, is_square_attacked, make_move, pseudo_legal_moves, MoveList};
use crate::Position;
use chess_core::{Color, Move, Square};
use thiserror::Error;

/// Returned when a move is not among the legal moves of a position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("illegal move: {uci}")]
pub struct IllegalMoveError {
    pub uci: String,
}

impl IllegalMoveError {
    pub fn new(m: &Move) -> Self {
        IllegalMoveError { uci: m.to_uci() }
    }
}

/// Returns true if `color`'s king is attacked.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    let king = position.board().king_square(color);
    is_square_attacked(position.board(), king, color.opposite())
}

/// Generates all legal moves for the side to move.
pub fn legal_moves(position: &Position) -> MoveList {
    let mut moves = pseudo_legal_moves(position);
    moves.retain(|m| keeps_king_safe(position, m));
    moves
}

/// Returns true if `m` is one of the legal moves of `position`.
pub fn is_legal(position: &Position, m: &Move) -> bool {
    legal_moves(position).contains(m)
}

/// Applies a move after checking that it is legal.
///
/// The result is a fresh position; `position` is left untouched.
pub fn apply_move(position: &Position, m: &Move) -> Result<Position, IllegalMoveError> {
    if !is_legal(position, m) {
        return Err(IllegalMoveError::new(m));
    }
    Ok(make_move(position, m))
}

fn keeps_king_safe(position: &Position, m: &Move) -> bool {
    let us = position.side_to_move();
    let them = us.opposite();

    if is_castling(position, m) {
        // Every square the king stands on or crosses must be unattacked.
        let from = m.from();
        let step = if m.to() > from { 1 } else { -1 };
        let path = [Some(from), from.offset(step, 0), Some(m.to())];
        if path
            .into_iter()
            .flatten()
            .any(|sq: Square| is_square_attacked(position.board(), sq, them))
        {
            return false;
        }
    }

    !is_in_check(&make_move(position, m), us)
}
