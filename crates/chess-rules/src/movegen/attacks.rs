//! Piece displacement tables and square-attack detection.

use crate::Board;
use chess_core::{Color, Piece, PieceKind, Square};

/// `(file, rank)` steps of a knight.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Diagonal ray directions.
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Orthogonal ray directions.
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// All eight directions; also the king's single steps.
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Squares reached from `from` by single steps, discarding off-board targets.
pub fn step_targets(from: Square, offsets: &[(i8, i8)]) -> impl Iterator<Item = Square> + '_ {
    offsets
        .iter()
        .filter_map(move |&(df, dr)| from.offset(df, dr))
}

/// Squares along a ray from `from`, up to and including the first occupied one.
pub fn ray(board: &Board, from: Square, (df, dr): (i8, i8)) -> impl Iterator<Item = Square> + '_ {
    let mut current = Some(from);
    let mut blocked = false;
    std::iter::from_fn(move || {
        if blocked {
            return None;
        }
        let next = current?.offset(df, dr)?;
        current = Some(next);
        blocked = !board.is_empty(next);
        Some(next)
    })
}

/// The first piece met along a ray from `from`, if any.
fn first_piece(board: &Board, from: Square, dir: (i8, i8)) -> Option<Piece> {
    ray(board, from, dir).last().and_then(|sq| board.piece_at(sq))
}

/// Returns true if any piece of `by_color` attacks `sq`.
///
/// The displacement rules are run in reverse from the target square: a
/// knight step from `sq` that lands on an enemy knight means that knight
/// attacks `sq`, and so on for each kind. Castling and en passant never
/// attack a square and are not considered.
pub fn is_square_attacked(board: &Board, sq: Square, by_color: Color) -> bool {
    let attacker = |kind| Piece::new(by_color, kind);

    // A pawn attacks diagonally forward, so look one rank behind it.
    let pawn = attacker(PieceKind::Pawn);
    let behind = -by_color.forward();
    if [-1, 1]
        .into_iter()
        .filter_map(|df| sq.offset(df, behind))
        .any(|from| board.holds(from, pawn))
    {
        return true;
    }

    let knight = attacker(PieceKind::Knight);
    if step_targets(sq, &KNIGHT_OFFSETS).any(|from| board.holds(from, knight)) {
        return true;
    }

    let king = attacker(PieceKind::King);
    if step_targets(sq, &QUEEN_DIRECTIONS).any(|from| board.holds(from, king)) {
        return true;
    }

    let queen = attacker(PieceKind::Queen);

    let bishop = attacker(PieceKind::Bishop);
    if BISHOP_DIRECTIONS
        .iter()
        .filter_map(|&dir| first_piece(board, sq, dir))
        .any(|piece| piece == bishop || piece == queen)
    {
        return true;
    }

    let rook = attacker(PieceKind::Rook);
    ROOK_DIRECTIONS
        .iter()
        .filter_map(|&dir| first_piece(board, sq, dir))
        .any(|piece| piece == rook || piece == queen)
}
