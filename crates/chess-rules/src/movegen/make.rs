//! The unchecked move applier.

use crate::Position;
use chess_core::{Color, Move, Piece, PieceKind};

/// Applies a move without checking legality.
///
/// `m` must come from the move generator for `position`; anything else
/// may leave the result inconsistent. Use [`super::apply_move`] for moves
/// of unknown origin.
///
/// The primary piece moves first (promoting if asked), then the incidental
/// changes are written in order. Castling rights, the en passant file and
/// both clocks are updated from what moved and what was removed.
pub fn make_move(position: &Position, m: &Move) -> Position {
    let us = position.side_to_move();
    let mut next = position.clone();

    let moving = position
        .piece_at(m.from())
        .unwrap_or_else(|| panic!("no piece on {} for {:?}", m.from(), m));
    let placed = m
        .promotion_kind()
        .map_or(moving, |kind| Piece::new(us, kind));

    let mut captured = position
        .piece_at(m.to())
        .is_some_and(|piece| piece.color != us);

    next.board.set(m.from(), None);
    next.board.set(m.to(), Some(placed));

    for change in m.changes() {
        let removes_enemy = change.piece.is_none()
            && position
                .piece_at(change.square)
                .is_some_and(|piece| piece.color != us);
        captured |= removes_enemy;
        next.board.set(change.square, change.piece);
    }

    let mut castling = position.castling();
    if moving.kind == PieceKind::King {
        castling = castling.without_color(us);
    }
    next.castling = castling.without_square(m.from()).without_square(m.to());

    let is_pawn = moving.kind == PieceKind::Pawn;
    let rank_delta = m.to().rank().index() as i8 - m.from().rank().index() as i8;
    next.en_passant = if is_pawn && rank_delta.abs() == 2 {
        Some(m.from().file())
    } else {
        None
    };

    next.halfmove_clock = if is_pawn || captured {
        0
    } else {
        position.halfmove_clock() + 1
    };
    if us == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = us.opposite();

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::legal_moves;
    use chess_core::{Fen, File, Square};

    fn play(position: &Position, uci: &str) -> Position {
        let m = legal_moves(position)
            .iter()
            .copied()
            .find(|m| m.to_uci() == uci)
            .unwrap_or_else(|| panic!("{uci} is not legal in {}", position.to_fen()));
        make_move(position, &m)
    }

    fn play_all(fen: &str, moves: &[&str]) -> Position {
        let mut position = Position::from_fen(fen).unwrap();
        for uci in moves {
            position = play(&position, uci);
        }
        position
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn double_push_records_the_file() {
        let position = play(&Position::startpos(), "e2e4");
        assert_eq!(position.en_passant(), Some(File::E));
        assert_eq!(
            position.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        // Any following move clears it.
        let position = play(&position, "g8f6");
        assert_eq!(position.en_passant(), None);
        assert_eq!(position.fullmove_number(), 2);
        assert_eq!(position.halfmove_clock(), 1);
    }

    #[test]
    fn en_passant_capture_removes_the_pawn() {
        let position = play_all(Fen::STARTPOS, &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        assert_eq!(position.piece_at(sq("d5")), None);
        assert_eq!(
            position.piece_at(sq("d6")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert_eq!(position.halfmove_clock(), 0);
    }

    #[test]
    fn castling_moves_both_pieces_and_clears_rights() {
        let position = play_all("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10", &["e1g1"]);
        assert_eq!(
            position.piece_at(Square::G1),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            position.piece_at(Square::F1),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert_eq!(position.piece_at(Square::H1), None);
        assert_eq!(position.piece_at(Square::E1), None);
        assert!(!position.castling().can_castle_kingside(Color::White));
        assert!(!position.castling().can_castle_queenside(Color::White));
        assert!(position.castling().can_castle_kingside(Color::Black));
        assert_eq!(position.halfmove_clock(), 4);

        let position = play(&position, "e8c8");
        assert_eq!(position.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 5 11");
    }

    #[test]
    fn rook_moves_and_captures_drop_one_flag() {
        let position = play_all("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &["a1a8"]);
        assert!(!position.castling().can_castle_queenside(Color::White));
        assert!(!position.castling().can_castle_queenside(Color::Black));
        assert!(position.castling().can_castle_kingside(Color::White));
        assert!(position.castling().can_castle_kingside(Color::Black));
        assert_eq!(position.halfmove_clock(), 0);
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        let position = play_all("4k3/1P6/8/8/8/8/8/4K3 w - - 7 30", &["b7b8n"]);
        assert_eq!(
            position.piece_at(sq("b8")),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert_eq!(position.piece_at(sq("b7")), None);
        assert_eq!(position.halfmove_clock(), 0);
    }

    #[test]
    fn quiet_moves_advance_the_clocks() {
        let position = play_all("4k3/8/8/3p4/4N3/8/8/4K3 w - - 42 50", &["e4d6"]);
        assert_eq!(position.halfmove_clock(), 43);
        assert_eq!(position.fullmove_number(), 50);
        let position = play(&position, "e8d7");
        assert_eq!(position.halfmove_clock(), 44);
        assert_eq!(position.fullmove_number(), 51);
        let position = play(&position, "d6b7");
        assert_eq!(position.halfmove_clock(), 45);
    }

    #[test]
    fn capture_resets_the_clock() {
        let position = play_all("4k3/8/8/3p4/8/4N3/8/4K3 w - - 42 50", &["e3d5"]);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.piece_at(sq("d5")).map(|p| p.kind), Some(PieceKind::Knight));
        assert_eq!(position.board().count(Color::Black, PieceKind::Pawn), 0);
    }

    #[test]
    fn pawn_move_resets_the_clock() {
        let position = play_all("4k3/8/8/3p4/8/4N3/8/4K3 b - - 42 50", &["d5d4"]);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 51);
    }

    #[test]
    fn source_position_is_untouched() {
        let before = Position::startpos();
        let _ = play(&before, "g1f3");
        assert_eq!(before, Position::startpos());
    }
}
