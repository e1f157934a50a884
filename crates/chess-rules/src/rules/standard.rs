//! Standard chess rules implementation.

use super::{DrawReason, GameStatus, RuleSet};
use crate::movegen::{self, IllegalMoveError};
use crate::{History, MoveList, Position};
use chess_core::{Color, Move, PieceKind};

/// Standard chess rules (FIDE).
///
/// Draws by rule are automatic: a game ends on threefold repetition and
/// on the fifty-move rule without either player claiming them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl StandardChess {
    /// Plies without a capture or pawn move that draw the game.
    pub const FIFTY_MOVE_PLIES: u32 = 100;

    /// Occurrences of a position that draw the game.
    pub const REPETITION_LIMIT: usize = 3;

    /// Returns true if `color` holds only a king, optionally with one
    /// knight or one bishop.
    fn has_mating_material(position: &Position, color: Color) -> bool {
        let mut minors = 0;
        for (_, piece) in position.board().pieces_of(color) {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors += 1,
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return true,
            }
        }
        minors > 1
    }
}

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Position {
        Position::startpos()
    }

    fn legal_moves(&self, position: &Position) -> MoveList {
        movegen::legal_moves(position)
    }

    fn apply_move(&self, position: &Position, m: &Move) -> Result<Position, IllegalMoveError> {
        movegen::apply_move(position, m)
    }

    fn is_check(&self, position: &Position) -> bool {
        movegen::is_in_check(position, position.side_to_move())
    }

    fn is_insufficient_material(&self, position: &Position) -> bool {
        Color::ALL
            .into_iter()
            .all(|color| !Self::has_mating_material(position, color))
    }

    fn status(&self, position: &Position, history: &History) -> GameStatus {
        if self.legal_moves(position).is_empty() {
            return if self.is_check(position) {
                GameStatus::Checkmate {
                    winner: position.side_to_move().opposite(),
                }
            } else {
                GameStatus::Stalemate
            };
        }

        if self.is_insufficient_material(position) {
            return GameStatus::Draw(DrawReason::InsufficientMaterial);
        }

        if history.occurrences(&position.signature()) >= Self::REPETITION_LIMIT {
            return GameStatus::Draw(DrawReason::ThreefoldRepetition);
        }

        if position.halfmove_clock() >= Self::FIFTY_MOVE_PLIES {
            return GameStatus::Draw(DrawReason::FiftyMoveRule);
        }

        GameStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(fen: &str) -> GameStatus {
        let position = Position::from_fen(fen).unwrap();
        StandardChess.status(&position, &History::starting_at(&position))
    }

    #[test]
    fn initial_position() {
        let pos = StandardChess.initial_position();
        assert_eq!(pos.to_fen(), chess_core::Fen::STARTPOS);
        assert!(!StandardChess.is_check(&pos));
        assert_eq!(status_of(chess_core::Fen::STARTPOS), GameStatus::InProgress);
    }

    #[test]
    fn checkmate_names_the_winner() {
        // Back-rank mate.
        let status = status_of("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1");
        assert_eq!(status, GameStatus::InProgress);
        let status = status_of("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(
            status,
            GameStatus::Checkmate {
                winner: Color::White
            }
        );
        assert_eq!(status.winner(), Some(Color::White));
        assert!(status.is_over());
    }

    #[test]
    fn stalemate() {
        assert_eq!(status_of("k7/8/1QK5/8/8/8/8/8 b - - 0 1"), GameStatus::Stalemate);
    }

    #[test]
    fn insufficient_material_cases() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2N1K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "2n1k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "3bk3/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ] {
            assert_eq!(
                status_of(fen),
                GameStatus::Draw(DrawReason::InsufficientMaterial),
                "{fen}"
            );
        }
        for fen in [
            "4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/1BN1K3 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/R3K3 w - - 0 1",
            "3qk3/8/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            assert_eq!(status_of(fen), GameStatus::InProgress, "{fen}");
        }
    }

    #[test]
    fn no_moves_outranks_insufficient_material() {
        // King and bishop against king, but Black has no move at all.
        assert_eq!(status_of("k7/8/1K6/4B3/8/8/8/8 b - - 0 1"), GameStatus::Stalemate);
    }

    #[test]
    fn fifty_move_rule_by_clock() {
        assert_eq!(
            status_of("4k3/8/8/8/8/8/8/R3K3 w - - 100 80"),
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        );
        assert_eq!(
            status_of("4k3/8/8/8/8/8/8/R3K3 w - - 99 80"),
            GameStatus::InProgress
        );
    }

    #[test]
    fn repetition_needs_three_occurrences() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut history = History::starting_at(&position);
        history.record(&position);
        assert_eq!(StandardChess.status(&position, &history), GameStatus::InProgress);
        history.record(&position);
        assert_eq!(
            StandardChess.status(&position, &history),
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        );
        assert!(StandardChess.is_game_over(&position, &history));
    }

    #[test]
    fn display() {
        assert_eq!(
            GameStatus::Checkmate {
                winner: Color::Black
            }
            .to_string(),
            "checkmate, Black wins"
        );
        assert_eq!(
            GameStatus::Draw(DrawReason::FiftyMoveRule).to_string(),
            "draw by fifty-move rule"
        );
    }
}
