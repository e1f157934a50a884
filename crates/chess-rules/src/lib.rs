//! Deterministic chess rules.
//!
//! This crate provides:
//! - [`Board`] and [`Position`] - the full game state, immutable once built
//! - Move generation, the legality filter and the move applier ([`movegen`])
//! - [`RuleSet`] / [`StandardChess`] - the game-status evaluator
//! - [`History`] and [`Game`] - repetition bookkeeping for a game in progress
//! - [`notation`] - resolving UCI strings to legal moves
//!
//! # Coordinates
//!
//! Squares are numbered `a1 = 0` to `h8 = 63`, rank by rank. Rank index 0
//! is White's back rank, so White pawns move towards higher ranks.
//!
//! # Example
//!
//! ```
//! use chess_rules::{Game, GameStatus, Position, RuleSet, StandardChess};
//!
//! let position = StandardChess.initial_position();
//! let moves = StandardChess.legal_moves(&position);
//! assert_eq!(moves.len(), 20);
//!
//! let mut game = Game::new();
//! for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     game.play_uci(uci).unwrap();
//! }
//! assert!(matches!(game.status(), GameStatus::Checkmate { .. }));
//! ```

mod board;
mod game;
mod history;
pub mod movegen;
pub mod notation;
mod position;
pub mod rules;

pub use board::Board;
pub use game::{Game, GameError};
pub use history::History;
pub use movegen::{
    apply_move, is_in_check, is_legal, is_square_attacked, legal_moves, make_move,
    pseudo_legal_moves, IllegalMoveError, MoveList,
};
pub use notation::{parse_move, RulesError};
pub use position::{CastlingRights, Position, PositionError, PositionSignature};
pub use rules::{DrawReason, GameStatus, RuleSet, StandardChess};
