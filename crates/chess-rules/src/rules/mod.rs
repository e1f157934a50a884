//! Rule set abstraction and game-status classification.
//!
//! The [`RuleSet`] trait is the contract the match orchestrator consumes:
//! move generation, move application and the game-status evaluator. The
//! orchestrator never reaches past it into the generator.

mod standard;

pub use standard::StandardChess;

use crate::movegen::IllegalMoveError;
use crate::{History, MoveList, Position};
use chess_core::{Color, Move};
use std::fmt;

/// Why a game ended drawn by rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Neither side can possibly deliver mate.
    InsufficientMaterial,
    /// The current position has occurred three times.
    ThreefoldRepetition,
    /// 100 plies without a capture or pawn move.
    FiftyMoveRule,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::FiftyMoveRule => "fifty-move rule",
        };
        f.write_str(text)
    }
}

/// State of a game as decided by the rules alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    /// Returns true for every status except [`GameStatus::InProgress`].
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    /// The winning side, if the game ended decisively.
    pub fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => f.write_str("in progress"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::Draw(reason) => write!(f, "draw by {}", reason),
        }
    }
}

/// Trait for implementing chess variants.
///
/// # Example
///
/// ```
/// use chess_rules::{History, RuleSet, StandardChess, GameStatus};
///
/// let position = StandardChess.initial_position();
/// let history = History::starting_at(&position);
/// assert_eq!(StandardChess.legal_moves(&position).len(), 20);
/// assert_eq!(StandardChess.status(&position, &history), GameStatus::InProgress);
/// ```
pub trait RuleSet {
    /// Returns the initial position for this variant.
    fn initial_position(&self) -> Position;

    /// Generates all legal moves for the given position.
    fn legal_moves(&self, position: &Position) -> MoveList;

    /// Returns true if the given move is legal in the position.
    fn is_legal(&self, position: &Position, m: &Move) -> bool {
        self.legal_moves(position).contains(m)
    }

    /// Applies a legal move, returning the resulting position.
    fn apply_move(&self, position: &Position, m: &Move) -> Result<Position, IllegalMoveError>;

    /// Returns true if the side to move is in check.
    fn is_check(&self, position: &Position) -> bool;

    /// Returns true if neither side has the material to deliver mate.
    fn is_insufficient_material(&self, position: &Position) -> bool;

    /// Classifies `position`.
    ///
    /// `history` holds every position of the game so far, the current one
    /// included.
    fn status(&self, position: &Position, history: &History) -> GameStatus;

    /// Returns true if the game is over.
    fn is_game_over(&self, position: &Position, history: &History) -> bool {
        self.status(position, history).is_over()
    }
}
