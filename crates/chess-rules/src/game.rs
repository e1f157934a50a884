//! A game in progress: the current position plus everything played so far.
//!
//! [`Game`] owns the [`History`] the status evaluator needs for repetition
//! detection and the list of moves played, and refuses further moves once
//! the rules declare the game over.

use crate::notation::{self, RulesError};
use crate::rules::{GameStatus, RuleSet, StandardChess};
use crate::{History, MoveList, Position, PositionError};
use chess_core::Move;
use thiserror::Error;

/// Error type for game operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error("game has already ended: {0}")]
    GameOver(GameStatus),
}

/// A standard chess game with history tracking.
#[derive(Debug, Clone)]
pub struct Game {
    start: Position,
    position: Position,
    history: History,
    moves: Vec<Move>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(StandardChess.initial_position())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        Game {
            history: History::starting_at(&position),
            start: position.clone(),
            position,
            moves: Vec::new(),
        }
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn start_position(&self) -> &Position {
        &self.start
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The moves played so far, in order.
    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    pub fn legal_moves(&self) -> MoveList {
        StandardChess.legal_moves(&self.position)
    }

    pub fn is_check(&self) -> bool {
        StandardChess.is_check(&self.position)
    }

    pub fn status(&self) -> GameStatus {
        StandardChess.status(&self.position, &self.history)
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }

    /// Plays a move, returning the resulting status.
    pub fn play(&mut self, m: &Move) -> Result<GameStatus, GameError> {
        let status = self.status();
        if status.is_over() {
            return Err(GameError::GameOver(status));
        }

        let next = StandardChess
            .apply_move(&self.position, m)
            .map_err(RulesError::from)?;
        self.history.record(&next);
        self.moves.push(*m);
        self.position = next;
        Ok(self.status())
    }

    /// Plays a move given in UCI notation, returning the resolved move.
    pub fn play_uci(&mut self, uci: &str) -> Result<Move, GameError> {
        let status = self.status();
        if status.is_over() {
            return Err(GameError::GameOver(status));
        }
        let m = notation::parse_move(&self.position, uci)?;
        self.play(&m)?;
        Ok(m)
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }
}
