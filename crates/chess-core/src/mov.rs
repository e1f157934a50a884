//! Move representation and UCI long-algebraic notation.

use crate::{Piece, PieceKind, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when a move string or promotion is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid move length: expected 4 or 5 characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid promotion letter '{0}'")]
    InvalidPromotionLetter(char),

    #[error("cannot promote to {0}")]
    InvalidPromotionKind(PieceKind),
}

/// An incidental board write that accompanies a move.
///
/// Castling relocates the rook and en passant removes a pawn that is not on
/// the destination square; both are expressed as cell changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellChange {
    pub square: Square,
    pub piece: Option<Piece>,
}

impl CellChange {
    /// Empties a square.
    #[inline]
    pub const fn clear(square: Square) -> Self {
        CellChange {
            square,
            piece: None,
        }
    }

    /// Places a piece on a square.
    #[inline]
    pub const fn place(square: Square, piece: Piece) -> Self {
        CellChange {
            square,
            piece: Some(piece),
        }
    }
}

/// A chess move.
///
/// Holds the origin and destination of the moving piece, the promotion
/// kind if any, and up to two incidental cell changes applied in order
/// after the primary piece lands.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
    changes: [Option<CellChange>; Move::MAX_CHANGES],
}

impl Move {
    /// Castling needs two changes (rook off, rook on); nothing needs more.
    pub const MAX_CHANGES: usize = 2;

    /// A placeholder move (a1a1), never legal.
    pub const NULL: Move = Move::normal(Square::A1, Square::A1);

    /// Creates a plain move with no promotion or incidental changes.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
            changes: [None; Move::MAX_CHANGES],
        }
    }

    /// Creates a promotion move, rejecting kinds a pawn cannot become.
    pub fn promotion(from: Square, to: Square, kind: PieceKind) -> Result<Self, MoveParseError> {
        if !kind.is_promotion_target() {
            return Err(MoveParseError::InvalidPromotionKind(kind));
        }
        Ok(Move {
            promotion: Some(kind),
            ..Move::normal(from, to)
        })
    }

    /// Returns this move with an incidental change appended.
    ///
    /// # Panics
    ///
    /// Panics if the move already holds [`Move::MAX_CHANGES`] changes.
    pub fn with_change(mut self, change: CellChange) -> Self {
        let slot = self
            .changes
            .iter_mut()
            .find(|slot| slot.is_none())
            .expect("move holds at most two incidental changes");
        *slot = Some(change);
        self
    }

    #[inline]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(&self) -> Square {
        self.to
    }

    #[inline]
    pub const fn promotion_kind(&self) -> Option<PieceKind> {
        self.promotion
    }

    /// The incidental changes, in application order.
    pub fn changes(&self) -> impl Iterator<Item = &CellChange> {
        self.changes.iter().flatten()
    }

    /// Returns true if the move carries incidental changes.
    #[inline]
    pub fn has_changes(&self) -> bool {
        self.changes[0].is_some()
    }

    /// The wire form of this move.
    #[inline]
    pub const fn uci(&self) -> UciMove {
        UciMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(&self) -> String {
        self.uci().to_string()
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}", self.uci())?;
        for change in self.changes() {
            match change.piece {
                Some(piece) => write!(f, ", {}={}", change.square, piece.to_fen_char())?,
                None => write!(f, ", {}=.", change.square)?,
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uci())
    }
}

/// A move as it travels over the wire: origin, destination, promotion.
///
/// This is what players send and receive. It carries no incidental changes;
/// the rules crate resolves it against a position to obtain the full [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl FromStr for UciMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(MoveParseError::InvalidLength(chars.len()));
        }
        let square = |pair: &[char]| {
            let text: String = pair.iter().collect();
            Square::from_algebraic(&text).ok_or(MoveParseError::InvalidSquare(text))
        };
        let from = square(&chars[0..2])?;
        let to = square(&chars[2..4])?;
        let promotion = match chars.get(4) {
            Some(&c) => {
                let kind = PieceKind::from_char(c).ok_or(MoveParseError::InvalidPromotionLetter(c))?;
                if !kind.is_promotion_target() {
                    return Err(MoveParseError::InvalidPromotionKind(kind));
                }
                Some(kind)
            }
            None => None,
        };
        Ok(UciMove {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}
