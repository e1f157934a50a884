//! Mailbox board representation.

use chess_core::{Color, Piece, PieceKind, Square};
use std::fmt;

/// The contents of all 64 squares.
///
/// Each cell holds `Some(piece)` or `None` for an empty square. Boards are
/// small `Copy` values; the move applier edits a copy and never the
/// original.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    /// A board with no pieces.
    pub const EMPTY: Board = Board { cells: [None; 64] };

    /// Creates a board from cells indexed by [`Square::index`].
    #[inline]
    pub const fn from_cells(cells: [Option<Piece>; 64]) -> Self {
        Board { cells }
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index() as usize]
    }

    /// Returns true if nothing stands on the square.
    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Returns true if the square holds `piece`.
    #[inline]
    pub fn holds(&self, sq: Square, piece: Piece) -> bool {
        self.piece_at(sq) == Some(piece)
    }

    #[inline]
    pub(crate) fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.index() as usize] = piece;
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Iterates over the squares occupied by one side.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Number of pieces of the given color and kind.
    pub fn count(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces_of(color)
            .filter(|(_, piece)| piece.kind == kind)
            .count()
    }

    /// Returns the square of the given side's king.
    ///
    /// # Panics
    ///
    /// Panics if that side has no king. Positions are built so that each
    /// side always has exactly one, so reaching this is a corrupted board.
    pub fn king_square(&self, color: Color) -> Square {
        let king = Piece::new(color, PieceKind::King);
        Square::all()
            .find(|&sq| self.holds(sq, king))
            .unwrap_or_else(|| panic!("corrupted board: {} has no king", color))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let sq = Square::from_coords(file, rank).ok_or(fmt::Error)?;
                let c = self.piece_at(sq).map_or('.', Piece::to_fen_char);
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board")?;
        write!(f, "{}", self)
    }
}
