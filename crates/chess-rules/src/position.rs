//! Chess position representation.

use chess_core::{Color, Fen, FenCastling, FenError, File, Piece, PieceKind, Rank, Square};
use thiserror::Error;

use crate::Board;

/// Errors raised when a FEN record does not describe a playable position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("en passant square {0} does not match the side to move")]
    EnPassantRank(Square),

    #[error("the side not to move is in check")]
    OpponentInCheck,
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    const fn kingside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    const fn queenside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_flag(color) != 0
    }

    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_flag(color) != 0
    }

    /// Returns these rights with both flags of `color` dropped.
    #[inline]
    #[must_use]
    pub const fn without_color(self, color: Color) -> Self {
        CastlingRights(self.0 & !(Self::kingside_flag(color) | Self::queenside_flag(color)))
    }

    /// Returns these rights with every flag that depends on the piece
    /// standing on `sq` dropped: a king's home square drops both flags of
    /// that side, a rook's corner drops the flag for that corner.
    #[must_use]
    pub const fn without_square(self, sq: Square) -> Self {
        let mask = match sq {
            Square::E1 => Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE,
            Square::E8 => Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE,
            Square::H1 => Self::WHITE_KINGSIDE,
            Square::A1 => Self::WHITE_QUEENSIDE,
            Square::H8 => Self::BLACK_KINGSIDE,
            Square::A8 => Self::BLACK_QUEENSIDE,
            _ => 0,
        };
        CastlingRights(self.0 & !mask)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    fn from_fen(fen: FenCastling) -> Self {
        let mut flags = 0;
        for (set, flag) in [
            (fen.white_kingside, Self::WHITE_KINGSIDE),
            (fen.white_queenside, Self::WHITE_QUEENSIDE),
            (fen.black_kingside, Self::BLACK_KINGSIDE),
            (fen.black_queenside, Self::BLACK_QUEENSIDE),
        ] {
            if set {
                flags |= flag;
            }
        }
        CastlingRights(flags)
    }

    fn to_fen(self) -> FenCastling {
        FenCastling {
            white_kingside: self.can_castle_kingside(Color::White),
            white_queenside: self.can_castle_queenside(Color::White),
            black_kingside: self.can_castle_kingside(Color::Black),
            black_queenside: self.can_castle_queenside(Color::Black),
        }
    }
}

/// Complete chess position state.
///
/// Positions are values: they come from [`Position::startpos`],
/// [`Position::from_fen`] or the move applier, and expose no way to change
/// them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    /// File of a pawn that just advanced two squares.
    pub(crate) en_passant: Option<File>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

/// The part of a [`Position`] that decides whether two positions repeat.
///
/// Everything except the two clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionSignature {
    pub board: Board,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<File>,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    ///
    /// Besides the syntax checks of [`Fen::parse`], this requires exactly one
    /// king per side, no pawns on the first or last rank, an en passant
    /// square behind a pawn of the side that just moved, and that the side
    /// not to move is not in check.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed = Fen::parse(fen)?;
        let board = Board::from_cells(parsed.placement);

        for color in Color::ALL {
            let count = board.count(color, PieceKind::King);
            if count != 1 {
                return Err(PositionError::KingCount { color, count });
            }
        }

        if let Some((sq, _)) = board.pieces().find(|(sq, piece)| {
            piece.kind == PieceKind::Pawn && matches!(sq.rank(), Rank::R1 | Rank::R8)
        }) {
            return Err(PositionError::PawnOnBackRank(sq));
        }

        let side_to_move = parsed.active_color;
        let en_passant = match parsed.en_passant {
            None => None,
            Some(sq) => {
                let expected = match side_to_move {
                    Color::White => Rank::R6,
                    Color::Black => Rank::R3,
                };
                if sq.rank() != expected {
                    return Err(PositionError::EnPassantRank(sq));
                }
                Some(sq.file())
            }
        };

        let position = Position {
            board,
            side_to_move,
            castling: CastlingRights::from_fen(parsed.castling),
            en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
        };

        if crate::movegen::is_in_check(&position, side_to_move.opposite()) {
            return Err(PositionError::OpponentInCheck);
        }

        Ok(position)
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = [None; 64];
        for (sq, piece) in self.board.pieces() {
            placement[sq.index() as usize] = Some(piece);
        }
        let ep_rank = match self.side_to_move {
            Color::White => Rank::R6,
            Color::Black => Rank::R3,
        };
        Fen {
            placement,
            active_color: self.side_to_move,
            castling: self.castling.to_fen(),
            en_passant: self.en_passant.map(|file| Square::new(file, ep_rank)),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_string()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// File on which an en passant capture is possible this ply, if any.
    #[inline]
    pub fn en_passant(&self) -> Option<File> {
        self.en_passant
    }

    /// Plies since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq)
    }

    /// Returns the repetition-relevant projection of this position.
    pub fn signature(&self) -> PositionSignature {
        PositionSignature {
            board: self.board,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
