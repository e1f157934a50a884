//! Move generation.
//!
//! Generation happens in two stages. [`pseudo_legal_moves`] follows each
//! piece's movement pattern and blocking rules without regard to king
//! safety; [`legal_moves`] then drops every move that would leave the
//! mover's king attacked, and castling moves whose king path is attacked.

mod attacks;
mod legal;
mod make;
pub mod perft;

use crate::Position;
use chess_core::{CellChange, Color, Move, Piece, PieceKind, Square};

pub use attacks::{
    is_square_attacked, ray, step_targets, BISHOP_DIRECTIONS, KNIGHT_OFFSETS, QUEEN_DIRECTIONS,
    ROOK_DIRECTIONS,
};
pub use legal::{apply_move, is_in_check, is_legal, legal_moves, IllegalMoveError};
pub use make::make_move;

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves the list can hold.
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all pseudo-legal moves for the side to move.
pub fn pseudo_legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let us = position.side_to_move();

    for (from, piece) in position.board().pieces_of(us) {
        match piece.kind {
            PieceKind::Pawn => generate_pawn_moves(position, from, &mut moves),
            PieceKind::Knight => generate_step_moves(position, from, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => generate_ray_moves(position, from, &BISHOP_DIRECTIONS, &mut moves),
            PieceKind::Rook => generate_ray_moves(position, from, &ROOK_DIRECTIONS, &mut moves),
            PieceKind::Queen => generate_ray_moves(position, from, &QUEEN_DIRECTIONS, &mut moves),
            PieceKind::King => {
                generate_step_moves(position, from, &QUEEN_DIRECTIONS, &mut moves);
                generate_castling_moves(position, from, &mut moves);
            }
        }
    }

    moves
}

/// Returns true if `sq` is empty or holds an enemy piece.
fn is_open_to(position: &Position, sq: Square, us: Color) -> bool {
    position
        .piece_at(sq)
        .map_or(true, |piece| piece.color != us)
}

/// Pushes a pawn move, expanding it into the four promotions on the far rank.
fn push_pawn_move(us: Color, from: Square, to: Square, moves: &mut MoveList) {
    if to.rank() == us.far_rank() {
        for kind in PieceKind::PROMOTIONS {
            if let Ok(m) = Move::promotion(from, to, kind) {
                moves.push(m);
            }
        }
    } else {
        moves.push(Move::normal(from, to));
    }
}

/// Generates pushes, captures, promotions and en passant for one pawn.
fn generate_pawn_moves(position: &Position, from: Square, moves: &mut MoveList) {
    let board = position.board();
    let us = position.side_to_move();
    let forward = us.forward();

    if let Some(one) = from.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
        push_pawn_move(us, from, one, moves);
        if from.rank() == us.pawn_rank() {
            if let Some(two) = from.offset(0, 2 * forward).filter(|&sq| board.is_empty(sq)) {
                moves.push(Move::normal(from, two));
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.offset(df, forward) else {
            continue;
        };
        match board.piece_at(to) {
            Some(target) if target.color != us => push_pawn_move(us, from, to, moves),
            Some(_) => {}
            None => {
                // The captured pawn sits beside us, on the file it advanced along.
                let victim = to.with_rank(from.rank());
                let enemy_pawn = Piece::new(us.opposite(), PieceKind::Pawn);
                if from.rank() == us.en_passant_rank()
                    && position.en_passant() == Some(to.file())
                    && board.holds(victim, enemy_pawn)
                {
                    moves.push(Move::normal(from, to).with_change(CellChange::clear(victim)));
                }
            }
        }
    }
}

/// Generates single-step moves (knight and king).
fn generate_step_moves(
    position: &Position,
    from: Square,
    offsets: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let us = position.side_to_move();
    for to in step_targets(from, offsets) {
        if is_open_to(position, to, us) {
            moves.push(Move::normal(from, to));
        }
    }
}

/// Generates sliding moves along each direction until blocked.
fn generate_ray_moves(
    position: &Position,
    from: Square,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let us = position.side_to_move();
    for &dir in directions {
        // The last square of a ray may hold a piece: capture it if it is an enemy.
        for to in ray(position.board(), from, dir) {
            if is_open_to(position, to, us) {
                moves.push(Move::normal(from, to));
            }
        }
    }
}

/// Generates castling moves whose flags and emptiness conditions hold.
///
/// Whether the king passes through or lands on an attacked square is left
/// to the legality filter.
fn generate_castling_moves(position: &Position, from: Square, moves: &mut MoveList) {
    let us = position.side_to_move();
    let board = position.board();
    let home = us.home_rank();
    let on_home = |file| Square::new(file, home);

    if from != on_home(chess_core::File::E) {
        return;
    }

    let rook = Piece::new(us, PieceKind::Rook);
    let rights = position.castling();

    use chess_core::File::{A, B, C, D, F, G, H};
    let sides = [
        (rights.can_castle_kingside(us), H, G, F, &[F, G][..]),
        (rights.can_castle_queenside(us), A, C, D, &[B, C, D][..]),
    ];

    for (allowed, rook_file, king_to, rook_to, between) in sides {
        let rook_from = on_home(rook_file);
        if allowed
            && board.holds(rook_from, rook)
            && between.iter().all(|&file| board.is_empty(on_home(file)))
        {
            moves.push(
                Move::normal(from, on_home(king_to))
                    .with_change(CellChange::clear(rook_from))
                    .with_change(CellChange::place(on_home(rook_to), rook)),
            );
        }
    }
}

/// Returns true if `m` is a castling move in `position`.
pub(crate) fn is_castling(position: &Position, m: &Move) -> bool {
    let is_king = position
        .piece_at(m.from())
        .map_or(false, |piece| piece.kind == PieceKind::King);
    is_king && (m.to().file().index() as i8 - m.from().file().index() as i8).abs() == 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::File;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pseudo(fen: &str) -> Vec<String> {
        let position = Position::from_fen(fen).unwrap();
        let mut moves: Vec<String> = pseudo_legal_moves(&position)
            .iter()
            .map(|m| m.to_uci())
            .collect();
        moves.sort();
        moves
    }

    fn from_square(moves: &[String], from: &str) -> Vec<String> {
        moves
            .iter()
            .filter(|m| m.starts_with(from))
            .cloned()
            .collect()
    }

    #[test]
    fn movelist_push_and_retain() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        let e2 = Square::new(File::E, chess_core::Rank::R2);
        list.push(Move::normal(e2, sq("e3")));
        list.push(Move::normal(e2, sq("e4")));
        list.push(Move::normal(sq("d2"), sq("d4")));
        assert_eq!(list.len(), 3);
        assert_eq!(list[2], Move::normal(sq("d2"), sq("d4")));

        list.retain(|m| m.from() == e2);
        assert_eq!(list.len(), 2);
        assert!(list.contains(&Move::normal(e2, sq("e4"))));
        assert!(!list.contains(&Move::normal(sq("d2"), sq("d4"))));
        assert_eq!(format!("{:?}", list), "[Move(e2e3), Move(e2e4)]");
    }

    #[test]
    fn startpos_has_twenty_pseudo_legal_moves() {
        assert_eq!(pseudo_legal_moves(&Position::startpos()).len(), 20);
    }

    #[test]
    fn pawn_pushes_need_empty_squares() {
        // Black knight on e3 blocks both pushes; d2 may double-push.
        let moves = pseudo("4k3/8/8/8/8/4n3/3PP3/4K3 w - - 0 1");
        assert_eq!(from_square(&moves, "e2"), Vec::<String>::new());
        assert_eq!(
            from_square(&moves, "d2"),
            vec!["d2d3", "d2d4", "d2e3"]
        );
        // Blocked on the second square only: single push survives.
        let moves = pseudo("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1");
        assert_eq!(from_square(&moves, "e2"), vec!["e2e3"]);
    }

    #[test]
    fn pawn_captures_only_enemies() {
        let moves = pseudo("4k3/8/8/8/8/3p1N2/4P3/4K3 w - - 0 1");
        assert_eq!(from_square(&moves, "e2"), vec!["e2d3", "e2e3", "e2e4"]);
    }

    #[test]
    fn black_pawns_move_down() {
        let moves = pseudo("4k3/3p4/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(from_square(&moves, "d7"), vec!["d7d5", "d7d6"]);
    }

    #[test]
    fn promotions_expand_to_four_moves() {
        let moves = pseudo("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(
            from_square(&moves, "a7"),
            vec!["a7a8b", "a7a8n", "a7a8q", "a7a8r", "a7b8b", "a7b8n", "a7b8q", "a7b8r"]
        );
    }

    #[test]
    fn en_passant_removes_the_pawn_beside() {
        let position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let moves = pseudo_legal_moves(&position);
        let ep = moves
            .iter()
            .find(|m| m.from() == sq("e5") && m.to() == sq("d6"))
            .expect("en passant capture generated");
        let changes: Vec<CellChange> = ep.changes().copied().collect();
        assert_eq!(changes, vec![CellChange::clear(sq("d5"))]);
    }

    #[test]
    fn en_passant_needs_the_recorded_file() {
        // Pawns on c5 and d5 but only the d-file was just double-pushed.
        let moves = pseudo("4k3/8/8/2pP4/8/8/8/4K3 w - - 0 2");
        assert_eq!(from_square(&moves, "d5"), vec!["d5d6"]);
        let moves = pseudo("4k3/8/8/2pP4/8/8/8/4K3 w - c6 0 2");
        assert_eq!(from_square(&moves, "d5"), vec!["d5c6", "d5d6"]);
    }

    #[test]
    fn knight_moves_skip_friendly_pieces() {
        let moves = pseudo("4k3/8/8/8/8/8/2P5/N3K3 w - - 0 1");
        assert_eq!(from_square(&moves, "a1"), vec!["a1b3"]);
    }

    #[test]
    fn sliders_capture_and_stop() {
        let moves = pseudo("4k3/8/8/8/p7/8/8/R3K3 w - - 0 1");
        assert_eq!(
            from_square(&moves, "a1"),
            vec!["a1a2", "a1a3", "a1a4", "a1b1", "a1c1", "a1d1"]
        );
    }

    #[test]
    fn queen_combines_rook_and_bishop() {
        let moves = pseudo("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        assert_eq!(from_square(&moves, "d4").len(), 27);
    }

    #[test]
    fn castling_needs_flags_rook_and_empty_squares() {
        let moves = pseudo("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        let moves = pseudo("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));

        let moves = pseudo("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));

        // Rights claimed but the rook is gone.
        let moves = pseudo("r3k2r/8/8/8/8/8/8/4K2R w KQkq - 0 1");
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn castling_move_relocates_rook() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let moves = pseudo_legal_moves(&position);
        let rook = Piece::new(Color::Black, PieceKind::Rook);
        let long = moves
            .iter()
            .find(|m| m.from() == Square::E8 && m.to() == Square::C8)
            .expect("queenside castle generated");
        let changes: Vec<CellChange> = long.changes().copied().collect();
        assert_eq!(
            changes,
            vec![CellChange::clear(Square::A8), CellChange::place(Square::D8, rook)]
        );
        assert!(is_castling(&position, long));
        assert!(!is_castling(&position, &Move::normal(Square::E8, Square::D8)));
    }
}
