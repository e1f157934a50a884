//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a given depth.
//! The counts for a handful of well-known positions are published, so any
//! mismatch points at a generator or applier bug.

use super::{legal_moves, make_move};
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|m| perft(&make_move(position, m), depth - 1))
        .sum()
}

/// Perft split by root move, sorted by UCI string.
///
/// Comparing the split against a reference engine narrows a wrong total
/// down to the root move whose subtree disagrees.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = legal_moves(position)
        .iter()
        .map(|m| {
            let nodes = perft(&make_move(position, m), depth.saturating_sub(1));
            (m.to_uci(), nodes)
        })
        .collect();

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1";

    fn check(fen: &str, expected: &[u64]) {
        let position = Position::from_fen(fen).unwrap();
        for (depth, &nodes) in (1..).zip(expected) {
            assert_eq!(perft(&position, depth), nodes, "{fen} at depth {depth}");
        }
    }

    #[test]
    fn perft_depth_zero_is_one() {
        assert_eq!(perft(&Position::startpos(), 0), 1);
    }

    #[test]
    fn perft_startpos() {
        check(chess_core::Fen::STARTPOS, &[20, 400, 8902]);
    }

    #[test]
    fn perft_startpos_depth_4() {
        assert_eq!(perft(&Position::startpos(), 4), 197_281);
    }

    // Castling, en passant and promotions all in one position.
    #[test]
    fn perft_kiwipete() {
        check(KIWIPETE, &[48, 2039, 97_862]);
    }

    // Check evasions and en passant pins along the fifth rank.
    #[test]
    fn perft_position3() {
        check(POSITION_3, &[14, 191, 2812, 43_238]);
    }

    #[test]
    fn perft_position4() {
        check(POSITION_4, &[6, 264, 9467]);
    }

    #[test]
    fn perft_position5() {
        check(POSITION_5, &[44, 1486, 62_379]);
    }

    #[test]
    #[ignore]
    fn perft_startpos_depth_5() {
        assert_eq!(perft(&Position::startpos(), 5), 4_865_609);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let position = Position::from_fen(KIWIPETE).unwrap();
        let results = perft_divide(&position, 2);
        assert_eq!(results.len(), 48);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2039);
        assert!(results.windows(2).all(|w| w[0].0 < w[1].0));

        let shallow = perft_divide(&Position::startpos(), 1);
        assert!(shallow.iter().all(|(_, n)| *n == 1));
    }
}
