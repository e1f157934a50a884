//! Position history for repetition detection.

use crate::{Position, PositionSignature};

/// The signatures of every position reached in a game, oldest first.
///
/// A history only grows. The caller records the starting position and then
/// the position after every applied move, so the last entry is always the
/// current position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    signatures: Vec<PositionSignature>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        History::default()
    }

    /// Creates a history holding only `position`.
    pub fn starting_at(position: &Position) -> Self {
        History {
            signatures: vec![position.signature()],
        }
    }

    /// Appends a signature.
    pub fn push(&mut self, signature: PositionSignature) {
        self.signatures.push(signature);
    }

    /// Appends the signature of `position`.
    pub fn record(&mut self, position: &Position) {
        self.push(position.signature());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// The most recently recorded signature.
    pub fn last(&self) -> Option<&PositionSignature> {
        self.signatures.last()
    }

    /// How many times `signature` has been recorded.
    pub fn occurrences(&self, signature: &PositionSignature) -> usize {
        self.signatures.iter().filter(|s| *s == signature).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PositionSignature> {
        self.signatures.iter()
    }

    pub fn as_slice(&self) -> &[PositionSignature] {
        &self.signatures
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a PositionSignature;
    type IntoIter = std::slice::Iter<'a, PositionSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{legal_moves, make_move};

    fn play(position: &Position, uci: &str) -> Position {
        let m = legal_moves(position)
            .iter()
            .copied()
            .find(|m| m.to_uci() == uci)
            .unwrap();
        make_move(position, &m)
    }

    #[test]
    fn starts_with_the_initial_position() {
        let start = Position::startpos();
        let history = History::starting_at(&start);
        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), Some(&start.signature()));
        assert!(History::new().is_empty());
    }

    #[test]
    fn counts_repeated_positions() {
        let start = Position::startpos();
        let mut history = History::starting_at(&start);
        let mut position = start.clone();
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            position = play(&position, uci);
            history.record(&position);
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.occurrences(&start.signature()), 2);
        // Clocks differ but the signature still matches.
        assert_ne!(position, start);
        assert_eq!(position.signature(), start.signature());
        assert_eq!(history.iter().count(), 5);
        assert_eq!((&history).into_iter().count(), history.as_slice().len());
    }
}
