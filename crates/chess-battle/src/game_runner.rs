//! Game execution logic for running a battle between two players.
//!
//! This module provides the [`GameRunner`] struct, which owns both players
//! and the game state, alternates turns, enforces the clocks, negotiates
//! draws, relays trash talk and decides how the game ended.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chess_core::Color;
use chess_rules::{DrawReason, Game, GameError, GameStatus, Position, RulesError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, TimeControl, TimeForfeit};
use crate::config::{BattleConfig, ConfigError};
use crate::player::{build_player, Player};

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
    /// Both players agreed to a draw.
    Agreement,
    /// The mover sent a string that is not a move.
    InvalidMove,
    /// The mover sent a well-formed move that is not legal.
    IllegalMove,
    /// The mover overran its time limit.
    TimeForfeit,
    /// The configured ply limit was reached.
    PlyLimit,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::InsufficientMaterial => "insufficient material",
            Termination::ThreefoldRepetition => "threefold repetition",
            Termination::FiftyMoveRule => "fifty-move rule",
            Termination::Agreement => "agreement",
            Termination::InvalidMove => "invalid move",
            Termination::IllegalMove => "illegal move",
            Termination::TimeForfeit => "time forfeit",
            Termination::PlyLimit => "ply limit",
        };
        f.write_str(text)
    }
}

/// The result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// The winner, or `None` for a draw.
    pub winner: Option<Color>,
    pub termination: Termination,
}

impl Outcome {
    pub fn win(winner: Color, termination: Termination) -> Self {
        Outcome {
            winner: Some(winner),
            termination,
        }
    }

    pub fn draw(termination: Termination) -> Self {
        Outcome {
            winner: None,
            termination,
        }
    }

    /// Maps a finished game status to an outcome. Returns `None` while
    /// the game is still in progress.
    pub fn from_status(status: GameStatus) -> Option<Self> {
        let outcome = match status {
            GameStatus::InProgress => return None,
            GameStatus::Checkmate { winner } => Outcome::win(winner, Termination::Checkmate),
            GameStatus::Stalemate => Outcome::draw(Termination::Stalemate),
            GameStatus::Draw(DrawReason::InsufficientMaterial) => {
                Outcome::draw(Termination::InsufficientMaterial)
            }
            GameStatus::Draw(DrawReason::ThreefoldRepetition) => {
                Outcome::draw(Termination::ThreefoldRepetition)
            }
            GameStatus::Draw(DrawReason::FiftyMoveRule) => {
                Outcome::draw(Termination::FiftyMoveRule)
            }
        };
        Some(outcome)
    }

    /// The score in the usual notation: "1-0", "0-1" or "1/2-1/2".
    pub fn score(&self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(winner) => write!(f, "{} ({} wins by {})", self.score(), winner, self.termination),
            None => write!(f, "{} (draw by {})", self.score(), self.termination),
        }
    }
}

/// A single accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// The move in UCI notation (e.g., "e2e4", "e7e8q").
    pub uci: String,
    pub color: Color,
    /// Wall time the mover spent in `make_move`.
    pub elapsed: Duration,
    /// The mover's remaining budget after the move, if the game has one.
    pub remaining: Option<Duration>,
}

/// Something said or offered during the game, other than a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    DrawOffer {
        ply: usize,
        by: Color,
        accepted: bool,
    },
    TrashTalk {
        ply: usize,
        by: Color,
        message: String,
    },
    /// A move string that ended the game because it was not playable.
    Rejected {
        ply: usize,
        by: Color,
        uci: String,
        reason: String,
    },
}

/// Everything that happened in a finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub white_name: String,
    pub black_name: String,
    pub start_fen: String,
    pub final_fen: String,
    pub moves: Vec<MoveRecord>,
    pub events: Vec<Event>,
    pub outcome: Outcome,
}

impl GameRecord {
    /// The accepted moves in UCI notation.
    pub fn uci_moves(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.uci.as_str()).collect()
    }
}

/// Runs games between two players.
///
/// ```
/// use chess_battle::game_runner::{GameRunner, Termination};
/// use chess_battle::player::ScriptedPlayer;
///
/// let white = ScriptedPlayer::new("white", ["f2f3", "g2g4"]);
/// let black = ScriptedPlayer::new("black", ["e7e5", "d8h4"]);
/// let mut runner = GameRunner::new(Box::new(white), Box::new(black));
/// let record = runner.play_game();
/// assert_eq!(record.outcome.termination, Termination::Checkmate);
/// ```
pub struct GameRunner {
    white: Box<dyn Player>,
    black: Box<dyn Player>,
    start: Position,
    time_control: TimeControl,
    draw_offers: bool,
    trash_talk: bool,
    max_plies: Option<u32>,
}

impl GameRunner {
    /// Creates a runner for a game from the standard start position, with no
    /// time limits, draw offers and trash talk enabled, and no ply limit.
    pub fn new(white: Box<dyn Player>, black: Box<dyn Player>) -> Self {
        GameRunner {
            white,
            black,
            start: Position::startpos(),
            time_control: TimeControl::UNLIMITED,
            draw_offers: true,
            trash_talk: true,
            max_plies: None,
        }
    }

    /// Builds the players and settings described by `config`.
    ///
    /// `seed` seeds random players that have no seed of their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the start position or the time control is invalid.
    pub fn from_config(config: &BattleConfig, seed: Option<u64>) -> Result<Self, ConfigError> {
        let start = config.start_position()?;
        let control = config.time_control.to_time_control()?;
        let white = build_player(&config.white, Color::White, &start, &control, seed)?;
        let black = build_player(&config.black, Color::Black, &start, &control, seed)?;
        Ok(GameRunner::new(white, black)
            .with_start_position(start)
            .with_time_control(control)
            .with_draw_offers(config.draw_offers)
            .with_trash_talk(config.trash_talk)
            .with_max_plies(config.max_plies))
    }

    #[must_use]
    pub fn with_start_position(mut self, start: Position) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_time_control(mut self, time_control: TimeControl) -> Self {
        self.time_control = time_control;
        self
    }

    #[must_use]
    pub fn with_draw_offers(mut self, enabled: bool) -> Self {
        self.draw_offers = enabled;
        self
    }

    #[must_use]
    pub fn with_trash_talk(mut self, enabled: bool) -> Self {
        self.trash_talk = enabled;
        self
    }

    #[must_use]
    pub fn with_max_plies(mut self, max_plies: Option<u32>) -> Self {
        self.max_plies = max_plies;
        self
    }

    fn seat_mut(&mut self, color: Color) -> &mut Box<dyn Player> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// The side to move first and its opponent.
    fn players_mut(&mut self, mover: Color) -> (&mut dyn Player, &mut dyn Player) {
        match mover {
            Color::White => (self.white.as_mut(), self.black.as_mut()),
            Color::Black => (self.black.as_mut(), self.white.as_mut()),
        }
    }

    /// Plays one game to the end.
    ///
    /// Players cannot make the runner fail: a bad move string, an illegal
    /// move or an overrun clock loses the game for the side that caused it.
    /// A mover that is still thinking when its limit expires is abandoned on
    /// its thread and its seat stays empty for the rest of the game.
    pub fn play_game(&mut self) -> GameRecord {
        let white_name = self.white.name().to_string();
        let black_name = self.black.name().to_string();
        let draw_offers = self.draw_offers;
        let trash_talk = self.trash_talk;
        let max_plies = self.max_plies;

        let mut game = Game::from_position(self.start.clone());
        let mut clocks = [
            Clock::new(&self.time_control),
            Clock::new(&self.time_control),
        ];
        let mut moves: Vec<MoveRecord> = Vec::new();
        let mut events: Vec<Event> = Vec::new();

        info!(
            white = %white_name,
            black = %black_name,
            fen = %game.to_fen(),
            "starting game"
        );

        let outcome = loop {
            if let Some(outcome) = Outcome::from_status(game.status()) {
                break outcome;
            }
            let ply = game.ply_count();
            if max_plies.is_some_and(|limit| ply >= limit as usize) {
                break Outcome::draw(Termination::PlyLimit);
            }

            let us = game.position().side_to_move();
            let them = us.opposite();
            let (mover, opponent) = self.players_mut(us);

            if draw_offers && mover.request_draw() {
                let accepted = opponent.respond_draw();
                debug!(ply, by = %us, accepted, "draw offered");
                events.push(Event::DrawOffer {
                    ply,
                    by: us,
                    accepted,
                });
                if accepted {
                    break Outcome::draw(Termination::Agreement);
                }
            }

            let player = std::mem::replace(self.seat_mut(us), Box::new(Vacant));
            let name = player.name().to_string();
            let (player, uci, elapsed) = match timed_move(player, clocks[us.index()].limit()) {
                Turn::Played {
                    player,
                    uci,
                    elapsed,
                } => (player, uci, elapsed),
                Turn::TimedOut(forfeit) => {
                    warn!(ply, player = %name, %forfeit, "cut off on time");
                    break Outcome::win(them, Termination::TimeForfeit);
                }
                Turn::Crashed => {
                    warn!(ply, player = %name, "player failed to answer");
                    events.push(Event::Rejected {
                        ply,
                        by: us,
                        uci: String::new(),
                        reason: "player failed to answer".to_string(),
                    });
                    break Outcome::win(them, Termination::InvalidMove);
                }
            };
            *self.seat_mut(us) = player;
            let (mover, opponent) = self.players_mut(us);

            if let Err(forfeit) = clocks[us.index()].charge(elapsed) {
                warn!(ply, player = %mover.name(), %forfeit, "lost on time");
                break Outcome::win(them, Termination::TimeForfeit);
            }

            if let Err(err) = game.play_uci(&uci) {
                let termination = match err {
                    GameError::Rules(RulesError::Malformed(_)) => Termination::InvalidMove,
                    _ => Termination::IllegalMove,
                };
                warn!(ply, player = %mover.name(), uci = %uci, %err, "move rejected");
                events.push(Event::Rejected {
                    ply,
                    by: us,
                    uci,
                    reason: err.to_string(),
                });
                break Outcome::win(them, termination);
            }

            let remaining = clocks[us.index()].remaining();
            debug!(ply, by = %us, uci = %uci, ?elapsed, "move played");
            opponent.receive_move(&uci, clocks[them.index()].remaining());
            moves.push(MoveRecord {
                uci,
                color: us,
                elapsed,
                remaining,
            });

            if trash_talk {
                if let Some(message) = mover.solicit_trash_talk() {
                    opponent.receive_trash_talk(&message);
                    events.push(Event::TrashTalk {
                        ply,
                        by: us,
                        message,
                    });
                }
            }
        };

        info!(plies = moves.len(), %outcome, "game over");

        GameRecord {
            white_name,
            black_name,
            start_fen: self.start.to_fen(),
            final_fen: game.to_fen(),
            moves,
            events,
            outcome,
        }
    }
}

/// Holds a seat while its player is thinking on another thread.
struct Vacant;

impl Player for Vacant {
    fn name(&self) -> &str {
        ""
    }

    fn make_move(&mut self) -> String {
        String::new()
    }
}

enum Turn {
    Played {
        player: Box<dyn Player>,
        uci: String,
        elapsed: Duration,
    },
    TimedOut(TimeForfeit),
    /// The player panicked or its thread could not be started.
    Crashed,
}

/// Asks `player` for a move on a worker thread and waits at most `limit`.
///
/// A player that overruns is left behind on its thread and never returned.
fn timed_move(mut player: Box<dyn Player>, limit: Option<Duration>) -> Turn {
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    let spawned = thread::Builder::new()
        .name("chess-battle-mover".to_string())
        .spawn(move || {
            let uci = player.make_move();
            let _ = tx.send((player, uci));
        });
    if spawned.is_err() {
        return Turn::Crashed;
    }

    let answer = match limit {
        None => rx.recv().ok(),
        Some(limit) => match rx.recv_timeout(limit) {
            Ok(answer) => Some(answer),
            Err(RecvTimeoutError::Timeout) => {
                return Turn::TimedOut(TimeForfeit {
                    elapsed: started.elapsed(),
                    limit,
                })
            }
            Err(RecvTimeoutError::Disconnected) => None,
        },
    };
    match answer {
        Some((player, uci)) => Turn::Played {
            player,
            uci,
            elapsed: started.elapsed(),
        },
        None => Turn::Crashed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ScriptedPlayer;

    fn scripted(white: &[&str], black: &[&str]) -> GameRunner {
        GameRunner::new(
            Box::new(ScriptedPlayer::new("White", white.iter().copied())),
            Box::new(ScriptedPlayer::new("Black", black.iter().copied())),
        )
    }

    #[test]
    fn test_outcome_display() {
        let mate = Outcome::win(Color::Black, Termination::Checkmate);
        assert_eq!(mate.to_string(), "0-1 (Black wins by checkmate)");
        let draw = Outcome::draw(Termination::FiftyMoveRule);
        assert_eq!(draw.to_string(), "1/2-1/2 (draw by fifty-move rule)");
        assert_eq!(Outcome::win(Color::White, Termination::TimeForfeit).score(), "1-0");
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(GameStatus::InProgress), None);
        assert_eq!(
            Outcome::from_status(GameStatus::Stalemate),
            Some(Outcome::draw(Termination::Stalemate))
        );
        assert_eq!(
            Outcome::from_status(GameStatus::Draw(DrawReason::ThreefoldRepetition)),
            Some(Outcome::draw(Termination::ThreefoldRepetition))
        );
        assert_eq!(
            Outcome::from_status(GameStatus::Checkmate {
                winner: Color::White
            }),
            Some(Outcome::win(Color::White, Termination::Checkmate))
        );
    }

    #[test]
    fn test_fools_mate() {
        let record = scripted(&["f2f3", "g2g4"], &["e7e5", "d8h4"]).play_game();
        assert_eq!(
            record.outcome,
            Outcome::win(Color::Black, Termination::Checkmate)
        );
        assert_eq!(record.uci_moves(), ["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(record.white_name, "White");
        assert_eq!(record.moves[1].color, Color::Black);
        assert_eq!(record.moves[0].remaining, None);
    }

    #[test]
    fn test_malformed_move_is_invalid() {
        let record = scripted(&["e2e9"], &[]).play_game();
        assert_eq!(
            record.outcome,
            Outcome::win(Color::Black, Termination::InvalidMove)
        );
        assert!(record.moves.is_empty());
        assert!(matches!(
            &record.events[..],
            [Event::Rejected { by: Color::White, uci, .. }] if uci == "e2e9"
        ));
    }

    #[test]
    fn test_running_out_of_moves_is_invalid() {
        let record = scripted(&["e2e4"], &["e7e5"]).play_game();
        assert_eq!(
            record.outcome,
            Outcome::win(Color::Black, Termination::InvalidMove)
        );
        assert_eq!(record.moves.len(), 2);
    }

    #[test]
    fn test_illegal_move_loses() {
        let record = scripted(&["e2e4"], &["e7e4"]).play_game();
        assert_eq!(
            record.outcome,
            Outcome::win(Color::White, Termination::IllegalMove)
        );
        assert_eq!(record.final_fen, game_after(&["e2e4"]));
    }

    fn game_after(moves: &[&str]) -> String {
        let mut game = Game::new();
        for uci in moves {
            game.play_uci(uci).unwrap();
        }
        game.to_fen()
    }

    #[test]
    fn test_ply_limit() {
        let record = scripted(&["g1f3", "f3g1"], &["g8f6", "f6g8"])
            .with_max_plies(Some(3))
            .play_game();
        assert_eq!(record.outcome, Outcome::draw(Termination::PlyLimit));
        assert_eq!(record.moves.len(), 3);
    }

    #[test]
    fn test_start_position_already_over() {
        let stalemate = Position::from_fen("k7/8/1QK5/8/8/8/8/8 b - - 0 1").unwrap();
        let record = scripted(&[], &[]).with_start_position(stalemate).play_game();
        assert_eq!(record.outcome, Outcome::draw(Termination::Stalemate));
        assert!(record.moves.is_empty());
        assert_eq!(record.start_fen, record.final_fen);
    }

    #[test]
    fn test_slow_player_is_cut_off_at_the_cap() {
        let white = ScriptedPlayer::new("Sleeper", ["e2e4"]).with_think_time(Duration::from_secs(5));
        let black = ScriptedPlayer::new("Black", ["e7e5"]);
        let control = TimeControl::UNLIMITED.with_per_move(Duration::from_millis(100));
        let started = Instant::now();
        let record = GameRunner::new(Box::new(white), Box::new(black))
            .with_time_control(control)
            .play_game();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(record.outcome, Outcome::win(Color::Black, Termination::TimeForfeit));
        assert!(record.moves.is_empty());
        assert_eq!(record.white_name, "Sleeper");
    }

    struct Panicker;

    impl Player for Panicker {
        fn name(&self) -> &str {
            "Panicker"
        }

        fn make_move(&mut self) -> String {
            panic!("lost the plot");
        }
    }

    #[test]
    fn test_panicking_player_loses() {
        let black = ScriptedPlayer::new("Black", ["e7e5"]);
        let record = GameRunner::new(Box::new(Panicker), Box::new(black)).play_game();
        assert_eq!(record.outcome, Outcome::win(Color::Black, Termination::InvalidMove));
        assert!(matches!(
            &record.events[..],
            [Event::Rejected { by: Color::White, .. }]
        ));
    }
}
