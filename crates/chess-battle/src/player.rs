//! The player contract and the bundled players.
//!
//! The orchestrator talks to players only through [`Player`] and only in
//! UCI notation. Players keep their own copy of the game; the orchestrator
//! never shares its position with them.

use crate::clock::TimeControl;
use crate::config::{ConfigError, PlayerConfig, PlayerKind};
use crate::engine::UciEnginePlayer;
use crate::human::HumanPlayer;
use chess_core::Color;
use chess_rules::{apply_move, legal_moves, parse_move, Position};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::warn;

/// Something that can play one side of a game.
///
/// Only [`Player::name`] and [`Player::make_move`] are required; the
/// remaining methods default to a player that never offers or accepts
/// draws and has nothing to say. Players are `Send` because the runner
/// calls `make_move` on a worker thread to enforce time limits.
pub trait Player: Send {
    /// Display name used in logs and transcripts.
    fn name(&self) -> &str;

    /// Returns the player's next move in UCI notation.
    fn make_move(&mut self) -> String;

    /// Informs the player of the opponent's move.
    ///
    /// `time_left` is the receiving player's remaining budget, or `None`
    /// when the game has no total time control.
    fn receive_move(&mut self, uci: &str, time_left: Option<Duration>) {
        let _ = (uci, time_left);
    }

    /// Returns true to offer a draw before moving.
    fn request_draw(&mut self) -> bool {
        false
    }

    /// Returns true to accept the opponent's draw offer.
    fn respond_draw(&mut self) -> bool {
        false
    }

    /// Returns a message to send the opponent after moving, if any.
    fn solicit_trash_talk(&mut self) -> Option<String> {
        None
    }

    /// Receives a message from the opponent.
    fn receive_trash_talk(&mut self, message: &str) {
        let _ = message;
    }
}

/// Plays a uniformly random legal move.
pub struct RandomPlayer {
    name: String,
    position: Position,
    rng: StdRng,
}

impl RandomPlayer {
    pub const DEFAULT_NAME: &'static str = "Mr. Bean";

    /// Creates a random player starting from `position`.
    ///
    /// With a seed the sequence of moves is reproducible.
    pub fn new(name: impl Into<String>, position: Position, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RandomPlayer {
            name: name.into(),
            position,
            rng,
        }
    }

    fn advance(&mut self, uci: &str) {
        let next = parse_move(&self.position, uci)
            .ok()
            .and_then(|m| apply_move(&self.position, &m).ok());
        match next {
            Some(position) => self.position = position,
            None => warn!(player = %self.name, uci, "ignoring move that does not fit our board"),
        }
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self) -> String {
        let moves = legal_moves(&self.position);
        let Some(choice) = moves.as_slice().choose(&mut self.rng) else {
            return String::new();
        };
        let uci = choice.to_uci();
        self.advance(&uci);
        uci
    }

    fn receive_move(&mut self, uci: &str, _time_left: Option<Duration>) {
        self.advance(uci);
    }
}

/// Replays a fixed list of moves, then returns empty strings.
///
/// Used to replay recorded games and to script orchestrator tests. The
/// moves are sent as written, without checking them.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    name: String,
    moves: VecDeque<String>,
    think_time: Duration,
    offer_draw_at: Option<usize>,
    accept_draws: bool,
    trash_talk: VecDeque<String>,
    received_moves: Vec<String>,
    received_talk: Vec<String>,
    last_time_left: Option<Duration>,
    played: usize,
}

impl ScriptedPlayer {
    pub fn new<I, S>(name: impl Into<String>, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPlayer {
            name: name.into(),
            moves: moves.into_iter().map(Into::into).collect(),
            ..ScriptedPlayer::default()
        }
    }

    /// Sleeps this long before answering each move request.
    #[must_use]
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Offers a draw before its `index`-th move (0-based).
    #[must_use]
    pub fn offering_draw_at(mut self, index: usize) -> Self {
        self.offer_draw_at = Some(index);
        self
    }

    /// Accepts every draw offer.
    #[must_use]
    pub fn accepting_draws(mut self) -> Self {
        self.accept_draws = true;
        self
    }

    /// Sends these messages after its first moves, one per move.
    #[must_use]
    pub fn with_trash_talk<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trash_talk = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Opponent moves received so far.
    pub fn received_moves(&self) -> &[String] {
        &self.received_moves
    }

    /// Messages received from the opponent so far.
    pub fn received_talk(&self) -> &[String] {
        &self.received_talk
    }

    /// The remaining time passed with the latest opponent move.
    pub fn last_time_left(&self) -> Option<Duration> {
        self.last_time_left
    }
}

impl Player for ScriptedPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self) -> String {
        if !self.think_time.is_zero() {
            std::thread::sleep(self.think_time);
        }
        self.played += 1;
        self.moves.pop_front().unwrap_or_default()
    }

    fn receive_move(&mut self, uci: &str, time_left: Option<Duration>) {
        self.received_moves.push(uci.to_string());
        self.last_time_left = time_left;
    }

    fn request_draw(&mut self) -> bool {
        self.offer_draw_at == Some(self.played)
    }

    fn respond_draw(&mut self) -> bool {
        self.accept_draws
    }

    fn solicit_trash_talk(&mut self) -> Option<String> {
        self.trash_talk.pop_front()
    }

    fn receive_trash_talk(&mut self, message: &str) {
        self.received_talk.push(message.to_string());
    }
}

/// Builds the configured player for `color`.
///
/// Random players without a configured seed use `fallback_seed`, so a
/// single seed on the command line makes the whole game reproducible.
///
/// # Errors
///
/// Returns an error if an engine player has no path or fails to start.
pub fn build_player(
    config: &PlayerConfig,
    color: Color,
    start: &Position,
    control: &TimeControl,
    fallback_seed: Option<u64>,
) -> Result<Box<dyn Player>, ConfigError> {
    let player: Box<dyn Player> = match config.kind {
        PlayerKind::Random => {
            let name = config
                .name
                .clone()
                .unwrap_or_else(|| format!("{} ({})", RandomPlayer::DEFAULT_NAME, color));
            // Offset Black's seed so both sides do not mirror each other's choices.
            let seed = config
                .seed
                .or_else(|| fallback_seed.map(|seed| seed.wrapping_add(color.index() as u64)));
            Box::new(RandomPlayer::new(name, start.clone(), seed))
        }
        PlayerKind::Scripted => {
            let name = config
                .name
                .clone()
                .unwrap_or_else(|| format!("Script ({})", color));
            Box::new(ScriptedPlayer::new(name, config.moves.iter().cloned()))
        }
        PlayerKind::Engine => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| ConfigError::MissingEnginePath(color.to_string()))?;
            let mut engine =
                UciEnginePlayer::spawn(path, start, control.total, control.per_move)?;
            if let Some(name) = &config.name {
                engine = engine.with_name(name.clone());
            }
            if let Some(millis) = config.movetime_ms {
                engine = engine.with_movetime(Duration::from_millis(millis));
            }
            Box::new(engine)
        }
        PlayerKind::Human => {
            let name = config
                .name
                .clone()
                .unwrap_or_else(|| format!("{} ({})", HumanPlayer::DEFAULT_NAME, color));
            Box::new(HumanPlayer::stdio(name, color, start.clone()).with_time_left(control.total))
        }
    };
    Ok(player)
}
