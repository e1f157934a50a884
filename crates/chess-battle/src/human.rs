//! A person at the terminal.
//!
//! Moves are typed in UCI notation. The player also answers draw offers and
//! may type a line of trash talk after each move.

use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use chess_core::Color;
use chess_rules::{apply_move, parse_move, Position};
use tracing::warn;

use crate::player::Player;

/// Reads moves and answers from a line-based input.
pub struct HumanPlayer {
    name: String,
    color: Color,
    position: Position,
    time_left: Option<Duration>,
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl HumanPlayer {
    pub const DEFAULT_NAME: &'static str = "Human";

    /// A player reading from stdin and prompting on stdout.
    pub fn stdio(name: impl Into<String>, color: Color, start: Position) -> Self {
        Self::with_io(
            name,
            color,
            start,
            BufReader::new(std::io::stdin()),
            std::io::stdout(),
        )
    }

    /// A player over any reader and writer.
    pub fn with_io(
        name: impl Into<String>,
        color: Color,
        start: Position,
        input: impl BufRead + Send + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        HumanPlayer {
            name: name.into(),
            color,
            position: start,
            time_left: None,
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Starts with this much on the clock, shown with each prompt.
    #[must_use]
    pub fn with_time_left(mut self, time_left: Option<Duration>) -> Self {
        self.time_left = time_left;
        self
    }

    fn say(&mut self, text: &str) {
        if let Err(err) = writeln!(self.output, "{}", text).and_then(|()| self.output.flush()) {
            warn!(player = %self.name, %err, "cannot write prompt");
        }
    }

    /// Prompts and reads one trimmed line. End of input reads as empty.
    fn ask(&mut self, prompt: &str) -> String {
        self.say(prompt);
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => line.trim().to_string(),
            Err(err) => {
                warn!(player = %self.name, %err, "cannot read answer");
                String::new()
            }
        }
    }

    fn ask_yes(&mut self, prompt: &str) -> bool {
        self.ask(prompt) == "y"
    }

    fn advance(&mut self, uci: &str) -> bool {
        let next = parse_move(&self.position, uci)
            .ok()
            .and_then(|m| apply_move(&self.position, &m).ok());
        match next {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self) -> String {
        let board = self.position.board().to_string();
        self.say(&format!("{} to move...\n\n{}", self.color, board));
        if let Some(left) = self.time_left {
            self.say(&format!("  Time left: {:.1}s", left.as_secs_f64()));
        }
        let uci = self.ask("  What is your move?");
        // An unplayable move is still sent; the game ends on it.
        self.advance(&uci);
        uci
    }

    fn receive_move(&mut self, uci: &str, time_left: Option<Duration>) {
        if !self.advance(uci) {
            warn!(player = %self.name, uci, "ignoring move that does not fit our board");
        }
        self.time_left = time_left;
        self.say(&format!("  Opponent played {}", uci));
    }

    fn request_draw(&mut self) -> bool {
        self.ask_yes("  Type \"y\" to request a draw. Type anything else to pass.")
    }

    fn respond_draw(&mut self) -> bool {
        self.ask_yes("  Opponent offers a draw. Type \"y\" to accept. Type anything else to pass.")
    }

    fn solicit_trash_talk(&mut self) -> Option<String> {
        let line = self.ask("  Any trash talk?");
        (!line.is_empty()).then_some(line)
    }

    fn receive_trash_talk(&mut self, message: &str) {
        self.say(&format!("  Opponent says: {}", message));
    }
}
