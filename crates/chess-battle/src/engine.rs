//! External engines speaking UCI (Universal Chess Interface).
//!
//! [`UciEngine`] spawns an engine as a subprocess and drives the protocol
//! over its stdin and stdout. [`UciEnginePlayer`] adapts it to the
//! [`Player`] contract, so an engine such as Stockfish can take a side.
//!
//! # Example
//!
//! ```no_run
//! use chess_battle::engine::UciEngine;
//!
//! let mut engine = UciEngine::spawn("/usr/bin/stockfish").unwrap();
//! engine.init().unwrap();
//! engine.set_position(None, &[]).unwrap();
//! let best_move = engine.go("movetime 1000").unwrap();
//! println!("Best move: {}", best_move);
//! engine.quit().unwrap();
//! ```

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use chess_core::Fen;
use chess_rules::Position;
use thiserror::Error;
use tracing::{debug, warn};

use crate::player::Player;

/// Errors that can occur when communicating with a UCI engine.
#[derive(Error, Debug)]
pub enum UciError {
    /// Failed to spawn the engine process or perform I/O operations.
    #[error("Failed to spawn process: {0}")]
    SpawnError(#[from] std::io::Error),
    /// The engine closed its output before answering.
    #[error("Engine closed its output")]
    Disconnected,
    /// The spawned process did not expose the requested pipe.
    #[error("Engine pipe unavailable: {0}")]
    MissingPipe(&'static str),
}

/// A UCI engine running as a subprocess.
///
/// # Lifecycle
///
/// 1. Spawn the engine with [`UciEngine::spawn`]
/// 2. Initialize the protocol with [`UciEngine::init`]
/// 3. Set positions and request moves with [`UciEngine::set_position`] and [`UciEngine::go`]
/// 4. Clean up with [`UciEngine::quit`] (or rely on the [`Drop`] implementation)
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// The engine's name as reported during initialization.
    pub name: String,
}

impl UciEngine {
    /// Spawns an engine process. Call [`init`](Self::init) before use.
    ///
    /// # Errors
    ///
    /// Returns [`UciError::SpawnError`] if the process cannot be spawned,
    /// typically because the executable doesn't exist or lacks permissions.
    pub fn spawn<P: AsRef<Path>>(path: P) -> Result<Self, UciError> {
        Self::spawn_command(Command::new(path.as_ref()))
    }

    /// Spawns an engine from a prepared command, e.g. one with arguments.
    pub fn spawn_command(mut command: Command) -> Result<Self, UciError> {
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = process.stdin.take().ok_or(UciError::MissingPipe("stdin"))?;
        let stdout = process
            .stdout
            .take()
            .ok_or(UciError::MissingPipe("stdout"))?;

        Ok(Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
        })
    }

    /// Sends one command line to the engine.
    pub fn send(&mut self, cmd: &str) -> Result<(), UciError> {
        debug!(cmd, "to engine");
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads one trimmed line, blocking until it arrives.
    pub fn read_line(&mut self) -> Result<String, UciError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(UciError::Disconnected);
        }
        Ok(line.trim().to_string())
    }

    /// Performs the `uci` / `isready` handshake and records the engine name.
    pub fn init(&mut self) -> Result<(), UciError> {
        self.send("uci")?;
        loop {
            let line = self.read_line()?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.to_string();
            }
            if line == "uciok" {
                break;
            }
        }

        self.send("isready")?;
        while self.read_line()? != "readyok" {}
        Ok(())
    }

    /// Sets the position from the start (or from `fen`) followed by `moves`.
    pub fn set_position(&mut self, fen: Option<&str>, moves: &[String]) -> Result<(), UciError> {
        let mut cmd = match fen {
            Some(fen) => format!("position fen {}", fen),
            None => "position startpos".to_string(),
        };
        if !moves.is_empty() {
            cmd.push_str(" moves ");
            cmd.push_str(&moves.join(" "));
        }
        self.send(&cmd)
    }

    /// Sends `go <params>` and waits for `bestmove`.
    pub fn go(&mut self, params: &str) -> Result<String, UciError> {
        self.send(&format!("go {}", params))?;
        loop {
            let line = self.read_line()?;
            if line.starts_with("bestmove ") {
                return Ok(line.split_whitespace().nth(1).unwrap_or("").to_string());
            }
        }
    }

    /// Sends `quit` and waits for the process to exit.
    pub fn quit(&mut self) -> Result<(), UciError> {
        self.send("quit")?;
        let _ = self.process.wait();
        Ok(())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.process.kill();
    }
}

/// Share of the remaining budget an engine is told to spend on one move.
const BUDGET_SHARE: f64 = 0.8;

/// A player backed by a UCI engine.
///
/// The engine is given the whole move list each turn. Its thinking time is
/// a fixed share of whatever budget it has left, or `movetime` when the
/// game has no limits.
pub struct UciEnginePlayer {
    engine: UciEngine,
    name: String,
    start_fen: Option<String>,
    moves: Vec<String>,
    per_move: Option<Duration>,
    time_left: Option<Duration>,
    movetime: Duration,
}

impl UciEnginePlayer {
    /// Thinking time per move when no clock applies.
    pub const DEFAULT_MOVETIME: Duration = Duration::from_secs(30);

    /// Spawns and initializes the engine at `path`.
    ///
    /// `total` and `per_move` are the limits of the game's time control.
    pub fn spawn<P: AsRef<Path>>(
        path: P,
        start: &Position,
        total: Option<Duration>,
        per_move: Option<Duration>,
    ) -> Result<Self, UciError> {
        let engine = UciEngine::spawn(path.as_ref())?;
        let player = Self::new(engine, start, total, per_move)?;
        if player.name.is_empty() {
            return Ok(player.with_name(path.as_ref().display().to_string()));
        }
        Ok(player)
    }

    /// Initializes an already spawned engine and wraps it.
    pub fn new(
        mut engine: UciEngine,
        start: &Position,
        total: Option<Duration>,
        per_move: Option<Duration>,
    ) -> Result<Self, UciError> {
        engine.init()?;
        let name = engine.name.clone();
        let start_fen = start.to_fen();
        Ok(UciEnginePlayer {
            engine,
            name,
            start_fen: (start_fen != Fen::STARTPOS).then_some(start_fen),
            moves: Vec::new(),
            per_move,
            time_left: total,
            movetime: Self::DEFAULT_MOVETIME,
        })
    }

    /// Replaces the engine-reported name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Thinking time used when no clock applies.
    #[must_use]
    pub fn with_movetime(mut self, movetime: Duration) -> Self {
        self.movetime = movetime;
        self
    }

    fn think_time(&self) -> Duration {
        let budget = match (self.time_left, self.per_move) {
            (Some(left), Some(cap)) => Some(left.min(cap)),
            (left, cap) => left.or(cap),
        };
        budget.map_or(self.movetime, |b| b.mul_f64(BUDGET_SHARE))
    }

    fn best_move(&mut self) -> Result<String, UciError> {
        self.engine
            .set_position(self.start_fen.as_deref(), &self.moves)?;
        let millis = self.think_time().as_millis().max(1);
        self.engine.go(&format!("movetime {}", millis))
    }
}

impl Player for UciEnginePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self) -> String {
        match self.best_move() {
            Ok(uci) => {
                self.moves.push(uci.clone());
                uci
            }
            Err(err) => {
                warn!(player = %self.name, %err, "engine failed to answer");
                String::new()
            }
        }
    }

    fn receive_move(&mut self, uci: &str, time_left: Option<Duration>) {
        self.moves.push(uci.to_string());
        self.time_left = time_left;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uci_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let spawn_error = UciError::SpawnError(io_error);
        assert!(spawn_error.to_string().contains("Failed to spawn process"));
        assert_eq!(UciError::Disconnected.to_string(), "Engine closed its output");
        assert_eq!(
            UciError::MissingPipe("stdin").to_string(),
            "Engine pipe unavailable: stdin"
        );
    }

    #[test]
    fn test_spawn_nonexistent_executable_returns_error() {
        let result = UciEngine::spawn("/nonexistent/path/to/engine");
        assert!(matches!(result, Err(UciError::SpawnError(_))));

        let result = UciEnginePlayer::spawn(
            "/nonexistent/path/to/engine",
            &Position::startpos(),
            None,
            None,
        );
        assert!(matches!(result, Err(UciError::SpawnError(_))));
    }

    /// A shell script that speaks just enough UCI to play 1. e4 or 1... e5.
    #[cfg(unix)]
    fn fake_engine() -> UciEngine {
        let script = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name FakeFish"; echo "uciok" ;;
    isready) echo "readyok" ;;
    "position startpos") echo "info string white" ;;
    go*) echo "info depth 1"; echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#;
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        UciEngine::spawn_command(command).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_handshake_and_bestmove() {
        let mut engine = fake_engine();
        engine.init().unwrap();
        assert_eq!(engine.name, "FakeFish");
        engine.set_position(None, &[]).unwrap();
        assert_eq!(engine.go("movetime 10").unwrap(), "e2e4");
        engine.quit().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_player_plays_and_tracks_budget() {
        let start = Position::startpos();
        let mut player = UciEnginePlayer::new(fake_engine(), &start, None, None).unwrap();
        assert_eq!(player.name(), "FakeFish");
        assert_eq!(player.think_time(), UciEnginePlayer::DEFAULT_MOVETIME);
        assert_eq!(player.make_move(), "e2e4");

        player.receive_move("e7e5", Some(Duration::from_secs(10)));
        assert_eq!(player.moves, ["e2e4", "e7e5"]);
        assert_eq!(player.think_time(), Duration::from_secs(8));

        let capped = UciEnginePlayer::new(
            fake_engine(),
            &start,
            Some(Duration::from_secs(60)),
            Some(Duration::from_secs(1)),
        )
        .unwrap()
        .with_name("Capped");
        assert_eq!(capped.name(), "Capped");
        assert_eq!(capped.think_time(), Duration::from_millis(800));
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_player_custom_start_sends_fen() {
        let start = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let player = UciEnginePlayer::new(fake_engine(), &start, None, None).unwrap();
        assert_eq!(
            player.start_fen.as_deref(),
            Some("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dead_engine_makes_an_empty_move() {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(r#"read -r l; echo "uciok"; read -r l; echo "readyok"; exit 0"#);
        let engine = UciEngine::spawn_command(command).unwrap();
        let mut player = UciEnginePlayer::new(engine, &Position::startpos(), None, None).unwrap();
        assert_eq!(player.make_move(), "");
    }

    #[test]
    fn test_uci_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        match UciError::from(io_error) {
            UciError::SpawnError(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            other => panic!("Expected SpawnError variant, got {:?}", other),
        }
    }
}
