//! Configuration file loading for chess battles.
//!
//! A battle is described by a TOML file (`battle.toml` in the current
//! directory by default). Every field has a default, so an empty or missing
//! file describes a random-versus-random game without time limits.

use crate::clock::TimeControl;
use crate::engine::UciError;
use chess_rules::{Position, PositionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or interpreting configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A player kind that no bundled player implements.
    #[error("Unknown player kind: {0}")]
    UnknownPlayer(String),
    /// A time limit that is negative or not a number.
    #[error("Invalid time control: {0}")]
    InvalidTimeControl(String),
    /// The configured start position is not playable.
    #[error("Invalid start position: {0}")]
    InvalidPosition(#[from] PositionError),
    /// An engine player was configured without an executable.
    #[error("No engine path configured for {0}")]
    MissingEnginePath(String),
    /// The engine could not be started.
    #[error("Failed to start engine: {0}")]
    Engine(#[from] UciError),
}

/// The bundled player implementations.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// Plays a uniformly random legal move.
    #[default]
    Random,
    /// Replays a fixed list of moves.
    Scripted,
    /// An external UCI engine such as Stockfish.
    Engine,
    /// A person typing moves at the terminal.
    Human,
}

impl FromStr for PlayerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(PlayerKind::Random),
            "scripted" => Ok(PlayerKind::Scripted),
            "engine" => Ok(PlayerKind::Engine),
            "human" => Ok(PlayerKind::Human),
            _ => Err(ConfigError::UnknownPlayer(s.to_string())),
        }
    }
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKind::Random => write!(f, "random"),
            PlayerKind::Scripted => write!(f, "scripted"),
            PlayerKind::Engine => write!(f, "engine"),
            PlayerKind::Human => write!(f, "human"),
        }
    }
}

/// Configuration for one side.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PlayerConfig {
    #[serde(default)]
    pub kind: PlayerKind,
    /// Display name. Defaults to a name chosen by the player kind.
    #[serde(default)]
    pub name: Option<String>,
    /// RNG seed for random players. Unseeded players draw from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Moves in UCI notation for scripted players.
    #[serde(default)]
    pub moves: Vec<String>,
    /// Executable for engine players.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Engine thinking time per move when the game has no clock.
    #[serde(default)]
    pub movetime_ms: Option<u64>,
}

/// Time limits as written in the configuration file.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct TimeControlConfig {
    /// Total budget per side in minutes. No budget if absent.
    #[serde(default)]
    pub minutes: Option<f64>,
    /// Seconds added after each move.
    #[serde(default)]
    pub increment_secs: f64,
    /// Cap on a single move in seconds. No cap if absent.
    #[serde(default)]
    pub max_time_per_move_secs: Option<f64>,
}

fn seconds(value: f64, field: &str) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::InvalidTimeControl(format!("{field} = {value}")))
}

impl TimeControlConfig {
    /// Converts to a [`TimeControl`], rejecting negative or non-finite values.
    pub fn to_time_control(&self) -> Result<TimeControl, ConfigError> {
        Ok(TimeControl {
            total: self
                .minutes
                .map(|minutes| seconds(minutes * 60.0, "minutes"))
                .transpose()?,
            increment: seconds(self.increment_secs, "increment_secs")?,
            per_move: self
                .max_time_per_move_secs
                .map(|secs| seconds(secs, "max_time_per_move_secs"))
                .transpose()?,
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_max_plies() -> Option<u32> {
    Some(500)
}

/// Main battle configuration structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BattleConfig {
    /// Whether players are asked for draw offers before each move.
    #[serde(default = "default_true")]
    pub draw_offers: bool,
    /// Whether players are asked for trash talk after each move.
    #[serde(default = "default_true")]
    pub trash_talk: bool,
    /// Plies after which the game is stopped as a draw. Defaults to 500.
    #[serde(default = "default_max_plies")]
    pub max_plies: Option<u32>,
    /// Custom start position in FEN. Defaults to the standard setup.
    #[serde(default)]
    pub start_fen: Option<String>,
    /// Where to write the JSON transcript, if anywhere.
    #[serde(default)]
    pub transcript: Option<PathBuf>,
    #[serde(default)]
    pub time_control: TimeControlConfig,
    #[serde(default)]
    pub white: PlayerConfig,
    #[serde(default)]
    pub black: PlayerConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            draw_offers: true,
            trash_talk: true,
            max_plies: default_max_plies(),
            start_fen: None,
            transcript: None,
            time_control: TimeControlConfig::default(),
            white: PlayerConfig::default(),
            black: PlayerConfig::default(),
        }
    }
}

impl BattleConfig {
    /// Loads the battle configuration from [`Self::config_path()`].
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the battle configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the default configuration file path, `battle.toml`.
    pub fn config_path() -> PathBuf {
        PathBuf::from("battle.toml")
    }

    /// The position the game starts from.
    pub fn start_position(&self) -> Result<Position, ConfigError> {
        match &self.start_fen {
            Some(fen) => Ok(Position::from_fen(fen)?),
            None => Ok(Position::startpos()),
        }
    }
}
