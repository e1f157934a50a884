//! JSON transcripts of finished games.
//!
//! A transcript carries the players, the start and final positions, every
//! accepted move with its timing, the draw offers and trash talk, and the
//! outcome. Transcripts are written for people and other tools to read;
//! nothing in this crate loads them back.

use crate::game_runner::{Event, GameRecord, MoveRecord, Termination};
use chess_core::Color;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

#[derive(Serialize)]
struct MoveJson<'a> {
    uci: &'a str,
    color: &'static str,
    elapsed_ms: u128,
    /// Absent when the game has no total time control.
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_ms: Option<u128>,
}

impl<'a> From<&'a MoveRecord> for MoveJson<'a> {
    fn from(record: &'a MoveRecord) -> Self {
        MoveJson {
            uci: &record.uci,
            color: color_name(record.color),
            elapsed_ms: record.elapsed.as_millis(),
            remaining_ms: record.remaining.map(|d| d.as_millis()),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EventJson<'a> {
    DrawOffer {
        ply: usize,
        by: &'static str,
        accepted: bool,
    },
    TrashTalk {
        ply: usize,
        by: &'static str,
        message: &'a str,
    },
    Rejected {
        ply: usize,
        by: &'static str,
        uci: &'a str,
        reason: &'a str,
    },
}

impl<'a> From<&'a Event> for EventJson<'a> {
    fn from(event: &'a Event) -> Self {
        match event {
            Event::DrawOffer { ply, by, accepted } => EventJson::DrawOffer {
                ply: *ply,
                by: color_name(*by),
                accepted: *accepted,
            },
            Event::TrashTalk { ply, by, message } => EventJson::TrashTalk {
                ply: *ply,
                by: color_name(*by),
                message,
            },
            Event::Rejected {
                ply,
                by,
                uci,
                reason,
            } => EventJson::Rejected {
                ply: *ply,
                by: color_name(*by),
                uci,
                reason,
            },
        }
    }
}

/// JSON representation of a complete game.
#[derive(Serialize)]
struct GameJson<'a> {
    white: &'a str,
    black: &'a str,
    /// "1-0", "0-1" or "1/2-1/2".
    result: &'static str,
    /// "white", "black", or "draw".
    winner: &'static str,
    termination: Termination,
    start_fen: &'a str,
    final_fen: &'a str,
    moves: Vec<MoveJson<'a>>,
    events: Vec<EventJson<'a>>,
    /// ISO 8601 timestamp when the file was created.
    created_at: String,
}

impl<'a> From<&'a GameRecord> for GameJson<'a> {
    fn from(record: &'a GameRecord) -> Self {
        GameJson {
            white: &record.white_name,
            black: &record.black_name,
            result: record.outcome.score(),
            winner: record.outcome.winner.map_or("draw", color_name),
            termination: record.outcome.termination,
            start_fen: &record.start_fen,
            final_fen: &record.final_fen,
            moves: record.moves.iter().map(MoveJson::from).collect(),
            events: record.events.iter().map(EventJson::from).collect(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Renders a finished game as pretty-printed JSON.
pub fn to_json(record: &GameRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&GameJson::from(record))
}

/// Writes a finished game to a JSON file, creating parent directories.
///
/// The file looks like:
/// ```json
/// {
///   "white": "Mr. Bean (White)",
///   "black": "Mr. Bean (Black)",
///   "result": "0-1",
///   "winner": "black",
///   "termination": "checkmate",
///   "start_fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
///   "final_fen": "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
///   "moves": [
///     { "uci": "f2f3", "color": "white", "elapsed_ms": 0 }
///   ],
///   "events": [
///     { "kind": "trash_talk", "ply": 3, "by": "black", "message": "gg" }
///   ],
///   "created_at": "2024-01-15T12:00:00+00:00"
/// }
/// ```
pub fn write_json<P: AsRef<Path>>(path: P, record: &GameRecord) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &GameJson::from(record))?;
    Ok(())
}
