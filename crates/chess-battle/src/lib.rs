//! Chess Battle - pits two players against each other under the standard rules.
//!
//! The rules live in `chess-rules`; this crate is the orchestration around
//! them: turn order, clocks, draw negotiation, trash talk and transcripts.
//!
//! # Modules
//!
//! - [`player`] - the player contract and the bundled players
//! - [`engine`] - UCI engines running as child processes
//! - [`human`] - a person typing moves at the terminal
//! - [`clock`] - time controls and per-side clocks
//! - [`game_runner`] - the game loop and its outcome
//! - [`config`] - the `battle.toml` configuration file
//! - [`transcript`] - JSON transcripts of finished games

pub mod clock;
pub mod config;
pub mod engine;
pub mod game_runner;
pub mod human;
pub mod player;
pub mod transcript;
