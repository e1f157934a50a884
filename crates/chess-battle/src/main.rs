use anyhow::Context;
use chess_battle::config::{BattleConfig, PlayerKind};
use chess_battle::game_runner::GameRunner;
use chess_battle::transcript;
use chess_rules::movegen::perft::{perft, perft_divide};
use chess_rules::Position;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-battle")]
#[command(about = "Plays chess games between bots under the standard rules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game
    Play {
        /// Configuration file (defaults to battle.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Player kind for White (random, scripted, engine or human)
        #[arg(long)]
        white: Option<PlayerKind>,
        /// Player kind for Black (random, scripted, engine or human)
        #[arg(long)]
        black: Option<PlayerKind>,
        /// Play White with the UCI engine at this path
        #[arg(long, value_name = "PATH", conflicts_with = "white")]
        white_engine: Option<PathBuf>,
        /// Play Black with the UCI engine at this path
        #[arg(long, value_name = "PATH", conflicts_with = "black")]
        black_engine: Option<PathBuf>,
        /// Seed for random players without their own seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Start position in FEN
        #[arg(long)]
        fen: Option<String>,
        /// Write a JSON transcript to this path
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
    /// Count leaf nodes of the move tree, per root move
    Perft {
        /// Search depth in plies
        #[arg(short, long)]
        depth: u32,
        /// Position in FEN (defaults to the start position)
        #[arg(long)]
        fen: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<BattleConfig> {
    let config = match path {
        Some(path) => BattleConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BattleConfig::load()?,
    };
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            white,
            black,
            white_engine,
            black_engine,
            seed,
            fen,
            transcript,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(kind) = white {
                config.white.kind = kind;
            }
            if let Some(kind) = black {
                config.black.kind = kind;
            }
            if let Some(path) = white_engine {
                config.white.kind = PlayerKind::Engine;
                config.white.path = Some(path);
            }
            if let Some(path) = black_engine {
                config.black.kind = PlayerKind::Engine;
                config.black.path = Some(path);
            }
            if fen.is_some() {
                config.start_fen = fen;
            }
            if transcript.is_some() {
                config.transcript = transcript;
            }

            let record = GameRunner::from_config(&config, seed)?.play_game();

            println!("{} vs {}", record.white_name, record.black_name);
            println!("{}", record.uci_moves().join(" "));
            println!("{}", record.outcome);
            println!("{}", record.final_fen);

            if let Some(path) = &config.transcript {
                transcript::write_json(path, &record)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!("Transcript written to {}", path.display());
            }
        }
        Commands::Perft { depth, fen } => {
            let position = match fen {
                Some(fen) => Position::from_fen(&fen)?,
                None => Position::startpos(),
            };
            for (uci, nodes) in perft_divide(&position, depth) {
                println!("{uci}: {nodes}");
            }
            println!();
            println!("Nodes searched: {}", perft(&position, depth));
        }
    }
    Ok(())
}
