use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use slidemash_core::{Coord, Direction, GameBoard, RandomSpawner};
use std::fs;
use std::path::{Path, PathBuf};

use settings::Settings;

mod play;
mod settings;

/// Slide and merge numbered tiles until the board locks up.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// TOML file with `[board]` and `[keys]` tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Board side length, between 3 and 8
    #[arg(long, global = true)]
    size: Option<Coord>,

    /// Seed for tile spawns, defaults to the current time
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in the terminal (default)
    Play {
        /// Start from a board file instead of a fresh board
        #[arg(long)]
        board: Option<PathBuf>,
    },
    /// Print a board file, optionally after playing some moves on it
    Show {
        path: PathBuf,

        /// Direction to play, may be repeated
        #[arg(short, long = "move", value_name = "DIRECTION")]
        moves: Vec<Direction>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = settings.board_config(cli.size, cli.seed);

    match cli.command.unwrap_or(Command::Play { board: None }) {
        Command::Play { board: Some(path) } => {
            let mut board = load_board(&path, config.seed)?;
            play::run(&mut board, &settings.keys)
        }
        Command::Play { board: None } => {
            let mut board = GameBoard::new(config)?;
            board.reset(true)?;
            play::run(&mut board, &settings.keys)
        }
        Command::Show { path, moves } => show(&path, config.seed, &moves),
    }
}

fn load_board(path: &Path, seed: u64) -> anyhow::Result<GameBoard> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read board {}", path.display()))?;
    let board = GameBoard::parse_with(&text, RandomSpawner::new(seed))
        .with_context(|| format!("Invalid board {}", path.display()))?;
    log::info!("Loaded {0}x{0} board from {1}", board.size(), path.display());
    Ok(board)
}

fn show(path: &Path, seed: u64, moves: &[Direction]) -> anyhow::Result<()> {
    let mut board = load_board(path, seed)?;
    println!("{board}");

    let mut game_over = false;
    for &direction in moves {
        println!("{}", play::apply_move(&mut board, direction, &mut game_over)?);
        println!("{board}");
        if game_over {
            break;
        }
    }

    println!("Score: {}", board.score());
    println!("Moves left: {}", if board.has_move() { "yes" } else { "no" });
    Ok(())
}
