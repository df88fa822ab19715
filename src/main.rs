// Entry point for the Kaboom command line
// Loads configuration, builds the score store once, and dispatches the subcommand

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use kaboom::kbm_cli::{self, Command};
use kaboom::kbm_game::load_config;
use kaboom::kbm_scores::HighScores;

#[derive(Parser, Debug)]
#[command(name = "kaboom", version, about = "A seeded Minesweeper-like grid game")]
struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    // Load or create user configuration (board shape, directories, image table)
    let cfg = load_config(cli.config.as_deref())?;
    debug!(game_dir = %cfg.game_dir().display(), "config loaded");

    let scores = HighScores::new(cfg.scores_path());
    kbm_cli::execute(
        cli.command.unwrap_or_default(),
        cfg,
        &scores,
        io::stdin().lock(),
        io::stdout().lock(),
    )?;
    Ok(())
}
