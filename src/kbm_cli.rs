// Command-line subcommands
// Each subcommand writes plain text to the given output so the binary stays a thin wrapper

use clap::Subcommand;
use std::io::{BufRead, Write};

use crate::kbm_assets::{GridImages, ImageSource};
use crate::kbm_error::Result;
use crate::kbm_game::{Config, Game};
use crate::kbm_mines::{MineSet, Placement, Position, generate_with};
use crate::kbm_scores::{HighScores, TOP_SCORES};
use crate::kbm_ui;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play in the terminal (the default)
    Play {
        /// Board number to start on
        #[arg(long)]
        game: Option<u64>,
        /// Name recorded next to a winning time
        #[arg(long)]
        player: Option<String>,
    },
    /// Print the mine layout of a board
    Generate {
        #[arg(long)]
        height: Option<usize>,
        #[arg(long)]
        width: Option<usize>,
        /// Number of mine draws
        #[arg(long)]
        mines: Option<usize>,
        /// Seed (board number); random when omitted
        #[arg(long, allow_hyphen_values = true)]
        seed: Option<i64>,
        /// Keep drawing until every requested mine is placed
        #[arg(long)]
        exact: bool,
        /// Draw the board instead of listing positions
        #[arg(long)]
        grid: bool,
    },
    /// Show the high scores
    Scores {
        #[arg(long, conflicts_with = "descending")]
        ascending: bool,
        #[arg(long)]
        descending: bool,
        /// Records to show, at most ten
        #[arg(short = 'n', long, default_value_t = TOP_SCORES)]
        count: usize,
    },
    /// Append a score record
    Record { value: String, player: String },
    /// List the image table and report missing files
    Assets,
}

impl Default for Command {
    fn default() -> Self {
        Command::Play {
            game: None,
            player: None,
        }
    }
}

/// Sort order for the scores command; no flag means the configured order
pub fn score_order(ascending: bool, descending: bool, default_ascending: bool) -> bool {
    if ascending || descending {
        ascending
    } else {
        default_ascending
    }
}

/// Mines as "row col" lines, or as a grid of `*` and `.`
pub fn mine_listing(field: &MineSet, height: usize, width: usize, grid: bool) -> String {
    let mut out = String::new();
    if grid {
        for row in 0..height {
            out.extend((0..width).map(|col| {
                if field.contains(Position::new(row, col)) {
                    '*'
                } else {
                    '.'
                }
            }));
            out.push('\n');
        }
    } else {
        for pos in field.iter() {
            out.push_str(&format!("{} {}\n", pos.row, pos.col));
        }
    }
    out
}

/// Run one subcommand; `input` is only read by `play`
pub fn execute<R: BufRead, W: Write>(
    cmd: Command,
    mut cfg: Config,
    scores: &HighScores,
    input: R,
    mut out: W,
) -> Result<()> {
    match cmd {
        Command::Play { game, player } => {
            if let Some(player) = player {
                cfg.player = player;
            }
            let mut session = Game::new(cfg.settings())?;
            if let Some(n) = game {
                session.select_game(n)?;
            }
            kbm_ui::run(&mut session, scores, &cfg, input, out)?;
        }
        Command::Generate {
            height,
            width,
            mines,
            seed,
            exact,
            grid,
        } => {
            let height = height.unwrap_or(cfg.board_height);
            let width = width.unwrap_or(cfg.board_width);
            let mines = mines.unwrap_or(cfg.max_bombs);
            let seed = seed.unwrap_or_else(rand::random::<i64>);
            let placement = if exact { Placement::Exact } else { cfg.placement };
            let field = generate_with(height, width, mines, seed, placement)?;

            writeln!(out, "seed {seed}: {} of {mines} mines placed", field.len())?;
            write!(out, "{}", mine_listing(&field, height, width, grid))?;
        }
        Command::Scores {
            ascending,
            descending,
            count,
        } => {
            let ascending = score_order(ascending, descending, cfg.ascending_scores);
            let top = scores.top_n(ascending, count.min(TOP_SCORES))?;
            if top.is_empty() {
                writeln!(out, "No scores yet.")?;
            }
            for record in top {
                writeln!(out, "{record}")?;
            }
        }
        Command::Record { value, player } => {
            scores.append(&value, &player)?;
        }
        Command::Assets => {
            let images = GridImages::new(cfg.image_path(), cfg.assets.clone())
                .with_tile_size(cfg.tile_width, cfg.tile_height);
            writeln!(out, "images in {}", images.dir().display())?;
            writeln!(out, "tile size {}x{}", images.tile_width(), images.tile_height())?;
            for (name, file) in &images.table().pieces {
                writeln!(out, "  piece {name} -> {file}")?;
            }
            for (name, file) in &images.table().backgrounds {
                writeln!(out, "  background {name} -> {file}")?;
            }
            for path in images.missing_files() {
                writeln!(out, "missing {}", path.display())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Option<Command>,
    }

    fn parse(args: &[&str]) -> Command {
        let args = std::iter::once("kaboom").chain(args.iter().copied());
        TestCli::try_parse_from(args).unwrap().command.unwrap_or_default()
    }

    fn scratch(name: &str) -> (PathBuf, Config, HighScores) {
        let dir = std::env::temp_dir().join(format!("kaboom-cli-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let mut cfg = Config::default();
        cfg.game_dir = Some(dir.clone());
        let scores = HighScores::new(cfg.scores_path());
        (dir, cfg, scores)
    }

    fn run(cmd: Command, cfg: &Config, scores: &HighScores, input: &str) -> String {
        let mut out = Vec::new();
        execute(cmd, cfg.clone(), scores, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn play_is_the_default() {
        assert_eq!(parse(&[]), Command::default());
        assert_eq!(
            parse(&["play", "--game", "4", "--player", "Bill"]),
            Command::Play {
                game: Some(4),
                player: Some("Bill".to_string())
            }
        );
    }

    #[test]
    fn order_flags_override_the_config() {
        assert!(score_order(true, false, false));
        assert!(!score_order(false, true, true));
        assert!(score_order(false, false, true));
        assert!(!score_order(false, false, false));
        assert!(TestCli::try_parse_from(["kaboom", "scores", "--ascending", "--descending"]).is_err());
    }

    #[test]
    fn scores_are_capped_at_ten() {
        let (dir, cfg, scores) = scratch("cap");
        for i in 0..12 {
            scores.append(&format!("{i:02}"), "P").unwrap();
        }
        let text = run(parse(&["scores", "-n", "50"]), &cfg, &scores, "");
        assert_eq!(text.lines().count(), 10);
        assert_eq!(text.lines().next(), Some("00  P"));

        let text = run(parse(&["scores", "--descending", "-n", "2"]), &cfg, &scores, "");
        assert_eq!(text, "11  P\n10  P\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_scores_and_record() {
        let (dir, cfg, scores) = scratch("record");
        assert_eq!(run(parse(&["scores"]), &cfg, &scores, ""), "No scores yet.\n");
        run(parse(&["record", "299", "Bill"]), &cfg, &scores, "");
        assert_eq!(run(parse(&["scores"]), &cfg, &scores, ""), "299  Bill\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn generate_lists_and_draws() {
        let (_dir, cfg, scores) = scratch("generate");
        let text = run(parse(&["generate", "--seed", "1"]), &cfg, &scores, "");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "seed 1: 8 of 9 mines placed");
        assert_eq!(lines[1], "2 2");
        assert_eq!(lines.len(), 9);

        let text = run(
            parse(&["generate", "--seed", "3", "--height", "1", "--width", "2", "--mines", "1", "--grid"]),
            &cfg,
            &scores,
            "",
        );
        assert_eq!(text, "seed 3: 1 of 1 mines placed\n.*\n");

        let text = run(parse(&["generate", "--seed", "1", "--exact"]), &cfg, &scores, "");
        assert!(text.starts_with("seed 1: 9 of 9 mines placed\n"));
    }

    #[test]
    fn generate_rejects_an_overfull_board() {
        let (_dir, cfg, scores) = scratch("overfull");
        let cmd = parse(&["generate", "--seed", "-5", "--height", "2", "--width", "2", "--mines", "5"]);
        let mut out = Vec::new();
        assert!(execute(cmd, cfg, &scores, "".as_bytes(), &mut out).is_err());
    }

    #[test]
    fn grid_listing_marks_mines() {
        let field: MineSet = [Position::new(0, 1), Position::new(1, 0)].into_iter().collect();
        assert_eq!(mine_listing(&field, 2, 3, true), ".*.\n*..\n");
        assert_eq!(mine_listing(&field, 2, 3, false), "0 1\n1 0\n");
    }

    #[test]
    fn assets_report_missing_files() {
        let (dir, cfg, scores) = scratch("assets");
        let text = run(parse(&["assets"]), &cfg, &scores, "");
        assert!(text.contains("tile size 58x78"));
        assert!(text.contains("  piece bomb -> bomb.jpg"));
        assert!(text.contains(&format!("missing {}", dir.join("PieceImages").join("bkgd.jpg").display())));
    }

    #[test]
    fn play_reads_the_given_input() {
        let (_dir, cfg, scores) = scratch("play");
        let text = run(parse(&["play", "--game", "2"]), &cfg, &scores, "quit\n");
        assert!(text.starts_with("Kaboom - board 2\n"));
    }
}
