// Text front end
// Reads one command per line, applies it to the game and prints the board

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::kbm_error::{KaboomError, Result};
use crate::kbm_game::{ClickOutcome, Config, Game, GameState};
use crate::kbm_mines::Position;
use crate::kbm_scores::HighScores;

const HELP: &str = "\
Commands:
  r ROW COL   reveal a tile
  f ROW COL   toggle a flag
  restart     replay this board
  new         next board
  select N    jump to board N
  scores      show the high scores
  cheat       toggle showing the mines
  quit        leave the game
";

/// A parsed input line; mirrors the Game menu plus the two board actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reveal(Position),
    Flag(Position),
    Restart,
    New,
    Select(u64),
    Scores,
    Cheat,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let mut words = line.split_whitespace();
        let cmd = words.next()?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();
        let position = |args: &[&str]| -> Option<Position> {
            match args {
                [row, col] => Some(Position::new(row.parse().ok()?, col.parse().ok()?)),
                _ => None,
            }
        };
        match (cmd.as_str(), args.as_slice()) {
            ("r" | "reveal", rest) => position(rest).map(Command::Reveal),
            ("f" | "flag", rest) => position(rest).map(Command::Flag),
            ("restart", []) => Some(Command::Restart),
            ("new", []) => Some(Command::New),
            ("select", [n]) => n.parse().ok().map(Command::Select),
            ("scores", []) => Some(Command::Scores),
            ("cheat", []) => Some(Command::Cheat),
            ("help" | "?", []) => Some(Command::Help),
            ("quit" | "q" | "exit", []) => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Print the title, status line and board
pub fn render<W: Write>(game: &Game, out: &mut W) -> Result<()> {
    let board = game.board();
    writeln!(out, "{}", game.title())?;
    writeln!(out, "{}", game.status_line())?;
    write!(out, "   ")?;
    for col in 0..board.width() {
        write!(out, "{}", col % 10)?;
    }
    writeln!(out)?;
    for row in 0..board.height() {
        write!(out, "{:>2} ", row)?;
        for col in 0..board.width() {
            write!(out, "{}", game.view(Position::new(row, col))?.glyph())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Apply one command; returns false when the player quits
fn apply<W: Write>(
    cmd: Command,
    game: &mut Game,
    scores: &HighScores,
    cfg: &Config,
    out: &mut W,
) -> Result<bool> {
    match cmd {
        Command::Reveal(pos) => match game.click(pos)? {
            ClickOutcome::Exploded => writeln!(out, "Kaboom! You hit a mine.")?,
            ClickOutcome::Won => {
                writeln!(out, "Board cleared in {}!", game.score_value())?;
                if let Err(e) = scores.append(&game.score_value(), &cfg.player) {
                    warn!(error = %e, "could not record score");
                    writeln!(out, "Could not record score: {e}")?;
                }
            }
            ClickOutcome::NoChange | ClickOutcome::Revealed(_) => {}
        },
        Command::Flag(pos) => {
            game.toggle_flag(pos)?;
        }
        Command::Restart => game.restart()?,
        Command::New => game.new_game()?,
        Command::Select(n) => game.select_game(n)?,
        Command::Scores => {
            // a broken score file is reported, it does not end the session
            match scores.high_scores(cfg.ascending_scores) {
                Ok(text) if text.is_empty() => writeln!(out, "No scores yet.")?,
                Ok(text) => write!(out, "{text}")?,
                Err(e) => {
                    warn!(error = %e, "could not read scores");
                    writeln!(out, "Could not read scores: {e}")?;
                }
            }
            return Ok(true);
        }
        Command::Cheat => {
            game.cheat();
        }
        Command::Help => {
            write!(out, "{HELP}")?;
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }
    render(game, out)?;
    Ok(true)
}

/// Main loop; ends on `quit` or end of input
pub fn run<R: BufRead, W: Write>(
    game: &mut Game,
    scores: &HighScores,
    cfg: &Config,
    input: R,
    mut out: W,
) -> Result<()> {
    render(game, &mut out)?;
    let mut last_tick = Instant::now();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // whole seconds since the last command feed the game clock
        let secs = last_tick.elapsed().as_secs();
        for _ in 0..secs {
            game.tick();
        }
        last_tick += Duration::from_secs(secs);

        let Some(cmd) = Command::parse(&line) else {
            writeln!(out, "Unknown command \"{}\", try help", line.trim())?;
            continue;
        };
        debug!(?cmd, "command");
        match apply(cmd, game, scores, cfg, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            // stream failures end the session, game errors are reported
            Err(KaboomError::Io(e)) => return Err(e.into()),
            Err(e) => writeln!(out, "{e}")?,
        }
        if game.state() != GameState::Playing {
            writeln!(out, "Type restart, new or select N to play again.")?;
        }
    }
    out.flush()?;
    Ok(())
}
