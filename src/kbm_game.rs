// Core game logic and configuration management
// Handles the board, game session state, and configuration persistence

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::kbm_assets::{AssetTable, TILE_HEIGHT, TILE_WIDTH};
use crate::kbm_error::{KaboomError, Result};
use crate::kbm_mines::{MineSet, Placement, Position, generate_with};
use crate::kbm_scores::SCORES_FILE;

const APP_NAME: &str = "kaboom";

/// User configuration
/// Persisted to disk as TOML
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    // Board shape
    pub board_width: usize,
    pub board_height: usize,
    pub max_bombs: usize,     // Number of mine draws per board
    pub placement: Placement, // fixed_draws or exact

    // Pixel size of one tile image
    pub tile_width: u32,
    pub tile_height: u32,

    // Where scores and images live; platform data dir when unset
    pub game_dir: Option<PathBuf>,
    pub image_dir: String,
    pub scores_file: String,

    pub ascending_scores: bool, // Times rank fastest first
    pub player: String,         // Name written next to a winning time

    pub assets: AssetTable,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            board_width: 10,
            board_height: 10,
            max_bombs: 9,
            placement: Placement::FixedDraws,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            game_dir: None,
            image_dir: "PieceImages".to_string(),
            scores_file: SCORES_FILE.to_string(),
            ascending_scores: true,
            player: "Player".to_string(),
            assets: AssetTable::default(),
        }
    }
}

impl Config {
    /// Directory holding the score file and the image folder
    pub fn game_dir(&self) -> PathBuf {
        if let Some(dir) = &self.game_dir {
            return dir.clone();
        }
        match project_dirs() {
            Some(proj) => proj.data_dir().to_path_buf(),
            None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn scores_path(&self) -> PathBuf {
        self.game_dir().join(&self.scores_file)
    }

    pub fn image_path(&self) -> PathBuf {
        self.game_dir().join(&self.image_dir)
    }

    /// Board parameters for a new game session
    pub fn settings(&self) -> Settings {
        Settings {
            height: self.board_height,
            width: self.board_width,
            max_bombs: self.max_bombs,
            placement: self.placement,
        }
    }
}

/// Project directories shared by the config file and the game data
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "kaboom", APP_NAME)
}

/// Get the configuration file path
/// Uses platform-specific config directory (e.g., ~/.config/kaboom/kaboom.toml on Linux)
/// Falls back to current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    let file = format!("{APP_NAME}.toml");
    match project_dirs() {
        Some(proj) => Some(proj.config_dir().join(file)),
        None => env::current_dir().ok().map(|dir| dir.join(file)),
    }
}

/// Load configuration from `path`, or from the default location when `path` is None
/// A missing default config is created; an explicit path must exist
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        let text = fs::read_to_string(path)?;
        return Ok(toml::from_str(&text)?);
    }

    let Some(path) = config_path() else {
        warn!("no config location available, using defaults");
        return Ok(Config::default());
    };
    if path.exists() {
        let text = fs::read_to_string(&path)?;
        return Ok(toml::from_str(&text)?);
    }

    let cfg = Config::default();
    if let Err(e) = save_config(&cfg, &path) {
        warn!(path = %path.display(), error = %e, "could not write default config");
    }
    Ok(cfg)
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let text = toml::to_string(cfg)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Board parameters a game session is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub height: usize,
    pub width: usize,
    pub max_bombs: usize,
    pub placement: Placement,
}

/// Player-visible state of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tile {
    #[default]
    Hidden,
    Flagged,
    Empty(u8), // Revealed safe tile with its adjacent mine count
    Bomb,      // Mine shown after the game is lost, or while cheating
    Exploded,  // The mine that ended the game
}

impl Tile {
    /// Asset table key for this tile's image
    pub fn piece_name(self) -> &'static str {
        const COUNTS: [&str; 9] = [
            "empty", "one", "two", "three", "four", "five", "six", "seven", "eight",
        ];
        match self {
            Tile::Hidden => "hidden",
            Tile::Flagged => "flagged",
            Tile::Empty(n) => COUNTS[usize::from(n.min(8))],
            Tile::Bomb => "bomb",
            Tile::Exploded => "exploded",
        }
    }

    /// Single character used by the text front end
    pub fn glyph(self) -> char {
        match self {
            Tile::Hidden => '#',
            Tile::Flagged => 'F',
            Tile::Empty(0) => '.',
            Tile::Empty(n) => char::from(b'0' + n.min(8)),
            Tile::Bomb => '*',
            Tile::Exploded => 'X',
        }
    }

    pub fn is_revealed(self) -> bool {
        matches!(self, Tile::Empty(_) | Tile::Bomb | Tile::Exploded)
    }
}

/// Dense grid of tiles with the mine layout underneath
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    height: usize,
    width: usize,
    mines: Vec<bool>,
    tiles: Vec<Tile>,
    mine_count: usize,
}

impl Board {
    /// Lay `mines` on an all-hidden board; positions off the board are an error
    pub fn new(height: usize, width: usize, mines: &MineSet) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(KaboomError::InvalidDimension { height, width });
        }
        let mut mask = vec![false; height * width];
        for pos in mines.iter() {
            if pos.row >= height || pos.col >= width {
                return Err(KaboomError::InvalidCoords {
                    row: pos.row,
                    col: pos.col,
                });
            }
            mask[pos.row * width + pos.col] = true;
        }
        Ok(Board {
            height,
            width,
            mines: mask,
            tiles: vec![Tile::Hidden; height * width],
            mine_count: mines.len(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of mines actually on the board
    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    /// Convert a position to the flat array index, checking bounds
    fn index(&self, pos: Position) -> Result<usize> {
        if pos.row < self.height && pos.col < self.width {
            Ok(pos.row * self.width + pos.col)
        } else {
            Err(KaboomError::InvalidCoords {
                row: pos.row,
                col: pos.col,
            })
        }
    }

    pub fn tile(&self, pos: Position) -> Result<Tile> {
        Ok(self.tiles[self.index(pos)?])
    }

    pub fn has_mine(&self, pos: Position) -> Result<bool> {
        Ok(self.mines[self.index(pos)?])
    }

    /// The up to eight positions surrounding `pos`
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + use<> {
        let rows = pos.row.saturating_sub(1)..=(pos.row + 1).min(self.height - 1);
        let cols = pos.col.saturating_sub(1)..=(pos.col + 1).min(self.width - 1);
        rows.flat_map(move |row| cols.clone().map(move |col| Position { row, col }))
            .filter(move |p| *p != pos)
    }

    pub fn adjacent_mines(&self, pos: Position) -> u8 {
        self.neighbors(pos)
            .filter(|p| self.mines[p.row * self.width + p.col])
            .count() as u8
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let width = self.width;
        (0..self.height * width).map(move |i| Position {
            row: i / width,
            col: i % width,
        })
    }

    /// True once every safe tile is revealed
    pub fn all_safe_revealed(&self) -> bool {
        self.mines
            .iter()
            .zip(&self.tiles)
            .all(|(mine, tile)| *mine || matches!(tile, Tile::Empty(_)))
    }

    /// Reveal a safe tile, flooding outwards through zero tiles
    /// Returns the number of tiles newly revealed
    fn flood_reveal(&mut self, start: Position) -> usize {
        let mut revealed = 0;
        let mut pending = vec![start];
        while let Some(pos) = pending.pop() {
            let idx = pos.row * self.width + pos.col;
            if self.mines[idx] || self.tiles[idx] != Tile::Hidden {
                continue;
            }
            let adj = self.adjacent_mines(pos);
            self.tiles[idx] = Tile::Empty(adj);
            revealed += 1;
            if adj == 0 {
                pending.extend(self.neighbors(pos));
            }
        }
        revealed
    }
}

/// Where a game session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// Result of a click on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    NoChange,
    Revealed(usize), // Tiles uncovered by this click
    Exploded,
    Won,
}

/// Main game state
#[derive(Debug, Clone)]
pub struct Game {
    settings: Settings,
    game_number: u64,      // Board identifier, also the mine seed
    board: Board,
    moves: u32,            // Clicks that revealed something
    flags_placed: usize,
    seconds_elapsed: u64,
    state: GameState,
    cheating: bool,        // Show hidden mines
}

impl Game {
    /// Start a session on board 1
    pub fn new(settings: Settings) -> Result<Self> {
        let board = Self::build_board(&settings, 1)?;
        let game = Game {
            settings,
            game_number: 1,
            board,
            moves: 0,
            flags_placed: 0,
            seconds_elapsed: 0,
            state: GameState::Playing,
            cheating: false,
        };
        debug!(mines = game.board.mine_count(), "board 1 ready");
        Ok(game)
    }

    fn build_board(settings: &Settings, game_number: u64) -> Result<Board> {
        let mines = generate_with(
            settings.height,
            settings.width,
            settings.max_bombs,
            game_number as i64,
            settings.placement,
        )?;
        Board::new(settings.height, settings.width, &mines)
    }

    /// Replay the current board from scratch
    pub fn restart(&mut self) -> Result<()> {
        self.board = Self::build_board(&self.settings, self.game_number)?;
        self.moves = 0;
        self.flags_placed = 0;
        self.seconds_elapsed = 0;
        self.state = GameState::Playing;
        self.cheating = false;
        debug!(
            game = self.game_number,
            mines = self.board.mine_count(),
            "board restarted"
        );
        Ok(())
    }

    /// Advance to the next board
    pub fn new_game(&mut self) -> Result<()> {
        self.game_number += 1;
        self.restart()
    }

    /// Jump to a specific board
    pub fn select_game(&mut self, game_number: u64) -> Result<()> {
        if game_number == 0 {
            return Err(KaboomError::InvalidGameNumber(game_number));
        }
        self.game_number = game_number;
        self.restart()
    }

    fn check_active(&self, pos: Position) -> Result<usize> {
        let idx = self.board.index(pos)?;
        if self.state != GameState::Playing {
            return Err(KaboomError::GameOver);
        }
        Ok(idx)
    }

    /// Handle a click on the tile at `pos`
    /// - Hidden mine ends the game and shows every other mine
    /// - Hidden safe tile reveals it, flooding out from zeros
    /// - Flagged and revealed tiles are left alone
    pub fn click(&mut self, pos: Position) -> Result<ClickOutcome> {
        let idx = self.check_active(pos)?;
        if self.board.tiles[idx] != Tile::Hidden {
            return Ok(ClickOutcome::NoChange);
        }
        self.moves += 1;

        if self.board.mines[idx] {
            for (tile, mine) in self.board.tiles.iter_mut().zip(&self.board.mines) {
                if *mine && *tile == Tile::Hidden {
                    *tile = Tile::Bomb;
                }
            }
            self.board.tiles[idx] = Tile::Exploded;
            self.state = GameState::Lost;
            debug!(game = self.game_number, %pos, "mine hit");
            return Ok(ClickOutcome::Exploded);
        }

        let revealed = self.board.flood_reveal(pos);
        if self.board.all_safe_revealed() {
            // Auto-flag any remaining mines when the player wins
            for (tile, mine) in self.board.tiles.iter_mut().zip(&self.board.mines) {
                if *mine {
                    *tile = Tile::Flagged;
                }
            }
            self.flags_placed = self.board.mine_count();
            self.state = GameState::Won;
            debug!(game = self.game_number, moves = self.moves, "board cleared");
            return Ok(ClickOutcome::Won);
        }
        Ok(ClickOutcome::Revealed(revealed))
    }

    /// Toggle a flag on a hidden tile; returns whether anything changed
    pub fn toggle_flag(&mut self, pos: Position) -> Result<bool> {
        let idx = self.check_active(pos)?;
        match self.board.tiles[idx] {
            Tile::Hidden => {
                self.board.tiles[idx] = Tile::Flagged;
                self.flags_placed += 1;
                Ok(true)
            }
            Tile::Flagged => {
                self.board.tiles[idx] = Tile::Hidden;
                self.flags_placed -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Toggle showing hidden mines
    pub fn cheat(&mut self) -> bool {
        self.cheating = !self.cheating;
        self.cheating
    }

    /// One second of play time
    pub fn tick(&mut self) {
        if self.state == GameState::Playing {
            self.seconds_elapsed += 1;
        }
    }

    /// Tile as the player should see it
    pub fn view(&self, pos: Position) -> Result<Tile> {
        let tile = self.board.tile(pos)?;
        if self.cheating && tile == Tile::Hidden && self.board.has_mine(pos)? {
            return Ok(Tile::Bomb);
        }
        Ok(tile)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn game_number(&self) -> u64 {
        self.game_number
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn flags_placed(&self) -> usize {
        self.flags_placed
    }

    pub fn seconds_elapsed(&self) -> u64 {
        self.seconds_elapsed
    }

    pub fn is_cheating(&self) -> bool {
        self.cheating
    }

    pub fn title(&self) -> String {
        format!("Kaboom - board {}", self.game_number)
    }

    /// Elapsed time as m:ss
    pub fn score_value(&self) -> String {
        format!("{}:{:02}", self.seconds_elapsed / 60, self.seconds_elapsed % 60)
    }

    pub fn status_line(&self) -> String {
        format!(
            "Moves: {}  Flags: {}/{}  Time: {}",
            self.moves,
            self.flags_placed,
            self.board.mine_count(),
            self.score_value()
        )
    }
}
