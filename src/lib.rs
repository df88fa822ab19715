// Kaboom: a seeded Minesweeper-like grid game
// Mine placement, game sessions, images and high scores; the binary parses the command line

pub mod kbm_assets; // Piece and background image lookup
pub mod kbm_cli;    // Subcommands behind the binary
pub mod kbm_error;  // Crate-wide error type
pub mod kbm_game;   // Board, game session and configuration
pub mod kbm_mines;  // Seeded mine placement
pub mod kbm_scores; // Flat-file high scores
pub mod kbm_ui;     // Line-oriented text front end

pub use kbm_error::{KaboomError, Result};
pub use kbm_mines::{MineSet, Placement, Position, generate, generate_with};
