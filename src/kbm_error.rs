// Error type shared by every Kaboom module
// Library code returns `Result<T>`; the binary turns these into exit messages

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KaboomError {
    #[error("invalid board dimension {height}x{width}")]
    InvalidDimension { height: usize, width: usize },
    #[error("invalid mine count {mines} for a board of {cells} tiles")]
    InvalidMineCount { mines: usize, cells: usize },
    #[error("unknown asset \"{0}\"")]
    UnknownAsset(String),
    #[error("tile ({row}, {col}) must be on the board")]
    InvalidCoords { row: usize, col: usize },
    #[error("invalid game number {0}, boards start at 1")]
    InvalidGameNumber(u64),
    #[error("score {field} {text:?} does not fit on one record line")]
    InvalidScoreField { field: &'static str, text: String },
    #[error("game already ended, restart or start a new game")]
    GameOver,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, KaboomError>;
