// Piece and background images
// Maps symbolic piece names to image files through a configurable table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::kbm_error::{KaboomError, Result};

/// Default tile size in pixels
pub const TILE_WIDTH: u32 = 58;
pub const TILE_HEIGHT: u32 = 78;

/// Anything that can resolve a symbolic name to image bytes
pub trait ImageSource {
    /// Image for a board piece (usually a `Tile::piece_name`)
    fn piece_image(&self, name: &str) -> Result<Vec<u8>>;

    /// Image drawn behind the board
    fn background_image(&self, name: &str) -> Result<Vec<u8>>;

    fn tile_width(&self) -> u32;

    fn tile_height(&self) -> u32;
}

/// Name to filename mapping for pieces and backgrounds
/// Persisted as part of the config so image sets can be swapped without code changes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AssetTable {
    pub pieces: BTreeMap<String, String>,
    pub backgrounds: BTreeMap<String, String>,
}

impl Default for AssetTable {
    fn default() -> Self {
        let mut pieces = BTreeMap::new();
        // Bombs are photographs, everything else is drawn
        for name in ["bomb", "exploded"] {
            pieces.insert(name.to_string(), format!("{name}.jpg"));
        }
        for name in [
            "hidden", "flagged", "empty", "one", "two", "three", "four", "five", "six", "seven",
            "eight",
        ] {
            pieces.insert(name.to_string(), format!("{name}.png"));
        }

        let mut backgrounds = BTreeMap::new();
        backgrounds.insert("bkgd".to_string(), "bkgd.jpg".to_string());

        AssetTable {
            pieces,
            backgrounds,
        }
    }
}

impl AssetTable {
    pub fn piece_file(&self, name: &str) -> Result<&str> {
        self.pieces
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| KaboomError::UnknownAsset(name.to_string()))
    }

    pub fn background_file(&self, name: &str) -> Result<&str> {
        self.backgrounds
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| KaboomError::UnknownAsset(name.to_string()))
    }

    /// Every mapped filename, pieces first
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.pieces
            .values()
            .chain(self.backgrounds.values())
            .map(String::as_str)
    }
}

/// Images read on demand from a directory on disk
#[derive(Debug, Clone)]
pub struct GridImages {
    dir: PathBuf,
    table: AssetTable,
    tile_width: u32,
    tile_height: u32,
}

impl GridImages {
    pub fn new(dir: impl Into<PathBuf>, table: AssetTable) -> Self {
        GridImages {
            dir: dir.into(),
            table,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
        }
    }

    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table(&self) -> &AssetTable {
        &self.table
    }

    /// Mapped files that are not present in the image directory
    pub fn missing_files(&self) -> Vec<PathBuf> {
        self.table
            .files()
            .map(|file| self.dir.join(file))
            .filter(|path| !path.is_file())
            .collect()
    }

    fn read(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(file);
        debug!(path = %path.display(), "loading image");
        Ok(fs::read(path)?)
    }
}

impl ImageSource for GridImages {
    fn piece_image(&self, name: &str) -> Result<Vec<u8>> {
        let file = self.table.piece_file(name)?;
        self.read(file)
    }

    fn background_image(&self, name: &str) -> Result<Vec<u8>> {
        let file = self.table.background_file(name)?;
        self.read(file)
    }

    fn tile_width(&self) -> u32 {
        self.tile_width
    }

    fn tile_height(&self) -> u32 {
        self.tile_height
    }
}
