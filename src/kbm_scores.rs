// High score persistence
// One "<value>  <player>" record per line in a flat text file, ranked as plain strings

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::kbm_error::{KaboomError, Result};

/// Default file name inside the game directory
pub const SCORES_FILE: &str = "HighScores.txt";

/// Number of records shown on the score board
pub const TOP_SCORES: usize = 10;

const SEPARATOR: &str = "  ";

/// A single line of the score file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub value: String,
    pub player: String,
}

impl ScoreRecord {
    pub fn new(value: impl Into<String>, player: impl Into<String>) -> Self {
        ScoreRecord {
            value: value.into(),
            player: player.into(),
        }
    }

    /// Split a stored line at the first separator; a line without one is all value
    pub fn parse(line: &str) -> Self {
        match line.split_once(SEPARATOR) {
            Some((value, player)) => ScoreRecord::new(value, player),
            None => ScoreRecord::new(line, ""),
        }
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.value, SEPARATOR, self.player)
    }
}

/// The score file of one game directory
#[derive(Debug, Clone)]
pub struct HighScores {
    path: PathBuf,
}

impl HighScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScores { path: path.into() }
    }

    /// Scores stored as `HighScores.txt` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        HighScores::new(dir.join(SCORES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file on first use
    /// Line breaks in either field, or a separator inside the value, would split the record
    pub fn append(&self, value: &str, player: &str) -> Result<()> {
        let breaks_line = |text: &str| text.contains(['\n', '\r']);
        if breaks_line(value) || value.contains(SEPARATOR) {
            return Err(KaboomError::InvalidScoreField {
                field: "value",
                text: value.to_string(),
            });
        }
        if breaks_line(player) {
            return Err(KaboomError::InvalidScoreField {
                field: "player",
                text: player.to_string(),
            });
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", ScoreRecord::new(value, player))?;
        info!(value, player, path = %self.path.display(), "score recorded");
        Ok(())
    }

    /// All stored lines in file order; a missing file means no scores yet
    fn lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no score file yet");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sort every record as a string and return at most `n` of them
    /// Ascending suits times (fastest first), descending suits points
    pub fn top_n(&self, ascending: bool, n: usize) -> Result<Vec<ScoreRecord>> {
        let mut lines = self.lines()?;
        lines.sort();
        if !ascending {
            lines.reverse();
        }
        Ok(lines
            .iter()
            .take(n)
            .map(|line| ScoreRecord::parse(line))
            .collect())
    }

    /// The top ten rendered one record per line, e.g. "299  Bill\n152  James\n"
    pub fn high_scores(&self, ascending: bool) -> Result<String> {
        let mut out = String::new();
        for record in self.top_n(ascending, TOP_SCORES)? {
            out.push_str(&record.to_string());
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store(name: &str) -> (PathBuf, HighScores) {
        let dir = std::env::temp_dir().join(format!("kaboom-scores-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = HighScores::in_dir(&dir);
        (dir, store)
    }

    #[test]
    fn descending_board() {
        let (dir, store) = scratch_store("desc");
        store.append("299", "Bill").unwrap();
        store.append("152", "James").unwrap();
        store.append("121", "Sally").unwrap();

        assert_eq!(
            store.high_scores(false).unwrap(),
            "299  Bill\n152  James\n121  Sally\n"
        );
        assert_eq!(
            store.high_scores(true).unwrap(),
            "121  Sally\n152  James\n299  Bill\n"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn ranks_as_strings_not_numbers() {
        let (dir, store) = scratch_store("lexi");
        store.append("10", "Ten").unwrap();
        store.append("9", "Nine").unwrap();

        let top = store.top_n(false, TOP_SCORES).unwrap();
        assert_eq!(
            top,
            vec![ScoreRecord::new("9", "Nine"), ScoreRecord::new("10", "Ten")]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_empty() {
        let (_dir, store) = scratch_store("missing");
        assert!(store.top_n(true, TOP_SCORES).unwrap().is_empty());
        assert_eq!(store.high_scores(false).unwrap(), "");
    }

    #[test]
    fn at_most_ten_records() {
        let (dir, store) = scratch_store("ten");
        for i in 0..15 {
            store.append(&format!("{:03}", i), &format!("P{i}")).unwrap();
        }
        let top = store.top_n(true, TOP_SCORES).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ScoreRecord::new("000", "P0"));
        assert_eq!(store.high_scores(false).unwrap().lines().count(), 10);
        assert_eq!(store.top_n(false, 3).unwrap().len(), 3);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parses_hand_written_lines() {
        let (dir, store) = scratch_store("hand");
        fs::create_dir_all(&dir).unwrap();
        fs::write(store.path(), "1:05  Ann Lee\n\n0:42\n").unwrap();

        let top = store.top_n(true, TOP_SCORES).unwrap();
        assert_eq!(
            top,
            vec![ScoreRecord::new("0:42", ""), ScoreRecord::new("1:05", "Ann Lee")]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn one_append_is_one_record() {
        let (dir, store) = scratch_store("forged");
        assert!(matches!(
            store.append("5", "Eve\n0  Mallory"),
            Err(KaboomError::InvalidScoreField { field: "player", .. })
        ));
        assert!(matches!(
            store.append("5\r\n0", "Eve"),
            Err(KaboomError::InvalidScoreField { field: "value", .. })
        ));
        assert!(matches!(
            store.append("0  Mallory", "x"),
            Err(KaboomError::InvalidScoreField { field: "value", .. })
        ));
        assert!(store.top_n(true, TOP_SCORES).unwrap().is_empty());

        store.append("5", "Eve  Adams").unwrap();
        assert_eq!(
            store.top_n(true, TOP_SCORES).unwrap(),
            vec![ScoreRecord::new("5", "Eve  Adams")]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn record_text_form() {
        let record = ScoreRecord::parse("299  Bill  Jr");
        assert_eq!(record, ScoreRecord::new("299", "Bill  Jr"));
        assert_eq!(record.to_string(), "299  Bill  Jr");
    }
}
