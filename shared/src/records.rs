//! Per-game records and the games index written by the bundle tooling.
//!
//! Layout of a games directory:
//!
//! ```text
//! games/
//! ├── games.json                  # GamesIndex
//! └── keen4/
//!     ├── game.json               # GameConfig
//!     └── keen4-bundle.jsdos
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fs::{MAX_RECORD_BYTES, ensure_parent_dir, read_to_string_with_limit};

/// Index file name at the root of a games directory.
pub const GAMES_INDEX_FILE: &str = "games.json";

/// Per-game record file name inside `games/{id}/`.
pub const GAME_CONFIG_FILE: &str = "game.json";

/// Full metadata for one packaged game (`games/{id}/game.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub year: u16,
    pub genre: Vec<String>,
    /// Bundle file name, relative to the game directory.
    pub bundle: String,
    /// Command run from the DOS prompt to start the game.
    pub executable: String,
    /// Key (or key combination) to action.
    #[serde(default)]
    pub controls: BTreeMap<String, String>,
    #[serde(default = "default_thumbnail")]
    pub thumbnail: String,
    /// Where the game files were obtained.
    #[serde(default)]
    pub source: String,
}

fn default_thumbnail() -> String {
    GameConfig::DEFAULT_THUMBNAIL.to_string()
}

impl GameConfig {
    pub const DEFAULT_THUMBNAIL: &'static str = "thumbnail.png";

    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_with_limit(path, MAX_RECORD_BYTES)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_pretty_json(path, self)
    }

    /// The index entry for this game.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            year: self.year,
            genre: self.genre.clone(),
        }
    }
}

/// Short listing entry stored in `games.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub year: u16,
    pub genre: Vec<String>,
}

/// What [`GamesIndex::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    Added,
    Updated,
}

/// The `games.json` index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesIndex {
    #[serde(default)]
    pub games: Vec<GameSummary>,
}

impl GamesIndex {
    /// Load the index, or start an empty one if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = read_to_string_with_limit(path, MAX_RECORD_BYTES)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_pretty_json(path, self)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.games.iter().any(|g| g.id == id)
    }

    /// Replace the entry with the same id in place, or append it.
    pub fn upsert(&mut self, summary: GameSummary) -> IndexChange {
        match self.games.iter_mut().find(|g| g.id == summary.id) {
            Some(existing) => {
                *existing = summary;
                IndexChange::Updated
            }
            None => {
                self.games.push(summary);
                IndexChange::Added
            }
        }
    }

    /// Append summaries whose ids are not indexed yet. Existing entries are
    /// left untouched. Returns the ids that were added.
    pub fn insert_missing(&mut self, summaries: impl IntoIterator<Item = GameSummary>) -> Vec<String> {
        let mut added = Vec::new();
        for summary in summaries {
            if !self.contains(&summary.id) {
                added.push(summary.id.clone());
                self.games.push(summary);
            }
        }
        added
    }

    /// Sort by title, ignoring case.
    pub fn sort_by_title(&mut self) {
        self.games.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        });
    }
}

fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
