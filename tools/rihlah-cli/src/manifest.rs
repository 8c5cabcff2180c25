//! bundles.toml manifest parsing
//!
//! Lists the games `rihlah-bundle build` packs, one `[[games]]` table each.

use anyhow::{Context, Result};
use rihlah_shared::{GameConfig, MAX_RECORD_BYTES, is_valid_game_id, read_to_string_with_limit};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// bundles.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub games: Vec<GameDefinition>,
}

/// One game to bundle
#[derive(Debug, Clone, Deserialize)]
pub struct GameDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    pub year: u16,
    #[serde(default)]
    pub genre: Vec<String>,

    /// Downloaded archive with the game files, relative to the downloads dir
    pub zip_file: String,

    /// Disk image inside the archive to `imgmount` instead of mounting the directory
    #[serde(default)]
    pub img_file: Option<String>,

    /// Disk geometry for `imgmount -size` (bytes per sector, sectors, heads, cylinders)
    #[serde(default)]
    pub img_size: Option<String>,

    /// Command run from the autoexec section
    pub executable: String,

    /// Where the game files came from
    #[serde(default)]
    pub source: String,

    /// Key to action
    #[serde(default)]
    pub controls: BTreeMap<String, String>,
}

impl GameDefinition {
    /// File name of the packed bundle.
    pub fn bundle_name(&self) -> String {
        format!("{}-bundle.{}", self.id, rihlah_shared::BUNDLE_EXTENSION)
    }

    /// The `game.json` record written next to the bundle.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            year: self.year,
            genre: self.genre.clone(),
            bundle: self.bundle_name(),
            executable: self.executable.clone(),
            controls: self.controls.clone(),
            thumbnail: GameConfig::DEFAULT_THUMBNAIL.to_string(),
            source: self.source.clone(),
        }
    }
}

impl BundleManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_with_limit(path, MAX_RECORD_BYTES)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse bundles.toml")
    }

    /// Validate manifest fields
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for game in &self.games {
            if !is_valid_game_id(&game.id) {
                anyhow::bail!(
                    "Invalid game id '{}' in bundles.toml (use lowercase letters, digits, '-' or '_')",
                    game.id
                );
            }
            if !seen.insert(game.id.as_str()) {
                anyhow::bail!("Duplicate game id '{}' in bundles.toml", game.id);
            }
            if game.executable.trim().is_empty() {
                anyhow::bail!("Game '{}' has no executable", game.id);
            }
            if game.img_file.is_some() && game.img_size.is_none() {
                anyhow::bail!(
                    "Game '{}' sets img_file but not img_size (e.g. \"512,8,2,384\")",
                    game.id
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEEN4: &str = r#"
[[games]]
id = "keen4"
title = "Commander Keen 4: Secret of the Oracle"
description = "The Goodbye Galaxy saga begins!"
author = "id Software"
year = 1991
genre = ["Platform", "Action"]
zip_file = "keen4.zip"
img_file = "keen4.img"
img_size = "512,8,2,384"
executable = "keen4e"
source = "https://www.retrogames.cz/play_411-DOS.php"

[games.controls]
"Arrow Keys" = "Move"
Ctrl = "Jump"
"#;

    #[test]
    fn test_manifest_parses_games() {
        let manifest = BundleManifest::parse(KEEN4).unwrap();
        manifest.validate().unwrap();

        let game = &manifest.games[0];
        assert_eq!(game.img_file.as_deref(), Some("keen4.img"));
        assert_eq!(game.controls.get("Ctrl").map(String::as_str), Some("Jump"));
        assert_eq!(game.bundle_name(), "keen4-bundle.jsdos");
    }

    #[test]
    fn test_game_config_record() {
        let manifest = BundleManifest::parse(KEEN4).unwrap();
        let config = manifest.games[0].game_config();
        assert_eq!(config.bundle, "keen4-bundle.jsdos");
        assert_eq!(config.thumbnail, "thumbnail.png");
        assert_eq!(config.genre, vec!["Platform", "Action"]);
    }

    #[test]
    fn test_manifest_empty() {
        let manifest = BundleManifest::parse("").unwrap();
        assert!(manifest.games.is_empty());
        manifest.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let duplicate = format!("{KEEN4}{KEEN4}");
        let err = BundleManifest::parse(&duplicate)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        let bad_id = KEEN4.replace("id = \"keen4\"", "id = \"Keen 4\"");
        assert!(BundleManifest::parse(&bad_id).unwrap().validate().is_err());

        let no_size = KEEN4.replace("img_size = \"512,8,2,384\"\n", "");
        let err = BundleManifest::parse(&no_size)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("img_size"));
    }
}
