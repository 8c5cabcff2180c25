//! Game catalog
//!
//! The catalog is an ordered, immutable list of games defined at startup:
//! either the curated list compiled into the binary or an operator-supplied
//! TOML file of the same shape. The launcher never mutates it.

mod resolver;

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use rihlah_shared::{MAX_RECORD_BYTES, is_valid_game_id, read_to_string_with_limit};
use serde::Deserialize;
use thiserror::Error;

pub use resolver::{ResolveError, levenshtein_distance};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::parse(BUILTIN_CATALOG).expect("embedded catalog.toml is valid")
});

/// One playable game.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub year: u16,
    pub developer: String,
    #[serde(default)]
    pub publisher: Option<String>,
    pub genre: String,
    /// Play-time label, e.g. "Shareware episode 1".
    pub runtime: String,
    pub description: String,
    pub tagline: String,
    #[serde(default)]
    pub controls: Vec<String>,
    /// Launch checklist, in order.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Bundle file name, resolved against a bundle base.
    pub bundle: String,
    #[serde(default)]
    pub accent: String,
    #[serde(default)]
    pub mood: String,
}

impl CatalogEntry {
    /// Join `base` (a URL prefix or directory) with this entry's bundle name.
    pub fn bundle_ref(&self, base: &str) -> String {
        if base.is_empty() {
            self.bundle.clone()
        } else if base.ends_with('/') || base.ends_with('\\') {
            format!("{}{}", base, self.bundle)
        } else {
            format!("{}/{}", base, self.bundle)
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog has no games")]
    Empty,

    #[error("invalid game id '{0}' (use lowercase letters, digits, '-' or '_')")]
    InvalidId(String),

    #[error("duplicate game id '{0}'")]
    DuplicateId(String),

    #[error("game '{0}' has no bundle")]
    MissingBundle(String),

    #[error("{0}")]
    Read(String),
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    games: Vec<CatalogEntry>,
}

/// Ordered list of games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The curated catalog compiled into the binary.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = read_to_string_with_limit(path, MAX_RECORD_BYTES)
            .map_err(|e| CatalogError::Read(format!("{e:#}")))?;
        Self::parse(&content)
    }

    /// Parse and validate catalog TOML.
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_entries(file.games)
    }

    /// Build a catalog from entries, validating ids and bundle names.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !is_valid_game_id(&entry.id) {
                return Err(CatalogError::InvalidId(entry.id.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
            if entry.bundle.trim().is_empty() {
                return Err(CatalogError::MissingBundle(entry.id.clone()));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&CatalogEntry> {
        self.entries.first()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The entry with `id`, falling back to the first entry for unknown ids.
    pub fn select(&self, id: &str) -> Option<&CatalogEntry> {
        self.get(id).or_else(|| self.first())
    }

    /// Resolve a user-typed query (exact, case-insensitive or unique prefix).
    pub fn resolve(&self, query: &str) -> Result<&CatalogEntry, ResolveError> {
        resolver::resolve(query, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_toml(id: &str, bundle: &str) -> String {
        format!(
            r#"
[[games]]
id = "{id}"
title = "Title {id}"
year = 1991
developer = "Dev"
genre = "Platform"
runtime = "Shareware"
description = "Desc"
tagline = "Tag"
bundle = "{bundle}"
"#
        )
    }

    #[test]
    fn builtin_catalog_is_ordered() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["jetpack", "keen4", "wolf3d"]);

        let keen = catalog.get("keen4").unwrap();
        assert_eq!(keen.year, 1991);
        assert_eq!(keen.bundle, "keen4.jsdos");
        assert_eq!(keen.controls.len(), 4);
        assert_eq!(keen.controls[3], "Ctrl + Alt for pogo");
        assert!(keen.publisher.is_none());
    }

    #[test]
    fn select_falls_back_to_first_entry() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.select("wolf3d").unwrap().id, "wolf3d");
        assert_eq!(catalog.select("doom").unwrap().id, "jetpack");
        assert_eq!(catalog.select("").unwrap().id, "jetpack");
    }

    #[test]
    fn parses_optional_fields_with_defaults() {
        let catalog = Catalog::parse(&entry_toml("a", "a.bundle")).unwrap();
        let entry = catalog.first().unwrap();
        assert!(entry.controls.is_empty());
        assert!(entry.instructions.is_empty());
        assert!(entry.mood.is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let content = format!("{}{}", entry_toml("a", "a.bundle"), entry_toml("a", "b.bundle"));
        assert!(matches!(
            Catalog::parse(&content),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn rejects_empty_and_invalid_catalogs() {
        assert!(matches!(Catalog::parse(""), Err(CatalogError::Empty)));
        assert!(matches!(
            Catalog::parse(&entry_toml("../a", "a.bundle")),
            Err(CatalogError::InvalidId(_))
        ));
        assert!(matches!(
            Catalog::parse(&entry_toml("a", " ")),
            Err(CatalogError::MissingBundle(_))
        ));
        assert!(matches!(
            Catalog::parse("games = 3"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn loads_catalog_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, entry_toml("b", "b.bundle")).unwrap();
        assert_eq!(Catalog::load(&path).unwrap().len(), 1);

        assert!(matches!(
            Catalog::load(&dir.path().join("missing.toml")),
            Err(CatalogError::Read(_))
        ));
    }

    #[test]
    fn bundle_ref_joins_bases() {
        let catalog = Catalog::builtin();
        let jetpack = catalog.first().unwrap();
        assert_eq!(jetpack.bundle_ref("/games/"), "/games/jetpack.jsdos");
        assert_eq!(jetpack.bundle_ref("/games"), "/games/jetpack.jsdos");
        assert_eq!(jetpack.bundle_ref(""), "jetpack.jsdos");
        assert_eq!(
            jetpack.bundle_ref("https://cdn.example/dos/"),
            "https://cdn.example/dos/jetpack.jsdos"
        );
    }
}
