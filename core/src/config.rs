//! Configuration management (config.toml in the platform config directory)
//!
//! Handles loading, saving, and providing defaults for launcher settings.
//! A missing or unparsable file yields defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rihlah_shared::{MAX_RECORD_BYTES, ensure_parent_dir, read_to_string_with_limit};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::session::{ControllerOptions, MountOptions};

const CONFIG_FILE: &str = "config.toml";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Emulator runtime and mount settings
    #[serde(default)]
    pub player: PlayerConfig,
    /// Locally installed DOSBox
    #[serde(default)]
    pub native: NativeConfig,
    /// Catalog and installed games
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Settings passed to every mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Where the runtime loads its own assets from
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Run the emulator off the UI thread (default: true)
    #[serde(default = "default_true")]
    pub worker_thread: bool,
    /// Prefix joined with each catalog entry's bundle name
    #[serde(default = "default_bundle_base")]
    pub bundle_base: String,
    /// Readiness poll interval in milliseconds (default: 30)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Stop waiting for the runtime after this many milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeConfig {
    /// DOSBox executable name or path (default: "dosbox")
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra arguments placed before `-conf`
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LibraryConfig {
    /// Catalog file replacing the builtin one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Directory holding bundles (default: `<data_dir>/games`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games_dir: Option<PathBuf>,
    /// Game booted by the last session, played again by a bare `rihlah play`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_game: Option<String>,
}

fn default_path_prefix() -> String {
    "https://v8.js-dos.com/latest/emulators/".to_string()
}
fn default_bundle_base() -> String {
    "/games/".to_string()
}
fn default_poll_interval_ms() -> u64 {
    30
}
fn default_command() -> String {
    "dosbox".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            worker_thread: default_true(),
            bundle_base: default_bundle_base(),
            poll_interval_ms: default_poll_interval_ms(),
            ready_timeout_ms: None,
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
        }
    }
}

impl PlayerConfig {
    /// Mount options for a bundle location.
    pub fn mount_options(&self, bundle_url: impl Into<String>) -> MountOptions {
        MountOptions {
            bundle_url: bundle_url.into(),
            path_prefix: self.path_prefix.clone(),
            worker_thread: self.worker_thread,
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            // A zero interval would spin.
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            ready_timeout: self.ready_timeout_ms.map(Duration::from_millis),
        }
    }
}

impl Config {
    /// Mount options for `entry`, with its bundle resolved against `bundle_base`.
    pub fn mount_options(&self, entry: &CatalogEntry) -> MountOptions {
        self.player
            .mount_options(entry.bundle_ref(&self.player.bundle_base))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        self.player.controller_options()
    }

    /// Configured games directory, or `<data_dir>/games`.
    pub fn games_dir(&self) -> Option<PathBuf> {
        self.library
            .games_dir
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("games")))
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/Rihlah`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.rihlah", "", "Rihlah")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory (installed bundles, session scratch space).
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.rihlah", "", "Rihlah")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path of the configuration file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_path().map(|path| load_from(&path)).unwrap_or_default()
}

/// Loads the configuration from `path`, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match read_to_string_with_limit(path, MAX_RECORD_BYTES)
        .and_then(|content| toml::from_str(&content).context("Invalid config.toml"))
    {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring config at {}: {:#}", path.display(), e);
            Config::default()
        }
    }
}

/// Saves the configuration to the platform config directory.
pub fn save(config: &Config) -> Result<()> {
    match config_path() {
        Some(path) => save_to(config, &path),
        None => Ok(()),
    }
}

/// Saves the configuration to `path`, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
