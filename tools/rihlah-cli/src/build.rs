//! Build command - pack downloaded games into .jsdos bundles
//!
//! For every game in the manifest: unpack its download into a staging
//! directory, add `.jsdos/dosbox.conf` and `.jsdos/jsdos.json`, zip the result
//! into `<out>/<id>/<id>-bundle.jsdos` and write `<out>/<id>/game.json`.
//! Finally the new games are added to `<out>/games.json`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use rihlah_shared::{
    DOSBOX_CONF_ENTRY, GAME_CONFIG_FILE, GAMES_INDEX_FILE, GamesIndex, JSDOS_JSON_ENTRY,
    ensure_parent_dir, extract_archive, write_bundle,
};

use crate::dosbox_conf;
use crate::manifest::{BundleManifest, GameDefinition};

/// Arguments for the build command
#[derive(Args)]
pub struct BuildArgs {
    /// Path to bundles.toml manifest file
    #[arg(short, long, default_value = "bundles.toml")]
    pub manifest: PathBuf,

    /// Directory holding the downloaded game archives
    #[arg(short, long, default_value = "downloads")]
    pub downloads: PathBuf,

    /// Output games directory
    #[arg(short, long, default_value = "games")]
    pub out: PathBuf,

    /// Keep OPL/AdLib music enabled
    #[arg(long)]
    pub music: bool,

    /// Only build these games (repeatable)
    #[arg(long = "game")]
    pub games: Vec<String>,
}

/// Bundle metadata stored at `.jsdos/jsdos.json`.
#[derive(Debug, Serialize)]
struct JsdosMetadata<'a> {
    id: &'a str,
    title: &'a str,
    executable: &'a str,
    music: bool,
    generator: String,
    created_at: DateTime<Utc>,
}

impl<'a> JsdosMetadata<'a> {
    fn new(game: &'a GameDefinition, music: bool) -> Self {
        Self {
            id: &game.id,
            title: &game.title,
            executable: &game.executable,
            music,
            generator: format!("rihlah-bundle {}", env!("CARGO_PKG_VERSION")),
            created_at: Utc::now(),
        }
    }
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    let manifest = BundleManifest::load(&args.manifest)?;
    manifest.validate()?;

    for id in &args.games {
        if !manifest.games.iter().any(|g| &g.id == id) {
            anyhow::bail!("Game '{}' is not in {}", id, args.manifest.display());
        }
    }
    let selected: Vec<&GameDefinition> = manifest
        .games
        .iter()
        .filter(|g| args.games.is_empty() || args.games.contains(&g.id))
        .collect();

    println!("Building DOS game bundles");
    if args.music {
        println!("Music is ENABLED (oplmode=auto).");
    } else {
        println!("Music is DISABLED (oplmode=none): sound effects stay, OPL/AdLib music is removed.");
    }

    let mut built = Vec::new();
    for game in &selected {
        println!("\nBuilding bundle for: {}", game.title);
        match build_game(game, &args.downloads, &args.out, args.music)? {
            Some(bundle) => {
                println!("  Created: {}", bundle.display());
                built.push(game.game_config().summary());
            }
            None => continue,
        }
    }

    let built_count = built.len();
    if built_count > 0 {
        println!("\nUpdating {}...", GAMES_INDEX_FILE);
        let index_path = args.out.join(GAMES_INDEX_FILE);
        let mut index = GamesIndex::load_or_default(&index_path)?;
        for id in index.insert_missing(built) {
            println!("  Added {} to {}", id, GAMES_INDEX_FILE);
        }
        index.sort_by_title();
        index.save(&index_path)?;
    }

    println!(
        "\nDone! {} built, {} skipped.",
        built_count,
        selected.len() - built_count
    );
    if !args.music && built_count > 0 {
        println!("To enable music for one game, edit its .jsdos/dosbox.conf and set oplmode=auto.");
    }
    Ok(())
}

/// Build one bundle. Returns `None` when the game's download is missing.
fn build_game(
    game: &GameDefinition,
    downloads: &Path,
    out: &Path,
    music: bool,
) -> Result<Option<PathBuf>> {
    let zip_path = downloads.join(&game.zip_file);
    if !zip_path.is_file() {
        println!("  Warning: archive not found: {}", zip_path.display());
        return Ok(None);
    }

    let staging = tempfile::Builder::new()
        .prefix(&format!("rihlah-{}-", game.id))
        .tempdir()
        .context("Failed to create staging directory")?;

    extract_archive(&zip_path, staging.path())
        .with_context(|| format!("Failed to unpack {}", zip_path.display()))?;

    let conf_path = staging.path().join(DOSBOX_CONF_ENTRY);
    ensure_parent_dir(&conf_path)?;
    std::fs::write(&conf_path, dosbox_conf::generate(game, music))
        .with_context(|| format!("Failed to write {}", conf_path.display()))?;

    let metadata = serde_json::to_string_pretty(&JsdosMetadata::new(game, music))
        .context("Failed to serialize jsdos.json")?;
    std::fs::write(staging.path().join(JSDOS_JSON_ENTRY), metadata)
        .context("Failed to write jsdos.json")?;

    let game_dir = out.join(&game.id);
    std::fs::create_dir_all(&game_dir)
        .with_context(|| format!("Failed to create {}", game_dir.display()))?;

    let bundle_path = game_dir.join(game.bundle_name());
    let files = write_bundle(staging.path(), &bundle_path)
        .with_context(|| format!("Failed to pack {}", bundle_path.display()))?;
    println!("  Packed {} files", files);

    game.game_config().save(&game_dir.join(GAME_CONFIG_FILE))?;
    Ok(Some(bundle_path))
}
