//! Add command - register a game that already has a bundle

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

use rihlah_shared::{
    BUNDLE_EXTENSION, GAME_CONFIG_FILE, GAMES_INDEX_FILE, GameConfig, GamesIndex, IndexChange,
    is_valid_game_id,
};

/// Arguments for the add command
#[derive(Args)]
pub struct AddArgs {
    /// Game ID (lowercase, no spaces, e.g. "doom")
    #[arg(long)]
    pub id: String,

    /// Game title
    #[arg(long)]
    pub title: String,

    /// Short description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Author or publisher
    #[arg(long, default_value = "")]
    pub author: String,

    /// Release year
    #[arg(long)]
    pub year: u16,

    /// Genres, comma-separated (e.g. "Action, Shooter")
    #[arg(long, value_delimiter = ',')]
    pub genre: Vec<String>,

    /// Bundle file name (default: <id>-bundle.jsdos)
    #[arg(long)]
    pub bundle: Option<String>,

    /// Command that starts the game from the DOS prompt
    #[arg(long)]
    pub executable: String,

    /// Control binding as "Key=Action" (repeatable)
    #[arg(long = "control", value_parser = parse_control)]
    pub controls: Vec<(String, String)>,

    /// Where the game files came from
    #[arg(long, default_value = "")]
    pub source: String,

    /// Games directory holding games.json and the per-game folders
    #[arg(long, default_value = "games")]
    pub games_dir: PathBuf,
}

fn parse_control(s: &str) -> Result<(String, String), String> {
    let (key, action) = s
        .split_once('=')
        .ok_or_else(|| format!("expected Key=Action, got '{s}'"))?;
    let (key, action) = (key.trim(), action.trim());
    if key.is_empty() || action.is_empty() {
        return Err(format!("expected Key=Action, got '{s}'"));
    }
    Ok((key.to_string(), action.to_string()))
}

/// Execute the add command
pub fn execute(args: AddArgs) -> Result<()> {
    if !is_valid_game_id(&args.id) {
        anyhow::bail!(
            "Invalid game id '{}' (use lowercase letters, digits, '-' or '_')",
            args.id
        );
    }

    let bundle = args
        .bundle
        .unwrap_or_else(|| format!("{}-bundle.{}", args.id, BUNDLE_EXTENSION));
    let config = GameConfig {
        id: args.id.clone(),
        title: args.title,
        description: args.description,
        author: args.author,
        year: args.year,
        genre: args
            .genre
            .iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect(),
        bundle: bundle.clone(),
        executable: args.executable,
        controls: args.controls.into_iter().collect::<BTreeMap<_, _>>(),
        thumbnail: GameConfig::DEFAULT_THUMBNAIL.to_string(),
        source: args.source,
    };

    let game_dir = args.games_dir.join(&config.id);
    if !game_dir.exists() {
        std::fs::create_dir_all(&game_dir)
            .with_context(|| format!("Failed to create {}", game_dir.display()))?;
        println!("✓ Created directory: {}", game_dir.display());
    }

    let config_path = game_dir.join(GAME_CONFIG_FILE);
    config.save(&config_path)?;
    println!("✓ Created {}", config_path.display());

    let index_path = args.games_dir.join(GAMES_INDEX_FILE);
    let mut index = GamesIndex::load_or_default(&index_path)?;
    match index.upsert(config.summary()) {
        IndexChange::Added => println!("✓ Added game to {}", index_path.display()),
        IndexChange::Updated => println!("✓ Updated game in {}", index_path.display()),
    }
    index.save(&index_path)?;

    println!("\nNext steps:");
    println!("  1. Copy your {} file to {}", bundle, game_dir.display());
    println!("  2. Optionally add a {} to {}", config.thumbnail, game_dir.display());
    println!("  3. Check it with: rihlah-bundle verify --dir {} --recursive", args.games_dir.display());

    Ok(())
}
