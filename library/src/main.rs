//! Rihlah launcher
//!
//! Lists the curated catalog, shows a game's briefing, or boots a game in a
//! local DOSBox. While a game is running, typing another game's name switches
//! to it; `q` or end of input quits.
//!
//! # URL Scheme
//!
//! Supports `rihlah://` deep links:
//! - `rihlah://play/{game_id}` - Boot a game from the catalog

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rihlah_core::{
    Catalog, CatalogEntry, Config, ResolveError, SessionController, SessionFactory, config,
};
use rihlah_library::player::{ProcessSessionFactory, SessionDir};
use rihlah_library::ui;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Rihlah - curated DOS shareware in a local DOSBox
#[derive(Parser)]
#[command(name = "rihlah")]
#[command(about = "Play curated DOS shareware in a local DOSBox")]
#[command(version)]
struct Cli {
    /// Catalog file to use instead of the curated one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory holding the .jsdos bundles
    #[arg(long, global = true)]
    games_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog
    List,

    /// Show a game's briefing, controls and launch checklist
    Info {
        /// Game id (or unique prefix)
        game: String,
    },

    /// Boot a game (defaults to the last game played, else the first entry)
    Play {
        /// Game id (or unique prefix)
        game: Option<String>,
    },
}

/// Actions that can be triggered by deep links
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeepLinkAction {
    /// Boot a catalog game
    Play { game_id: String },
}

/// Parse deep link from command line args
fn parse_deep_link(args: &[String]) -> Option<DeepLinkAction> {
    for arg in args.iter().skip(1) {
        if let Some(rest) = arg.strip_prefix("rihlah://") {
            return parse_rihlah_url(rest);
        }
    }
    None
}

/// Command-line arguments with deep links removed, for clap.
fn cli_args(args: &[String]) -> impl Iterator<Item = &String> {
    args.iter().filter(|arg| !arg.starts_with("rihlah://"))
}

/// Parse a rihlah:// URL path into an action
fn parse_rihlah_url(path: &str) -> Option<DeepLinkAction> {
    let (action, rest) = path.split_once('/')?;

    match action {
        "play" => {
            let game_id = rest.trim_end_matches('/').to_string();
            if game_id.is_empty() {
                return None;
            }
            Some(DeepLinkAction::Play { game_id })
        }
        _ => None,
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let cli = Cli::parse_from(cli_args(&args));

    let mut config = config::load();
    if let Some(path) = cli.catalog {
        config.library.catalog = Some(path);
    }
    if let Some(dir) = cli.games_dir {
        config.library.games_dir = Some(dir);
    }
    let catalog = load_catalog(&config)?;

    // Deep links take precedence over subcommands (rihlah://...)
    if let Some(action) = parse_deep_link(&args) {
        tracing::info!("Deep link detected: {:?}", action);
        let DeepLinkAction::Play { game_id } = action;
        let Some(entry) = catalog.get(&game_id) else {
            eprintln!("Game '{}' is not in the catalog", game_id);
            std::process::exit(1);
        };
        return play(&config, &catalog, entry);
    }

    match cli.command.unwrap_or(Commands::Play { game: None }) {
        Commands::List => print!("{}", ui::render_library(&catalog, None)),
        Commands::Info { game } => {
            let entry = resolve_or_exit(&catalog, &game);
            print!("{}", ui::render_briefing(entry));
        }
        Commands::Play { game } => {
            let entry = match game {
                Some(query) => resolve_or_exit(&catalog, &query),
                None => catalog
                    .select(config.library.last_game.as_deref().unwrap_or_default())
                    .context("Catalog has no games")?,
            };
            play(&config, &catalog, entry)?;
        }
    }

    Ok(())
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.library.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Ok(Catalog::builtin().clone()),
    }
}

fn resolve_or_exit<'a>(catalog: &'a Catalog, query: &str) -> &'a CatalogEntry {
    match catalog.resolve(query) {
        Ok(entry) => entry,
        Err(e) => {
            report_resolve_error(catalog, &e);
            std::process::exit(1);
        }
    }
}

fn report_resolve_error(catalog: &Catalog, error: &ResolveError) {
    eprintln!("{}", error);
    if let ResolveError::NotFound { suggestions, .. } = error
        && !suggestions.is_empty()
    {
        eprintln!("\nDid you mean:");
        for suggestion in suggestions {
            eprintln!("  - {}", suggestion);
        }
    }
    eprintln!("\nAvailable games:");
    for entry in catalog.entries() {
        eprintln!("  - {} ({})", entry.id, entry.title);
    }
}

/// Boot `entry` and run the interactive session until the user quits.
fn play(config: &Config, catalog: &Catalog, entry: &CatalogEntry) -> Result<()> {
    let games_dir = config
        .games_dir()
        .context("Could not determine the games directory")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let last_game = runtime.block_on(run_session(config, catalog, &games_dir, entry))?;
    remember_last_game(&last_game);
    Ok(())
}

/// Store `game_id` as the default for the next bare `rihlah play`.
///
/// Reloads the stored config so command-line overrides are not persisted.
fn remember_last_game(game_id: &str) {
    let mut stored = config::load();
    if stored.library.last_game.as_deref() == Some(game_id) {
        return;
    }
    stored.library.last_game = Some(game_id.to_string());
    if let Err(e) = config::save(&stored) {
        tracing::warn!("Failed to save config: {:#}", e);
    }
}

async fn run_session(
    config: &Config,
    catalog: &Catalog,
    games_dir: &Path,
    entry: &CatalogEntry,
) -> Result<String> {
    let session_root = config::data_dir()
        .map(|dir| dir.join("sessions"))
        .unwrap_or_else(|| env::temp_dir().join("rihlah-sessions"));
    let host = SessionDir::new(&session_root)
        .with_context(|| format!("Failed to create {}", session_root.display()))?;

    let factory = ProcessSessionFactory::from_config(&config.native);
    if !factory.is_available() {
        eprintln!(
            "'{}' was not found. Install DOSBox or set `command` under [native] in {}.",
            factory.command(),
            config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config.toml".to_string())
        );
    }

    let controller = SessionController::new(factory, host, config.controller_options())?;

    let mut status = controller.subscribe();
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let line = ui::render_status(&status.borrow_and_update());
            println!("{line}");
        }
    });

    let bundle_base = games_dir.to_string_lossy().into_owned();
    let mount_options = |entry: &CatalogEntry| {
        config
            .player
            .mount_options(entry.bundle_ref(&bundle_base))
    };

    println!("{}", ui::render_briefing(entry));
    let _ = controller.select(mount_options(entry));
    let mut active = entry.id.clone();
    println!("Type a game to switch to, `list` for the library, or `q` to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let query = line.trim();
        match query {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "list" => {
                print!("{}", ui::render_library(catalog, Some(&active)));
                continue;
            }
            _ => {}
        }

        match catalog.resolve(query) {
            Ok(next) => {
                tracing::info!("Switching to '{}'", next.id);
                println!("\n{}", ui::render_briefing(next));
                let _ = controller.select(mount_options(next));
                active = next.id.clone();
            }
            Err(e) => report_resolve_error(catalog, &e),
        }
    }

    // Wait for the stops: the runtime is dropped once this returns.
    controller.shutdown().await;
    printer.abort();
    Ok(active)
}
