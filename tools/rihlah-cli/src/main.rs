//! Rihlah bundle tool - package DOS games as .jsdos bundles
//!
//! # Commands
//!
//! - `rihlah-bundle build` - Pack downloaded games listed in bundles.toml
//! - `rihlah-bundle verify` - Check bundles for the required `.jsdos/` metadata
//! - `rihlah-bundle add` - Register a game that already has a bundle
//!
//! # Manifest (bundles.toml)
//!
//! ```toml
//! [[games]]
//! id = "keen4"
//! title = "Commander Keen 4: Secret of the Oracle"
//! author = "id Software"
//! year = 1991
//! genre = ["Platform", "Action"]
//! zip_file = "keen4.zip"
//! img_file = "keen4.img"        # optional: imgmount this image
//! img_size = "512,8,2,384"
//! executable = "keen4e"
//!
//! [games.controls]
//! "Arrow Keys" = "Move"
//! ```

mod add;
mod build;
mod dosbox_conf;
mod manifest;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Rihlah bundle tool - package DOS games as .jsdos bundles
#[derive(Parser)]
#[command(name = "rihlah-bundle")]
#[command(about = "Package DOS games as .jsdos bundles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack downloaded games into bundles and update games.json
    Build(build::BuildArgs),

    /// Check bundles for the required .jsdos metadata
    Verify(verify::VerifyArgs),

    /// Register a game and its bundle in games.json
    Add(add::AddArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build::execute(args),
        Commands::Verify(args) => verify::execute(args),
        Commands::Add(args) => add::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_parses_controls_and_genres() {
        let cli = Cli::parse_from([
            "rihlah-bundle",
            "add",
            "--id",
            "doom",
            "--title",
            "DOOM",
            "--year",
            "1993",
            "--executable",
            "DOOM.EXE",
            "--genre",
            "Action,Shooter",
            "--control",
            "Ctrl=Fire",
            "--control",
            "Space=Open",
        ]);
        let Commands::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.genre, vec!["Action", "Shooter"]);
        assert_eq!(args.controls.len(), 2);
        assert_eq!(args.games_dir, std::path::PathBuf::from("games"));
    }
}
