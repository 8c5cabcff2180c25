//! Verify command - check bundles for the required `.jsdos` metadata

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use rihlah_shared::{has_bundle_extension, inspect_bundle};

/// Arguments for the verify command
#[derive(Args)]
pub struct VerifyArgs {
    /// Directory to scan for .jsdos bundles
    #[arg(short, long, default_value = "public/games")]
    pub dir: PathBuf,

    /// Also scan subdirectories (e.g. the `<id>/` folders written by `build`)
    #[arg(short, long)]
    pub recursive: bool,
}

/// Execute the verify command
pub fn execute(args: VerifyArgs) -> Result<()> {
    let bundles = find_bundles(&args.dir, args.recursive)?;

    if bundles.is_empty() {
        println!("No .jsdos bundles found under {}.", args.dir.display());
        return Ok(());
    }

    let mut failures = 0;
    for path in &bundles {
        let name = path.strip_prefix(&args.dir).unwrap_or(path).display();
        match inspect_bundle(path) {
            Ok(report) if report.is_valid() => {
                println!("✓ {} contains required metadata.", name);
            }
            Ok(report) => {
                failures += 1;
                eprintln!("✗ {} is missing: {}", name, report.missing.join(", "));
            }
            Err(e) => {
                failures += 1;
                eprintln!("✗ {}: {}", name, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{} of {} bundles are missing the .jsdos metadata files",
            failures,
            bundles.len()
        );
    }
    Ok(())
}

/// Bundle files under `dir`, sorted by path.
fn find_bundles(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut bundles = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if entry.file_type().is_file() && has_bundle_extension(entry.path()) {
            bundles.push(entry.into_path());
        }
    }
    bundles.sort();
    Ok(bundles)
}
