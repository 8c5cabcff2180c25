//! Filesystem helpers for catalog, index and config files.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum size of a text record (catalog, index, `game.json`, config).
pub const MAX_RECORD_BYTES: u64 = 4 * 1024 * 1024; // 4 MiB

/// Read a UTF-8 text file, refusing anything larger than `max_bytes`.
pub fn read_to_string_with_limit(path: &Path, max_bytes: u64) -> Result<String> {
    let len = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if len > max_bytes {
        anyhow::bail!(
            "{} is too large ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
