//! Locating the DOSBox executable.

use std::path::{Path, PathBuf};

/// Find the DOSBox executable for `command`.
///
/// Searches in order:
/// 1. `command` itself, when it is a path
/// 2. Same directory as the launcher executable
/// 3. System PATH
pub fn find_dosbox(command: &str) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let as_path = Path::new(command);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }

    let exe_name = if cfg!(windows) && as_path.extension().is_none() {
        format!("{}.exe", command)
    } else {
        command.to_string()
    };

    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let local = dir.join(&exe_name);
        if local.is_file() {
            return Some(local);
        }
    }

    which::which(command).ok()
}
