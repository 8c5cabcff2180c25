//! Working directory that sessions are unpacked into.

use std::io;
use std::path::{Path, PathBuf};

use rihlah_core::HostSurface;

/// Host surface for the native player: one directory, one subdirectory per
/// mount attempt.
#[derive(Debug)]
pub struct SessionDir {
    root: PathBuf,
}

impl SessionDir {
    /// Use `root` as the host directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for mount attempt number `attempt`.
    pub fn attempt_dir(&self, attempt: u64) -> PathBuf {
        self.root.join(format!("attempt-{attempt}"))
    }
}

impl HostSurface for SessionDir {
    /// Empty the directory. Inside a Tokio runtime the removal runs on the
    /// blocking pool; the entries to remove are listed before returning.
    fn clear(&self) {
        let paths: Vec<PathBuf> = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries.flatten().map(|entry| entry.path()).collect(),
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", self.root.display(), e);
                return;
            }
        };
        if paths.is_empty() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || remove_all(&paths));
            }
            Err(_) => remove_all(&paths),
        }
    }
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        // A stopping session may have removed its own directory already.
        if let Err(e) = result
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
