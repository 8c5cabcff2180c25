//! A running DOSBox child process.

use std::path::{Path, PathBuf};

use rihlah_core::Session;
use tokio::process::Child;

/// Session backed by a DOSBox process. The child is killed on stop, and on
/// drop if it was never stopped.
#[derive(Debug)]
pub struct ProcessSession {
    child: Option<Child>,
    workdir: PathBuf,
}

impl ProcessSession {
    pub(super) fn new(child: Child, workdir: PathBuf) -> Self {
        Self {
            child: Some(child),
            workdir,
        }
    }

    /// OS process id, while the session is running.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Whether `stop` has not been called yet.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Directory the bundle was unpacked into.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl Session for ProcessSession {
    async fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        let pid = child.id();
        if let Err(e) = child.kill().await {
            tracing::debug!("DOSBox (pid {:?}) already gone: {}", pid, e);
        }

        if let Err(e) = tokio::fs::remove_dir_all(&self.workdir).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove {}: {}", self.workdir.display(), e);
        }

        tracing::info!("Stopped DOSBox session (pid {:?})", pid);
    }
}
