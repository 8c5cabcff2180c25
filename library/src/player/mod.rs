//! Native player: boots bundles in a locally installed DOSBox.
//!
//! A mount unpacks the `.jsdos` archive into a fresh directory under the
//! [`SessionDir`] and starts DOSBox there with the bundle's own
//! `.jsdos/dosbox.conf`.

mod binary;
mod host;
mod session;

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use rihlah_core::config::NativeConfig;
use rihlah_core::{MountError, MountOptions, SessionFactory};
use rihlah_shared::{DOSBOX_CONF_ENTRY, extract_bundle};

pub use binary::find_dosbox;
pub use host::SessionDir;
pub use session::ProcessSession;

/// Session factory that runs each bundle in its own DOSBox process.
#[derive(Debug)]
pub struct ProcessSessionFactory {
    command: String,
    args: Vec<String>,
    attempts: AtomicU64,
    /// DOSBox location, once it has been found.
    program: OnceLock<PathBuf>,
}

impl ProcessSessionFactory {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            attempts: AtomicU64::new(0),
            program: OnceLock::new(),
        }
    }

    pub fn from_config(native: &NativeConfig) -> Self {
        Self::new(native.command.clone(), native.args.clone())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Locate DOSBox. A miss is retried on the next call; a hit is kept.
    fn program(&self) -> Option<PathBuf> {
        if let Some(program) = self.program.get() {
            return Some(program.clone());
        }
        let program = find_dosbox(&self.command)?;
        Some(self.program.get_or_init(|| program).clone())
    }
}

impl SessionFactory for ProcessSessionFactory {
    type Session = ProcessSession;
    type Host = SessionDir;

    fn is_available(&self) -> bool {
        self.program().is_some()
    }

    fn mount(
        &self,
        host: Arc<SessionDir>,
        options: MountOptions,
    ) -> impl Future<Output = Result<Option<ProcessSession>, MountError>> + Send {
        let program = self.program();
        let command = self.command.clone();
        let args = self.args.clone();
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;

        async move {
            let program = program.ok_or_else(|| {
                MountError::Environment(format!("'{}' was not found on PATH", command))
            })?;
            let bundle = local_bundle_path(&options.bundle_url)?;
            let workdir = host.attempt_dir(attempt);

            tracing::debug!(
                "Unpacking {} into {}",
                bundle.display(),
                workdir.display()
            );
            let target = workdir.clone();
            tokio::task::spawn_blocking(move || extract_bundle(&bundle, &target))
                .await
                .map_err(|e| MountError::Rejected(format!("bundle extraction failed: {e}")))?
                .map_err(|e| MountError::Rejected(e.to_string()))?;

            let child = tokio::process::Command::new(&program)
                .args(&args)
                .arg("-conf")
                .arg(DOSBOX_CONF_ENTRY)
                .current_dir(&workdir)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    MountError::Rejected(format!("failed to start {}: {}", program.display(), e))
                })?;

            tracing::info!(
                "Started {} (pid {:?}) for {}",
                program.display(),
                child.id(),
                options.bundle_url
            );
            Ok(Some(ProcessSession::new(child, workdir)))
        }
    }
}

/// Map a bundle URL onto a local file. Remote bundles are not supported.
fn local_bundle_path(bundle_url: &str) -> Result<PathBuf, MountError> {
    if bundle_url.starts_with("http://") || bundle_url.starts_with("https://") {
        return Err(MountError::Environment(format!(
            "remote bundles cannot be played natively: {bundle_url}"
        )));
    }
    let path = bundle_url.strip_prefix("file://").unwrap_or(bundle_url);
    if path.is_empty() {
        return Err(MountError::Rejected("empty bundle path".to_string()));
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rihlah_core::{ControllerOptions, Session, SessionController, SessionStatus};
    use rihlah_shared::{JSDOS_JSON_ENTRY, write_bundle};
    use std::path::Path;

    fn pack(dir: &Path, files: &[(&str, &str)]) -> PathBuf {
        let staging = dir.join("staging");
        for (name, content) in files {
            let path = staging.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let bundle = dir.join("game.jsdos");
        write_bundle(&staging, &bundle).unwrap();
        bundle
    }

    #[test]
    fn local_bundle_paths() {
        assert_eq!(
            local_bundle_path("/srv/games/keen4.jsdos").unwrap(),
            PathBuf::from("/srv/games/keen4.jsdos")
        );
        assert_eq!(
            local_bundle_path("file:///srv/games/keen4.jsdos").unwrap(),
            PathBuf::from("/srv/games/keen4.jsdos")
        );
        assert!(matches!(
            local_bundle_path("https://cdn.example/keen4.jsdos"),
            Err(MountError::Environment(_))
        ));
        assert!(local_bundle_path("").is_err());
    }

    #[test]
    fn unavailable_without_dosbox() {
        let factory = ProcessSessionFactory::new("rihlah-no-such-dosbox-binary", Vec::new());
        assert!(!factory.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn resolved_program_is_remembered() {
        let factory = ProcessSessionFactory::new("true", Vec::new());
        assert!(factory.program.get().is_none());
        assert!(factory.is_available());
        let found = factory.program.get().cloned().expect("cached path");
        assert_eq!(factory.program(), Some(found));
    }

    #[tokio::test]
    async fn mount_without_dosbox_is_an_environment_error() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(SessionDir::new(dir.path()).unwrap());
        let factory = ProcessSessionFactory::new("rihlah-no-such-dosbox-binary", Vec::new());

        let result = factory
            .mount(host, MountOptions::new("/nowhere/game.jsdos"))
            .await;
        assert!(matches!(result, Err(MountError::Environment(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mount_rejects_incomplete_bundles() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = pack(dir.path(), &[("KEEN4E.EXE", "MZ")]);
        let host = Arc::new(SessionDir::new(dir.path().join("sessions")).unwrap());
        let factory = ProcessSessionFactory::new("true", Vec::new());

        let result = factory
            .mount(host, MountOptions::new(bundle.to_str().unwrap()))
            .await;
        match result {
            Err(MountError::Rejected(message)) => assert!(message.contains(".jsdos/")),
            _ => panic!("expected a rejected mount"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mount_unpacks_and_starts_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = pack(
            dir.path(),
            &[
                (DOSBOX_CONF_ENTRY, "[autoexec]\nmount c .\n"),
                (JSDOS_JSON_ENTRY, "{}"),
                ("KEEN4E.EXE", "MZ"),
            ],
        );
        let host = Arc::new(SessionDir::new(dir.path().join("sessions")).unwrap());
        let factory = ProcessSessionFactory::new("true", Vec::new());

        let mut session = factory
            .mount(Arc::clone(&host), MountOptions::new(bundle.to_str().unwrap()))
            .await
            .unwrap()
            .expect("session");

        assert!(session.workdir().starts_with(host.root()));
        assert!(session.workdir().join(DOSBOX_CONF_ENTRY).is_file());
        assert!(session.workdir().join("KEEN4E.EXE").is_file());

        session.stop().await;
        assert!(!session.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn shutdown_stops_the_session_before_the_runtime_goes_away() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = pack(
            dir.path(),
            &[
                (DOSBOX_CONF_ENTRY, "[autoexec]\nmount c .\n"),
                (JSDOS_JSON_ENTRY, "{}"),
            ],
        );
        let sessions = dir.path().join("sessions");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let host = SessionDir::new(&sessions).unwrap();
            // `sh -c "sleep 30" x -conf ...`: the trailing arguments are ignored.
            let factory = ProcessSessionFactory::new(
                "/bin/sh",
                vec!["-c".to_string(), "sleep 30".to_string(), "x".to_string()],
            );
            let controller =
                SessionController::new(factory, host, ControllerOptions::default()).unwrap();

            controller
                .select(MountOptions::new(bundle.to_str().unwrap()))
                .await
                .unwrap();
            assert_eq!(controller.status(), SessionStatus::Ready);
            assert!(sessions.join("attempt-1").is_dir());

            controller.shutdown().await;
        });
        drop(runtime);

        let left: Vec<_> = std::fs::read_dir(&sessions)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert!(left.is_empty(), "session directories left behind: {left:?}");
    }
}
