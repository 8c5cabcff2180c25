//! Session controller: one live session per host, latest selection wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{
    ControllerError, HostSurface, MountError, MountOptions, Session, SessionFactory, SessionStatus,
};

/// How often to check whether the runtime has loaded.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Timing knobs for [`SessionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Interval between readiness checks.
    pub poll_interval: Duration,
    /// Give up waiting for the runtime after this long. `None` waits until
    /// the attempt is superseded or the controller is disposed.
    pub ready_timeout: Option<Duration>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: None,
        }
    }
}

/// Outcome of waiting for the runtime.
enum Readiness {
    Available,
    TimedOut,
    Superseded,
}

struct State<F: SessionFactory> {
    /// Bumped by every selection and by disposal; attempts compare against it.
    generation: u64,
    session: Option<F::Session>,
    /// Released on disposal.
    host: Option<Arc<F::Host>>,
}

struct Shared<F: SessionFactory> {
    factory: F,
    options: ControllerOptions,
    state: Mutex<State<F>>,
    status: watch::Sender<SessionStatus>,
    runtime: Handle,
    /// Stop tasks that may still be running.
    teardowns: Mutex<Vec<JoinHandle<()>>>,
}

/// Drives mount/teardown of emulator sessions for a single host surface.
///
/// Dropping the controller disposes it: the in-flight attempt (if any)
/// becomes a no-op and the live session (if any) is stopped.
pub struct SessionController<F: SessionFactory> {
    shared: Arc<Shared<F>>,
}

impl<F: SessionFactory> SessionController<F> {
    /// Create a controller bound to `host`.
    ///
    /// Must be called from within a Tokio runtime; mounts and teardowns are
    /// spawned onto it.
    pub fn new(
        factory: F,
        host: impl Into<Arc<F::Host>>,
        options: ControllerOptions,
    ) -> Result<Self, ControllerError> {
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        let (status, _) = watch::channel(SessionStatus::Idle);

        Ok(Self {
            shared: Arc::new(Shared {
                factory,
                options,
                state: Mutex::new(State {
                    generation: 0,
                    session: None,
                    host: Some(host.into()),
                }),
                status,
                runtime,
                teardowns: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Switch to a new bundle, superseding whatever was selected before.
    ///
    /// The previous session is stopped without waiting, the host is
    /// cleared and a new mount starts in the background. The returned handle
    /// completes once this attempt has settled; dropping it is fine.
    pub fn select(&self, options: MountOptions) -> JoinHandle<()> {
        let (token, host, previous) = {
            let mut state = self.shared.lock_state();
            let Some(host) = state.host.clone() else {
                return self.shared.runtime.spawn(async {});
            };
            state.generation += 1;
            self.shared.status.send_replace(SessionStatus::Loading);
            (state.generation, host, state.session.take())
        };

        tracing::debug!("Selecting bundle {} (attempt {})", options.bundle_url, token);

        if let Some(previous) = previous {
            self.shared.teardown(previous);
        }
        host.clear();

        let shared = Arc::clone(&self.shared);
        self.shared
            .runtime
            .spawn(async move { shared.run_attempt(token, host, options).await })
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.shared.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status.subscribe()
    }

    /// Whether a live session is held.
    pub fn has_session(&self) -> bool {
        self.shared.lock_state().session.is_some()
    }

    /// Number of selections made so far (plus one after disposal).
    pub fn generation(&self) -> u64 {
        self.shared.lock_state().generation
    }

    /// Tear the controller down. Equivalent to dropping it.
    pub fn dispose(self) {
        drop(self);
    }

    /// Dispose, then wait until every session stop issued so far has
    /// finished.
    ///
    /// Use this instead of [`dispose`](Self::dispose) when the runtime is
    /// about to shut down, which would cancel pending stops. Sessions that
    /// are still mounting are not waited for.
    pub async fn shutdown(self) {
        let shared = Arc::clone(&self.shared);
        drop(self);

        let pending = std::mem::take(&mut *shared.lock_teardowns());
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::warn!("Session teardown failed: {}", e);
            }
        }
    }
}

impl<F: SessionFactory> Drop for SessionController<F> {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl<F: SessionFactory> Shared<F> {
    fn lock_state(&self) -> MutexGuard<'_, State<F>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_teardowns(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.teardowns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, token: u64) -> bool {
        self.lock_state().generation == token
    }

    async fn run_attempt(self: Arc<Self>, token: u64, host: Arc<F::Host>, options: MountOptions) {
        let result = match self.wait_until_available(token).await {
            Readiness::Superseded => {
                tracing::trace!("Attempt {} superseded before mounting", token);
                return;
            }
            Readiness::TimedOut => Err(MountError::Unavailable),
            Readiness::Available => self.factory.mount(host, options).await,
        };
        self.complete(token, result);
    }

    async fn wait_until_available(&self, token: u64) -> Readiness {
        let started = Instant::now();
        loop {
            if !self.is_current(token) {
                return Readiness::Superseded;
            }
            if self.factory.is_available() {
                return Readiness::Available;
            }
            if let Some(timeout) = self.options.ready_timeout
                && started.elapsed() >= timeout
            {
                return Readiness::TimedOut;
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    fn complete(&self, token: u64, result: Result<Option<F::Session>, MountError>) {
        let mut state = self.lock_state();
        if state.generation != token {
            drop(state);
            if let Ok(Some(session)) = result {
                tracing::debug!("Stopping session from superseded attempt {}", token);
                self.teardown(session);
            }
            return;
        }

        match result {
            Ok(Some(session)) => {
                state.session = Some(session);
                self.status.send_replace(SessionStatus::Ready);
                tracing::info!("Emulator session ready");
            }
            Ok(None) => {
                tracing::warn!("Emulator runtime returned no session");
                self.status
                    .send_replace(SessionStatus::Error(MountError::NoSession.detail()));
            }
            Err(error) => {
                tracing::error!("Failed to boot emulator: {}", error);
                self.status.send_replace(SessionStatus::Error(error.detail()));
            }
        }
    }

    /// Stop `session` in the background.
    fn teardown(&self, mut session: F::Session) {
        let handle = self.runtime.spawn(async move {
            session.stop().await;
        });
        let mut teardowns = self.lock_teardowns();
        teardowns.retain(|pending| !pending.is_finished());
        teardowns.push(handle);
    }

    fn dispose(&self) {
        let session = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.host = None;
            state.session.take()
        };
        if let Some(session) = session {
            tracing::debug!("Stopping session on dispose");
            self.teardown(session);
        }
    }
}
