//! Emulator session lifecycle
//!
//! The emulator itself is external: it is reached through a
//! [`SessionFactory`] that can report whether it is ready and mount a bundle
//! onto a [`HostSurface`], producing a [`Session`] that can only be stopped.
//!
//! [`SessionController`] owns at most one live session per host. Every new
//! selection supersedes the previous attempt; results from superseded
//! attempts are discarded and any session they produced is stopped.
//!
//! # Example
//!
//! ```rust,ignore
//! let controller = SessionController::new(factory, host, ControllerOptions::default())?;
//! let mut status = controller.subscribe();
//!
//! controller.select(config.mount_options(entry));
//! while status.changed().await.is_ok() {
//!     println!("{}", status.borrow().message());
//! }
//! ```

mod controller;
mod error;
mod status;

use std::future::Future;
use std::sync::Arc;

pub use controller::{ControllerOptions, SessionController};
pub use error::{ControllerError, MountError};
pub use status::{SessionState, SessionStatus};

/// A running emulator instance bound to one bundle.
pub trait Session: Send + 'static {
    /// Stop the emulator. Calling this on a stopped session is a no-op.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;
}

/// The attachment point the emulator renders into.
pub trait HostSurface: Send + Sync + 'static {
    /// Remove whatever a previous session left on the surface.
    fn clear(&self);
}

/// Capability to create sessions, provided by the emulator runtime.
pub trait SessionFactory: Send + Sync + 'static {
    type Session: Session;
    type Host: HostSurface;

    /// Whether the runtime is loaded and `mount` may be called.
    fn is_available(&self) -> bool;

    /// Boot `options.bundle_url` on `host`.
    ///
    /// `Ok(None)` means the runtime answered without a session; the
    /// controller reports it the same way as a failed mount.
    fn mount(
        &self,
        host: Arc<Self::Host>,
        options: MountOptions,
    ) -> impl Future<Output = Result<Option<Self::Session>, MountError>> + Send;
}

/// Options passed to the runtime for one mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    /// Bundle location (URL or local path).
    pub bundle_url: String,
    /// Where the runtime loads its own assets from.
    pub path_prefix: String,
    /// Run the emulator off the UI thread.
    pub worker_thread: bool,
}

impl MountOptions {
    pub fn new(bundle_url: impl Into<String>) -> Self {
        Self {
            bundle_url: bundle_url.into(),
            path_prefix: String::new(),
            worker_thread: true,
        }
    }
}
