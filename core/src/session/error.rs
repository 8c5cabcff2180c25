//! Session error types

use thiserror::Error;

/// Shown when the runtime fails without saying why.
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown emulator error";

/// Why a mount attempt did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// The runtime cannot be used from this environment.
    #[error("{0}")]
    Environment(String),

    /// The runtime never became available.
    #[error("Emulator runtime failed to load")]
    Unavailable,

    /// The runtime refused the mount.
    #[error("{0}")]
    Rejected(String),

    /// The runtime answered without a session.
    #[error("Unable to bootstrap the emulator")]
    NoSession,
}

impl MountError {
    /// Detail string for [`super::SessionStatus::Error`], never empty.
    pub fn detail(&self) -> String {
        let detail = self.to_string();
        if detail.trim().is_empty() {
            UNKNOWN_ERROR_DETAIL.to_string()
        } else {
            detail
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("session controller must be created inside a Tokio runtime")]
    NoRuntime,
}
