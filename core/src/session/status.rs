//! Session status as shown to the player

use std::fmt;

/// Status tag without the error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Current controller status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// Waiting for the runtime or the mount to finish.
    Loading,
    /// A session is running.
    Ready,
    /// The last attempt failed; carries a human-readable detail.
    Error(String),
}

impl SessionStatus {
    pub fn state(&self) -> SessionState {
        match self {
            SessionStatus::Idle => SessionState::Idle,
            SessionStatus::Loading => SessionState::Loading,
            SessionStatus::Ready => SessionState::Ready,
            SessionStatus::Error(_) => SessionState::Error,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            SessionStatus::Error(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }

    /// Short overlay label.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Loading => "Initializing",
            SessionStatus::Ready => "Ready",
            SessionStatus::Error(_) => "Error",
        }
    }

    /// Overlay sentence, with the error detail appended when there is one.
    pub fn message(&self) -> String {
        match self {
            SessionStatus::Idle => "Select a bundle to boot the emulator.".to_string(),
            SessionStatus::Loading => {
                "Spinning up DOSBox and streaming the bundle\u{2026}".to_string()
            }
            SessionStatus::Ready => {
                "Game ready. Press the DOS window to capture your keyboard.".to_string()
            }
            SessionStatus::Error(detail) => {
                const COPY: &str = "We couldn't boot the emulator. Try again or pick another game.";
                if detail.is_empty() {
                    COPY.to_string()
                } else {
                    format!("{COPY} ({detail})")
                }
            }
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(SessionStatus::default(), SessionStatus::Idle);
        assert_eq!(SessionStatus::default().state(), SessionState::Idle);
    }

    #[test]
    fn only_errors_carry_detail() {
        assert_eq!(SessionStatus::Loading.detail(), None);
        assert_eq!(SessionStatus::Ready.detail(), None);
        assert_eq!(SessionStatus::Error("boom".into()).detail(), Some("boom"));
        assert_eq!(SessionStatus::Error("boom".into()).state(), SessionState::Error);
    }

    #[test]
    fn error_message_appends_detail() {
        let status = SessionStatus::Error("boom".into());
        assert_eq!(status.label(), "Error");
        assert_eq!(
            status.message(),
            "We couldn't boot the emulator. Try again or pick another game. (boom)"
        );
        assert!(!SessionStatus::Error(String::new()).message().contains('('));
    }

    #[test]
    fn loading_label_reads_initializing() {
        assert_eq!(SessionStatus::Loading.label(), "Initializing");
        assert!(SessionStatus::Loading.to_string().starts_with("Initializing: Spinning up DOSBox"));
    }
}
