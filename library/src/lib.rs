//! Rihlah Library
//!
//! Terminal front-end for the Rihlah DOS arcade. Games are booted in a
//! locally installed DOSBox, one child process per session, driven by the
//! [`rihlah_core::SessionController`].

pub mod player;
pub mod ui;
