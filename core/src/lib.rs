//! Rihlah Core - catalog, session lifecycle and configuration
//!
//! # Architecture
//!
//! - [`Catalog`] - Ordered, immutable list of playable games
//! - [`SessionController`] - Mounts bundles through a [`SessionFactory`], one live session per host
//! - [`config`] - Launcher settings and the controller inputs derived from them

pub mod catalog;
pub mod config;
pub mod session;

pub use catalog::{Catalog, CatalogEntry, CatalogError, ResolveError};
pub use config::Config;
pub use session::{
    ControllerError, ControllerOptions, HostSurface, MountError, MountOptions, Session,
    SessionController, SessionFactory, SessionState, SessionStatus,
};
