//! The JobFinder client.
//!
//! [`App::start`] installs the page shell, applies the saved theme, mounts
//! the navigation bar and theme toggle, registers every page with the hash
//! router and resolves the initial route. State shared between pages lives
//! in the [`AppState`] store on the [`AppContext`].

pub mod api;
pub mod bootstrap;
pub mod components;
pub mod config;
pub mod context;
pub mod icons;
pub mod pages;
pub mod shell;
pub mod state;
pub mod tour;

pub use bootstrap::App;
pub use config::{AppConfig, ConfigError};
pub use context::AppContext;
pub use state::{AppState, AppStatePatch};
