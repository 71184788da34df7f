//! # Documents, Stores, and Components
//!
//! JobFinder renders into an in-process document instead of a browser DOM.
//! The pieces fit together like this:
//!
//! - [`Document`]: an element arena with selectors, classes and bubbling
//!   listeners.
//! - [`EventLoop`]: the host's task queue and timers, on virtual time so
//!   tests can step through delays.
//! - [`Store`]: one immutable application state snapshot, shallow-merged on
//!   write, with synchronous listeners.
//! - [`Component`]: a template plus data, methods and lifecycle hooks;
//!   rendering produces an [`Instance`].
//!
//! ## Signals
//!
//! `Signal<T>` is a cloneable handle to an observable value:
//!
//! ```rust
//! use jobfinder_core::*;
//!
//! let query = signal(String::from("rust"));
//! query.set("rust remote".into());
//! query.update(|q| q.push_str(" senior"));
//! assert_eq!(query.get(), "rust remote senior");
//! ```
//!
//! ## The store
//!
//! ```rust
//! use jobfinder_core::*;
//! use serde_json::{Map, json};
//!
//! let store: Store<Map<String, serde_json::Value>> = Store::default();
//! let _guard = store.subscribe(|s| log::debug!("now {s:?}"));
//! let mut patch = Map::new();
//! patch.insert("currentPage".into(), json!("jobs"));
//! store.set_state(patch);
//! assert_eq!(store.get_state()["currentPage"], json!("jobs"));
//! ```
//!
//! ## Cleanup
//!
//! Timers, subscriptions and nested widgets hand back a [`Dispose`]. An
//! instance collects them in its [`Scope`] and runs them all on
//! [`Instance::dispose`], which the router calls when a page is swapped out.

pub mod component;
pub mod dom;
pub mod effects;
pub mod error;
pub mod event_loop;
pub mod markup;
pub mod preferences;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod store;
pub mod theme;

pub use component::*;
pub use dom::*;
pub use effects::*;
pub use error::*;
pub use event_loop::*;
pub use markup::{Handler, Node, NodeKind};
pub use preferences::*;
pub use runtime::*;
pub use scope::*;
pub use signal::*;
pub use store::*;
pub use theme::*;
