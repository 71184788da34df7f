pub use crate::component::{Component, Instance, Methods, Mounted, Page, Target, Template};
pub use crate::dom::{Document, ElementId};
pub use crate::effects::Dispose;
pub use crate::error::*;
pub use crate::event_loop::{Clock, EventLoop, ManualClock, SystemClock, TimerId};
pub use crate::markup::{self, Handler, Node};
pub use crate::preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use crate::runtime::Runtime;
pub use crate::scope::{CleanupId, Scope};
pub use crate::signal::{Signal, signal};
pub use crate::store::{State, Store};
pub use crate::theme::{THEME_KEY, Theme, ThemeManager};
