use std::rc::Rc;

use crate::dom::Document;
use crate::event_loop::EventLoop;
use crate::preferences::{MemoryPreferences, PreferenceStore};
use crate::signal::{Signal, signal};
use crate::theme::Theme;

/// The host environment every component renders against: the document,
/// the event loop, persisted preferences and the system color scheme.
///
/// Cheap to clone; passed by reference instead of living in globals, so each
/// test can build an isolated one.
#[derive(Clone)]
pub struct Runtime {
    pub document: Rc<Document>,
    pub event_loop: Rc<EventLoop>,
    pub preferences: Rc<dyn PreferenceStore>,
    /// `prefers-color-scheme` as reported by the host.
    pub color_scheme: Signal<Theme>,
}

impl Runtime {
    pub fn new(event_loop: EventLoop, preferences: Rc<dyn PreferenceStore>) -> Self {
        Self {
            document: Rc::new(Document::new()),
            event_loop: Rc::new(event_loop),
            preferences,
            color_scheme: signal(Theme::Dark),
        }
    }

    /// In-memory preferences and a system-clock loop.
    pub fn headless() -> Self {
        Self::new(EventLoop::new(), Rc::new(MemoryPreferences::new()))
    }

    pub fn with_preferences(preferences: Rc<dyn PreferenceStore>) -> Self {
        Self::new(EventLoop::new(), preferences)
    }
}
