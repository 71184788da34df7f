use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{Dispose, Runtime, Signal, signal};

pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the active theme: applies it to the document element, persists it
/// under [`THEME_KEY`] and notifies theme-change watchers on every apply.
pub struct ThemeManager {
    runtime: Runtime,
    theme: Signal<Theme>,
    system: RefCell<Option<Dispose>>,
}

impl ThemeManager {
    /// Reads the persisted preference (dark when absent or unreadable).
    pub fn new(runtime: &Runtime) -> Rc<Self> {
        let stored = runtime.preferences.get(THEME_KEY);
        let theme = stored
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or_default();
        if let Some(raw) = stored.as_deref()
            && Theme::parse(raw).is_none()
        {
            log::warn!("ignoring unknown persisted theme {raw:?}");
        }
        Rc::new(Self {
            runtime: runtime.clone(),
            theme: signal(theme),
            system: RefCell::new(None),
        })
    }

    /// Applies the current theme and starts following system color-scheme
    /// changes.
    pub fn init(self: &Rc<Self>) {
        self.apply();
        let weak = Rc::downgrade(self);
        let d = self.runtime.color_scheme.watch(move |scheme| {
            if let Some(tm) = weak.upgrade() {
                log::debug!("system color scheme changed to {scheme}");
                tm.theme.set_silent(*scheme);
                tm.apply();
            }
        });
        if let Some(old) = self.system.replace(Some(d)) {
            old.run();
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn is_dark(&self) -> bool {
        self.theme() == Theme::Dark
    }

    pub fn toggle(&self) -> Theme {
        let next = self.theme().toggled();
        self.theme.set_silent(next);
        self.apply();
        next
    }

    pub fn set(&self, theme: Theme) {
        self.theme.set_silent(theme);
        self.apply();
    }

    /// Subscribes to theme-change notifications.
    pub fn watch(&self, f: impl Fn(&Theme) + 'static) -> Dispose {
        self.theme.watch(f)
    }

    /// The notifying handle, for [`crate::Instance::watch`].
    pub fn signal(&self) -> &Signal<Theme> {
        &self.theme
    }

    fn apply(&self) {
        let theme = self.theme();
        let doc = &self.runtime.document;
        doc.toggle_class(doc.document_element(), "dark", Some(theme == Theme::Dark));
        if let Err(e) = self.runtime.preferences.set(THEME_KEY, theme.as_str()) {
            log::warn!("could not persist theme: {e}");
        }
        self.theme.set(theme);
    }

    /// Stops following the system color scheme.
    pub fn shutdown(&self) {
        if let Some(d) = self.system.borrow_mut().take() {
            d.run();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryPreferences;
    use std::cell::Cell;

    fn runtime(prefs: MemoryPreferences) -> Runtime {
        Runtime::with_preferences(Rc::new(prefs))
    }

    #[test]
    fn toggling_twice_restores_and_notifies_twice() {
        let rt = runtime(MemoryPreferences::new());
        let tm = ThemeManager::new(&rt);
        tm.init();
        let changes = Rc::new(Cell::new(0));
        let _w = tm.watch({
            let changes = changes.clone();
            move |_| changes.set(changes.get() + 1)
        });

        assert_eq!(tm.toggle(), Theme::Light);
        assert!(!rt.document.has_class(rt.document.document_element(), "dark"));
        assert_eq!(tm.toggle(), Theme::Dark);

        assert_eq!(rt.preferences.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(changes.get(), 2);
        assert!(rt.document.has_class(rt.document.document_element(), "dark"));
    }

    #[test]
    fn persisted_preference_wins_over_default() {
        let rt = runtime(MemoryPreferences::with([(THEME_KEY, "light")]));
        let tm = ThemeManager::new(&rt);
        tm.init();
        assert_eq!(tm.theme(), Theme::Light);
        assert!(!rt.document.has_class(rt.document.document_element(), "dark"));
    }

    #[test]
    fn follows_system_scheme_until_shutdown() {
        let rt = runtime(MemoryPreferences::new());
        let tm = ThemeManager::new(&rt);
        tm.init();
        rt.color_scheme.set(Theme::Light);
        assert_eq!(tm.theme(), Theme::Light);
        assert_eq!(rt.preferences.get(THEME_KEY).as_deref(), Some("light"));

        tm.shutdown();
        rt.color_scheme.set(Theme::Dark);
        assert_eq!(tm.theme(), Theme::Light);
    }
}
