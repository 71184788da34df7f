use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use jobfinder_core::*;
use serde::{Deserialize, Serialize};

type ChangeListener = Rc<dyn Fn(&str)>;

/// The URL fragment. Changes are announced on the next turn of the event
/// loop, the way `hashchange` is.
#[derive(Clone)]
pub struct Location {
    inner: Rc<LocationInner>,
}

struct LocationInner {
    event_loop: Rc<EventLoop>,
    hash: RefCell<String>,
    history: RefCell<Vec<String>>,
    listeners: RefCell<Vec<(u64, ChangeListener)>>,
    next_id: Cell<u64>,
}

#[derive(Serialize, Deserialize)]
struct Saved {
    current: String,
    history: Vec<String>,
}

fn normalize(path: &str) -> String {
    let path = path.trim().trim_start_matches('#');
    if path.is_empty() {
        String::new()
    } else {
        format!("#{path}")
    }
}

impl Location {
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            inner: Rc::new(LocationInner {
                event_loop: runtime.event_loop.clone(),
                hash: RefCell::new(String::new()),
                history: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Starts at `path` without recording history or notifying.
    pub fn starting_at(runtime: &Runtime, path: &str) -> Self {
        let loc = Self::new(runtime);
        *loc.inner.hash.borrow_mut() = normalize(path);
        loc
    }

    /// The raw fragment, `#` included; empty when unset.
    pub fn hash(&self) -> String {
        self.inner.hash.borrow().clone()
    }

    /// The fragment without `#`, `/` when empty.
    pub fn path(&self) -> String {
        let hash = self.inner.hash.borrow();
        match hash.strip_prefix('#') {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => "/".to_string(),
        }
    }

    /// Accepts `/jobs` or `#/jobs`. Setting the current value does nothing.
    pub fn set_hash(&self, path: &str) {
        let next = normalize(path);
        let prev = self.inner.hash.replace(next.clone());
        if prev == next {
            return;
        }
        self.inner.history.borrow_mut().push(prev);
        log::debug!("location: {next}");
        self.notify_later();
    }

    /// Goes back one entry. Returns `false` when there is nothing to go back to.
    pub fn back(&self) -> bool {
        let Some(prev) = self.inner.history.borrow_mut().pop() else {
            return false;
        };
        *self.inner.hash.borrow_mut() = prev;
        self.notify_later();
        true
    }

    pub fn history(&self) -> Vec<String> {
        self.inner.history.borrow().clone()
    }

    pub fn on_change(&self, f: impl Fn(&str) + 'static) -> Dispose {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(f)));
        let weak: Weak<LocationInner> = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    pub fn to_json(&self) -> String {
        let saved = Saved {
            current: self.hash(),
            history: self.history(),
        };
        serde_json::to_string(&saved).unwrap_or_else(|_| "{}".into())
    }

    /// Restores the fragment and history saved by [`Location::to_json`] and
    /// announces the change.
    pub fn from_json(&self, json: &str) -> serde_json::Result<()> {
        let saved: Saved = serde_json::from_str(json)?;
        *self.inner.history.borrow_mut() = saved.history.iter().map(|h| normalize(h)).collect();
        *self.inner.hash.borrow_mut() = normalize(&saved.current);
        self.notify_later();
        Ok(())
    }

    fn notify_later(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.event_loop.post(move || {
            let Some(inner) = weak.upgrade() else { return };
            let loc = Location { inner };
            let path = loc.path();
            let listeners: Vec<ChangeListener> = loc
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for l in listeners {
                l(&path);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_are_announced_asynchronously() {
        let rt = Runtime::headless();
        let loc = Location::new(&rt);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _l = loc.on_change({
            let seen = seen.clone();
            move |p| seen.borrow_mut().push(p.to_string())
        });

        assert_eq!(loc.path(), "/");
        loc.set_hash("/jobs");
        assert_eq!(loc.hash(), "#/jobs");
        assert!(seen.borrow().is_empty());

        rt.event_loop.run_pending();
        assert_eq!(*seen.borrow(), vec!["/jobs"]);
    }

    #[test]
    fn setting_the_same_fragment_is_silent() {
        let rt = Runtime::headless();
        let loc = Location::starting_at(&rt, "#/about");
        loc.set_hash("/about");
        assert_eq!(rt.event_loop.pending_tasks(), 0);
        assert!(loc.history().is_empty());
    }

    #[test]
    fn back_walks_history() {
        let rt = Runtime::headless();
        let loc = Location::new(&rt);
        loc.set_hash("/jobs");
        loc.set_hash("/resume");
        assert!(loc.back());
        assert_eq!(loc.path(), "/jobs");
        assert!(loc.back());
        assert_eq!(loc.path(), "/");
        assert!(!loc.back());
    }

    #[test]
    fn history_survives_a_json_round_trip() {
        let rt = Runtime::headless();
        let loc = Location::new(&rt);
        loc.set_hash("/jobs");
        loc.set_hash("/about");
        let saved = loc.to_json();

        let restored = Location::new(&rt);
        restored.from_json(&saved).unwrap();
        assert_eq!(restored.path(), "/about");
        assert!(restored.back());
        assert_eq!(restored.path(), "/jobs");
        assert!(restored.from_json("not json").is_err());
    }
}
