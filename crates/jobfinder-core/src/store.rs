//! Application state container.
//!
//! `Store` holds one immutable snapshot at a time. `set_state` shallow-merges
//! a patch into a copy of the snapshot, swaps it in and notifies every
//! listener synchronously, in subscription order. There is no batching: each
//! call is its own write and its own notification pass.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use crate::Dispose;

/// State that can absorb a partial update.
pub trait State: Clone + 'static {
    type Patch;

    /// Shallow merge: fields present in `patch` overwrite, the rest stay.
    fn apply(&mut self, patch: Self::Patch);
}

/// Dynamic key/value state; a patch is another map whose keys win.
impl State for Map<String, Value> {
    type Patch = Map<String, Value>;

    fn apply(&mut self, patch: Self::Patch) {
        for (k, v) in patch {
            self.insert(k, v);
        }
    }
}

type Listener<S> = Rc<dyn Fn(&S)>;
type ListenerId = u64;

pub struct Store<S: State> {
    inner: Rc<StoreInner<S>>,
}

struct StoreInner<S> {
    state: RefCell<Rc<S>>,
    listeners: RefCell<Vec<(ListenerId, Listener<S>)>>,
    next_id: Cell<ListenerId>,
    writes: Cell<u64>,
}

impl<S: State> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: State + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: State> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(Rc::new(initial)),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                writes: Cell::new(0),
            }),
        }
    }

    /// Current snapshot. Later writes never mutate a snapshot already handed
    /// out.
    pub fn get_state(&self) -> Rc<S> {
        self.inner.state.borrow().clone()
    }

    pub fn set_state(&self, patch: S::Patch) {
        let next = {
            let current = self.inner.state.borrow();
            let mut next = S::clone(&current);
            next.apply(patch);
            Rc::new(next)
        };
        *self.inner.state.borrow_mut() = next;
        self.inner.writes.set(self.inner.writes.get() + 1);

        // Iterate over a copy so listeners can subscribe, unsubscribe or
        // write again while the pass is running.
        let listeners: Vec<Listener<S>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        log::trace!("store write #{}: {} listener(s)", self.inner.writes.get(), listeners.len());
        // A listener that writes back runs a nested pass; listeners after it
        // get the latest snapshot, not the one this pass started with.
        for l in listeners {
            let current = self.get_state();
            l(&current);
        }
    }

    /// Registers `listener`; running the returned `Dispose` removes exactly
    /// this registration.
    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> Dispose {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<StoreInner<S>> = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Number of `set_state` calls so far.
    pub fn writes(&self) -> u64 {
        self.inner.writes.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!("test helper expects an object"),
        }
    }

    #[test]
    fn set_state_merges_and_keeps_untouched_keys() {
        let store = Store::new(map(json!({"currentPage": "landing", "user": null})));
        store.set_state(map(json!({"isInterviewing": true, "currentPage": "interviewing"})));
        assert_eq!(
            Value::Object((*store.get_state()).clone()),
            json!({"currentPage": "interviewing", "isInterviewing": true, "user": null})
        );
    }

    #[test]
    fn snapshots_are_immutable() {
        let store = Store::new(map(json!({"n": 1})));
        let before = store.get_state();
        store.set_state(map(json!({"n": 2})));
        assert_eq!(before["n"], json!(1));
        assert_eq!(store.get_state()["n"], json!(2));
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let store = Store::new(Map::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _a = store.subscribe({
            let seen = seen.clone();
            move |_| seen.borrow_mut().push("a")
        });
        let _b = store.subscribe({
            let seen = seen.clone();
            move |_| seen.borrow_mut().push("b")
        });
        store.set_state(map(json!({"x": 1})));
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let store = Store::new(Map::new());
        let hits = Rc::new(Cell::new(0));
        let mk = || {
            let hits = hits.clone();
            move |_: &Map<String, Value>| hits.set(hits.get() + 1)
        };
        let first = store.subscribe(mk());
        let _second = store.subscribe(mk());
        first.run();
        first.run();
        store.set_state(map(json!({"x": 1})));
        assert_eq!(hits.get(), 1);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn listener_may_write_back() {
        let store = Store::new(map(json!({"count": 0})));
        let _guard = store.subscribe({
            let store = store.clone();
            move |s| {
                if s["count"] == json!(1) {
                    store.set_state(map(json!({"echo": true})));
                }
            }
        });
        store.set_state(map(json!({"count": 1})));
        assert_eq!(store.get_state()["echo"], json!(true));
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn later_listeners_see_a_nested_write() {
        let store = Store::new(map(json!({"count": 0})));
        let _writer = store.subscribe({
            let store = store.clone();
            move |s| {
                if s["count"] == json!(1) {
                    store.set_state(map(json!({"count": 2})));
                }
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _reader = store.subscribe({
            let seen = seen.clone();
            move |s| seen.borrow_mut().push(s["count"].clone())
        });
        store.set_state(map(json!({"count": 1})));
        assert_eq!(*seen.borrow(), vec![json!(2), json!(2)]);
        assert_eq!(seen.borrow().last(), Some(&store.get_state()["count"]));
    }

    #[test]
    fn unsubscribing_during_a_pass_stops_later_passes() {
        let store = Store::new(Map::new());
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Dispose>>> = Rc::new(RefCell::new(None));
        let d = store.subscribe({
            let hits = hits.clone();
            let slot = slot.clone();
            move |_| {
                hits.set(hits.get() + 1);
                if let Some(d) = slot.borrow().as_ref() {
                    d.run();
                }
            }
        });
        *slot.borrow_mut() = Some(d);
        store.set_state(Map::new());
        store.set_state(Map::new());
        assert_eq!(hits.get(), 1);
    }

    fn patch_strategy() -> impl Strategy<Value = Vec<Vec<(String, i64)>>> {
        let key = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from);
        prop::collection::vec(prop::collection::vec((key, any::<i64>()), 0..4), 0..12)
    }

    proptest! {
        #[test]
        fn final_state_is_the_ordered_shallow_merge(patches in patch_strategy()) {
            let store = Store::new(Map::new());
            let mut expected = Map::new();
            for patch in &patches {
                let mut m = Map::new();
                for (k, v) in patch {
                    m.insert(k.clone(), json!(v));
                }
                for (k, v) in &m {
                    expected.insert(k.clone(), v.clone());
                }
                store.set_state(m);
            }
            prop_assert_eq!(&*store.get_state(), &expected);
        }

        #[test]
        fn unsubscribed_listener_hears_nothing_more(
            before in 0usize..5,
            after in 0usize..5,
        ) {
            let store = Store::new(Map::new());
            let hits = Rc::new(Cell::new(0usize));
            let d = store.subscribe({
                let hits = hits.clone();
                move |_| hits.set(hits.get() + 1)
            });
            for i in 0..before {
                store.set_state(map(json!({"i": i})));
            }
            d.run();
            for i in 0..after {
                store.set_state(map(json!({"j": i})));
            }
            prop_assert_eq!(hits.get(), before);
        }
    }
}
