use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::Dispose;

pub type SubId = usize;

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Observable value. Subscribers run synchronously on every write, in the
/// order they subscribed.
pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

struct Inner<T> {
    value: T,
    next_id: SubId,
    subs: Vec<(SubId, Subscriber<T>)>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            next_id: 0,
            subs: Vec::new(),
        })))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow().value)
    }

    pub fn set(&self, v: T)
    where
        T: Clone,
    {
        self.0.borrow_mut().value = v;
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F)
    where
        T: Clone,
    {
        f(&mut self.0.borrow_mut().value);
        self.notify();
    }

    /// Writes without notifying subscribers.
    pub fn set_silent(&self, v: T) {
        self.0.borrow_mut().value = v;
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        let mut inner = self.0.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subs.push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        let mut inner = self.0.borrow_mut();
        let before = inner.subs.len();
        inner.subs.retain(|(sid, _)| *sid != id);
        inner.subs.len() != before
    }

    /// Subscribes and hands back a `Dispose` that unsubscribes. The handle
    /// only holds a weak reference to the signal.
    pub fn watch(&self, f: impl Fn(&T) + 'static) -> Dispose {
        let id = self.subscribe(f);
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.0);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                Signal(inner).unsubscribe(id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    fn notify(&self)
    where
        T: Clone,
    {
        // Subscribers may write back into the signal, so they get a snapshot
        // and nothing stays borrowed while they run.
        let (value, subs) = {
            let inner = self.0.borrow();
            let subs: Vec<Subscriber<T>> = inner.subs.iter().map(|(_, s)| s.clone()).collect();
            (inner.value.clone(), subs)
        };
        for s in subs {
            s(&value);
        }
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
