use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::Dispose;

/// Handle to one cleanup registered with a [`Scope`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanupId(u64);

/// Lifetime container for cleanups.
///
/// Every component instance owns one; the router disposes the outgoing
/// page's scope before swapping content, which cancels its timers and
/// subscriptions and unmounts nested widgets.
#[derive(Clone, Default)]
pub struct Scope {
    cleanups: Rc<RefCell<Vec<(CleanupId, Box<dyn FnOnce()>)>>>,
    next: Rc<Cell<u64>>,
    closed: Rc<Cell<bool>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cleanup. On a scope that is already closed the cleanup
    /// runs right away.
    pub fn add_disposer(&self, cleanup: impl FnOnce() + 'static) -> CleanupId {
        let id = CleanupId(self.next.get());
        self.next.set(id.0 + 1);
        if self.closed.get() {
            cleanup();
        } else {
            self.cleanups.borrow_mut().push((id, Box::new(cleanup)));
        }
        id
    }

    /// Ties a [`Dispose`] handle to this scope.
    pub fn own(&self, d: Dispose) -> CleanupId {
        self.add_disposer(move || d.run())
    }

    /// Forgets a cleanup without running it, once whatever it guarded has
    /// finished on its own.
    pub fn release(&self, id: CleanupId) {
        self.cleanups.borrow_mut().retain(|(cid, _)| *cid != id);
    }

    pub fn is_disposed(&self) -> bool {
        self.closed.get()
    }

    /// Number of cleanups still waiting.
    pub fn pending(&self) -> usize {
        self.cleanups.borrow().len()
    }

    /// Runs every cleanup, newest first. Later calls do nothing.
    pub fn dispose(&self) {
        if self.closed.replace(true) {
            return;
        }
        let cleanups = self.cleanups.take();
        log::trace!("scope closing with {} cleanups", cleanups.len());
        for (_, cleanup) in cleanups.into_iter().rev() {
            cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanups_run_newest_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let scope = Scope::new();
        for i in 0..3 {
            let order = order.clone();
            scope.add_disposer(move || order.borrow_mut().push(i));
        }
        assert_eq!(scope.pending(), 3);
        scope.dispose();
        scope.dispose();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn late_registration_runs_immediately() {
        let scope = Scope::new();
        scope.dispose();
        let hit = Rc::new(Cell::new(false));
        let d = Dispose::new({
            let hit = hit.clone();
            move || hit.set(true)
        });
        scope.own(d);
        assert!(hit.get());
        assert_eq!(scope.pending(), 0);
    }

    #[test]
    fn released_cleanups_never_run() {
        let hit = Rc::new(Cell::new(0));
        let scope = Scope::new();
        let first = scope.add_disposer({
            let hit = hit.clone();
            move || hit.set(hit.get() + 1)
        });
        scope.add_disposer({
            let hit = hit.clone();
            move || hit.set(hit.get() + 10)
        });
        scope.release(first);
        assert_eq!(scope.pending(), 1);
        scope.dispose();
        assert_eq!(hit.get(), 10);
    }
}
