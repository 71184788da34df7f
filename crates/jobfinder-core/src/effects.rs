use std::cell::RefCell;
use std::rc::Rc;

/// A cancellation handle: timers, subscriptions and mounted instances hand
/// one of these back so their owner can tear them down.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs the cleanup the first time; later calls do nothing.
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_done(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispose")
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn dispose_runs_once() {
        let hits = Rc::new(Cell::new(0));
        let d = Dispose::new({
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        });
        let d2 = d.clone();
        d.run();
        d2.run();
        assert_eq!(hits.get(), 1);
        assert!(d.is_done());
    }
}
