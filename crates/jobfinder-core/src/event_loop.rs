//! Single-threaded cooperative event loop with virtual time.
//!
//! All waiting in the runtime (route transitions, simulated network and
//! monitoring updates) is a deferred callback on this loop. Time only moves
//! when the host calls [`EventLoop::advance`] or [`EventLoop::tick`], which
//! keeps every timing-dependent behaviour deterministic under test.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::Dispose;

new_key_type! {
    pub struct TimerId;
}

/// Wall-clock source for [`EventLoop::tick`].
pub trait Clock: 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock tests can drive by hand.
#[derive(Clone)]
pub struct ManualClock {
    t: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            t: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.t.set(self.t.get() + d);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.t.get()
    }
}

enum Callback {
    Once(Option<Box<dyn FnOnce()>>),
    Repeat(Rc<RefCell<Box<dyn FnMut()>>>),
}

struct Timer {
    due: Duration,
    seq: u64,
    period: Option<Duration>,
    callback: Callback,
}

struct LoopState {
    now: Duration,
    seq: u64,
    timers: SlotMap<TimerId, Timer>,
    tasks: VecDeque<Box<dyn FnOnce()>>,
}

pub struct EventLoop {
    state: RefCell<LoopState>,
    clock: Box<dyn Clock>,
    last_tick: Cell<Instant>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        let last = clock.now();
        Self {
            state: RefCell::new(LoopState {
                now: Duration::ZERO,
                seq: 0,
                timers: SlotMap::with_key(),
                tasks: VecDeque::new(),
            }),
            clock,
            last_tick: Cell::new(last),
        }
    }

    /// Virtual time elapsed since the loop was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Queues a task for the next turn of the loop.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.state.borrow_mut().tasks.push_back(Box::new(task));
    }

    pub fn set_timeout(&self, delay: Duration, f: impl FnOnce() + 'static) -> TimerId {
        self.insert(delay, None, Callback::Once(Some(Box::new(f))))
    }

    /// Repeats every `period`. A zero period is bumped to one millisecond so
    /// `advance` always terminates.
    pub fn set_interval(&self, period: Duration, f: impl FnMut() + 'static) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(
            period,
            Some(period),
            Callback::Repeat(Rc::new(RefCell::new(Box::new(f)))),
        )
    }

    fn insert(&self, delay: Duration, period: Option<Duration>, callback: Callback) -> TimerId {
        let mut st = self.state.borrow_mut();
        st.seq += 1;
        let timer = Timer {
            due: st.now + delay,
            seq: st.seq,
            period,
            callback,
        };
        st.timers.insert(timer)
    }

    /// Cancels a timer. Clearing an unknown or already fired timer is a no-op.
    pub fn clear(&self, id: TimerId) -> bool {
        self.state.borrow_mut().timers.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.state.borrow().timers.contains_key(id)
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// A `Dispose` that clears `id`; it holds the loop weakly.
    pub fn cancel_handle(self: &Rc<Self>, id: TimerId) -> Dispose {
        let weak: Weak<EventLoop> = Rc::downgrade(self);
        Dispose::new(move || {
            if let Some(ev) = weak.upgrade() {
                ev.clear(id);
            }
        })
    }

    /// Runs queued tasks, including ones queued while running, until the
    /// queue is empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.state.borrow_mut().tasks.pop_front();
            let Some(task) = task else { break };
            task();
            ran += 1;
        }
        ran
    }

    /// Moves virtual time forward by `by`, firing every timer that falls due
    /// on the way in (due time, creation order). Tasks are drained before
    /// and after each timer.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        self.run_pending();
        while let Some(id) = self.next_due(target) {
            self.fire(id);
            self.run_pending();
        }
        self.state.borrow_mut().now = target;
    }

    /// Advances by the wall-clock time elapsed since the previous tick.
    pub fn tick(&self) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_tick.replace(now));
        self.advance(elapsed);
    }

    /// Fires timers in order until none are left or `limit` virtual time has
    /// passed. Interval timers keep this busy up to the limit.
    pub fn run_until_idle(&self, limit: Duration) {
        let deadline = self.now() + limit;
        self.run_pending();
        while let Some(id) = self.next_due(deadline) {
            self.fire(id);
            self.run_pending();
        }
        let mut st = self.state.borrow_mut();
        if st.timers.is_empty() {
            return;
        }
        st.now = deadline;
    }

    fn next_due(&self, limit: Duration) -> Option<TimerId> {
        let st = self.state.borrow();
        st.timers
            .iter()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(id, _)| id)
    }

    fn fire(&self, id: TimerId) {
        let job = {
            let mut st = self.state.borrow_mut();
            let Some((due, period)) = st.timers.get(id).map(|t| (t.due, t.period)) else {
                return;
            };
            if due > st.now {
                st.now = due;
            }
            match period {
                Some(period) => {
                    st.seq += 1;
                    let seq = st.seq;
                    let timer = &mut st.timers[id];
                    timer.due = due + period;
                    timer.seq = seq;
                    match &timer.callback {
                        Callback::Repeat(f) => Job::Repeat(f.clone()),
                        Callback::Once(_) => Job::None,
                    }
                }
                None => match st.timers.remove(id).map(|t| t.callback) {
                    Some(Callback::Once(f)) => f.map(Job::Once).unwrap_or(Job::None),
                    _ => Job::None,
                },
            }
        };
        match job {
            Job::Once(f) => f(),
            Job::Repeat(f) => {
                if let Ok(mut f) = f.try_borrow_mut() {
                    f();
                }
            }
            Job::None => {}
        }
    }
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Repeat(Rc<RefCell<Box<dyn FnMut()>>>),
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timeouts_fire_in_due_then_creation_order() {
        let ev = EventLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, delay) in [("b", 20), ("a", 10), ("c", 20)] {
            let log = log.clone();
            ev.set_timeout(ms(delay), move || log.borrow_mut().push(name));
        }
        ev.advance(ms(15));
        assert_eq!(*log.borrow(), vec!["a"]);
        ev.advance(ms(5));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(ev.now(), ms(20));
        assert_eq!(ev.pending_timers(), 0);
    }

    #[test]
    fn intervals_repeat_until_cleared() {
        let ev = Rc::new(EventLoop::new());
        let hits = Rc::new(Cell::new(0));
        let id = ev.set_interval(ms(100), {
            let hits = hits.clone();
            move || hits.set(hits.get() + 1)
        });
        ev.advance(ms(350));
        assert_eq!(hits.get(), 3);
        let cancel = ev.cancel_handle(id);
        cancel.run();
        ev.advance(ms(1000));
        assert_eq!(hits.get(), 3);
        assert!(!ev.is_pending(id));
    }

    #[test]
    fn nested_timeouts_scheduled_during_advance_fire_if_due() {
        let ev = Rc::new(EventLoop::new());
        let fired = Rc::new(Cell::new(false));
        ev.set_timeout(ms(300), {
            let ev = ev.clone();
            let fired = fired.clone();
            move || {
                ev.set_timeout(ms(300), move || fired.set(true));
            }
        });
        ev.advance(ms(599));
        assert!(!fired.get());
        ev.advance(ms(1));
        assert!(fired.get());
    }

    #[test]
    fn posted_tasks_run_before_timers() {
        let ev = Rc::new(EventLoop::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        ev.set_timeout(Duration::ZERO, {
            let log = log.clone();
            move || log.borrow_mut().push("timer")
        });
        ev.post({
            let log = log.clone();
            move || log.borrow_mut().push("task")
        });
        ev.advance(Duration::ZERO);
        assert_eq!(*log.borrow(), vec!["task", "timer"]);
    }

    #[test]
    fn tick_follows_the_clock() {
        let clock = ManualClock::new();
        let ev = EventLoop::with_clock(Box::new(clock.clone()));
        let fired = Rc::new(Cell::new(false));
        ev.set_timeout(ms(50), {
            let fired = fired.clone();
            move || fired.set(true)
        });
        clock.advance(ms(49));
        ev.tick();
        assert!(!fired.get());
        clock.advance(ms(1));
        ev.tick();
        assert!(fired.get());
    }

    #[test]
    fn clearing_twice_is_harmless() {
        let ev = EventLoop::new();
        let id = ev.set_timeout(ms(10), || {});
        assert!(ev.clear(id));
        assert!(!ev.clear(id));
    }
}
