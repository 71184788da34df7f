//! Hash routing for JobFinder.
//!
//! A [`Router`] maps the fragment of a [`Location`] to a registered [`Page`].
//! Every route change runs a timed swap on the page container: the outgoing
//! page is disposed and the container gets the leave class; after the leave
//! delay the new page is mounted under the enter class, which is removed
//! after the enter delay.
//!
//! ```rust
//! use jobfinder_core::*;
//! use jobfinder_navigation::*;
//! use web_time::Duration;
//!
//! let rt = Runtime::headless();
//! let content = rt.document.create_element("main");
//! rt.document.set_element_id(content, "page-content");
//! rt.document.append_child(rt.document.body(), content);
//!
//! let location = Location::new(&rt);
//! let router = Router::new(&rt, location, "#page-content");
//! router
//!     .add_route("/", Component::<()>::new("home"))
//!     .add_route("/jobs", Component::<()>::new("jobs"));
//! router.init();
//!
//! router.navigate("/jobs");
//! rt.event_loop.advance(Duration::from_millis(300));
//! assert_eq!(router.active().as_deref(), Some("jobs"));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use jobfinder_core::*;
use web_time::Duration;

mod location;

pub use location::Location;

/// Timing and class names of the page swap.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSpec {
    pub leave: Duration,
    pub enter: Duration,
    pub leave_class: String,
    pub enter_class: String,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            leave: Duration::from_millis(300),
            enter: Duration::from_millis(300),
            leave_class: "page-leave-active".into(),
            enter_class: "page-enter-active".into(),
        }
    }
}

/// How a path was resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    Matched,
    /// No route matched; the dedicated not-found page was used.
    NotFound,
    /// No route matched; the `/` route was used.
    Fallback,
    /// Nothing to render at all.
    Empty,
}

/// Published to `on_navigate` hooks once a page is mounted.
#[derive(Clone, Debug, PartialEq)]
pub struct Navigation {
    pub path: String,
    pub outcome: RouteOutcome,
    /// Name of the mounted page, if any.
    pub page: Option<String>,
}

type NavigateHook = Rc<dyn Fn(&Navigation)>;

#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

struct RouterInner {
    runtime: Runtime,
    location: Location,
    container: String,
    transition: RefCell<TransitionSpec>,
    routes: RefCell<Vec<(String, Rc<dyn Page>)>>,
    not_found: RefCell<Option<Rc<dyn Page>>>,
    active: RefCell<Option<Rc<dyn Mounted>>>,
    /// Timers of the transition in flight.
    pending: RefCell<Vec<TimerId>>,
    current: RefCell<Option<String>>,
    outcome: RefCell<Option<RouteOutcome>>,
    hooks: RefCell<Vec<(u64, NavigateHook)>>,
    next_hook: Cell<u64>,
    listening: RefCell<Option<Dispose>>,
}

impl Router {
    pub fn new(runtime: &Runtime, location: Location, container: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                runtime: runtime.clone(),
                location,
                container: container.into(),
                transition: RefCell::new(TransitionSpec::default()),
                routes: RefCell::new(Vec::new()),
                not_found: RefCell::new(None),
                active: RefCell::new(None),
                pending: RefCell::new(Vec::new()),
                current: RefCell::new(None),
                outcome: RefCell::new(None),
                hooks: RefCell::new(Vec::new()),
                next_hook: Cell::new(0),
                listening: RefCell::new(None),
            }),
        }
    }

    pub fn with_transition(self, spec: TransitionSpec) -> Self {
        *self.inner.transition.borrow_mut() = spec;
        self
    }

    pub fn location(&self) -> &Location {
        &self.inner.location
    }

    /// Registers `page` under `path`; registering a path again replaces it.
    pub fn add_route(&self, path: impl Into<String>, page: impl Page + 'static) -> &Self {
        let path = path.into();
        let page: Rc<dyn Page> = Rc::new(page);
        let mut routes = self.inner.routes.borrow_mut();
        match routes.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => {
                log::warn!("route {path} registered twice, replacing {}", slot.1.name());
                slot.1 = page;
            }
            None => routes.push((path, page)),
        }
        self
    }

    pub fn not_found(&self, page: impl Page + 'static) -> &Self {
        *self.inner.not_found.borrow_mut() = Some(Rc::new(page));
        self
    }

    pub fn routes(&self) -> Vec<String> {
        self.inner
            .routes
            .borrow()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn on_navigate(&self, f: impl Fn(&Navigation) + 'static) -> Dispose {
        let id = self.inner.next_hook.get();
        self.inner.next_hook.set(id + 1);
        self.inner.hooks.borrow_mut().push((id, Rc::new(f)));
        let weak: Weak<RouterInner> = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.hooks.borrow_mut().retain(|(hid, _)| *hid != id);
            }
        })
    }

    /// Evaluates the current fragment now and follows later changes.
    pub fn init(&self) {
        let weak = Rc::downgrade(&self.inner);
        let d = self.inner.location.on_change(move |_| {
            if let Some(inner) = weak.upgrade() {
                Router { inner }.evaluate();
            }
        });
        if let Some(old) = self.inner.listening.replace(Some(d)) {
            old.run();
        }
        self.evaluate();
    }

    /// Changes the fragment; the swap starts when the change is announced.
    pub fn navigate(&self, path: &str) {
        self.inner.location.set_hash(path);
    }

    /// Path of the last evaluation.
    pub fn current_path(&self) -> Option<String> {
        self.inner.current.borrow().clone()
    }

    pub fn outcome(&self) -> Option<RouteOutcome> {
        self.inner.outcome.borrow().clone()
    }

    /// Name of the mounted page.
    pub fn active(&self) -> Option<String> {
        self.inner
            .active
            .borrow()
            .as_ref()
            .map(|m| m.name().to_string())
    }

    pub fn active_instance(&self) -> Option<Rc<dyn Mounted>> {
        self.inner.active.borrow().clone()
    }

    /// Whether a swap is still waiting on its timers.
    pub fn in_transition(&self) -> bool {
        let ev = &self.inner.runtime.event_loop;
        self.inner.pending.borrow().iter().any(|id| ev.is_pending(*id))
    }

    fn resolve(&self, path: &str) -> (Option<Rc<dyn Page>>, RouteOutcome) {
        let routes = self.inner.routes.borrow();
        let lookup = |p: &str| routes.iter().find(|(rp, _)| rp == p).map(|(_, page)| page.clone());
        if let Some(page) = lookup(path) {
            return (Some(page), RouteOutcome::Matched);
        }
        if let Some(page) = self.inner.not_found.borrow().clone() {
            return (Some(page), RouteOutcome::NotFound);
        }
        match lookup("/") {
            Some(page) => (Some(page), RouteOutcome::Fallback),
            None => (None, RouteOutcome::Empty),
        }
    }

    fn cancel_pending(&self) {
        let pending = std::mem::take(&mut *self.inner.pending.borrow_mut());
        for id in pending {
            self.inner.runtime.event_loop.clear(id);
        }
    }

    fn evaluate(&self) {
        let path = self.inner.location.path();
        let (page, outcome) = self.resolve(&path);
        log::debug!(
            "route {path}: {outcome:?} -> {}",
            page.as_ref().map(|p| p.name()).unwrap_or("nothing")
        );

        // A newer evaluation wins over a transition still in flight.
        self.cancel_pending();

        let rt = &self.inner.runtime;
        let doc = &rt.document;
        let container = match doc.query_selector(&self.inner.container) {
            Ok(Some(el)) => el,
            Ok(None) => {
                log::warn!("route {path}: container {} is missing", self.inner.container);
                return;
            }
            Err(e) => {
                log::warn!("route {path}: {e}");
                return;
            }
        };

        let outgoing = self.inner.active.borrow_mut().take();
        if let Some(old) = outgoing {
            old.dispose();
        }
        *self.inner.current.borrow_mut() = Some(path.clone());
        *self.inner.outcome.borrow_mut() = Some(outcome.clone());

        let spec = self.inner.transition.borrow().clone();
        doc.clear(container);
        doc.remove_class(container, &spec.enter_class);
        doc.add_class(container, &spec.leave_class);

        let weak = Rc::downgrade(&self.inner);
        let id = rt.event_loop.set_timeout(spec.leave, move || {
            if let Some(inner) = weak.upgrade() {
                Router { inner }.enter(container, path, outcome, page);
            }
        });
        self.inner.pending.borrow_mut().push(id);
    }

    fn enter(
        &self,
        container: ElementId,
        path: String,
        outcome: RouteOutcome,
        page: Option<Rc<dyn Page>>,
    ) {
        let rt = &self.inner.runtime;
        let doc = &rt.document;
        if !doc.exists(container) {
            log::warn!("route {path}: container went away mid-transition");
            return;
        }
        let spec = self.inner.transition.borrow().clone();
        doc.remove_class(container, &spec.leave_class);
        doc.add_class(container, &spec.enter_class);

        let mounted = page.map(|p| p.mount(rt, Target::Element(container)));
        let nav = Navigation {
            path,
            outcome,
            page: mounted.as_ref().map(|m| m.name().to_string()),
        };
        *self.inner.active.borrow_mut() = mounted;
        log::debug!("mounted {:?} at {}", nav.page, nav.path);

        let hooks: Vec<NavigateHook> = self
            .inner
            .hooks
            .borrow()
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for hook in hooks {
            hook(&nav);
        }

        let weak = Rc::downgrade(&self.inner);
        let enter_class = spec.enter_class;
        let id = rt.event_loop.set_timeout(spec.enter, move || {
            if let Some(inner) = weak.upgrade() {
                inner.runtime.document.remove_class(container, &enter_class);
            }
        });
        self.inner.pending.borrow_mut().push(id);
    }

    /// Stops following the location, cancels any transition and disposes the
    /// mounted page.
    pub fn shutdown(&self) {
        if let Some(d) = self.inner.listening.borrow_mut().take() {
            d.run();
        }
        self.cancel_pending();
        let active = self.inner.active.borrow_mut().take();
        if let Some(page) = active {
            page.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::markup;

    const LEAVE: Duration = Duration::from_millis(300);

    fn page(name: &str, body: &str) -> Component<()> {
        Component::<()>::new(name)
            .static_template(markup::section().class(name).child(markup::text(body)))
    }

    fn setup() -> (Runtime, ElementId, Router) {
        let rt = Runtime::headless();
        let content = rt.document.create_element("main");
        rt.document.set_element_id(content, "page-content");
        rt.document.append_child(rt.document.body(), content);
        let router = Router::new(&rt, Location::new(&rt), "#page-content");
        (rt, content, router)
    }

    #[test]
    fn navigate_mounts_after_leave_delay() {
        let (rt, content, router) = setup();
        let published = Rc::new(RefCell::new(Vec::new()));
        let _hook = router.on_navigate({
            let published = published.clone();
            move |nav| published.borrow_mut().push(nav.path.clone())
        });
        router
            .add_route("/", page("landing", "home"))
            .add_route("/jobs", page("jobs", "listings"));
        router.init();
        rt.event_loop.advance(LEAVE);
        assert_eq!(router.active().as_deref(), Some("landing"));

        router.navigate("/jobs");
        rt.event_loop.run_pending();
        assert!(rt.document.has_class(content, "page-leave-active"));
        assert!(rt.document.inner_html(content).is_empty());
        assert_eq!(router.active(), None);

        rt.event_loop.advance(LEAVE);
        assert_eq!(router.active().as_deref(), Some("jobs"));
        assert_eq!(router.current_path().as_deref(), Some("/jobs"));
        assert_eq!(*published.borrow(), vec!["/", "/jobs"]);
        assert!(!rt.document.has_class(content, "page-leave-active"));
        assert!(rt.document.has_class(content, "page-enter-active"));

        rt.event_loop.advance(LEAVE);
        assert!(!rt.document.has_class(content, "page-enter-active"));
        assert!(!router.in_transition());
    }

    #[test]
    fn routed_content_equals_direct_render() {
        let (rt, content, router) = setup();
        let about = page("about", "About us");
        router.add_route("/about", about.clone());
        router.location().set_hash("/about");
        router.init();
        rt.event_loop.advance(LEAVE);

        let scratch = rt.document.create_element("div");
        let direct = about.render(&rt, scratch, ());
        assert_eq!(rt.document.inner_html(content), direct.outer_html());
    }

    #[test]
    fn unknown_path_renders_the_landing_route() {
        let (rt, content, router) = setup();
        router.add_route("/", page("landing", "home"));
        router.init();
        rt.event_loop.advance(LEAVE);
        let home = rt.document.inner_html(content);

        router.navigate("/does-not-exist");
        rt.event_loop.advance(LEAVE);
        assert_eq!(rt.document.inner_html(content), home);
        assert_eq!(router.outcome(), Some(RouteOutcome::Fallback));
        assert_eq!(router.current_path().as_deref(), Some("/does-not-exist"));
    }

    #[test]
    fn not_found_page_takes_precedence_over_fallback() {
        let (rt, _content, router) = setup();
        router.add_route("/", page("landing", "home"));
        router.not_found(page("missing", "nothing here"));
        router.navigate("/nope");
        router.init();
        rt.event_loop.advance(LEAVE);
        assert_eq!(router.active().as_deref(), Some("missing"));
        assert_eq!(router.outcome(), Some(RouteOutcome::NotFound));
    }

    #[test]
    fn newer_navigation_cancels_the_one_in_flight() {
        let (rt, _content, router) = setup();
        let mounts = Rc::new(RefCell::new(Vec::new()));
        let tracked = |name: &'static str| {
            let mounts = mounts.clone();
            page(name, name).mounted(move |_| {
                mounts.borrow_mut().push(name);
                Vec::new()
            })
        };
        router
            .add_route("/", tracked("landing"))
            .add_route("/jobs", tracked("jobs"))
            .add_route("/about", tracked("about"));
        router.init();
        rt.event_loop.advance(LEAVE);

        router.navigate("/jobs");
        rt.event_loop.advance(Duration::from_millis(100));
        router.navigate("/about");
        rt.event_loop.advance(Duration::from_millis(250));
        assert_eq!(router.active(), None);
        rt.event_loop.advance(Duration::from_millis(50));

        assert_eq!(*mounts.borrow(), vec!["landing", "about"]);
        assert_eq!(router.active().as_deref(), Some("about"));
    }

    #[test]
    fn outgoing_page_is_disposed_on_swap() {
        let (rt, _content, router) = setup();
        let ticks = Rc::new(Cell::new(0));
        let ticking = page("landing", "home").mounted({
            let ticks = ticks.clone();
            move |inst| {
                let ticks = ticks.clone();
                vec![inst.set_interval(Duration::from_millis(50), move |_| {
                    ticks.set(ticks.get() + 1)
                })]
            }
        });
        router
            .add_route("/", ticking)
            .add_route("/jobs", page("jobs", "listings"));
        router.init();
        rt.event_loop.advance(LEAVE);
        let landing = router.active_instance().unwrap();

        router.navigate("/jobs");
        rt.event_loop.run_pending();
        assert!(landing.is_disposed());
        let before = ticks.get();
        rt.event_loop.advance(Duration::from_secs(2));
        assert_eq!(ticks.get(), before);
    }

    #[test]
    fn missing_container_skips_the_swap() {
        let rt = Runtime::headless();
        let router = Router::new(&rt, Location::new(&rt), "#page-content");
        router.add_route("/", page("landing", "home"));
        router.init();
        rt.event_loop.advance(LEAVE);
        assert_eq!(router.active(), None);
        assert_eq!(router.current_path(), None);
    }

    #[test]
    fn without_a_landing_route_the_container_is_cleared() {
        let (rt, content, router) = setup();
        let published = Rc::new(RefCell::new(None));
        let _hook = router.on_navigate({
            let published = published.clone();
            move |nav| *published.borrow_mut() = Some(nav.clone())
        });
        router.add_route("/jobs", page("jobs", "listings"));
        router.init();
        rt.event_loop.advance(LEAVE);

        assert!(rt.document.inner_html(content).is_empty());
        let nav = published.borrow().clone().unwrap();
        assert_eq!(nav.outcome, RouteOutcome::Empty);
        assert_eq!(nav.page, None);
        assert_eq!(nav.path, "/");
    }

    #[test]
    fn shutdown_stops_routing() {
        let (rt, _content, router) = setup();
        router
            .add_route("/", page("landing", "home"))
            .add_route("/jobs", page("jobs", "listings"));
        router.init();
        rt.event_loop.advance(LEAVE);
        router.shutdown();
        assert_eq!(router.active(), None);

        router.navigate("/jobs");
        rt.event_loop.advance(LEAVE);
        assert_eq!(router.active(), None);
    }
}
