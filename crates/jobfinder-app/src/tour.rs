//! First-visit guided tour.
//!
//! On a first visit a welcome prompt appears after a short delay. The tour
//! walks the steps registered for the current route, highlighting each
//! target element; finishing or skipping it is remembered under
//! [`TOUR_KEY`].

use std::cell::RefCell;
use std::rc::Rc;

use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Methods, Runtime, Signal, TimerId, signal};
use web_time::Duration;

use crate::icons;

pub const TOUR_KEY: &str = "jobfinder_has_seen_tour";
pub const HIGHLIGHT: &str = "tour-highlight";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Top,
    Right,
    Bottom,
    Left,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Right => "right",
            Position::Bottom => "bottom",
            Position::Left => "left",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TourStep {
    pub target: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub position: Position,
}

const fn step(
    target: &'static str,
    title: &'static str,
    description: &'static str,
    position: Position,
) -> TourStep {
    TourStep {
        target,
        title,
        description,
        position,
    }
}

const LANDING: [TourStep; 4] = [
    step(
        ".hero",
        "Welcome to JobFinder",
        "This is your gateway to finding your dream job.",
        Position::Bottom,
    ),
    step(
        ".cta",
        "Job Search",
        "Start here to search for opportunities that match your skills and interests.",
        Position::Bottom,
    ),
    step(
        ".features",
        "Key Features",
        "Explore our powerful features designed to help you in your job search journey.",
        Position::Top,
    ),
    step(
        ".call-to-action",
        "Get Started",
        "Click here to begin your job search journey.",
        Position::Top,
    ),
];

const CHOOSE_SEARCH: [TourStep; 2] = [
    step(
        r#"[data-path="/jobs"]"#,
        "Traditional Job Search",
        "Browse through job listings with powerful filtering options.",
        Position::Right,
    ),
    step(
        r#"[data-path="/ai-job-search"]"#,
        "AI-Powered Job Search",
        "Let our AI find the perfect job matches based on your profile and preferences.",
        Position::Left,
    ),
];

const JOBS: [TourStep; 2] = [
    step(
        ".job-list",
        "Job Listings",
        "Browse through available job opportunities that match your search criteria.",
        Position::Top,
    ),
    step(
        ".remote-filter",
        "Filters",
        "Narrow the list down to remote positions.",
        Position::Left,
    ),
];

const INTERVIEW_PREP: [TourStep; 2] = [
    step(
        ".interview-settings",
        "Interview Settings",
        "Pick an industry and a difficulty for your practice session.",
        Position::Bottom,
    ),
    step(
        ".start-interview",
        "Start Practicing",
        "Begin a simulated interview with our AI interviewer.",
        Position::Top,
    ),
];

const AI_JOB_SEARCH: [TourStep; 2] = [
    step(
        ".tabs",
        "Two Ways to Search",
        "Upload your CV for AI matching, or search by job title.",
        Position::Bottom,
    ),
    step(
        ".analyze",
        "Analyze Your CV",
        "We read your CV and rank the roles you would excel at.",
        Position::Top,
    ),
];

/// Tour steps for a routed path; empty for pages without a tour.
pub fn steps_for_route(path: &str) -> &'static [TourStep] {
    match path {
        "/" => &LANDING,
        "/choose-search" => &CHOOSE_SEARCH,
        "/jobs" => &JOBS,
        "/interview-prep" => &INTERVIEW_PREP,
        "/ai-job-search" => &AI_JOB_SEARCH,
        _ => &[],
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TourState {
    pub show_welcome: bool,
    pub active: bool,
    /// 1-based; 0 before the tour starts.
    pub current_step: usize,
    pub route: String,
}

impl TourState {
    pub fn steps(&self) -> &'static [TourStep] {
        steps_for_route(&self.route)
    }

    pub fn current(&self) -> Option<&'static TourStep> {
        if !self.active {
            return None;
        }
        self.current_step
            .checked_sub(1)
            .and_then(|i| self.steps().get(i))
    }
}

pub struct TourGuide {
    runtime: Runtime,
    state: Signal<TourState>,
    welcome: RefCell<Option<TimerId>>,
    delay: Duration,
}

impl TourGuide {
    pub fn new(runtime: &Runtime, delay: Duration) -> Rc<Self> {
        Rc::new(Self {
            runtime: runtime.clone(),
            state: signal(TourState {
                route: "/".into(),
                ..TourState::default()
            }),
            welcome: RefCell::new(None),
            delay,
        })
    }

    /// Schedules the welcome prompt unless the tour was already seen.
    pub fn init(self: &Rc<Self>) {
        if self.has_seen() {
            log::debug!("tour already seen");
            return;
        }
        let weak = Rc::downgrade(self);
        let id = self.runtime.event_loop.set_timeout(self.delay, move || {
            if let Some(guide) = weak.upgrade() {
                guide.welcome.borrow_mut().take();
                guide.state.update(|s| s.show_welcome = true);
            }
        });
        self.replace_timer(Some(id));
    }

    pub fn has_seen(&self) -> bool {
        self.runtime.preferences.get(TOUR_KEY).is_some()
    }

    pub fn state(&self) -> TourState {
        self.state.get()
    }

    pub fn signal(&self) -> &Signal<TourState> {
        &self.state
    }

    pub fn current(&self) -> Option<TourStep> {
        self.state.with(|s| s.current().cloned())
    }

    pub fn start(&self) {
        self.state.update(|s| {
            s.show_welcome = false;
            s.current_step = 1;
            s.active = true;
        });
        self.highlight();
    }

    pub fn next(&self) {
        let (step, total) = self.state.with(|s| (s.current_step, s.steps().len()));
        if step < total {
            self.state.update(|s| s.current_step += 1);
            self.highlight();
        } else {
            self.complete();
        }
    }

    pub fn prev(&self) {
        if self.state.with(|s| s.current_step > 1) {
            self.state.update(|s| s.current_step -= 1);
            self.highlight();
        }
    }

    pub fn skip(&self) {
        self.replace_timer(None);
        self.state.update(|s| {
            s.show_welcome = false;
            s.active = false;
        });
        self.finish();
    }

    pub fn complete(&self) {
        self.state.update(|s| s.active = false);
        self.finish();
    }

    /// Forgets that the tour was seen and shows the welcome prompt again.
    pub fn reset(&self) {
        if let Err(e) = self.runtime.preferences.remove(TOUR_KEY) {
            log::warn!("could not reset tour: {e}");
        }
        self.state.update(|s| {
            s.show_welcome = true;
            s.current_step = 0;
            s.active = false;
        });
        self.highlight();
    }

    /// Follows navigation; a running tour restarts on the new page's steps.
    pub fn set_route(&self, path: &str) {
        if self.state.with(|s| s.route == path) {
            return;
        }
        self.state.update(|s| {
            s.route = path.to_string();
            if s.active {
                s.current_step = 1;
                s.active = !s.steps().is_empty();
            }
        });
        self.highlight();
    }

    pub fn shutdown(&self) {
        self.replace_timer(None);
        self.clear_highlight();
    }

    fn finish(&self) {
        if let Err(e) = self.runtime.preferences.set(TOUR_KEY, "true") {
            log::warn!("could not remember the tour: {e}");
        }
        self.highlight();
    }

    fn replace_timer(&self, id: Option<TimerId>) {
        if let Some(old) = self.welcome.replace(id) {
            self.runtime.event_loop.clear(old);
        }
    }

    fn clear_highlight(&self) {
        let doc = &self.runtime.document;
        for el in doc.query_selector_all(&format!(".{HIGHLIGHT}")).unwrap_or_default() {
            doc.remove_class(el, HIGHLIGHT);
        }
    }

    fn highlight(&self) {
        self.clear_highlight();
        let Some(step) = self.current() else { return };
        let doc = &self.runtime.document;
        match doc.query_selector(step.target) {
            Ok(Some(el)) => doc.add_class(el, HIGHLIGHT),
            Ok(None) => log::debug!("tour target {} not on the page", step.target),
            Err(e) => log::warn!("tour step {:?}: {e}", step.title),
        }
    }
}

fn welcome(m: &Methods) -> Node {
    markup::div()
        .class("tour-welcome fixed inset-0 z-50 flex items-center justify-center")
        .child(
            markup::div()
                .class("card p-6 max-w-md")
                .child(markup::icon("compass"))
                .child(markup::h2().class("text-2xl font-bold mb-2").child(markup::text("Welcome to JobFinder!")))
                .child(markup::p().class("text-muted-foreground mb-6").child(markup::text(
                    "Would you like a quick tour of the main features?",
                )))
                .child(
                    markup::div()
                        .class("flex gap-2 justify-end")
                        .child(
                            markup::button()
                                .class("tour-skip btn btn-ghost")
                                .on_click(m.bind_with("tour", "skip"))
                                .child(markup::text("Skip")),
                        )
                        .child(
                            markup::button()
                                .class("tour-start btn btn-primary")
                                .on_click(m.bind_with("tour", "start"))
                                .child(markup::text("Start Tour")),
                        ),
                ),
        )
}

fn tooltip(step: &TourStep, index: usize, total: usize, m: &Methods) -> Node {
    markup::div()
        .class("tour-tooltip card p-4 z-60")
        .attr("data-position", step.position.as_str())
        .attr("data-target", step.target)
        .child(markup::h3().class("font-semibold").child(markup::text(step.title)))
        .child(markup::p().class("text-sm").child(markup::text(step.description)))
        .child(
            markup::div()
                .class("flex items-center justify-between mt-4")
                .child(
                    markup::span()
                        .class("tour-counter text-xs text-muted-foreground")
                        .child(markup::text(format!("Step {index} of {total}"))),
                )
                .child(
                    markup::div()
                        .class("flex gap-2")
                        .child(
                            markup::button()
                                .class("tour-prev btn btn-sm btn-ghost")
                                .on_click(m.bind_with("tour", "prev"))
                                .child(markup::text("Back")),
                        )
                        .child(
                            markup::button()
                                .class("tour-next btn btn-sm btn-primary")
                                .on_click(m.bind_with("tour", "next"))
                                .child(markup::text(if index == total { "Finish" } else { "Next" })),
                        ),
                ),
        )
}

/// The welcome prompt and step tooltips. Re-renders on every tour change.
pub fn tour_overlay(guide: &Rc<TourGuide>) -> Component<()> {
    let view = guide.clone();
    let actions = guide.clone();
    let watched = guide.clone();

    Component::<()>::new("tour-overlay")
        .template(move |_, m, _| {
            let state = view.state();
            if state.show_welcome {
                welcome(m)
            } else if let Some(step) = state.current() {
                tooltip(step, state.current_step, state.steps().len(), m)
            } else {
                Node::empty()
            }
        })
        .method("tour", move |_, arg| match arg.as_str() {
            Some("start") => actions.start(),
            Some("skip") => actions.skip(),
            Some("next") => actions.next(),
            Some("prev") => actions.prev(),
            _ => log::warn!("unknown tour action {arg}"),
        })
        .after_render(icons::hydrate_after_render)
        .mounted(move |inst| vec![inst.watch(watched.signal(), |inst, _| inst.refresh())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::markup;

    fn guide() -> (Runtime, Rc<TourGuide>) {
        let rt = Runtime::headless();
        let g = TourGuide::new(&rt, Duration::from_millis(1500));
        (rt, g)
    }

    #[test]
    fn welcome_appears_once_per_visitor() {
        let (rt, g) = guide();
        g.init();
        rt.event_loop.advance(Duration::from_millis(1499));
        assert!(!g.state().show_welcome);
        rt.event_loop.advance(Duration::from_millis(1));
        assert!(g.state().show_welcome);

        g.skip();
        assert!(!g.state().show_welcome);
        assert_eq!(rt.preferences.get(TOUR_KEY).as_deref(), Some("true"));

        let again = TourGuide::new(&rt, Duration::from_millis(1500));
        again.init();
        rt.event_loop.advance(Duration::from_secs(5));
        assert!(!again.state().show_welcome);
    }

    #[test]
    fn walking_the_steps_moves_the_highlight() {
        let (rt, g) = guide();
        let doc = &rt.document;
        doc.append_content(
            doc.body(),
            &markup::div()
                .child(markup::div().class("job-list"))
                .child(markup::button().class("remote-filter")),
        );
        g.set_route("/jobs");
        g.start();
        let list = doc.query_selector(".job-list").unwrap().unwrap();
        let filter = doc.query_selector(".remote-filter").unwrap().unwrap();
        assert!(doc.has_class(list, HIGHLIGHT));

        g.next();
        assert_eq!(g.current().map(|s| s.title), Some("Filters"));
        assert!(!doc.has_class(list, HIGHLIGHT));
        assert!(doc.has_class(filter, HIGHLIGHT));

        g.prev();
        g.prev();
        assert_eq!(g.state().current_step, 1);

        g.next();
        g.next();
        assert!(!g.state().active);
        assert!(!doc.has_class(filter, HIGHLIGHT));
        assert!(g.has_seen());
    }

    #[test]
    fn reset_brings_the_welcome_back() {
        let (rt, g) = guide();
        g.complete();
        assert!(g.has_seen());
        g.reset();
        assert!(!g.has_seen());
        assert!(g.state().show_welcome);
        assert!(rt.preferences.get(TOUR_KEY).is_none());
    }

    #[test]
    fn overlay_buttons_drive_the_guide() {
        let (rt, g) = guide();
        let doc = rt.document.clone();
        let overlay = tour_overlay(&g).render(&rt, doc.body(), ());
        g.init();
        rt.event_loop.advance(Duration::from_millis(1500));
        assert!(doc.query_selector(".tour-welcome").unwrap().is_some());

        let start = doc.query_selector(".tour-start").unwrap().unwrap();
        doc.click(start);
        let counter = doc.query_selector(".tour-counter").unwrap().unwrap();
        assert_eq!(doc.text_content(counter), "Step 1 of 4");

        let next = doc.query_selector(".tour-next").unwrap().unwrap();
        doc.click(next);
        assert_eq!(g.state().current_step, 2);
        assert!(overlay.render_count() >= 4);
    }
}
