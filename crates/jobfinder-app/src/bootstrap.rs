//! Application start-up: shell, theme, chrome, routes and the interview
//! wellness reveal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use jobfinder_core::{Dispose, Instance, Result, TimerId};
use jobfinder_navigation::{Navigation, Router};

use crate::components::nav_bar::{NavBarData, nav_bar};
use crate::components::theme_toggle;
use crate::state::AppStatePatch;
use crate::tour::{TourGuide, tour_overlay};
use crate::{AppContext, icons, pages, shell};

/// A running application. Dropping it leaves everything mounted; call
/// [`App::shutdown`] to tear down.
pub struct App {
    ctx: AppContext,
    router: Router,
    nav_bar: Instance<NavBarData>,
    theme_toggle: Instance<()>,
    tour: Rc<TourGuide>,
    overlay: Instance<()>,
    reveal: Rc<RefCell<Option<TimerId>>>,
    subscriptions: Vec<Dispose>,
}

impl App {
    pub fn start(ctx: AppContext) -> Result<Self> {
        let rt = ctx.runtime.clone();
        let doc = rt.document.clone();

        let anchors = shell::install(&doc)?;
        ctx.theme.init();
        icons::hydrate_icons(&doc);

        let nav_bar = nav_bar(&ctx).render(&rt, anchors.navbar, ());
        let theme_toggle = theme_toggle(&ctx).render(&rt, anchors.theme_toggle, ());
        let tour = TourGuide::new(&rt, ctx.config.tour_delay());
        let overlay = tour_overlay(&tour).render(&rt, doc.body(), ());

        let router = Router::new(&rt, ctx.location.clone(), ctx.config.container.clone())
            .with_transition(ctx.config.transition_spec());
        pages::register(&router, &ctx);

        let mut subscriptions = Vec::new();
        subscriptions.push(router.on_navigate({
            let ctx = ctx.clone();
            let tour = tour.clone();
            move |nav: &Navigation| {
                ctx.set_state(AppStatePatch::new().current_page(nav.path.as_str()));
                icons::hydrate_icons(&ctx.runtime.document);
                tour.set_route(&nav.path);
            }
        }));

        let reveal = Rc::new(RefCell::new(None));
        subscriptions.push(watch_interview(&ctx, reveal.clone()));

        tour.init();
        router.init();
        log::info!(
            "JobFinder app initialized with {} routes",
            router.routes().len()
        );

        Ok(Self {
            ctx,
            router,
            nav_bar,
            theme_toggle,
            tour,
            overlay,
            reveal,
            subscriptions,
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn tour(&self) -> &Rc<TourGuide> {
        &self.tour
    }

    pub fn nav_bar(&self) -> &Instance<NavBarData> {
        &self.nav_bar
    }

    pub fn theme_toggle(&self) -> &Instance<()> {
        &self.theme_toggle
    }

    /// Whether the wellness panel is waiting to be revealed.
    pub fn reveal_pending(&self) -> bool {
        self.reveal
            .borrow()
            .is_some_and(|id| self.ctx.runtime.event_loop.is_pending(id))
    }

    pub fn shutdown(&self) {
        for d in &self.subscriptions {
            d.run();
        }
        if let Some(id) = self.reveal.borrow_mut().take() {
            self.ctx.runtime.event_loop.clear(id);
        }
        self.router.shutdown();
        self.tour.shutdown();
        self.overlay.dispose();
        self.theme_toggle.dispose();
        self.nav_bar.dispose();
        self.ctx.theme.shutdown();
        log::info!("JobFinder app shut down");
    }
}

/// Reveals the wellness panel a while after an interview starts. Leaving the
/// interview first cancels the reveal.
fn watch_interview(ctx: &AppContext, reveal: Rc<RefCell<Option<TimerId>>>) -> Dispose {
    let was_in = Cell::new(false);
    let ctx_in = ctx.clone();
    ctx.store.subscribe(move |state| {
        let now_in = state.in_interview();
        let ev = &ctx_in.runtime.event_loop;
        if now_in && !was_in.get() {
            let delay = ctx_in.config.wellness_reveal();
            let ctx = ctx_in.clone();
            let slot = reveal.clone();
            let id = ev.set_timeout(delay, move || {
                slot.borrow_mut().take();
                log::debug!("revealing wellness data");
                ctx.set_state(AppStatePatch::new().show_wellness_data(true));
            });
            if let Some(old) = reveal.borrow_mut().replace(id) {
                ev.clear(old);
            }
        } else if !now_in && let Some(id) = reveal.borrow_mut().take() {
            log::debug!("interview ended before the wellness reveal");
            ev.clear(id);
        }
        was_in.set(now_in);
    })
}
