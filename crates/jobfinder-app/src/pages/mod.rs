//! Routed pages.

use jobfinder_core::markup::{self, Node};
use jobfinder_core::Instance;
use jobfinder_navigation::Router;
use serde_json::Value;

use crate::AppContext;

pub mod about;
pub mod ai_job_search;
pub mod choose_search;
pub mod entertainment;
pub mod interview_prep;
pub mod jobs;
pub mod landing;
pub mod resume;

pub const ROUTES: [&str; 8] = [
    "/",
    "/interview-prep",
    "/entertainment",
    "/about",
    "/jobs",
    "/resume",
    "/choose-search",
    "/ai-job-search",
];

/// Registers every page under its path.
pub fn register(router: &Router, ctx: &AppContext) {
    router
        .add_route("/", landing::landing(ctx))
        .add_route("/interview-prep", interview_prep::interview_prep(ctx))
        .add_route("/entertainment", entertainment::entertainment())
        .add_route("/about", about::about())
        .add_route("/jobs", jobs::jobs(ctx))
        .add_route("/resume", resume::resume())
        .add_route("/choose-search", choose_search::choose_search(ctx))
        .add_route("/ai-job-search", ai_job_search::ai_job_search(ctx));
    log::debug!("registered {} routes", ROUTES.len());
}

/// Body of the `navigate` method on pages with call-to-action buttons: the
/// argument is the target path.
fn follow(ctx: &AppContext, arg: &Value) {
    match arg.as_str() {
        Some(path) => ctx.navigate(path),
        None => log::warn!("navigate called without a path: {arg}"),
    }
}

fn set_title<D: 'static, P: 'static>(inst: &Instance<D, P>, title: &str) {
    inst.runtime().document.set_title(title);
}

fn page_header(title: &str, blurb: &str) -> Node {
    markup::div()
        .class("page-header text-center mb-12")
        .child(
            markup::h1()
                .class("text-3xl md:text-4xl font-bold")
                .child(markup::text(title)),
        )
        .child(
            markup::p()
                .class("mt-4 text-muted-foreground max-w-2xl mx-auto")
                .child(markup::text(blurb)),
        )
}

fn feature_card(icon: &str, title: &str, body: &str) -> Node {
    markup::div()
        .class("card feature-card p-6")
        .child(
            markup::div()
                .class("w-12 h-12 rounded-full flex items-center justify-center mb-4")
                .child(markup::icon(icon)),
        )
        .child(
            markup::h3()
                .class("text-xl font-semibold mb-2")
                .child(markup::text(title)),
        )
        .child(markup::p().class("text-blue-200").child(markup::text(body)))
}

fn page(class: &str) -> Node {
    markup::div()
        .class("min-h-screen pt-16")
        .class(class)
}
