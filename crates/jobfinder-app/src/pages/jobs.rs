use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Methods};

use super::{page, page_header, set_title};
use crate::api::{JobSearchResult, JobService};
use crate::{AppContext, icons};

pub const TITLE: &str = "Job Listings - JobFinder";
pub const DEFAULT_QUERY: &str = "Software Engineer";

#[derive(Clone, Debug, Default)]
pub struct JobsData {
    pub query: String,
    pub remote_only: bool,
    pub results: Vec<JobSearchResult>,
    pub error: Option<String>,
}

impl JobsData {
    pub fn visible(&self) -> impl Iterator<Item = &JobSearchResult> {
        self.results.iter().filter(|j| !self.remote_only || j.remote)
    }
}

fn search(jobs: &dyn JobService, query: &str) -> JobsData {
    let mut data = JobsData {
        query: query.to_string(),
        ..JobsData::default()
    };
    match jobs.search_jobs(query) {
        Ok(results) => data.results = results,
        Err(e) => data.error = Some(e.to_string()),
    }
    data
}

fn listing(job: &JobSearchResult) -> Node {
    markup::div()
        .class("card job-listing p-6")
        .attr("data-job-id", job.id.to_string())
        .child(markup::h3().class("text-xl font-semibold").child(markup::text(job.title.as_str())))
        .child(
            markup::div()
                .class("flex flex-wrap gap-4 text-sm text-muted-foreground")
                .child(markup::span().child(markup::icon("building")).child(markup::text(job.company.as_str())))
                .child(markup::span().child(markup::icon("map-pin")).child(markup::text(job.location.as_str())))
                .child(markup::span().child(markup::icon("dollar-sign")).child(markup::text(job.salary.as_str())))
                .child(markup::span().child(markup::icon("clock")).child(markup::text(job.posted.as_str()))),
        )
        .child(markup::p().class("mt-4 text-sm").child(markup::text(job.description.as_str())))
        .child(if job.remote {
            markup::span().class("badge remote-badge").child(markup::text("Remote"))
        } else {
            Node::empty()
        })
}

fn render(d: &JobsData, m: &Methods) -> Node {
    let body = match &d.error {
        Some(e) => markup::div()
            .class("jobs-error text-center py-12")
            .child(markup::h3().class("text-xl font-semibold mb-2").child(markup::text("No jobs found")))
            .child(markup::p().class("text-muted-foreground").child(markup::text(e.as_str()))),
        None => markup::div().class("job-list space-y-4").children(d.visible().map(listing)),
    };
    page("jobs").child(
        markup::div()
            .class("container mx-auto px-4 py-12")
            .child(page_header(
                "Job Listings",
                &format!("Showing {} openings for \"{}\"", d.visible().count(), d.query),
            ))
            .child(
                markup::div().class("flex justify-end mb-4").child(
                    markup::button()
                        .class("remote-filter btn")
                        .class(if d.remote_only { "btn-primary" } else { "btn-outline" })
                        .attr("aria-pressed", d.remote_only.to_string())
                        .on_click(m.bind("toggleRemote"))
                        .child(markup::text("Remote only")),
                ),
            )
            .child(body),
    )
}

pub fn jobs(ctx: &AppContext) -> Component<JobsData> {
    let initial = ctx.jobs.clone();
    let searcher = ctx.jobs.clone();
    Component::<JobsData>::new("jobs")
        .data(move || search(initial.as_ref(), DEFAULT_QUERY))
        .template(|d, m, _| render(d, m))
        .method("search", move |inst, arg| {
            let query = arg.as_str().unwrap_or_default();
            let remote_only = inst.with_data(|d| d.remote_only);
            let mut next = search(searcher.as_ref(), query);
            next.remote_only = remote_only;
            inst.set_data(next);
        })
        .method("toggleRemote", |inst, _| inst.update(|d| d.remote_only = !d.remote_only))
        .after_render(icons::hydrate_after_render)
        .mounted(|inst| {
            set_title(inst, TITLE);
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_and_filters_remote_jobs() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        let page = jobs(&ctx).render(&ctx.runtime, doc.body(), ());
        assert_eq!(doc.query_selector_all(".job-listing").unwrap().len(), 8);

        let filter = doc.query_selector(".remote-filter").unwrap().unwrap();
        doc.click(filter);
        assert_eq!(doc.query_selector_all(".job-listing").unwrap().len(), 5);
        assert_eq!(doc.query_selector_all(".remote-badge").unwrap().len(), 5);
        assert_eq!(page.render_count(), 2);
    }

    #[test]
    fn blank_search_shows_the_error() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        let page = jobs(&ctx).render(&ctx.runtime, doc.body(), ());
        page.call_with("search", "  ");
        assert!(page.with_data(|d| d.error.is_some() && d.results.is_empty()));
        assert!(doc.query_selector(".jobs-error").unwrap().is_some());

        page.call_with("search", "Data Scientist");
        let first = doc.query_selector(".job-listing").unwrap().unwrap();
        assert!(doc.text_content(first).contains("Senior Data Scientist"));
    }
}
