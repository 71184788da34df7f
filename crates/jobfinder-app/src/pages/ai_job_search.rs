//! CV analysis, job search and application automation, all through
//! [`JobService`].

use std::rc::Rc;

use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Instance, Methods};
use serde_json::Value;
use web_time::Duration;

use super::{page, page_header, set_title};
use crate::api::{
    AutomationLog, AutomationStatus, ControlAction, ControlKind, JobMatch, JobSearchResult,
    JobService, RunState,
};
use crate::{AppContext, icons};

pub const TITLE: &str = "AI Job Search - JobFinder";
pub const MAX_CV_BYTES: u64 = 5 * 1024 * 1024;
pub const ANALYSIS_DELAY: Duration = Duration::from_secs(3);
pub const PROGRESS_STEP: Duration = Duration::from_millis(100);
pub const SEARCH_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Search,
}

impl Tab {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "upload" => Some(Tab::Upload),
            "search" => Some(Tab::Search),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AiSearchData {
    pub tab: Tab,
    pub cv_file: Option<String>,
    pub analyzing: bool,
    pub progress: u8,
    pub matches: Vec<JobMatch>,
    pub job_title: String,
    pub searching: bool,
    pub results: Vec<JobSearchResult>,
    pub automation: AutomationStatus,
    pub logs: Vec<AutomationLog>,
    pub error: Option<String>,
}

type Search = Instance<AiSearchData>;

fn tab_button(label: &str, tab: &str, active: bool, m: &Methods) -> Node {
    markup::button()
        .class("tab btn")
        .class(if active { "btn-primary" } else { "btn-ghost" })
        .attr("data-tab", tab)
        .on_click(m.bind_with("selectTab", tab))
        .child(markup::text(label))
}

fn match_card(job: &JobMatch) -> Node {
    markup::div()
        .class("card job-match p-6")
        .attr("data-score", job.match_score.to_string())
        .child(
            markup::div()
                .class("flex justify-between")
                .child(markup::h3().class("text-xl font-semibold").child(markup::text(job.title.as_str())))
                .child(markup::span().class("badge").child(markup::text(format!("{}% match", job.match_score)))),
        )
        .child(markup::p().class("text-sm").child(markup::text(job.why_match.as_str())))
        .child(
            Node::element("ul").class("list-disc pl-5 text-sm").children(
                job.responsibilities
                    .iter()
                    .map(|r| Node::element("li").child(markup::text(r.as_str()))),
            ),
        )
}

fn result_card(job: &JobSearchResult) -> Node {
    markup::div()
        .class("card search-result p-6")
        .attr("data-job-id", job.id.to_string())
        .child(markup::h3().class("text-xl font-semibold").child(markup::text(job.title.as_str())))
        .child(markup::p().class("text-muted-foreground").child(markup::text(format!(
            "{} · {} · {}",
            job.company, job.location, job.salary
        ))))
        .child(markup::p().class("mt-4 text-sm").child(markup::text(job.description.as_str())))
}

fn upload_tab(d: &AiSearchData, m: &Methods) -> Node {
    let drop_zone = match &d.cv_file {
        Some(name) => markup::div()
            .class("cv-selected")
            .child(markup::icon("file-text"))
            .child(markup::p().class("font-medium").child(markup::text(name.as_str()))),
        None => markup::div()
            .class("cv-drop")
            .child(markup::icon("upload"))
            .child(markup::p().class("font-medium").child(markup::text("Drop your CV here or click to browse")))
            .child(markup::p().class("text-sm text-muted-foreground").child(markup::text("PDF or DOCX, up to 5MB"))),
    };
    let status = if d.analyzing {
        markup::div()
            .class("analyzing")
            .child(markup::h3().class("text-xl font-medium mb-2").child(markup::text("Analyzing your CV")))
            .child(
                markup::div()
                    .class("progress h-2 rounded-full")
                    .attr("aria-valuenow", d.progress.to_string())
                    .child(markup::div().class("progress-fill").attr("style", format!("width: {}%", d.progress))),
            )
    } else if d.matches.is_empty() {
        markup::div()
            .class("no-analysis")
            .child(markup::h3().class("text-xl font-medium mb-2").child(markup::text("No analysis yet")))
    } else {
        markup::div()
            .class("matches space-y-4")
            .child(markup::h2().class("text-2xl font-bold mb-4").child(markup::text("Your Top Job Matches")))
            .children(d.matches.iter().map(match_card))
    };
    markup::div()
        .class("upload-tab grid grid-cols-1 md:grid-cols-2 gap-8")
        .child(
            markup::div().class("card p-6").child(drop_zone).child(
                markup::button()
                    .class("analyze btn btn-primary w-full mt-4")
                    .on_click(m.bind("analyzeCv"))
                    .child(markup::text("Analyze CV")),
            ),
        )
        .child(status)
}

fn automation_panel(d: &AiSearchData, m: &Methods) -> Node {
    let a = &d.automation;
    let controls = [
        ("start", "Apply to All"),
        ("pause", "Pause"),
        ("resume", "Resume"),
        ("skip", "Skip"),
        ("stop", "Stop"),
    ];
    markup::div()
        .class("automation card p-4 mt-6")
        .attr("data-status", format!("{:?}", a.status).to_lowercase())
        .child(markup::p().class("automation-progress text-sm").child(markup::text(format!(
            "{} of {} applied, {} failed",
            a.jobs_completed, a.jobs_total, a.jobs_failed
        ))))
        .child(markup::div().class("flex gap-2").children(controls.iter().map(|(action, label)| {
            markup::button()
                .class("control btn btn-outline btn-sm")
                .attr("data-action", *action)
                .on_click(m.bind_with("control", *action))
                .child(markup::text(*label))
        })))
        .child(
            Node::element("ul").class("automation-log text-xs space-y-1").children(
                d.logs
                    .iter()
                    .map(|l| Node::element("li").child(markup::text(format!("[{}] {}", l.timestamp, l.message)))),
            ),
        )
}

fn search_tab(d: &AiSearchData, m: &Methods) -> Node {
    let results = if d.searching {
        markup::div().class("searching").child(markup::text("Searching..."))
    } else {
        markup::div()
            .class("results space-y-4")
            .children(d.results.iter().map(result_card))
    };
    markup::div()
        .class("search-tab")
        .child(
            markup::div()
                .class("flex gap-2")
                .child(
                    Node::element("input")
                        .class("job-title input flex-grow")
                        .attr("placeholder", "e.g. Frontend Developer")
                        .attr("value", d.job_title.as_str()),
                )
                .child(
                    markup::button()
                        .class("search btn btn-primary")
                        .on_click(m.bind("search"))
                        .child(markup::icon("search"))
                        .child(markup::text("Search")),
                ),
        )
        .child(results)
        .child(if d.results.is_empty() { Node::empty() } else { automation_panel(d, m) })
}

fn render(d: &AiSearchData, m: &Methods) -> Node {
    page("ai-job-search").child(
        markup::div()
            .class("container mx-auto px-4 py-12")
            .child(page_header(
                "AI-Powered Job Matching",
                "Upload your CV and let our AI find the roles where you will shine, or search by title.",
            ))
            .child(
                markup::div()
                    .class("tabs flex gap-2 mb-6")
                    .child(tab_button("Upload CV", "upload", d.tab == Tab::Upload, m))
                    .child(tab_button("Search by Title", "search", d.tab == Tab::Search, m)),
            )
            .child(match &d.error {
                Some(e) => markup::div().class("error alert alert-destructive").child(markup::text(e.as_str())),
                None => Node::empty(),
            })
            .child(match d.tab {
                Tab::Upload => upload_tab(d, m),
                Tab::Search => search_tab(d, m),
            }),
    )
}

fn fail(inst: &Search, message: impl Into<String>) {
    let message = message.into();
    log::debug!("ai job search: {message}");
    inst.update(|d| d.error = Some(message));
}

fn select_cv(inst: &Search, arg: &Value) {
    let Some(name) = arg.get("name").and_then(Value::as_str) else {
        return fail(inst, "Please choose a file.");
    };
    let size = arg.get("size").and_then(Value::as_u64).unwrap_or_default();
    let lower = name.to_ascii_lowercase();
    if !(lower.ends_with(".pdf") || lower.ends_with(".docx")) {
        return fail(inst, "Please upload a PDF or DOCX file only.");
    }
    if size > MAX_CV_BYTES {
        return fail(inst, "Please upload a file smaller than 5MB.");
    }
    let name = name.to_string();
    inst.update(|d| {
        d.cv_file = Some(name);
        d.error = None;
    });
}

fn analyze(inst: &Search, jobs: Rc<dyn JobService>) {
    let Some(file) = inst.with_data(|d| d.cv_file.clone()) else {
        return fail(inst, "Please upload your CV first.");
    };
    inst.update(|d| {
        d.analyzing = true;
        d.progress = 0;
        d.error = None;
    });
    let ticker = inst.set_interval(PROGRESS_STEP, |inst| {
        if inst.with_data(|d| d.progress < 100) {
            inst.update(|d| d.progress = (d.progress + 5).min(100));
        }
    });
    inst.set_timeout(ANALYSIS_DELAY, move |inst| {
        ticker.run();
        match jobs.analyze_cv(&file, &[]) {
            Ok(matches) => inst.update(|d| {
                d.analyzing = false;
                d.progress = 100;
                d.matches = matches;
            }),
            Err(e) => {
                inst.update(|d| d.analyzing = false);
                fail(inst, e.to_string());
            }
        }
    });
}

fn search(inst: &Search, jobs: Rc<dyn JobService>) {
    let title = inst.with_data(|d| d.job_title.trim().to_string());
    if title.is_empty() {
        return fail(inst, "Please enter a job title to search for.");
    }
    inst.update(|d| {
        d.searching = true;
        d.results.clear();
        d.error = None;
    });
    inst.set_timeout(SEARCH_DELAY, move |inst| match jobs.search_jobs(&title) {
        Ok(results) => {
            let automation = jobs.job_status().unwrap_or_default();
            inst.update(|d| {
                d.searching = false;
                d.results = results;
                d.automation = automation;
            });
        }
        Err(e) => {
            inst.update(|d| d.searching = false);
            fail(inst, e.to_string());
        }
    });
}

fn control(inst: &Search, jobs: &dyn JobService, arg: &Value) {
    let kind: ControlKind = match serde_json::from_value(arg.clone()) {
        Ok(kind) => kind,
        Err(e) => return fail(inst, format!("unknown control {arg}: {e}")),
    };
    let outcome = jobs.control(&ControlAction::new(kind));
    let logs = jobs.job_logs().unwrap_or_default();
    match outcome {
        Ok(status) => inst.update(|d| {
            d.automation = status;
            d.logs = logs;
            d.error = None;
        }),
        Err(e) => fail(inst, e.to_string()),
    }
}

pub fn ai_job_search(ctx: &AppContext) -> Component<AiSearchData> {
    let analyzer = ctx.jobs.clone();
    let searcher = ctx.jobs.clone();
    let controller = ctx.jobs.clone();

    Component::<AiSearchData>::new("ai-job-search")
        .template(|d, m, _| render(d, m))
        .method("selectTab", |inst, arg| {
            if let Some(tab) = arg.as_str().and_then(Tab::parse) {
                inst.update(|d| d.tab = tab);
            }
        })
        .method("selectCv", select_cv)
        .method("analyzeCv", move |inst, _| analyze(inst, analyzer.clone()))
        .method("setJobTitle", |inst, arg| {
            let title = arg.as_str().unwrap_or_default().to_string();
            inst.update(|d| d.job_title = title);
        })
        .method("search", move |inst, _| search(inst, searcher.clone()))
        .method("control", move |inst, arg| control(inst, controller.as_ref(), arg))
        .after_render(icons::hydrate_after_render)
        .mounted(|inst| {
            set_title(inst, TITLE);
            Vec::new()
        })
}

impl AiSearchData {
    pub fn is_running(&self) -> bool {
        self.automation.status == RunState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mount() -> (AppContext, Search) {
        let ctx = AppContext::headless();
        let page = ai_job_search(&ctx).render(&ctx.runtime, ctx.runtime.document.body(), ());
        (ctx, page)
    }

    #[test]
    fn cv_is_validated_then_analyzed() {
        let (ctx, page) = mount();
        page.call("analyzeCv");
        assert_eq!(page.with_data(|d| d.error.clone()).as_deref(), Some("Please upload your CV first."));

        page.call_with("selectCv", json!({ "name": "cv.png", "size": 10 }));
        assert!(page.with_data(|d| d.cv_file.is_none()));
        page.call_with("selectCv", json!({ "name": "cv.pdf", "size": MAX_CV_BYTES + 1 }));
        assert!(page.with_data(|d| d.cv_file.is_none()));

        page.call_with("selectCv", json!({ "name": "cv.pdf", "size": 1024 }));
        page.call("analyzeCv");
        assert!(page.with_data(|d| d.analyzing && d.error.is_none()));

        ctx.runtime.event_loop.advance(Duration::from_millis(500));
        assert_eq!(page.with_data(|d| d.progress), 25);

        ctx.runtime.event_loop.advance(ANALYSIS_DELAY);
        assert!(page.with_data(|d| !d.analyzing && d.progress == 100));
        assert_eq!(ctx.runtime.document.query_selector_all(".job-match").unwrap().len(), 5);
        assert_eq!(ctx.runtime.event_loop.pending_timers(), 0);
    }

    #[test]
    fn search_then_automate() {
        let (ctx, page) = mount();
        page.call_with("selectTab", "search");
        page.call("search");
        assert!(page.with_data(|d| d.error.is_some()));

        page.call_with("setJobTitle", "Frontend Developer");
        page.call("search");
        assert!(ctx.runtime.document.query_selector(".searching").unwrap().is_some());
        ctx.runtime.event_loop.advance(SEARCH_DELAY);
        assert_eq!(ctx.runtime.document.query_selector_all(".search-result").unwrap().len(), 8);
        assert_eq!(page.with_data(|d| d.automation.jobs_total), 8);

        let start = ctx
            .runtime
            .document
            .query_selector(r#".control[data-action="start"]"#)
            .unwrap()
            .unwrap();
        ctx.runtime.document.click(start);
        assert!(page.with_data(|d| d.is_running()));
        assert_eq!(page.with_data(|d| d.automation.current_job_id), Some(101));

        page.call_with("control", "resume");
        assert!(page.with_data(|d| d.error.is_some() && d.is_running()));
    }
}
