//! Practice interview page.
//!
//! Settings mode lets the user pick an industry and a difficulty. Starting
//! an interview flips the store into the `interviewing` state, shows the
//! avatar with the wellness panel (once the store reveals it) and plays a
//! scripted transcript.

use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Dispose, Instance, Methods};
use web_time::Duration;

use super::{page, set_title};
use crate::components::{AvatarProps, interviewer_avatar};
use crate::state::{AppStatePatch, INTERVIEWING};
use crate::{AppContext, icons};

pub const TITLE: &str = "Interview Preparation - JobFinder";
pub const INDUSTRIES: [&str; 4] = ["Technology", "Finance", "Healthcare", "Marketing"];
pub const DIFFICULTIES: [&str; 3] = ["Easy", "Medium", "Hard"];

/// Delay before the first scripted question.
pub const SCRIPT_START: Duration = Duration::from_millis(1100);
pub const ANSWER_DELAY: Duration = Duration::from_secs(3);
pub const NEXT_QUESTION_DELAY: Duration = Duration::from_secs(5);

const OPENING: [(Speaker, &str); 2] = [
    (
        Speaker::Interviewer,
        "Hello! I'll be conducting your interview today. Could you briefly introduce yourself \
         and tell me about your background?",
    ),
    (
        Speaker::Candidate,
        "Hi, I'm a software engineer with 5 years of experience in web development...",
    ),
];

const SCRIPT: [(&str, &str); 4] = [
    (
        "Can you walk me through your most challenging project?",
        "That's a great question. My most challenging project was...",
    ),
    (
        "How do you handle disagreements with team members?",
        "I believe in open communication when dealing with disagreements...",
    ),
    (
        "Where do you see yourself in five years?",
        "I'm looking to grow into a leadership role where I can...",
    ),
    (
        "What would your previous manager say about your strengths and weaknesses?",
        "My previous manager would say my strength is attention to detail...",
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    Interviewer,
    Candidate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterviewPrepData {
    pub active_tab: String,
    pub is_interviewing: bool,
    pub show_wellness_data: bool,
    pub selected_difficulty: String,
    pub selected_industry: String,
    pub transcript: Vec<(Speaker, String)>,
    /// Bumped on every start so timers from an abandoned session do nothing.
    session: u32,
}

impl Default for InterviewPrepData {
    fn default() -> Self {
        Self {
            active_tab: "settings".into(),
            is_interviewing: false,
            show_wellness_data: false,
            selected_difficulty: "Medium".into(),
            selected_industry: "Technology".into(),
            transcript: Vec::new(),
            session: 0,
        }
    }
}

type Prep = Instance<InterviewPrepData>;

fn choice(label: &str, selected: bool, method: &str, m: &Methods) -> Node {
    markup::button()
        .class("choice btn")
        .class(if selected { "btn-primary" } else { "btn-outline" })
        .attr("data-choice", label)
        .on_click(m.bind_with(method, label))
        .child(markup::text(label))
}

fn line(speaker: Speaker, text: &str) -> Node {
    let (badge, class) = match speaker {
        Speaker::Interviewer => ("AI", "bg-blue-600/20"),
        Speaker::Candidate => ("You", "bg-blue-300/20"),
    };
    markup::div()
        .class("transcript-line flex items-start gap-2")
        .child(
            markup::div()
                .class("w-8 h-8 rounded-full flex-shrink-0 flex items-center justify-center text-sm")
                .child(markup::text(badge)),
        )
        .child(
            markup::div()
                .class("rounded-lg p-3 text-sm")
                .class(class)
                .child(markup::text(text)),
        )
}

fn settings(d: &InterviewPrepData, m: &Methods) -> Node {
    markup::div()
        .class("interview-settings max-w-4xl mx-auto rounded-lg p-6 mb-8")
        .child(
            markup::div()
                .class("mb-6")
                .child(markup::h2().class("text-2xl font-bold mb-2").child(markup::text("Interview Settings")))
                .child(markup::p().class("text-blue-200").child(markup::text("Customize your practice interview session."))),
        )
        .child(
            markup::div()
                .class("grid grid-cols-1 md:grid-cols-2 gap-6")
                .child(
                    markup::div().class("industries grid grid-cols-1 sm:grid-cols-2 gap-2").children(
                        INDUSTRIES
                            .iter()
                            .map(|i| choice(i, d.selected_industry == *i, "selectIndustry", m)),
                    ),
                )
                .child(
                    markup::div().class("difficulties grid grid-cols-1 sm:grid-cols-3 gap-2").children(
                        DIFFICULTIES
                            .iter()
                            .map(|l| choice(l, d.selected_difficulty == *l, "selectDifficulty", m)),
                    ),
                ),
        )
        .child(
            markup::div().class("mt-8 flex justify-center").child(
                markup::button()
                    .class("start-interview btn btn-primary btn-lg")
                    .on_click(m.bind("startInterview"))
                    .child(markup::icon("video"))
                    .child(markup::text("Start Practice Interview")),
            ),
        )
}

fn in_progress(d: &InterviewPrepData, m: &Methods) -> Node {
    markup::div()
        .class("interview-session grid grid-cols-1 md:grid-cols-12 gap-8")
        .child(
            markup::div().class("md:col-span-5").child(
                markup::div()
                    .class("card p-6")
                    .child(markup::h2().class("text-2xl font-bold mb-4").child(markup::text("Interview in Progress")))
                    .child(markup::p().class("interview-meta text-blue-200 mb-6").child(markup::text(format!(
                        "{} - {} Difficulty",
                        d.selected_industry, d.selected_difficulty
                    ))))
                    .child(
                        markup::div()
                            .id("interview-transcript")
                            .class("space-y-2")
                            .children(d.transcript.iter().map(|(who, text)| line(*who, text))),
                    )
                    .child(
                        markup::button()
                            .class("end-interview btn btn-primary mt-6")
                            .on_click(m.bind("endInterview"))
                            .child(markup::icon("x-circle"))
                            .child(markup::text("End Interview")),
                    ),
            ),
        )
        .child(
            markup::div()
                .class("md:col-span-7")
                .child(markup::div().id("interview-avatar-container")),
        )
}

/// Plays question `index`, then its answer, then schedules the next one.
fn ask(inst: &Prep, index: usize, session: u32) {
    let live = inst.with_data(|d| d.is_interviewing && d.session == session);
    let Some((question, answer)) = SCRIPT.get(index).copied() else {
        return;
    };
    if !live {
        return;
    }
    inst.update(|d| d.transcript.push((Speaker::Interviewer, question.to_string())));
    inst.set_timeout(ANSWER_DELAY, move |inst| {
        if !inst.with_data(|d| d.is_interviewing && d.session == session) {
            return;
        }
        inst.update(|d| d.transcript.push((Speaker::Candidate, answer.to_string())));
        if index + 1 < SCRIPT.len() {
            inst.set_timeout(NEXT_QUESTION_DELAY, move |inst| ask(inst, index + 1, session));
        }
    });
}

fn mount_avatar(inst: &Prep) {
    icons::hydrate_after_render(inst);
    let (interviewing, wellness) = inst.with_data(|d| (d.is_interviewing, d.show_wellness_data));
    if !interviewing {
        return;
    }
    let props = AvatarProps {
        speaking: true,
        size: 400,
        show_wellness_data: wellness,
    };
    inst.mount_child(&interviewer_avatar(), "#interview-avatar-container", props);
}

pub fn interview_prep(ctx: &AppContext) -> Component<InterviewPrepData> {
    let start = ctx.clone();
    let end = ctx.clone();
    let store = ctx.store.clone();
    let leave = ctx.clone();

    Component::<InterviewPrepData>::new("interview-prep")
        .template(|d, m, _| {
            page("interview-prep").child(
                markup::div()
                    .class("container mx-auto px-4 py-12 md:py-24")
                    .child(
                        markup::div()
                            .class("text-center mb-12")
                            .child(markup::h1().class("text-4xl font-bold mb-4").child(markup::text("AI Interview Preparation")))
                            .child(markup::p().class("text-xl text-blue-200 max-w-3xl mx-auto").child(markup::text(
                                "Practice with our AI interviewer for realistic interview experience and real-time feedback.",
                            ))),
                    )
                    .child(if d.is_interviewing { in_progress(d, m) } else { settings(d, m) }),
            )
        })
        .method("selectTab", |inst, arg| {
            if let Some(tab) = arg.as_str() {
                inst.update(|d| d.active_tab = tab.to_string());
            }
        })
        .method("selectIndustry", |inst, arg| {
            if let Some(industry) = arg.as_str() {
                inst.update(|d| d.selected_industry = industry.to_string());
            }
        })
        .method("selectDifficulty", |inst, arg| {
            if let Some(level) = arg.as_str() {
                inst.update(|d| d.selected_difficulty = level.to_string());
            }
        })
        .method("startInterview", move |inst, _| {
            let (difficulty, industry, session) = inst.with_data(|d| {
                (d.selected_difficulty.clone(), d.selected_industry.clone(), d.session + 1)
            });
            inst.update(|d| {
                d.is_interviewing = true;
                d.session = session;
                d.transcript = OPENING.iter().map(|(who, text)| (*who, text.to_string())).collect();
            });
            start.set_state(
                AppStatePatch::new()
                    .is_interviewing(true)
                    .interview_difficulty(difficulty)
                    .interview_industry(industry)
                    .current_page(INTERVIEWING),
            );
            inst.set_timeout(SCRIPT_START, move |inst| ask(inst, 0, session));
        })
        .method("endInterview", move |inst, _| {
            inst.update(|d| {
                d.is_interviewing = false;
                d.show_wellness_data = false;
            });
            end.set_state(
                AppStatePatch::new()
                    .is_interviewing(false)
                    .show_wellness_data(false)
                    .current_page("interview-prep"),
            );
        })
        .after_render(mount_avatar)
        .mounted(move |inst| {
            set_title(inst, TITLE);
            let sync = inst.subscribe(&store, |inst, state| {
                let stale = inst.with_data(|d| {
                    d.is_interviewing != state.is_interviewing
                        || d.show_wellness_data != state.show_wellness_data
                });
                if stale {
                    inst.update(|d| {
                        d.is_interviewing = state.is_interviewing;
                        d.show_wellness_data = state.show_wellness_data;
                    });
                }
            });
            // Leaving the page ends a running session.
            let leave = leave.clone();
            let abandon = Dispose::new(move || {
                if leave.state().is_interviewing {
                    log::debug!("interview abandoned by navigation");
                    leave.set_state(
                        AppStatePatch::new()
                            .is_interviewing(false)
                            .show_wellness_data(false),
                    );
                }
            });
            vec![sync, abandon]
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfinder_core::ElementId;

    fn click(ctx: &AppContext, selector: &str) {
        let doc = &ctx.runtime.document;
        let el: ElementId = doc.query_selector(selector).unwrap().unwrap();
        doc.click(el);
    }

    fn transcript_lines(ctx: &AppContext) -> usize {
        ctx.runtime
            .document
            .query_selector_all(".transcript-line")
            .unwrap()
            .len()
    }

    #[test]
    fn settings_update_selection() {
        let ctx = AppContext::headless();
        let page = interview_prep(&ctx).render(&ctx.runtime, ctx.runtime.document.body(), ());
        assert_eq!(ctx.runtime.document.title(), TITLE);

        click(&ctx, r#".choice[data-choice="Finance"]"#);
        click(&ctx, r#".choice[data-choice="Hard"]"#);
        assert!(page.with_data(|d| d.selected_industry == "Finance" && d.selected_difficulty == "Hard"));
        let hard = ctx
            .runtime
            .document
            .query_selector(r#".choice[data-choice="Hard"]"#)
            .unwrap()
            .unwrap();
        assert!(ctx.runtime.document.has_class(hard, "btn-primary"));
    }

    #[test]
    fn starting_writes_the_store_and_plays_the_script() {
        let ctx = AppContext::headless();
        let page = interview_prep(&ctx).render(&ctx.runtime, ctx.runtime.document.body(), ());
        click(&ctx, r#".choice[data-choice="Healthcare"]"#);
        click(&ctx, ".start-interview");

        let state = ctx.state();
        assert!(state.in_interview());
        assert_eq!(state.interview_industry, "Healthcare");
        assert_eq!(state.interview_difficulty, "Medium");
        assert_eq!(transcript_lines(&ctx), 2);
        let slot = ctx.runtime.document.get_element_by_id("interview-avatar-container").unwrap();
        assert_eq!(ctx.runtime.document.children(slot).len(), 1);

        let ev = &ctx.runtime.event_loop;
        ev.advance(SCRIPT_START);
        assert_eq!(transcript_lines(&ctx), 3);
        ev.advance(ANSWER_DELAY);
        assert_eq!(transcript_lines(&ctx), 4);
        ev.advance(NEXT_QUESTION_DELAY + ANSWER_DELAY);
        assert_eq!(transcript_lines(&ctx), 6);
        ev.advance(Duration::from_secs(60));
        assert_eq!(page.with_data(|d| d.transcript.len()), 2 + 2 * SCRIPT.len());
    }

    #[test]
    fn ending_stops_the_script_and_hides_wellness() {
        let ctx = AppContext::headless();
        let page = interview_prep(&ctx).render(&ctx.runtime, ctx.runtime.document.body(), ());
        click(&ctx, ".start-interview");
        ctx.set_state(AppStatePatch::new().show_wellness_data(true));
        assert!(page.with_data(|d| d.show_wellness_data));
        assert!(ctx.runtime.document.query_selector(".wellness-slot").unwrap().is_some());

        click(&ctx, ".end-interview");
        let state = ctx.state();
        assert!(!state.is_interviewing && !state.show_wellness_data);
        assert_eq!(state.current_page, "interview-prep");

        ctx.runtime.event_loop.advance(Duration::from_secs(60));
        assert!(page.with_data(|d| d.transcript.len() == 2));
        assert!(ctx.runtime.document.query_selector(".interview-settings").unwrap().is_some());
    }

    #[test]
    fn disposing_mid_session_ends_it() {
        let ctx = AppContext::headless();
        let page = interview_prep(&ctx).render(&ctx.runtime, ctx.runtime.document.body(), ());
        click(&ctx, ".start-interview");
        assert!(ctx.state().is_interviewing);

        page.dispose();
        assert!(!ctx.state().is_interviewing);
        assert!(!ctx.state().show_wellness_data);
        assert_eq!(ctx.runtime.event_loop.pending_timers(), 0);
    }
}
