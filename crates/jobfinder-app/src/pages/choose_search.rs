use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Methods};

use super::{follow, page, page_header, set_title};
use crate::{AppContext, icons};

pub const TITLE: &str = "Choose Your Search - JobFinder";

struct SearchOption {
    path: &'static str,
    icon: &'static str,
    title: &'static str,
    description: &'static str,
    perks: [&'static str; 3],
}

const OPTIONS: [SearchOption; 2] = [
    SearchOption {
        path: "/jobs",
        icon: "search",
        title: "Browse Jobs",
        description: "Search and filter through job listings manually",
        perks: [
            "Access thousands of job listings",
            "Filter by location, salary, and more",
            "Save your favorite listings",
        ],
    },
    SearchOption {
        path: "/ai-job-search",
        icon: "sparkles",
        title: "AI Job Matching",
        description: "Upload your CV and let AI find the roles that fit",
        perks: [
            "Personalized match scores",
            "Insights on why you fit each role",
            "Automated applications",
        ],
    },
];

fn card(o: &SearchOption, m: &Methods) -> Node {
    markup::div()
        .class("card search-option h-full flex flex-col p-6")
        .child(markup::icon(o.icon))
        .child(markup::h3().class("text-xl font-semibold").child(markup::text(o.title)))
        .child(markup::p().class("text-muted-foreground").child(markup::text(o.description)))
        .child(
            Node::element("ul")
                .class("space-y-2 flex-grow")
                .children(o.perks.iter().map(|p| Node::element("li").child(markup::text(*p)))),
        )
        .child(
            markup::button()
                .class("choose btn btn-primary w-full")
                .attr("data-path", o.path)
                .on_click(m.bind_with("navigate", o.path))
                .child(markup::text(format!("Continue with {}", o.title))),
        )
}

pub fn choose_search(ctx: &AppContext) -> Component<()> {
    let nav = ctx.clone();
    Component::<()>::new("choose-search")
        .template(|_, m, _| {
            page("choose-search").child(
                markup::div()
                    .class("container mx-auto px-4 py-12")
                    .child(page_header(
                        "Choose How to Find Your Next Role",
                        "Browse listings yourself or let our AI match your CV to open positions.",
                    ))
                    .child(
                        markup::div()
                            .class("grid grid-cols-1 md:grid-cols-2 gap-6")
                            .children(OPTIONS.iter().map(|o| card(o, m))),
                    ),
            )
        })
        .method("navigate", move |_, arg| follow(&nav, arg))
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
    fn cards_lead_to_both_searches() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        choose_search(&ctx).render(&ctx.runtime, doc.body(), ());
        let buttons = doc.query_selector_all(".choose").unwrap();
        assert_eq!(buttons.len(), 2);

        doc.click(buttons[1]);
        assert_eq!(ctx.location.path(), "/ai-job-search");
        doc.click(buttons[0]);
        assert_eq!(ctx.location.path(), "/jobs");
    }
}
