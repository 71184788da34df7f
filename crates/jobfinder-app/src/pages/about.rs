use jobfinder_core::Component;
use jobfinder_core::markup::{self, Node};

use super::{feature_card, page, page_header, set_title};
use crate::icons;

pub const TITLE: &str = "About Us - JobFinder";

fn markup_tree() -> Node {
    page("about").child(
        markup::div()
            .class("container mx-auto px-4 py-12")
            .child(page_header(
                "About JobFinder",
                "We help job seekers land the right role with AI-assisted search, interview practice \
                 and resume tools.",
            ))
            .child(
                markup::div()
                    .class("grid grid-cols-1 md:grid-cols-3 gap-8")
                    .child(feature_card(
                        "target",
                        "Our Mission",
                        "Make the job hunt less stressful by putting smart tools in every candidate's hands.",
                    ))
                    .child(feature_card(
                        "users",
                        "Our Team",
                        "Engineers, recruiters and career coaches who have been on both sides of the table.",
                    ))
                    .child(feature_card(
                        "heart-pulse",
                        "Wellbeing First",
                        "Interview practice that keeps an eye on stress and focus, not just answers.",
                    )),
            ),
    )
}

pub fn about() -> Component<()> {
    Component::<()>::new("about")
        .static_template(markup_tree())
        .after_render(icons::hydrate_after_render)
        .mounted(|inst| {
            set_title(inst, TITLE);
            Vec::new()
        })
}
