use jobfinder_core::Component;
use jobfinder_core::markup::{self, Node};

use super::{page, page_header, set_title};
use crate::icons;

pub const TITLE: &str = "Entertainment - JobFinder";

const BREAKS: [(&str, &str, &str); 4] = [
    ("music", "Focus Playlists", "Instrumental mixes for deep work and application sprints."),
    ("gamepad-2", "Brain Teasers", "Five-minute puzzles to reset between interviews."),
    ("wind", "Breathing Exercises", "Guided box breathing before a big call."),
    ("smile", "Career Humor", "Because every job hunt needs a laugh."),
];

fn markup_tree() -> Node {
    page("entertainment").child(
        markup::div()
            .class("container mx-auto px-4 py-12")
            .child(page_header(
                "Take a Break",
                "Job hunting is hard work. Recharge with something lighter.",
            ))
            .child(
                markup::div()
                    .class("grid grid-cols-1 md:grid-cols-2 gap-6")
                    .children(BREAKS.iter().map(|(icon, title, body)| {
                        markup::div()
                            .class("card break-card p-6 flex gap-4")
                            .child(markup::icon(icon))
                            .child(
                                markup::div()
                                    .child(markup::h3().class("text-lg font-semibold").child(markup::text(*title)))
                                    .child(markup::p().class("text-muted-foreground").child(markup::text(*body))),
                            )
                    })),
            ),
    )
}

pub fn entertainment() -> Component<()> {
    Component::<()>::new("entertainment")
        .static_template(markup_tree())
        .after_render(icons::hydrate_after_render)
        .mounted(|inst| {
            set_title(inst, TITLE);
            Vec::new()
        })
}
