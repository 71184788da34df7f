use jobfinder_core::Component;
use jobfinder_core::markup::{self, Node};

use super::{page, page_header, set_title};
use crate::icons;

pub const TITLE: &str = "Resume Builder - JobFinder";

const SECTIONS: [(&str, &str, &str); 4] = [
    ("user", "Personal Information", "Add your contact details and basic information"),
    ("briefcase", "Work Experience", "List your work history and achievements"),
    ("graduation-cap", "Education", "Add your educational background"),
    ("award", "Skills & Certifications", "Highlight your key skills and certifications"),
];

const TEMPLATES: [&str; 4] = ["Classic", "Modern", "Creative", "Executive"];

fn markup_tree() -> Node {
    page("resume").child(
        markup::div()
            .class("container mx-auto px-4 py-12")
            .child(page_header(
                "Resume Builder",
                "Create a professional resume that stands out, with AI suggestions tailored to your \
                 target roles.",
            ))
            .child(markup::div().class("resume-sections grid grid-cols-1 md:grid-cols-2 gap-4").children(
                SECTIONS.iter().map(|(icon, title, body)| {
                    markup::div()
                        .class("card resume-section p-4")
                        .child(
                            markup::h3()
                                .class("font-medium mb-2 flex items-center")
                                .child(markup::icon(icon))
                                .child(markup::text(*title)),
                        )
                        .child(markup::p().class("text-sm text-muted-foreground").child(markup::text(*body)))
                }),
            ))
            .child(markup::div().class("resume-templates grid grid-cols-2 md:grid-cols-4 gap-4 mt-8").children(
                TEMPLATES.iter().map(|name| {
                    markup::div().class("card resume-template p-4").child(
                        markup::p()
                            .class("text-center text-sm font-medium")
                            .child(markup::text(format!("{name} Template"))),
                    )
                }),
            )),
    )
}

pub fn resume() -> Component<()> {
    Component::<()>::new("resume")
        .static_template(markup_tree())
        .after_render(icons::hydrate_after_render)
        .mounted(|inst| {
            set_title(inst, TITLE);
            Vec::new()
        })
}
