use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Instance, Methods};

use super::{feature_card, follow, set_title};
use crate::components::wellness_overview::random_unit;
use crate::components::{AvatarProps, interviewer_avatar};
use crate::{AppContext, icons};

pub const TITLE: &str = "JobFinder - AI-Powered Career Platform";

fn cta(label: &str, icon: &str, path: &str, outline: bool, m: &Methods) -> Node {
    markup::button()
        .class("cta btn btn-lg")
        .class(if outline { "btn-outline" } else { "btn-primary" })
        .attr("data-path", path)
        .on_click(m.bind_with("navigate", path))
        .child(markup::span().child(markup::text(label)))
        .child(markup::icon(icon))
}

fn hero(m: &Methods) -> Node {
    markup::section().class("hero relative pt-24 pb-12 md:pt-32 md:pb-20").child(
        markup::div()
            .class("container mx-auto px-4 grid grid-cols-1 md:grid-cols-2 gap-12 items-center")
            .child(
                markup::div()
                    .class("text-center md:text-left animate-slide-up")
                    .child(
                        markup::h1()
                            .class("text-4xl md:text-5xl lg:text-6xl font-bold mb-6 text-white")
                            .child(markup::text("Find Your Dream Job With "))
                            .child(markup::span().class("text-gradient").child(markup::text("AI-Powered")))
                            .child(markup::text(" Assistance")),
                    )
                    .child(markup::p().class("text-xl mb-8 text-blue-200 md:max-w-lg").child(markup::text(
                        "JobFinder leverages cutting-edge AI to match your skills with the perfect job \
                         opportunities and prepare you for interviews.",
                    )))
                    .child(
                        markup::div()
                            .class("flex flex-col sm:flex-row gap-4 justify-center md:justify-start")
                            .child(cta("Start Job Search", "arrow-right", "/choose-search", false, m))
                            .child(cta("Practice Interviews", "video", "/interview-prep", true, m)),
                    ),
            )
            .child(
                markup::div()
                    .class("hidden md:block animate-fade-in")
                    .child(markup::div().id("avatar-container").class("relative")),
            ),
    )
}

fn features() -> Node {
    markup::section().class("features py-16 md:py-24").child(
        markup::div()
            .class("container mx-auto px-4")
            .child(
                markup::div()
                    .class("text-center mb-16")
                    .child(markup::h2().class("text-3xl md:text-4xl font-bold mb-4").child(markup::text("Powered by Advanced AI")))
                    .child(markup::p().class("text-xl text-blue-200 max-w-2xl mx-auto").child(markup::text(
                        "Our platform uses cutting-edge technology to help you find the perfect job and prepare for interviews.",
                    ))),
            )
            .child(
                markup::div()
                    .class("grid grid-cols-1 md:grid-cols-3 gap-8")
                    .child(feature_card(
                        "search",
                        "AI-Powered Job Matching",
                        "Our AI analyzes your skills, experience, and preferences to match you with the most suitable job opportunities.",
                    ))
                    .child(feature_card(
                        "video",
                        "Interview Simulator",
                        "Practice interviews with our AI interviewer that provides real-time feedback and personalized coaching.",
                    ))
                    .child(feature_card(
                        "file-text",
                        "Resume Builder",
                        "Create an optimized resume with AI suggestions tailored to your target roles and industry standards.",
                    )),
            ),
    )
}

fn footer() -> Node {
    let links = [
        ("#/about", "About Us"),
        ("#/privacy", "Privacy Policy"),
        ("#/terms", "Terms of Service"),
        ("#/contact", "Contact Us"),
    ];
    Node::element("footer")
        .class("py-8 px-4")
        .child(
            markup::div()
                .class("flex flex-wrap gap-8 justify-center")
                .children(links.iter().map(|(href, label)| {
                    markup::a(*href)
                        .class("text-sm text-blue-300")
                        .child(markup::text(*label))
                })),
        )
        .child(
            markup::div()
                .class("mt-8 text-center text-sm text-blue-300")
                .child(markup::text("© JobFinder. All rights reserved.")),
        )
}

fn mount_avatar(inst: &Instance<()>) {
    icons::hydrate_after_render(inst);
    let props = AvatarProps {
        speaking: random_unit() > 0.5,
        ..AvatarProps::default()
    };
    inst.mount_child(&interviewer_avatar(), "#avatar-container", props);
}

pub fn landing(ctx: &AppContext) -> Component<()> {
    let nav = ctx.clone();
    Component::<()>::new("landing")
        .template(|_, m, _| {
            markup::div()
                .class("landing min-h-screen")
                .child(markup::div().class("background"))
                .child(hero(m))
                .child(features())
                .child(
                    markup::section()
                        .class("call-to-action py-16 md:py-24 text-center")
                        .child(markup::h2().class("text-3xl md:text-4xl font-bold mb-6").child(markup::text("Ready to Launch Your Career?")))
                        .child(cta("Get Started", "arrow-right", "/choose-search", false, m)),
                )
                .child(footer())
        })
        .method("navigate", move |_, arg| follow(&nav, arg))
        .after_render(mount_avatar)
        .mounted(|inst| {
            set_title(inst, TITLE);
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_buttons_navigate() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        let page = landing(&ctx).render(&ctx.runtime, doc.body(), ());
        assert_eq!(doc.title(), TITLE);
        assert_eq!(doc.query_selector_all(".cta").unwrap().len(), 3);

        let practice = doc
            .query_selector(r#".cta[data-path="/interview-prep"]"#)
            .unwrap()
            .unwrap();
        doc.click(practice);
        assert_eq!(ctx.location.path(), "/interview-prep");
        assert!(page.is_attached());
    }

    #[test]
    fn avatar_lands_in_its_container() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        landing(&ctx).render(&ctx.runtime, doc.body(), ());
        let slot = doc.get_element_by_id("avatar-container").unwrap();
        let avatar = doc.children(slot)[0];
        assert_eq!(doc.attr(avatar, "data-component").as_deref(), Some("interviewer-avatar"));
        assert!(doc.query_selector(".icon-video").unwrap().is_some());
    }
}
