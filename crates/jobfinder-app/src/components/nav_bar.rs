use jobfinder_core::markup::{self, Node};
use jobfinder_core::{Component, Methods};

use crate::AppContext;
use crate::icons;

pub const LINKS: [(&str, &str); 6] = [
    ("/", "Home"),
    ("/jobs", "Jobs"),
    ("/interview-prep", "Interview Prep"),
    ("/resume", "Resume"),
    ("/entertainment", "Entertainment"),
    ("/about", "About Us"),
];

const ACTIVE: &str = "bg-accent text-accent-foreground";

#[derive(Debug, Default)]
pub struct NavBarData {
    pub mobile_menu_open: bool,
}

fn brand() -> Node {
    markup::div().class("flex items-center").child(
        markup::a("#/")
            .class("brand flex items-center gap-2")
            .child(
                markup::div()
                    .class("brand-mark h-8 w-8 rounded-full")
                    .child(markup::span().class("text-white font-bold").child(markup::text("J"))),
            )
            .child(markup::span().class("brand-name text-xl font-bold").child(markup::text("JobFinder"))),
    )
}

fn link(path: &str, label: &str, class: &str, m: &Methods) -> Node {
    markup::a(format!("#{path}"))
        .class(class)
        .on_click(m.bind_with("navigate", path))
        .child(markup::text(label))
}

/// The site navigation bar. Re-renders on every store change so the active
/// link follows the current page.
pub fn nav_bar(ctx: &AppContext) -> Component<NavBarData> {
    let store = ctx.store.clone();
    let nav = ctx.clone();
    let watched = ctx.store.clone();

    Component::<NavBarData>::new("nav-bar")
        .template(move |d, m, _| {
            let current = store.get_state().current_page.clone();
            let desktop = LINKS.iter().map(|(path, label)| {
                link(path, label, "navbar-item", m).class_if(current == *path, ACTIVE)
            });
            let mobile = LINKS
                .iter()
                .map(|(path, label)| link(path, label, "mobile-link text-xl font-medium", m));

            markup::nav()
                .class("navbar")
                .child(brand())
                .child(markup::div().class("navbar-links hidden md:flex items-center space-x-1").children(desktop))
                .child(
                    markup::div()
                        .class("flex items-center gap-4")
                        .child(markup::button().class("btn btn-primary").child(markup::text("Sign In")))
                        .child(
                            markup::button()
                                .class("menu-toggle md:hidden navbar-item")
                                .on_click(m.bind("toggleMobileMenu"))
                                .child(markup::icon("menu")),
                        ),
                )
                .child(
                    markup::div()
                        .id("mobile-menu")
                        .class("mobile-menu fixed inset-0 z-50 flex flex-col items-center")
                        .class(if d.mobile_menu_open { "translate-x-0" } else { "translate-x-full" })
                        .attr("aria-hidden", (!d.mobile_menu_open).to_string())
                        .child(
                            markup::button()
                                .class("menu-close absolute top-4 right-4 navbar-item")
                                .on_click(m.bind("toggleMobileMenu"))
                                .child(markup::icon("x")),
                        )
                        .children(mobile),
                )
        })
        .method("toggleMobileMenu", |inst, _| {
            inst.update(|d| d.mobile_menu_open = !d.mobile_menu_open)
        })
        .method("navigate", move |inst, arg| {
            let Some(path) = arg.as_str() else { return };
            if inst.with_data(|d| d.mobile_menu_open) {
                inst.update(|d| d.mobile_menu_open = false);
            }
            nav.navigate(path);
        })
        .after_render(icons::hydrate_after_render)
        .mounted(move |inst| vec![inst.subscribe(&watched, |inst, _| inst.refresh())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppStatePatch;

    #[test]
    fn active_link_follows_the_store() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        let bar = nav_bar(&ctx).render(&ctx.runtime, doc.body(), ());

        ctx.set_state(AppStatePatch::new().current_page("/jobs"));
        let jobs = doc.query_selector(r##".navbar-item[href="#/jobs"]"##).unwrap().unwrap();
        assert!(doc.has_class(jobs, "bg-accent"));
        assert_eq!(bar.render_count(), 2);
    }

    #[test]
    fn mobile_menu_toggles_and_closes_on_navigation() {
        let ctx = AppContext::headless();
        let doc = ctx.runtime.document.clone();
        let bar = nav_bar(&ctx).render(&ctx.runtime, doc.body(), ());

        let toggle = doc.query_selector(".menu-toggle").unwrap().unwrap();
        doc.click(toggle);
        assert!(bar.with_data(|d| d.mobile_menu_open));
        let menu = doc.get_element_by_id("mobile-menu").unwrap();
        assert!(doc.has_class(menu, "translate-x-0"));

        let about = doc
            .query_selector(r##".mobile-link[href="#/about"]"##)
            .unwrap()
            .unwrap();
        doc.click(about);
        assert!(!bar.with_data(|d| d.mobile_menu_open));
        assert_eq!(ctx.location.path(), "/about");
    }
}
